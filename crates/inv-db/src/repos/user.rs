use inv_core::entities::User;

use super::Record;
use crate::error::DatabaseError;
use crate::helpers::{get_id, get_opt_id, get_timestamps, opt_id_value};

impl Record for User {
    const COLUMNS: &'static [&'static str] = &["name", "email", "team_id"];
    const TEAM_COLUMN: Option<&'static str> = Some("team_id");

    fn bind(&self) -> Vec<libsql::Value> {
        vec![
            libsql::Value::Text(self.name.clone()),
            libsql::Value::Text(self.email.clone()),
            opt_id_value(self.team_id),
        ]
    }

    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError> {
        let (created_at, updated_at) = get_timestamps(row, 4)?;
        Ok(Self {
            id: get_id(row, 0)?,
            name: row.get::<String>(1)?,
            email: row.get::<String>(2)?,
            team_id: get_opt_id(row, 3)?,
            created_at,
            updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::super::{fetch, insert, list};
    use super::*;
    use crate::test_support::helpers::test_db;
    use inv_core::filter::ListFilter;

    #[tokio::test]
    async fn team_is_nullable() {
        let db = test_db().await;
        let user = User {
            name: "jdoe".into(),
            email: "jdoe@example.com".into(),
            ..User::default()
        };
        let id = insert(db.conn(), &user).await.unwrap();
        let stored: User = fetch(db.conn(), id).await.unwrap().unwrap();
        assert_eq!(stored.team_id, None);
        assert_eq!(stored.email, "jdoe@example.com");
    }

    #[tokio::test]
    async fn list_by_team() {
        let db = test_db().await;
        for (name, team) in [("a", Some(1)), ("b", Some(2)), ("c", None)] {
            let user = User {
                name: name.into(),
                email: format!("{name}@example.com"),
                team_id: team,
                ..User::default()
            };
            insert(db.conn(), &user).await.unwrap();
        }
        let filter = ListFilter {
            team_ids: vec![2],
            ..ListFilter::default()
        };
        let users: Vec<User> = list(db.conn(), &filter).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "b");
    }
}
