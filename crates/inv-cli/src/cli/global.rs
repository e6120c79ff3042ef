use std::path::PathBuf;

use inv_core::identity::Caller;

/// Global flags available before or after subcommands.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub config: Option<PathBuf>,
    pub db: Option<String>,
    pub subject: String,
    pub roles: Vec<String>,
}

impl GlobalFlags {
    /// The identity handed to the policy gate.
    #[must_use]
    pub fn caller(&self) -> Caller {
        self.roles
            .iter()
            .fold(Caller::new(self.subject.clone()), |caller, role| {
                caller.with_role(role.clone())
            })
    }
}
