use anyhow::Context;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Read `--json` input: inline JSON, or `@path` for a file.
pub fn read_payload(raw: &str) -> anyhow::Result<String> {
    match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read payload file {path}")),
        None => Ok(raw.to_string()),
    }
}

/// Parse a payload holding either one object or an array of objects.
pub fn parse_batch<T: DeserializeOwned>(payload: &str) -> anyhow::Result<Vec<T>> {
    let value: Value = serde_json::from_str(payload).context("payload is not valid JSON")?;
    let batch = match value {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>(),
        single => serde_json::from_value(single).map(|item| vec![item]),
    };
    batch.context("payload does not match the resource shape")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use inv_core::entities::Tag;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn single_object_becomes_one_item_batch() {
        let batch: Vec<Tag> = parse_batch(r#"{"name":"blue"}"#).unwrap();
        assert_eq!(batch, vec![Tag::named("blue")]);
    }

    #[test]
    fn array_keeps_order() {
        let batch: Vec<Tag> = parse_batch(r#"[{"name":"b"},{"name":"a"}]"#).unwrap();
        let names: Vec<_> = batch.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let err = parse_batch::<Tag>(r#"{"title":"x"}"#).unwrap_err();
        assert!(err.to_string().contains("resource shape"));
    }

    #[test]
    fn at_prefix_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"name":"from-file"}}"#).unwrap();
        let raw = format!("@{}", file.path().display());
        assert_eq!(read_payload(&raw).unwrap(), r#"{"name":"from-file"}"#);
        assert_eq!(read_payload("{}").unwrap(), "{}");
    }
}
