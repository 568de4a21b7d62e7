//! Local JSON table dumps
//!
//! Reads `<dir>/<table>.json`, a JSON array of objects, one per item. Used
//! for offline runs against exported tables and by the integration tests.

use crate::error::{ReportError, Result};
use async_trait::async_trait;
use oakreport_core::source::TableSource;
use oakreport_core::types::{FieldValue, Item};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Table source backed by a directory of JSON files
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    dir: PathBuf,
}

impl JsonDirSource {
    /// Read tables from `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the dump for `table`
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.json"))
    }
}

#[async_trait]
impl TableSource for JsonDirSource {
    fn name(&self) -> &str {
        "json"
    }

    async fn scan(&self, table: &str) -> Result<Vec<Item>> {
        let path = self.table_path(table);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ReportError::fetch(table, format!("{}: {e}", path.display())))?;
        let items = parse_items(&content, &path).map_err(|message| ReportError::fetch(table, message))?;
        debug!("Read {} items from {}", items.len(), path.display());
        Ok(items)
    }
}

fn parse_items(content: &str, path: &Path) -> std::result::Result<Vec<Item>, String> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| format!("{}: {e}", path.display()))?;
    let Value::Array(entries) = value else {
        return Err(format!("{}: expected a JSON array", path.display()));
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::Object(fields) => Ok(fields
                .into_iter()
                .map(|(name, value)| (name, FieldValue::from(value)))
                .collect()),
            _ => Err(format!("{}: entry {index} is not an object", path.display())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scan_reads_objects() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("accounts.json"),
            r#"[{"account": "A1", "username": "Alice"}, {"account": "A2", "age": 3}]"#,
        )
        .unwrap();

        let items = JsonDirSource::new(dir.path()).scan("accounts").await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["username"], FieldValue::Text("Alice".into()));
        assert_eq!(items[1]["age"], FieldValue::Number(3.0));
    }

    #[tokio::test]
    async fn test_missing_table_is_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonDirSource::new(dir.path())
            .scan("oak-usage-log-vtc")
            .await
            .unwrap_err();
        match err {
            ReportError::Fetch { table, .. } => assert_eq!(table, "oak-usage-log-vtc"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_non_array_is_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("t.json"), r#"{"account": "A1"}"#).unwrap();
        let err = JsonDirSource::new(dir.path()).scan("t").await.unwrap_err();
        assert!(err.to_string().contains("expected a JSON array"));
    }
}
