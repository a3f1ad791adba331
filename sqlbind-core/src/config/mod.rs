use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use serde_yaml::{from_value, Mapping, Value};

use crate::err::{Context, Result};

mod util;
pub use util::*;

/// The kind of statement an operation executes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    Get,
    Insert,
    Update,
    Delete,
    /// Executes the configured query as-is, a template is required
    Execute,
}

/// How array values are spread over the slots of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ArrayMode {
    /// Elements are reused from the start of the array when there are
    /// more slots than elements
    #[default]
    Lenient,
    /// The number of slots must equal the number of elements
    Strict,
}

/// The configuration of a single statement operation
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct OperationConfig {
    /// The statement kind
    pub kind: OperationKind,
    /// The schema of the target tables
    pub schema: Option<String>,
    /// The target table, or a comma-separated list of tables for
    /// multi-table profiles
    pub tables: String,
    /// The SQL template, if any. Without a template statements are
    /// generated from the table metadata and the request document.
    pub query: Option<String>,
    /// Whether the template uses an IN clause fed from a JSON array
    #[serde(default)]
    pub in_clause: bool,
    /// Overrides the product name reported by the driver
    pub database_product: Option<String>,
    /// Statement timeout passed through to the driver
    pub query_timeout_secs: Option<u64>,
    /// Whether statements are bound for batched execution
    #[serde(default)]
    pub batched: bool,
    #[serde(default)]
    pub array_mode: ArrayMode,
}

impl OperationConfig {
    pub fn new(kind: OperationKind, tables: impl Into<String>) -> Self {
        Self {
            kind,
            schema: None,
            tables: tables.into(),
            query: None,
            in_clause: false,
            database_product: None,
            query_timeout_secs: None,
            batched: false,
            array_mode: ArrayMode::default(),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_in_clause(mut self, in_clause: bool) -> Self {
        self.in_clause = in_clause;
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn parse(options: Value) -> Result<Self> {
        from_value::<Self>(options).context("Failed to parse operation configuration options")
    }

    /// The configured template, empty templates are treated as absent
    pub fn template(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(|q| q.trim())
            .filter(|q| !q.is_empty())
    }

    /// The list of configured table names
    pub fn table_names(&self) -> Vec<String> {
        self.tables
            .split(',')
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .collect()
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_operation_config() {
        let conf = parse_config(
            r#"
kind: Get
schema: "HR"
tables: "EMPLOYEES, DEPARTMENTS"
query: "SELECT * FROM EMPLOYEES WHERE ID IN($ids)"
in_clause: true
query_timeout_secs: 30
array_mode: Strict
"#,
        )
        .unwrap();

        let parsed = OperationConfig::parse(conf).unwrap();

        assert_eq!(
            parsed,
            OperationConfig {
                kind: OperationKind::Get,
                schema: Some("HR".into()),
                tables: "EMPLOYEES, DEPARTMENTS".into(),
                query: Some("SELECT * FROM EMPLOYEES WHERE ID IN($ids)".into()),
                in_clause: true,
                database_product: None,
                query_timeout_secs: Some(30),
                batched: false,
                array_mode: ArrayMode::Strict,
            }
        );
        assert_eq!(
            parsed.table_names(),
            vec!["EMPLOYEES".to_string(), "DEPARTMENTS".to_string()]
        );
        assert_eq!(parsed.query_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_parse_operation_config_defaults() {
        let conf = parse_config(
            r#"
kind: Insert
tables: "ORDERS"
"#,
        )
        .unwrap();

        let parsed = OperationConfig::parse(conf).unwrap();

        assert_eq!(parsed, OperationConfig::new(OperationKind::Insert, "ORDERS"));
        assert_eq!(parsed.template(), None);
    }

    #[test]
    fn test_blank_template_is_absent() {
        let conf = OperationConfig::new(OperationKind::Get, "T").with_query("   ");

        assert_eq!(conf.template(), None);
    }

    #[test]
    fn test_parse_operation_config_invalid_kind() {
        let conf = parse_config("kind: Merge\ntables: T").unwrap();

        assert!(OperationConfig::parse(conf).is_err());
    }
}
