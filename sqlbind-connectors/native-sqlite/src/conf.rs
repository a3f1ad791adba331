use serde::{Deserialize, Serialize};
use sqlbind_core::{
    config,
    err::{Context, Result},
};

/// The connection config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SqliteConnectionConfig {
    /// Path to the database file.
    /// Set to ":memory:" for an in-memory db.
    pub path: String,
}

impl SqliteConnectionConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn parse(options: config::Value) -> Result<Self> {
        config::from_value::<Self>(options)
            .context("Failed to parse connection configuration options")
    }
}

#[cfg(test)]
mod tests {
    use sqlbind_core::config::parse_config;

    use super::*;

    #[test]
    fn test_parse_connection_config() {
        let conf = SqliteConnectionConfig::parse(parse_config("path: \"/tmp/db.sqlite\"").unwrap())
            .unwrap();

        assert_eq!(conf, SqliteConnectionConfig::new("/tmp/db.sqlite"));
    }

    #[test]
    fn test_parse_connection_config_missing_path() {
        SqliteConnectionConfig::parse(parse_config("other: 1").unwrap()).unwrap_err();
    }
}
