use std::sync::Arc;

use fallible_iterator::FallibleIterator;
use rusqlite::OpenFlags;
use sqlbind_connectors_base::interface::{ColumnMetadata, Connection, DatabaseMetadata};
use sqlbind_core::err::{Context, Result};
use sqlbind_logging::{debug, trace};

use crate::{from_sqlite_type, SqliteConnectionConfig, SqliteConnector, SqlitePreparedStatement};

/// Wrapper for the sqlite connection
pub struct SqliteConnection {
    con: Arc<rusqlite::Connection>,
}

impl SqliteConnection {
    pub fn new(con: rusqlite::Connection) -> Self {
        Self { con: Arc::new(con) }
    }

    /// Opens the database file at the configured path
    pub fn open(config: &SqliteConnectionConfig) -> Result<Self> {
        debug!("Opening sqlite database at \"{}\"", config.path);
        let con = rusqlite::Connection::open_with_flags(config.path.clone(), OpenFlags::default())
            .context("Failed to connect to sqlite")?;

        Ok(Self::new(con))
    }

    pub(crate) fn con(&self) -> Arc<rusqlite::Connection> {
        Arc::clone(&self.con)
    }

    /// Runs the supplied statements as-is, without any parameters
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.con
            .execute_batch(sql)
            .with_context(|| format!("Failed to execute sql: {}", sql))
    }
}

impl DatabaseMetadata for SqliteConnection {
    fn database_product_name(&mut self) -> Result<String> {
        Ok(SqliteConnector::PRODUCT_NAME.into())
    }

    fn get_columns(&mut self, schema: Option<&str>, table: &str) -> Result<Vec<ColumnMetadata>> {
        let sql = match schema {
            Some(_) => "SELECT name, type FROM pragma_table_info(?1, ?2)",
            None => "SELECT name, type FROM pragma_table_info(?1)",
        };
        trace!("Retrieving columns of \"{}\" using: {}", table, sql);

        let mut stmt = self
            .con
            .prepare(sql)
            .context("Failed to prepare table info query")?;

        let rows = match schema {
            Some(schema) => stmt.query([table, schema]),
            None => stmt.query([table]),
        }
        .context("Failed to query table info")?;

        let cols = rows
            .map(|row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .collect::<Vec<(String, String)>>()
            .context("Failed to read table info")?;

        Ok(cols
            .into_iter()
            .map(|(name, decl)| {
                let (sql_type, type_name) = from_sqlite_type(&decl);
                ColumnMetadata::new(table, name, sql_type, type_name)
            })
            .collect())
    }
}

impl Connection for SqliteConnection {
    type TStatement = SqlitePreparedStatement;

    fn prepare(&mut self, sql: &str) -> Result<Self::TStatement> {
        SqlitePreparedStatement::prepare(self.con(), sql)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sqlbind_core::data::SqlType;

    use super::*;

    fn connection() -> SqliteConnection {
        SqliteConnector::connect(SqliteConnectionConfig::new(":memory:")).unwrap()
    }

    #[test]
    fn test_get_columns() {
        let mut con = connection();
        con.execute_batch("CREATE TABLE people (id INTEGER, name VARCHAR(50), joined DATE)")
            .unwrap();

        assert_eq!(con.database_product_name().unwrap(), "SQLite");
        assert_eq!(
            con.get_columns(None, "people").unwrap(),
            vec![
                ColumnMetadata::new("people", "id", SqlType::Integer, "INTEGER"),
                ColumnMetadata::new("people", "name", SqlType::Varchar, "VARCHAR(50)"),
                ColumnMetadata::new("people", "joined", SqlType::Date, "DATE"),
            ]
        );
        assert_eq!(
            con.get_columns(Some("main"), "people").unwrap().len(),
            3
        );
    }

    #[test]
    fn test_get_columns_unknown_table() {
        let mut con = connection();

        assert_eq!(con.get_columns(None, "missing").unwrap(), vec![]);
    }

    #[test]
    fn test_prepare_invalid_sql() {
        let mut con = connection();

        con.prepare("SELEC 1").unwrap_err();
    }
}
