use sqlbind_core::{data::SqlType, err::Result};

use super::PreparedStatement;

/// A column as reported by the database metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMetadata {
    /// The table the column belongs to
    pub table: String,
    /// The column name, as reported by the driver
    pub name: String,
    /// The SQL type code (`DATA_TYPE`)
    pub sql_type: SqlType,
    /// The driver specific type name (`TYPE_NAME`)
    pub type_name: String,
}

impl ColumnMetadata {
    pub fn new(
        table: impl Into<String>,
        name: impl Into<String>,
        sql_type: SqlType,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
            sql_type,
            type_name: type_name.into(),
        }
    }
}

/// Access to the metadata of the connected database
pub trait DatabaseMetadata {
    /// Gets the product name of the database, eg "Oracle" or "PostgreSQL"
    fn database_product_name(&mut self) -> Result<String>;

    /// Gets the columns of the supplied table in their declared order.
    /// Returns an empty list if the table does not exist.
    fn get_columns(&mut self, schema: Option<&str>, table: &str) -> Result<Vec<ColumnMetadata>>;
}

/// An open connection to the database
pub trait Connection: DatabaseMetadata {
    type TStatement: PreparedStatement;

    /// Prepares the supplied SQL, with `?` bind markers, for execution
    fn prepare(&mut self, sql: &str) -> Result<Self::TStatement>;
}
