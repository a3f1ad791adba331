use std::collections::HashMap;

use sqlbind_core::{
    data::ColumnType,
    err::{Context, Result, StatementError},
};
use sqlbind_logging::debug;

use crate::interface::DatabaseMetadata;

/// Objects which legitimately report no columns through the metadata api
const SYSTEM_OBJECTS: [&str; 3] = ["DUAL", "SYSDUMMY1", "SYSIBM.SYSDUMMY1"];

/// The resolved type of a single column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    /// The column name as reported by the driver
    pub name: String,
    pub column_type: ColumnType,
    /// The driver type name, used as the type hint of array values
    pub type_name: String,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, column_type: ColumnType, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type,
            type_name: type_name.into(),
        }
    }
}

/// Mapping of column names to their types.
///
/// Lookups are case insensitive, the columns are retained in the
/// order reported by the database.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeMap {
    columns: Vec<ColumnInfo>,
    lookup: HashMap<String, usize>,
}

impl TypeMap {
    pub fn new(columns: Vec<ColumnInfo>) -> Self {
        let mut map = Self::default();

        for col in columns.into_iter() {
            map.insert(col);
        }

        map
    }

    /// Adds the column, if a column with the same name already exists
    /// the first definition is retained
    fn insert(&mut self, col: ColumnInfo) -> bool {
        let key = col.name.to_uppercase();

        if self.lookup.contains_key(&key) {
            return false;
        }

        self.lookup.insert(key, self.columns.len());
        self.columns.push(col);
        true
    }

    pub fn get(&self, name: &str) -> Option<&ColumnInfo> {
        self.lookup
            .get(&name.to_uppercase())
            .map(|idx| &self.columns[*idx])
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.get(name).map(|c| c.column_type)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(&name.to_uppercase())
    }

    /// The columns in the order reported by the database
    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Resolves column types from the database metadata
pub struct TypeRegistry;

impl TypeRegistry {
    /// Queries the column metadata of the supplied table, or comma-separated
    /// list of tables, and unions the results into a single type map.
    pub fn resolve<M: DatabaseMetadata + ?Sized>(
        metadata: &mut M,
        schema: Option<&str>,
        tables: &str,
    ) -> Result<TypeMap> {
        let mut map = TypeMap::default();

        for table in tables.split(',').map(|t| t.trim()).filter(|t| !t.is_empty()) {
            let cols = metadata
                .get_columns(schema, table)
                .with_context(|| format!("Failed to retrieve columns of table \"{}\"", table))?;

            if cols.is_empty() {
                if Self::is_system_object(table) {
                    debug!("System object \"{}\" reported no columns", table);
                    continue;
                }

                return Err(StatementError::TableNotFound {
                    table: table.to_string(),
                }
                .into());
            }

            for col in cols.into_iter() {
                let column_type = ColumnType::from_metadata(col.sql_type, &col.type_name);
                debug!(
                    "Resolved column \"{}\".\"{}\" ({:?} {}) as {}",
                    table, col.name, col.sql_type, col.type_name, column_type
                );

                if !map.insert(ColumnInfo::new(col.name.clone(), column_type, col.type_name)) {
                    debug!("Ignoring duplicate column \"{}\" of table \"{}\"", col.name, table);
                }
            }
        }

        Ok(map)
    }

    fn is_system_object(table: &str) -> bool {
        let table = table.to_uppercase();
        SYSTEM_OBJECTS.iter().any(|o| *o == table)
    }
}
