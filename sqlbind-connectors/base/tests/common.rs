use sqlbind_connectors_base::{interface::ColumnMetadata, memory::MemoryConnection};
use sqlbind_core::data::SqlType;

/// A connection exposing an EMPLOYEES table with one column of each
/// commonly used type
pub fn employees(product: &str) -> MemoryConnection {
    MemoryConnection::new(product).with_table(
        "EMPLOYEES",
        vec![
            ColumnMetadata::new("EMPLOYEES", "ID", SqlType::Integer, "INTEGER"),
            ColumnMetadata::new("EMPLOYEES", "NAME", SqlType::Varchar, "VARCHAR"),
            ColumnMetadata::new("EMPLOYEES", "SALARY", SqlType::Numeric, "NUMBER"),
            ColumnMetadata::new("EMPLOYEES", "HIRED", SqlType::Date, "DATE"),
            ColumnMetadata::new("EMPLOYEES", "PHOTO", SqlType::Blob, "BLOB"),
            ColumnMetadata::new("EMPLOYEES", "PROFILE", SqlType::Other, "jsonb"),
        ],
    )
}
