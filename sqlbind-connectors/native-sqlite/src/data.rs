use serde_json::{Number, Value as JsonValue};
use sqlbind_core::data::SqlType;
use rusqlite::types::Value;

/// Maps the declared type of a column to the SQL type a JDBC style driver
/// would report for it, along with the type name.
///
/// Sqlite columns only carry a type affinity, the declared name is used to
/// recover the more specific date, time, boolean, json and national
/// character types.
/// @see sqlite3AffinityType in sqlite source
pub fn from_sqlite_type(decl: &str) -> (SqlType, String) {
    let r#type = decl.trim().to_uppercase();

    let sql_type = if r#type.contains("NCHAR")
        || r#type.contains("NVARCHAR")
        || r#type.contains("NTEXT")
    {
        SqlType::NVarchar
    } else if r#type.contains("BIGINT") {
        SqlType::BigInt
    } else if r#type.contains("INT") {
        SqlType::Integer
    } else if r#type.contains("BOOL") {
        SqlType::Boolean
    } else if r#type.contains("TIMESTAMP") || r#type.contains("DATETIME") {
        SqlType::Timestamp
    } else if r#type.contains("DATE") {
        SqlType::Date
    } else if r#type.contains("TIME") {
        SqlType::Time
    } else if r#type.contains("JSON") {
        SqlType::Other
    } else if r#type.contains("CHAR") || r#type.contains("CLOB") || r#type.contains("TEXT") {
        SqlType::Varchar
    } else if r#type.contains("BLOB") || r#type.is_empty() {
        SqlType::Blob
    } else if r#type.contains("REAL") || r#type.contains("DOUB") {
        SqlType::Double
    } else if r#type.contains("FLOA") {
        SqlType::Float
    } else if r#type.contains("DEC") || r#type.contains("NUM") {
        SqlType::Decimal
    } else {
        SqlType::Varchar
    };

    (sql_type, decl.trim().to_string())
}

/// Converts a value read from sqlite into JSON
pub fn to_json(val: Value) -> JsonValue {
    match val {
        Value::Null => JsonValue::Null,
        Value::Integer(i) => JsonValue::from(i),
        Value::Real(f) => Number::from_f64(f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Text(s) => JsonValue::String(s),
        // Blobs are returned as their utf8 representation
        Value::Blob(b) => JsonValue::String(String::from_utf8_lossy(&b).into_owned()),
    }
}
