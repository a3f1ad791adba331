use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::err::{self, bail, Result};

use super::SqlType;

/// The semantic type of a column, which decides how request values
/// are converted and bound onto a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Long,
    Float,
    Double,
    String,
    NVarchar,
    Date,
    Time,
    Timestamp,
    Boolean,
    Blob,
    Json,
    Array,
}

impl ColumnType {
    /// Maps the type reported by the column metadata to the semantic type.
    ///
    /// The type name takes precedence for JSON columns as most drivers report
    /// them as OTHER or VARCHAR.
    pub fn from_metadata(sql_type: SqlType, type_name: &str) -> Self {
        let type_name = type_name.to_lowercase();

        if type_name == "json" || type_name == "jsonb" {
            return Self::Json;
        }

        match sql_type {
            SqlType::TinyInt | SqlType::SmallInt | SqlType::Integer => Self::Integer,
            SqlType::BigInt => Self::Long,
            SqlType::Real | SqlType::Float => Self::Float,
            SqlType::Double | SqlType::Numeric | SqlType::Decimal => Self::Double,
            SqlType::Char | SqlType::Varchar | SqlType::LongVarchar | SqlType::Clob => {
                Self::String
            }
            SqlType::NChar | SqlType::NVarchar | SqlType::LongNVarchar | SqlType::NClob => {
                Self::NVarchar
            }
            SqlType::Date => Self::Date,
            SqlType::Time | SqlType::TimeWithTimezone => Self::Time,
            SqlType::Timestamp | SqlType::TimestampWithTimezone => Self::Timestamp,
            SqlType::Bit | SqlType::Boolean => Self::Boolean,
            SqlType::Blob | SqlType::Binary | SqlType::VarBinary | SqlType::LongVarBinary => {
                Self::Blob
            }
            SqlType::Array | SqlType::Struct => Self::Array,
            SqlType::Null | SqlType::Other | SqlType::JavaObject => Self::String,
        }
    }

    /// The SQL type used when binding a null of this column type
    pub fn null_type(&self) -> SqlType {
        match self {
            ColumnType::Integer => SqlType::Integer,
            ColumnType::Long => SqlType::BigInt,
            ColumnType::Float => SqlType::Float,
            ColumnType::Double => SqlType::Decimal,
            ColumnType::String => SqlType::Varchar,
            ColumnType::NVarchar => SqlType::NVarchar,
            ColumnType::Date => SqlType::Date,
            ColumnType::Time => SqlType::Time,
            ColumnType::Timestamp => SqlType::Timestamp,
            ColumnType::Boolean => SqlType::Boolean,
            ColumnType::Blob => SqlType::Blob,
            ColumnType::Json => SqlType::Null,
            ColumnType::Array => SqlType::Array,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Long => "long",
            ColumnType::Float => "float",
            ColumnType::Double => "double",
            ColumnType::String => "string",
            ColumnType::NVarchar => "nvarchar",
            ColumnType::Date => "date",
            ColumnType::Time => "time",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Boolean => "boolean",
            ColumnType::Blob => "blob",
            ColumnType::Json => "json",
            ColumnType::Array => "array",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = err::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_lowercase().as_str() {
            "integer" => Self::Integer,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            "string" => Self::String,
            "nvarchar" => Self::NVarchar,
            "date" => Self::Date,
            "time" => Self::Time,
            "timestamp" => Self::Timestamp,
            "boolean" => Self::Boolean,
            "blob" => Self::Blob,
            "json" => Self::Json,
            "array" => Self::Array,
            _ => bail!("Unrecognized column type: {}", s),
        })
    }
}
