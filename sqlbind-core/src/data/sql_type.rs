use serde::{Deserialize, Serialize};

use crate::err::{self, bail, Result};

/// Constants representing the SQL type codes reported by database metadata
/// and used when binding typed nulls.
///
/// The discriminants match the `java.sql.Types` codes so that the values
/// reported in the `DATA_TYPE` column of column metadata can be
/// converted directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum SqlType {
    Bit = -7,
    TinyInt = -6,
    SmallInt = 5,
    Integer = 4,
    BigInt = -5,
    Float = 6,
    Real = 7,
    Double = 8,
    Numeric = 2,
    Decimal = 3,
    Char = 1,
    Varchar = 12,
    LongVarchar = -1,
    Date = 91,
    Time = 92,
    Timestamp = 93,
    Binary = -2,
    VarBinary = -3,
    LongVarBinary = -4,
    Null = 0,
    Other = 1111,
    JavaObject = 2000,
    Struct = 2002,
    Array = 2003,
    Blob = 2004,
    Clob = 2005,
    Boolean = 16,
    NChar = -15,
    NVarchar = -9,
    LongNVarchar = -16,
    NClob = 2011,
    TimeWithTimezone = 2013,
    TimestampWithTimezone = 2014,
}

impl TryFrom<i32> for SqlType {
    type Error = err::Error;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            -7 => Self::Bit,
            -6 => Self::TinyInt,
            5 => Self::SmallInt,
            4 => Self::Integer,
            -5 => Self::BigInt,
            6 => Self::Float,
            7 => Self::Real,
            8 => Self::Double,
            2 => Self::Numeric,
            3 => Self::Decimal,
            1 => Self::Char,
            12 => Self::Varchar,
            -1 => Self::LongVarchar,
            91 => Self::Date,
            92 => Self::Time,
            93 => Self::Timestamp,
            -2 => Self::Binary,
            -3 => Self::VarBinary,
            -4 => Self::LongVarBinary,
            0 => Self::Null,
            1111 => Self::Other,
            2000 => Self::JavaObject,
            2002 => Self::Struct,
            2003 => Self::Array,
            2004 => Self::Blob,
            2005 => Self::Clob,
            16 => Self::Boolean,
            -15 => Self::NChar,
            -9 => Self::NVarchar,
            -16 => Self::LongNVarchar,
            2011 => Self::NClob,
            2013 => Self::TimeWithTimezone,
            2014 => Self::TimestampWithTimezone,
            _ => bail!("Unrecognized SQL type code: {}", value),
        })
    }
}

impl SqlType {
    /// Gets the numeric type code
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_type_code_conversions() {
        let types = [
            SqlType::Bit,
            SqlType::TinyInt,
            SqlType::SmallInt,
            SqlType::Integer,
            SqlType::BigInt,
            SqlType::Float,
            SqlType::Real,
            SqlType::Double,
            SqlType::Numeric,
            SqlType::Decimal,
            SqlType::Char,
            SqlType::Varchar,
            SqlType::LongVarchar,
            SqlType::Date,
            SqlType::Time,
            SqlType::Timestamp,
            SqlType::Binary,
            SqlType::VarBinary,
            SqlType::LongVarBinary,
            SqlType::Null,
            SqlType::Other,
            SqlType::JavaObject,
            SqlType::Struct,
            SqlType::Array,
            SqlType::Blob,
            SqlType::Clob,
            SqlType::Boolean,
            SqlType::NChar,
            SqlType::NVarchar,
            SqlType::LongNVarchar,
            SqlType::NClob,
            SqlType::TimeWithTimezone,
            SqlType::TimestampWithTimezone,
        ];

        for t in types.into_iter() {
            assert_eq!(SqlType::try_from(t.code()).unwrap(), t);
        }
    }

    #[test]
    fn test_sql_type_unknown_code() {
        assert!(SqlType::try_from(-999).is_err());
    }
}
