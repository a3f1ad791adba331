use std::io::Cursor;

use serde_json::Value;
use sqlbind_core::{
    data::{
        bigdecimal::BigDecimal,
        chrono::{NaiveDate, NaiveDateTime, NaiveTime},
        ColumnType, Dialect, SqlObject, SqlType,
    },
    err::{Result, StatementError},
};
use sqlbind_logging::trace;

use crate::{interface::PreparedStatement, type_registry::ColumnInfo};

mod array;
pub use array::*;
mod json;
pub use json::*;
mod literal;
pub use literal::*;

/// A value converted to the shape of the setter it will be bound through.
///
/// Conversion performs all parsing up front so a plan of values can be
/// validated before anything touches the statement.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Null(SqlType, Option<String>),
    Decimal(BigDecimal),
    Long(i64),
    Float(f32),
    Boolean(bool),
    String(String),
    NString(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    Blob(Vec<u8>),
    BinaryStream(Vec<u8>),
    Object(SqlObject),
}

impl BindValue {
    /// Binds the value onto the supplied slot of the statement
    pub fn apply<S: PreparedStatement + ?Sized>(self, stmt: &mut S, index: usize) -> Result<()> {
        match self {
            BindValue::Null(sql_type, hint) => stmt.set_null(index, sql_type, hint.as_deref()),
            BindValue::Decimal(d) => stmt.set_big_decimal(index, &d),
            BindValue::Long(i) => stmt.set_long(index, i),
            BindValue::Float(f) => stmt.set_float(index, f),
            BindValue::Boolean(b) => stmt.set_boolean(index, b),
            BindValue::String(s) => stmt.set_string(index, &s),
            BindValue::NString(s) => stmt.set_nstring(index, &s),
            BindValue::Date(d) => stmt.set_date(index, d),
            BindValue::Time(t) => stmt.set_time(index, t),
            BindValue::Timestamp(ts) => stmt.set_timestamp(index, ts),
            BindValue::Blob(data) => stmt.set_blob(index, &mut Cursor::new(data)),
            BindValue::BinaryStream(data) => {
                let len = data.len();
                stmt.set_binary_stream(index, &mut Cursor::new(data), len)
            }
            BindValue::Object(obj) => stmt.set_object(index, obj),
        }
    }
}

/// Converts JSON values to the bind values of their column type and binds
/// them, applying the rules of the target database.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypedBinder {
    dialect: Dialect,
    /// Whether values are bound for batch execution
    batched: bool,
}

impl TypedBinder {
    pub fn new(dialect: Dialect, batched: bool) -> Self {
        Self { dialect, batched }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Converts and binds the value onto the supplied slot.
    ///
    /// Literals which do not parse into the column type fail with
    /// [`StatementError::InvalidFormat`] before the statement is touched,
    /// driver failures are wrapped in [`StatementError::SqlBind`].
    pub fn bind<S: PreparedStatement + ?Sized>(
        &self,
        stmt: &mut S,
        index: usize,
        column: &ColumnInfo,
        value: &Value,
    ) -> Result<()> {
        let converted = self.convert(column, value)?;
        trace!(
            "Binding {:?} to parameter {} ({} {})",
            converted,
            index,
            column.name,
            column.column_type
        );

        converted
            .apply(stmt, index)
            .map_err(|source| StatementError::SqlBind { index, source }.into())
    }

    /// Converts the value into the bind value of the column type
    pub fn convert(&self, column: &ColumnInfo, value: &Value) -> Result<BindValue> {
        if value.is_null() {
            return Ok(self.null(column));
        }

        let text = literal(value);

        Ok(match column.column_type {
            ColumnType::Integer | ColumnType::Double => BindValue::Decimal(parse_decimal(&text)?),
            ColumnType::Long => BindValue::Long(parse_long(&text)?),
            ColumnType::Float => BindValue::Float(parse_float(&text)?),
            ColumnType::String => BindValue::String(text),
            ColumnType::NVarchar => BindValue::NString(unescape(&text)?),
            ColumnType::Boolean => BindValue::Boolean(parse_boolean(&text)?),
            ColumnType::Date => {
                let date = parse_date(&text)?;

                if self.dialect.binds_date_as_string() {
                    BindValue::String(text)
                } else {
                    BindValue::Date(date)
                }
            }
            ColumnType::Time => {
                let time = parse_time(&text)?;

                if self.dialect.binds_time_as_string(self.batched) {
                    BindValue::String(text)
                } else {
                    BindValue::Time(time)
                }
            }
            ColumnType::Timestamp => BindValue::Timestamp(parse_timestamp(&text)?),
            ColumnType::Blob => match self.dialect {
                Dialect::PostgreSql => BindValue::BinaryStream(text.into_bytes()),
                _ => BindValue::Blob(text.into_bytes()),
            },
            ColumnType::Json => self.convert_json(value)?,
            ColumnType::Array => {
                BindValue::Object(SqlObject::Array(build_array(&column.type_name, value)?))
            }
        })
    }

    fn null(&self, column: &ColumnInfo) -> BindValue {
        match (column.column_type, self.dialect) {
            (ColumnType::Json, Dialect::PostgreSql) => BindValue::Null(SqlType::Other, None),
            (ColumnType::Array, Dialect::Oracle) => {
                BindValue::Null(SqlType::Array, Some(column.type_name.clone()))
            }
            (t, _) => BindValue::Null(t.null_type(), None),
        }
    }

    fn convert_json(&self, value: &Value) -> Result<BindValue> {
        let doc = json_document(value)?;

        Ok(match (self.dialect, doc) {
            (Dialect::PostgreSql, doc) => BindValue::Object(SqlObject::PgJson(match value {
                Value::String(text) => text.clone(),
                _ => doc.to_string(),
            })),
            (Dialect::Oracle, Value::Object(obj)) => {
                BindValue::Object(SqlObject::OracleJson(to_oracle_object(&obj)?))
            }
            (_, doc) => BindValue::String(doc.to_string()),
        })
    }
}

impl Default for TypedBinder {
    fn default() -> Self {
        Self::new(Dialect::Other, false)
    }
}
