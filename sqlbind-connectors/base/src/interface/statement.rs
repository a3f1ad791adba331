use std::{io::Read, time::Duration};

use enum_as_inner::EnumAsInner;
use serde_json::Value;
use sqlbind_core::{
    data::{
        bigdecimal::BigDecimal,
        chrono::{NaiveDate, NaiveDateTime, NaiveTime},
        SqlObject, SqlType,
    },
    err::Result,
};

/// A prepared statement with positional (1-based) bind markers.
///
/// Values are bound through the setter family, the statement keeps
/// its bound values until they are cleared or overwritten.
pub trait PreparedStatement {
    /// Binds a SQL NULL of the supplied type. Some drivers require the
    /// name of the user-defined type for ARRAY and STRUCT nulls.
    fn set_null(&mut self, index: usize, sql_type: SqlType, type_name: Option<&str>)
        -> Result<()>;

    /// Binds an exact numeric of arbitrary precision
    fn set_big_decimal(&mut self, index: usize, value: &BigDecimal) -> Result<()>;

    fn set_long(&mut self, index: usize, value: i64) -> Result<()>;

    fn set_float(&mut self, index: usize, value: f32) -> Result<()>;

    fn set_boolean(&mut self, index: usize, value: bool) -> Result<()>;

    fn set_string(&mut self, index: usize, value: &str) -> Result<()>;

    /// Binds national character text
    fn set_nstring(&mut self, index: usize, value: &str) -> Result<()>;

    fn set_date(&mut self, index: usize, value: NaiveDate) -> Result<()>;

    fn set_time(&mut self, index: usize, value: NaiveTime) -> Result<()>;

    fn set_timestamp(&mut self, index: usize, value: NaiveDateTime) -> Result<()>;

    /// Binds a binary large object read from the supplied stream
    fn set_blob(&mut self, index: usize, stream: &mut dyn Read) -> Result<()>;

    /// Binds a raw binary stream of the supplied length
    fn set_binary_stream(&mut self, index: usize, stream: &mut dyn Read, length: usize)
        -> Result<()>;

    /// Binds a driver-native object
    fn set_object(&mut self, index: usize, value: SqlObject) -> Result<()>;

    /// Sets the statement timeout, `None` disables the timeout
    fn set_query_timeout(&mut self, _timeout: Option<Duration>) -> Result<()> {
        Ok(())
    }

    /// Clears all bound values
    fn clear_parameters(&mut self) -> Result<()>;

    /// Executes the statement with the currently bound values
    fn execute(&mut self) -> Result<ExecutionOutcome>;

    /// Returns a loggable representation of the statement
    fn logged(&self) -> Result<LoggedStatement>;
}

/// The result of executing a statement
#[derive(Debug, Clone, PartialEq, EnumAsInner)]
pub enum ExecutionOutcome {
    /// The rows returned by a query, each as a JSON object
    Rows(Vec<Value>),
    /// The number of rows affected by a modification
    Affected(u64),
}

/// A string representation of a statement, used mainly for logging
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedStatement {
    sql: String,
    params: Vec<String>,
}

impl LoggedStatement {
    pub fn new(sql: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &Vec<String> {
        &self.params
    }
}
