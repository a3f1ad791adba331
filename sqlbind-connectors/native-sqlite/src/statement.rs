use std::{collections::BTreeMap, io::Read, sync::Arc, time::Duration};

use bigdecimal::ToPrimitive;
use itertools::Itertools;
use rusqlite::types::Value;
use serde_json::{Map, Value as JsonValue};
use sqlbind_connectors_base::interface::{ExecutionOutcome, LoggedStatement, PreparedStatement};
use sqlbind_core::{
    data::{
        bigdecimal::BigDecimal,
        chrono::{NaiveDate, NaiveDateTime, NaiveTime},
        SqlObject, SqlType,
    },
    err::{bail, Context, Result},
};
use sqlbind_logging::trace;

use crate::to_json;

/// A statement prepared against an sqlite connection.
///
/// Bound values are retained until the statement is executed, each
/// execution binds them onto a freshly prepared rusqlite statement.
#[derive(Debug)]
pub struct SqlitePreparedStatement {
    con: Arc<rusqlite::Connection>,
    sql: String,
    param_count: usize,
    params: BTreeMap<usize, Value>,
    timeout: Option<Duration>,
}

impl SqlitePreparedStatement {
    /// Validates the SQL and counts its parameters
    pub fn prepare(con: Arc<rusqlite::Connection>, sql: &str) -> Result<Self> {
        let param_count = con
            .prepare(sql)
            .with_context(|| format!("Failed to prepare sql: {}", sql))?
            .parameter_count();

        Ok(Self {
            con,
            sql: sql.to_string(),
            param_count,
            params: BTreeMap::new(),
            timeout: None,
        })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn param_count(&self) -> usize {
        self.param_count
    }

    fn set(&mut self, index: usize, value: Value) -> Result<()> {
        if index == 0 || index > self.param_count {
            bail!(
                "Invalid parameter index {} for statement with {} parameters",
                index,
                self.param_count
            );
        }

        self.params.insert(index, value);
        Ok(())
    }

    fn read(stream: &mut dyn Read) -> Result<Vec<u8>> {
        let mut buf = vec![];
        stream
            .read_to_end(&mut buf)
            .context("Failed to read binary stream")?;
        Ok(buf)
    }
}

impl PreparedStatement for SqlitePreparedStatement {
    fn set_null(&mut self, index: usize, _: SqlType, _: Option<&str>) -> Result<()> {
        self.set(index, Value::Null)
    }

    fn set_big_decimal(&mut self, index: usize, value: &BigDecimal) -> Result<()> {
        // Integral values within range keep the integer storage class,
        // anything else is stored as text to retain its precision
        let value = match value.to_i64() {
            Some(int) if value.is_integer() => Value::Integer(int),
            _ => Value::Text(value.to_string()),
        };

        self.set(index, value)
    }

    fn set_long(&mut self, index: usize, value: i64) -> Result<()> {
        self.set(index, Value::Integer(value))
    }

    fn set_float(&mut self, index: usize, value: f32) -> Result<()> {
        let value = value
            .to_string()
            .parse::<f64>()
            .context("Failed to widen float")?;

        self.set(index, Value::Real(value))
    }

    fn set_boolean(&mut self, index: usize, value: bool) -> Result<()> {
        self.set(index, Value::Integer(value as i64))
    }

    fn set_string(&mut self, index: usize, value: &str) -> Result<()> {
        self.set(index, Value::Text(value.to_string()))
    }

    fn set_nstring(&mut self, index: usize, value: &str) -> Result<()> {
        self.set(index, Value::Text(value.to_string()))
    }

    fn set_date(&mut self, index: usize, value: NaiveDate) -> Result<()> {
        self.set(index, Value::Text(value.format("%Y-%m-%d").to_string()))
    }

    fn set_time(&mut self, index: usize, value: NaiveTime) -> Result<()> {
        self.set(index, Value::Text(value.format("%H:%M:%S%.f").to_string()))
    }

    fn set_timestamp(&mut self, index: usize, value: NaiveDateTime) -> Result<()> {
        self.set(
            index,
            Value::Text(value.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
        )
    }

    fn set_blob(&mut self, index: usize, stream: &mut dyn Read) -> Result<()> {
        let data = Self::read(stream)?;
        self.set(index, Value::Blob(data))
    }

    fn set_binary_stream(
        &mut self,
        index: usize,
        stream: &mut dyn Read,
        length: usize,
    ) -> Result<()> {
        let mut data = Self::read(stream)?;
        data.truncate(length);
        self.set(index, Value::Blob(data))
    }

    fn set_object(&mut self, index: usize, value: SqlObject) -> Result<()> {
        self.set(index, Value::Text(value.to_json_text()))
    }

    fn set_query_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.timeout = timeout;
        Ok(())
    }

    fn clear_parameters(&mut self) -> Result<()> {
        self.params.clear();
        Ok(())
    }

    fn execute(&mut self) -> Result<ExecutionOutcome> {
        if let Some(timeout) = self.timeout {
            self.con
                .busy_timeout(timeout)
                .context("Failed to set busy timeout")?;
        }

        let mut stmt = self
            .con
            .prepare(&self.sql)
            .with_context(|| format!("Failed to prepare sql: {}", self.sql))?;

        for idx in 1..=self.param_count {
            let value = match self.params.get(&idx) {
                Some(value) => value,
                None => bail!("No value has been bound to parameter {}", idx),
            };

            stmt.raw_bind_parameter(idx, value)
                .with_context(|| format!("Failed to bind parameter {}", idx))?;
        }

        if stmt.column_count() == 0 {
            let affected = stmt.raw_execute().context("Failed to execute statement")?;
            trace!("Statement affected {} rows", affected);

            return Ok(ExecutionOutcome::Affected(affected as u64));
        }

        let cols = stmt
            .column_names()
            .into_iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>();

        let mut rows = stmt.raw_query();
        let mut results = vec![];

        while let Some(row) = rows.next().context("Failed to read row")? {
            let mut obj = Map::new();

            for (idx, col) in cols.iter().enumerate() {
                obj.insert(col.clone(), to_json(row.get::<_, Value>(idx)?));
            }

            results.push(JsonValue::Object(obj));
        }
        trace!("Statement returned {} rows", results.len());

        Ok(ExecutionOutcome::Rows(results))
    }

    fn logged(&self) -> Result<LoggedStatement> {
        Ok(LoggedStatement::new(
            &self.sql,
            self.params
                .iter()
                .map(|(idx, val)| format!("{}: value={:?}", idx, val))
                .collect_vec(),
        ))
    }
}
