use std::{
    collections::{BTreeMap, HashMap},
    io::Read,
    sync::{Arc, Mutex},
    time::Duration,
};

use serde_json::Value;
use sqlbind_core::{
    data::{
        bigdecimal::BigDecimal,
        chrono::{NaiveDate, NaiveDateTime, NaiveTime},
        SqlObject, SqlType,
    },
    err::{anyhow, bail, Context, Result},
};

use crate::{
    interface::{
        ColumnMetadata, Connection, DatabaseMetadata, ExecutionOutcome, LoggedStatement,
        PreparedStatement,
    },
    template::count_bind_markers,
};

/// A value bound onto a [`RecordingStatement`], one variant per setter
#[derive(Debug, Clone, PartialEq)]
pub enum BoundParam {
    Null(SqlType, Option<String>),
    BigDecimal(BigDecimal),
    Long(i64),
    Float(f32),
    Boolean(bool),
    String(String),
    NString(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    Blob(Vec<u8>),
    BinaryStream(Vec<u8>, usize),
    Object(SqlObject),
}

/// A statement executed against the in-memory connection
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedStatement {
    pub sql: String,
    pub params: Vec<BoundParam>,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Default)]
struct MemoryLog {
    prepared: Vec<String>,
    executed: Vec<ExecutedStatement>,
}

/// A connection which serves column metadata from memory and records
/// every statement it executes.
///
/// Most useful for testing.
#[derive(Debug, Clone)]
pub struct MemoryConnection {
    product: String,
    tables: HashMap<String, Vec<ColumnMetadata>>,
    rows: Vec<Value>,
    fail_bind_at: Option<usize>,
    log: Arc<Mutex<MemoryLog>>,
}

impl MemoryConnection {
    pub fn new(product: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            tables: HashMap::new(),
            rows: vec![],
            fail_bind_at: None,
            log: Arc::new(Mutex::new(MemoryLog::default())),
        }
    }

    /// Registers a table, lookups are case insensitive and ignore the schema
    pub fn with_table(mut self, name: &str, cols: Vec<ColumnMetadata>) -> Self {
        self.tables.insert(name.to_uppercase(), cols);
        self
    }

    /// Sets the rows returned by every query
    pub fn with_rows(mut self, rows: Vec<Value>) -> Self {
        self.rows = rows;
        self
    }

    /// Makes every bind onto the supplied slot fail like a driver error
    pub fn with_bind_failure_at(mut self, index: usize) -> Self {
        self.fail_bind_at = Some(index);
        self
    }

    /// The SQL of every prepared statement, in order
    pub fn prepared(&self) -> Vec<String> {
        self.log
            .lock()
            .map(|l| l.prepared.clone())
            .unwrap_or_default()
    }

    /// Every executed statement, in order
    pub fn executed(&self) -> Vec<ExecutedStatement> {
        self.log
            .lock()
            .map(|l| l.executed.clone())
            .unwrap_or_default()
    }
}

impl DatabaseMetadata for MemoryConnection {
    fn database_product_name(&mut self) -> Result<String> {
        Ok(self.product.clone())
    }

    fn get_columns(&mut self, _schema: Option<&str>, table: &str) -> Result<Vec<ColumnMetadata>> {
        Ok(self
            .tables
            .get(&table.to_uppercase())
            .cloned()
            .unwrap_or_default())
    }
}

impl Connection for MemoryConnection {
    type TStatement = RecordingStatement;

    fn prepare(&mut self, sql: &str) -> Result<RecordingStatement> {
        self.log
            .lock()
            .map_err(|_| anyhow!("Failed to lock statement log"))?
            .prepared
            .push(sql.to_string());

        Ok(RecordingStatement {
            sql: sql.to_string(),
            params: BTreeMap::new(),
            timeout: None,
            rows: self.rows.clone(),
            fail_bind_at: self.fail_bind_at,
            log: Arc::clone(&self.log),
        })
    }
}

/// A prepared statement which records the values bound onto it
#[derive(Debug)]
pub struct RecordingStatement {
    sql: String,
    params: BTreeMap<usize, BoundParam>,
    timeout: Option<Duration>,
    rows: Vec<Value>,
    fail_bind_at: Option<usize>,
    log: Arc<Mutex<MemoryLog>>,
}

impl RecordingStatement {
    /// Creates a standalone statement, not attached to any connection
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: BTreeMap::new(),
            timeout: None,
            rows: vec![],
            fail_bind_at: None,
            log: Arc::new(Mutex::new(MemoryLog::default())),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The currently bound values, keyed by slot index
    pub fn params(&self) -> &BTreeMap<usize, BoundParam> {
        &self.params
    }

    pub fn param(&self, index: usize) -> Option<&BoundParam> {
        self.params.get(&index)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn record(&mut self, index: usize, param: BoundParam) -> Result<()> {
        let slots = count_bind_markers(&self.sql);

        if index == 0 || index > slots {
            bail!(
                "Invalid parameter index {} for statement with {} parameters",
                index,
                slots
            );
        }

        if self.fail_bind_at == Some(index) {
            bail!("Driver rejected the value of parameter {}", index);
        }

        self.params.insert(index, param);
        Ok(())
    }
}

impl PreparedStatement for RecordingStatement {
    fn set_null(
        &mut self,
        index: usize,
        sql_type: SqlType,
        type_name: Option<&str>,
    ) -> Result<()> {
        self.record(
            index,
            BoundParam::Null(sql_type, type_name.map(|t| t.to_string())),
        )
    }

    fn set_big_decimal(&mut self, index: usize, value: &BigDecimal) -> Result<()> {
        self.record(index, BoundParam::BigDecimal(value.clone()))
    }

    fn set_long(&mut self, index: usize, value: i64) -> Result<()> {
        self.record(index, BoundParam::Long(value))
    }

    fn set_float(&mut self, index: usize, value: f32) -> Result<()> {
        self.record(index, BoundParam::Float(value))
    }

    fn set_boolean(&mut self, index: usize, value: bool) -> Result<()> {
        self.record(index, BoundParam::Boolean(value))
    }

    fn set_string(&mut self, index: usize, value: &str) -> Result<()> {
        self.record(index, BoundParam::String(value.to_string()))
    }

    fn set_nstring(&mut self, index: usize, value: &str) -> Result<()> {
        self.record(index, BoundParam::NString(value.to_string()))
    }

    fn set_date(&mut self, index: usize, value: NaiveDate) -> Result<()> {
        self.record(index, BoundParam::Date(value))
    }

    fn set_time(&mut self, index: usize, value: NaiveTime) -> Result<()> {
        self.record(index, BoundParam::Time(value))
    }

    fn set_timestamp(&mut self, index: usize, value: NaiveDateTime) -> Result<()> {
        self.record(index, BoundParam::Timestamp(value))
    }

    fn set_blob(&mut self, index: usize, stream: &mut dyn Read) -> Result<()> {
        let mut buff = vec![];
        stream
            .read_to_end(&mut buff)
            .context("Failed to read blob stream")?;

        self.record(index, BoundParam::Blob(buff))
    }

    fn set_binary_stream(
        &mut self,
        index: usize,
        stream: &mut dyn Read,
        length: usize,
    ) -> Result<()> {
        let mut buff = vec![];
        stream
            .take(length as u64)
            .read_to_end(&mut buff)
            .context("Failed to read binary stream")?;

        self.record(index, BoundParam::BinaryStream(buff, length))
    }

    fn set_object(&mut self, index: usize, value: SqlObject) -> Result<()> {
        self.record(index, BoundParam::Object(value))
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
        let slots = count_bind_markers(&self.sql);
        let mut params = Vec::with_capacity(slots);

        for idx in 1..=slots {
            params.push(
                self.params
                    .get(&idx)
                    .cloned()
                    .with_context(|| format!("Parameter {} has not been bound", idx))?,
            );
        }

        self.log
            .lock()
            .map_err(|_| anyhow!("Failed to lock statement log"))?
            .executed
            .push(ExecutedStatement {
                sql: self.sql.clone(),
                params,
                timeout: self.timeout,
            });

        if self.sql.trim_start().to_uppercase().starts_with("SELECT") {
            Ok(ExecutionOutcome::Rows(self.rows.clone()))
        } else {
            Ok(ExecutionOutcome::Affected(1))
        }
    }

    fn logged(&self) -> Result<LoggedStatement> {
        Ok(LoggedStatement::new(
            self.sql.clone(),
            self.params
                .iter()
                .map(|(idx, p)| format!("{}: {:?}", idx, p))
                .collect(),
        ))
    }
}
