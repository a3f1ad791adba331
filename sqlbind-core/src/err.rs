pub use anyhow::{anyhow, bail, ensure, Context, Error, Result};
use thiserror::Error;

/// Failures raised while building, binding or executing a statement.
///
/// These are raised through [`anyhow::Error`] like every other error in the
/// workspace and recovered with [`StatementError::find`] when a caller needs
/// to decide how a failure is reported.
#[derive(Debug, Error)]
pub enum StatementError {
    #[error("The specified table does not exist: {table}")]
    TableNotFound { table: String },
    #[error("The column name does not exist: {column}")]
    ColumnNotFound { column: String },
    #[error("Parameter count mismatch: expected {expected} but received {actual}")]
    ParameterCountMismatch { expected: usize, actual: usize },
    #[error("Malformed request document: {0}")]
    MalformedRequest(String),
    #[error("Invalid {target} value '{value}'")]
    InvalidFormat { target: &'static str, value: String },
    #[error("Failed to bind parameter {index}")]
    SqlBind {
        index: usize,
        #[source]
        source: anyhow::Error,
    },
    #[error("Nested array types deeper than {max} levels are not supported")]
    NestedLevelExhausted { max: usize },
    #[error("Array parameter '{name}' has {elements} elements for {slots} slots")]
    ArrayLengthMismatch {
        name: String,
        elements: usize,
        slots: usize,
    },
    #[error("Invalid operation configuration: {0}")]
    ConfigurationMismatch(String),
}

/// The kind of a [`StatementError`], without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    TableNotFound,
    ColumnNotFound,
    ParameterCountMismatch,
    MalformedRequest,
    InvalidFormat,
    SqlBind,
    NestedLevelExhausted,
    ArrayLengthMismatch,
    ConfigurationMismatch,
}

impl StatementError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StatementError::TableNotFound { .. } => ErrorKind::TableNotFound,
            StatementError::ColumnNotFound { .. } => ErrorKind::ColumnNotFound,
            StatementError::ParameterCountMismatch { .. } => ErrorKind::ParameterCountMismatch,
            StatementError::MalformedRequest(_) => ErrorKind::MalformedRequest,
            StatementError::InvalidFormat { .. } => ErrorKind::InvalidFormat,
            StatementError::SqlBind { .. } => ErrorKind::SqlBind,
            StatementError::NestedLevelExhausted { .. } => ErrorKind::NestedLevelExhausted,
            StatementError::ArrayLengthMismatch { .. } => ErrorKind::ArrayLengthMismatch,
            StatementError::ConfigurationMismatch(_) => ErrorKind::ConfigurationMismatch,
        }
    }

    pub fn column_not_found(column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
        }
    }

    pub fn invalid_format(target: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidFormat {
            target,
            value: value.into(),
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRequest(msg.into())
    }

    /// Finds the first statement error in the chain of the supplied error
    pub fn find(err: &Error) -> Option<&StatementError> {
        err.chain().find_map(|e| e.downcast_ref::<StatementError>())
    }

    /// Classifies an arbitrary error, errors raised by the driver itself
    /// are treated as bind failures
    pub fn classify(err: &Error) -> ErrorKind {
        Self::find(err)
            .map(|e| e.kind())
            .unwrap_or(ErrorKind::SqlBind)
    }
}

impl ErrorKind {
    /// Whether the failure only affects the current document, as opposed to
    /// the whole invocation
    pub fn is_document_level(&self) -> bool {
        !matches!(
            self,
            ErrorKind::TableNotFound | ErrorKind::ConfigurationMismatch
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_statement_error() {
        let err = Error::new(StatementError::column_not_found("NAME"));

        assert_eq!(StatementError::classify(&err), ErrorKind::ColumnNotFound);
        assert_eq!(err.to_string(), "The column name does not exist: NAME");
    }

    #[test]
    fn test_classify_statement_error_behind_context() {
        let err = Err::<(), _>(StatementError::invalid_format("date", "2020-13-45"))
            .context("Failed to bind document")
            .unwrap_err();

        assert_eq!(StatementError::classify(&err), ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_classify_driver_error() {
        let err = anyhow!("ORA-00942: table or view does not exist");

        assert_eq!(StatementError::classify(&err), ErrorKind::SqlBind);
    }

    #[test]
    fn test_sql_bind_error_preserves_driver_message() {
        let err = Error::new(StatementError::SqlBind {
            index: 3,
            source: anyhow!("Invalid column index"),
        });

        assert_eq!(err.to_string(), "Failed to bind parameter 3");
        assert_eq!(
            format!("{:#}", err),
            "Failed to bind parameter 3: Invalid column index"
        );
    }

    #[test]
    fn test_error_kind_scope() {
        assert!(ErrorKind::ColumnNotFound.is_document_level());
        assert!(ErrorKind::InvalidFormat.is_document_level());
        assert!(!ErrorKind::TableNotFound.is_document_level());
        assert!(!ErrorKind::ConfigurationMismatch.is_document_level());
    }
}
