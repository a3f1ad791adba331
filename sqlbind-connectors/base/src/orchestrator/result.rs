use sqlbind_core::err::{Error, ErrorKind};

use crate::interface::ExecutionOutcome;

use super::StatementState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    Success,
    /// The document could not be processed, sibling documents are unaffected
    ApplicationError,
}

/// The outcome of processing a single request document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentResult {
    /// The position of the document in the input
    pub index: usize,
    pub status: DocumentStatus,
    pub error_kind: Option<ErrorKind>,
    /// The state the document was in when it failed
    pub failed_state: Option<StatementState>,
    pub message: Option<String>,
    /// The rewritten SQL, if the statement was built
    pub sql: Option<String>,
    pub outcome: Option<ExecutionOutcome>,
}

impl DocumentResult {
    pub fn success(index: usize, sql: String, outcome: ExecutionOutcome) -> Self {
        Self {
            index,
            status: DocumentStatus::Success,
            error_kind: None,
            failed_state: None,
            message: None,
            sql: Some(sql),
            outcome: Some(outcome),
        }
    }

    pub fn failure(
        index: usize,
        state: StatementState,
        kind: ErrorKind,
        err: &Error,
        sql: Option<String>,
    ) -> Self {
        Self {
            index,
            status: DocumentStatus::ApplicationError,
            error_kind: Some(kind),
            failed_state: Some(state),
            message: Some(format!("{:#}", err)),
            sql,
            outcome: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == DocumentStatus::Success
    }
}
