use std::fmt;

use sqlbind_core::{config::OperationConfig, err::ErrorKind};

use crate::template::has_placeholders;

/// The processing state of a single request document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementState {
    ParsingTemplate,
    ResolvingTypes,
    BuildingWhere,
    Binding,
    Executing,
    Done,
    Failed(ErrorKind),
}

impl StatementState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StatementState::Done | StatementState::Failed(_))
    }
}

impl fmt::Display for StatementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementState::ParsingTemplate => write!(f, "parsing template"),
            StatementState::ResolvingTypes => write!(f, "resolving types"),
            StatementState::BuildingWhere => write!(f, "building where clause"),
            StatementState::Binding => write!(f, "binding"),
            StatementState::Executing => write!(f, "executing"),
            StatementState::Done => write!(f, "done"),
            StatementState::Failed(kind) => write!(f, "failed ({:?})", kind),
        }
    }
}

/// How statements of an operation are built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementMode {
    /// A template whose `IN($name)` groups are expanded from JSON arrays
    InClause,
    /// A template with `$name` placeholders
    NamedParameter,
    /// A template with plain `?` markers, or none at all
    Positional,
    /// No template, the statement is generated from the table metadata
    Profile,
}

impl StatementMode {
    pub fn of(config: &OperationConfig) -> Self {
        match config.template() {
            None => StatementMode::Profile,
            Some(_) if config.in_clause => StatementMode::InClause,
            Some(t) if has_placeholders(t) => StatementMode::NamedParameter,
            Some(_) => StatementMode::Positional,
        }
    }
}
