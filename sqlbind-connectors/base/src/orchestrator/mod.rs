use sqlbind_core::{
    config::{OperationConfig, OperationKind},
    data::Dialect,
    err::{bail, Context, Result, StatementError},
};
use sqlbind_logging::{debug, log_enabled, trace, warn, Level};

use crate::{
    binder::TypedBinder,
    interface::{Connection, ExecutionOutcome, PreparedStatement},
    request::RequestDocument,
    template::{contains_in_clause, has_in_placeholder},
    type_registry::{TypeMap, TypeRegistry},
    BindPlanner,
};

mod result;
pub use result::*;
mod state;
pub use state::*;

/// Drives request documents through statement construction, binding and
/// execution for a single operation invocation.
///
/// The column types are resolved once, when the orchestrator is created.
/// The last prepared statement is kept and reused while the rewritten
/// SQL of subsequent documents does not change.
pub struct StatementOrchestrator<'a, C: Connection> {
    connection: &'a mut C,
    config: OperationConfig,
    binder: TypedBinder,
    types: TypeMap,
    mode: StatementMode,
    cached: Option<(String, C::TStatement)>,
}

/// Tracks the progress of a single document
struct Progress {
    index: usize,
    state: StatementState,
    sql: Option<String>,
}

impl Progress {
    fn new(index: usize) -> Self {
        Self {
            index,
            state: StatementState::ParsingTemplate,
            sql: None,
        }
    }

    fn enter(&mut self, state: StatementState) {
        trace!(
            "Document {} transitioned from {} to {}",
            self.index,
            self.state,
            state
        );
        self.state = state;
    }
}

impl<'a, C: Connection> StatementOrchestrator<'a, C> {
    /// Validates the configuration and resolves the column types of the
    /// configured tables.
    ///
    /// Fails with [`StatementError::ConfigurationMismatch`] or
    /// [`StatementError::TableNotFound`], both of which abort the whole
    /// invocation before any document is processed.
    pub fn new(connection: &'a mut C, config: OperationConfig) -> Result<Self> {
        Self::validate(&config)?;

        let product = match config.database_product.as_deref() {
            Some(product) => product.to_string(),
            None => connection
                .database_product_name()
                .context("Failed to retrieve database product name")?,
        };
        let dialect = Dialect::from_product_name(&product);
        let mode = StatementMode::of(&config);
        debug!(
            "Building {:?} statements for \"{}\" in {:?} mode against {} ({:?})",
            config.kind, config.tables, mode, product, dialect
        );

        let types = TypeRegistry::resolve(connection, config.schema.as_deref(), &config.tables)?;

        Ok(Self {
            connection,
            binder: TypedBinder::new(dialect, config.batched),
            config,
            types,
            mode,
            cached: None,
        })
    }

    fn validate(config: &OperationConfig) -> Result<()> {
        let query = config.template().unwrap_or_default();

        if contains_in_clause(query) != config.in_clause {
            return Err(StatementError::ConfigurationMismatch(if config.in_clause {
                "The IN clause option is enabled but the query has no IN clause".into()
            } else {
                "The query contains an IN clause but the IN clause option is disabled".into()
            })
            .into());
        }

        if config.in_clause && !has_in_placeholder(query) {
            return Err(StatementError::ConfigurationMismatch(
                "The IN clause option requires an uppercase IN($name) group in the query".into(),
            )
            .into());
        }

        if config.template().is_none() && config.kind == OperationKind::Execute {
            return Err(StatementError::ConfigurationMismatch(
                "An execute operation requires a query".into(),
            )
            .into());
        }

        if config.template().is_none() && config.table_names().len() != 1 {
            return Err(StatementError::ConfigurationMismatch(format!(
                "Statements without a query require a single table, found \"{}\"",
                config.tables
            ))
            .into());
        }

        Ok(())
    }

    pub fn mode(&self) -> StatementMode {
        self.mode
    }

    pub fn dialect(&self) -> Dialect {
        self.binder.dialect()
    }

    pub fn types(&self) -> &TypeMap {
        &self.types
    }

    /// Processes each document in turn, a failing document does not
    /// prevent the processing of those after it
    pub fn process_all<'d>(
        &mut self,
        docs: impl IntoIterator<Item = &'d RequestDocument>,
    ) -> Vec<DocumentResult> {
        docs.into_iter()
            .enumerate()
            .map(|(idx, doc)| self.process(idx, doc))
            .collect()
    }

    /// Builds, binds and executes the statement of a single document
    pub fn process(&mut self, index: usize, doc: &RequestDocument) -> DocumentResult {
        let mut progress = Progress::new(index);

        match self.run(doc, &mut progress) {
            Ok(outcome) => {
                progress.enter(StatementState::Done);
                DocumentResult::success(index, progress.sql.unwrap_or_default(), outcome)
            }
            Err(err) => {
                let kind = StatementError::classify(&err);
                let state = progress.state;
                progress.enter(StatementState::Failed(kind));
                warn!(
                    "Document {} failed while {}: {:#}",
                    index, state, err
                );

                DocumentResult::failure(index, state, kind, &err, progress.sql)
            }
        }
    }

    fn run(&mut self, doc: &RequestDocument, progress: &mut Progress) -> Result<ExecutionOutcome> {
        let planner = BindPlanner::new(&self.config, &self.types);

        let plan = match self.config.template() {
            Some(template) => {
                let statement = planner.parse_template(template, doc)?;
                progress.enter(StatementState::ResolvingTypes);
                let plan = planner.resolve_template(statement, doc)?;
                progress.enter(StatementState::BuildingWhere);
                planner.build_where(plan, doc)?
            }
            None => {
                progress.enter(StatementState::ResolvingTypes);
                progress.enter(StatementState::BuildingWhere);
                planner.plan_profile(doc)?
            }
        };
        progress.sql = Some(plan.sql().to_string());

        progress.enter(StatementState::Binding);
        let binder = self.binder;
        let stmt = self.statement(plan.sql())?;
        stmt.clear_parameters()
            .context("Failed to clear statement parameters")?;
        plan.apply(stmt, &binder)?;

        progress.enter(StatementState::Executing);
        if log_enabled!(Level::Debug) {
            debug!("Executing {:?}", stmt.logged()?);
        }

        stmt.execute()
    }

    /// Gets the prepared statement for the SQL, reusing the last statement
    /// if its SQL is unchanged
    fn statement(&mut self, sql: &str) -> Result<&mut C::TStatement> {
        let reusable = matches!(&self.cached, Some((cached, _)) if cached == sql);

        if !reusable {
            let mut stmt = self
                .connection
                .prepare(sql)
                .with_context(|| format!("Failed to prepare statement: {}", sql))?;
            stmt.set_query_timeout(self.config.query_timeout())?;
            trace!("Prepared statement: {}", sql);

            self.cached = Some((sql.to_string(), stmt));
        }

        match self.cached.as_mut() {
            Some((_, stmt)) => Ok(stmt),
            None => bail!("No statement has been prepared"),
        }
    }
}
