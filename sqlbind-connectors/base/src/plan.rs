use serde_json::{Map, Value};
use sqlbind_core::{
    config::{ArrayMode, OperationConfig, OperationKind},
    data::ColumnType,
    err::{Result, StatementError},
};
use sqlbind_logging::{debug, warn};

use crate::{
    binder::TypedBinder,
    interface::PreparedStatement,
    request::{lookup_key, RequestDocument},
    template::{
        count_bind_markers, expand_in_clauses, has_placeholders, split_for_order_by,
        split_for_where, ClauseSplit, ParsedTemplate,
    },
    type_registry::{ColumnInfo, TypeMap},
    where_builder::{Clause, DynamicWhereBuilder},
};

/// A value to bind onto a single positional slot
#[derive(Debug, Clone, PartialEq)]
pub struct BindSlot {
    /// The 1-based slot index
    pub index: usize,
    pub column: ColumnInfo,
    pub value: Value,
}

impl BindSlot {
    pub fn new(index: usize, column: ColumnInfo, value: Value) -> Self {
        Self {
            index,
            column,
            value,
        }
    }
}

/// A rewritten statement and the complete, validated set of values to
/// bind onto it
#[derive(Debug, Clone, PartialEq)]
pub struct BindPlan {
    sql: String,
    slots: Vec<BindSlot>,
}

impl BindPlan {
    pub fn new(sql: impl Into<String>, slots: Vec<BindSlot>) -> Self {
        Self {
            sql: sql.into(),
            slots,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn slots(&self) -> &[BindSlot] {
        &self.slots
    }

    /// Binds the plan onto the statement.
    ///
    /// Every value is converted before the first setter is called. If a
    /// setter fails the parameters bound so far are cleared.
    pub fn apply<S: PreparedStatement + ?Sized>(
        &self,
        stmt: &mut S,
        binder: &TypedBinder,
    ) -> Result<()> {
        let values = self
            .slots
            .iter()
            .map(|s| Ok((s.index, binder.convert(&s.column, &s.value)?)))
            .collect::<Result<Vec<_>>>()?;

        for (index, value) in values.into_iter() {
            if let Err(source) = value.apply(stmt, index) {
                if let Err(err) = stmt.clear_parameters() {
                    warn!("Failed to clear parameters after bind failure: {:?}", err);
                }

                return Err(StatementError::SqlBind { index, source }.into());
            }
        }

        Ok(())
    }
}

/// A template rewritten for a single document, before its values are resolved
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateStatement {
    /// `$name` placeholders rewritten to bind markers
    Named(ParsedTemplate),
    /// Plain `?` bind markers
    Positional(String),
    /// No bind markers
    Static(String),
}

/// Turns request documents into bind plans for a single operation
pub struct BindPlanner<'a> {
    config: &'a OperationConfig,
    types: &'a TypeMap,
}

impl<'a> BindPlanner<'a> {
    pub fn new(config: &'a OperationConfig, types: &'a TypeMap) -> Self {
        Self { config, types }
    }

    /// Plans the statement of a document, running each stage in turn
    pub fn plan(&self, doc: &RequestDocument) -> Result<BindPlan> {
        match self.config.template() {
            Some(template) => {
                let statement = self.parse_template(template, doc)?;
                let plan = self.resolve_template(statement, doc)?;
                self.build_where(plan, doc)
            }
            None => self.plan_profile(doc),
        }
    }

    fn where_builder(&self) -> DynamicWhereBuilder<'a> {
        DynamicWhereBuilder::new(self.types, self.config.array_mode)
    }

    /// Expands the IN clauses of the template and rewrites its placeholders
    pub fn parse_template(
        &self,
        template: &str,
        doc: &RequestDocument,
    ) -> Result<TemplateStatement> {
        let template = if self.config.in_clause {
            expand_in_clauses(template, doc)?
        } else {
            template.to_string()
        };

        Ok(if has_placeholders(&template) {
            let parsed = ParsedTemplate::parse(&template);
            debug!("Rewrote template into \"{}\"", parsed.sql());
            TemplateStatement::Named(parsed)
        } else if count_bind_markers(&template) > 0 {
            TemplateStatement::Positional(template)
        } else {
            TemplateStatement::Static(template)
        })
    }

    /// Resolves the columns and values of the bind markers of the statement
    pub fn resolve_template(
        &self,
        statement: TemplateStatement,
        doc: &RequestDocument,
    ) -> Result<BindPlan> {
        match statement {
            TemplateStatement::Named(parsed) => self.plan_named(parsed, doc),
            TemplateStatement::Positional(sql) => self.plan_positional(sql, doc),
            TemplateStatement::Static(sql) => Ok(BindPlan::new(sql, vec![])),
        }
    }

    /// Binds `$name` placeholders from the keys of the same name
    fn plan_named(&self, parsed: ParsedTemplate, doc: &RequestDocument) -> Result<BindPlan> {
        let obj = doc.require_object()?;

        if doc.where_override().is_none() && parsed.params().len() != obj.len() {
            return Err(StatementError::ParameterCountMismatch {
                expected: parsed.params().len(),
                actual: obj.len(),
            }
            .into());
        }

        self.ensure_columns_exist(obj)?;

        let slots = named_slots(&parsed, self.types, Some(obj), 0, self.config.array_mode)?;

        Ok(BindPlan::new(parsed.into_sql(), slots))
    }

    /// Binds the `?` markers of the template from the document values in
    /// key order, array values fill consecutive markers
    fn plan_positional(&self, template: String, doc: &RequestDocument) -> Result<BindPlan> {
        let obj = doc.require_object()?;
        let markers = count_bind_markers(&template);
        let mut slots = vec![];

        for (key, value) in obj.iter() {
            let column = self.column(key)?;

            match value {
                Value::Array(items) if column.column_type != ColumnType::Array => {
                    for item in items.iter() {
                        slots.push(BindSlot::new(slots.len() + 1, column.clone(), item.clone()));
                    }
                }
                _ => slots.push(BindSlot::new(slots.len() + 1, column.clone(), value.clone())),
            }
        }

        if slots.len() != markers {
            return Err(StatementError::ParameterCountMismatch {
                expected: markers,
                actual: slots.len(),
            }
            .into());
        }

        Ok(BindPlan::new(template, slots))
    }

    /// Adds the document-level WHERE and ORDER BY overrides to the query of
    /// a Get operation, other operations are returned unchanged.
    ///
    /// The WHERE override is placed before any GROUP BY, ORDER BY or row
    /// limiting clause of the query, joined with `AND` if the query already
    /// filters. The ORDER BY override extends an existing ORDER BY.
    pub fn build_where(&self, plan: BindPlan, doc: &RequestDocument) -> Result<BindPlan> {
        if self.config.kind != OperationKind::Get {
            return Ok(plan);
        }

        let BindPlan { mut sql, mut slots } = plan;
        let body = doc.object()?;

        if let Some(text) = doc.where_override() {
            let split = split_for_where(&sql);
            Self::ensure_no_trailing_markers(&split, "WHERE")?;

            let clause = self.where_builder().build(
                body,
                Some(text),
                count_bind_markers(split.head) + 1,
            )?;

            sql = split.rejoin(&if split.present {
                format!("{} AND ({})", split.head, clause.sql)
            } else {
                format!("{} WHERE {}", split.head, clause.sql)
            });
            slots.extend(clause.slots);
        }

        if let Some(text) = doc.order_by_override() {
            let split = split_for_order_by(&sql);
            Self::ensure_no_trailing_markers(&split, "ORDER BY")?;

            let clause = self.where_builder().build_order_by(
                body,
                text,
                count_bind_markers(split.head) + 1,
            )?;

            sql = split.rejoin(&if split.present {
                format!("{}, {}", split.head, clause.sql)
            } else {
                format!("{} ORDER BY {}", split.head, clause.sql)
            });
            slots.extend(clause.slots);
        }

        debug!(
            "Planned statement \"{}\" with {} bind values",
            sql,
            slots.len()
        );

        Ok(BindPlan::new(sql, slots))
    }

    /// Slots are numbered in order of appearance, an override can only be
    /// placed before clauses without bind markers
    fn ensure_no_trailing_markers(split: &ClauseSplit, clause: &str) -> Result<()> {
        if count_bind_markers(split.tail) > 0 {
            return Err(StatementError::ConfigurationMismatch(format!(
                "Cannot add a {} override before the bind markers of \"{}\"",
                clause, split.tail
            ))
            .into());
        }

        Ok(())
    }

    /// Generates the statement from the table metadata
    pub fn plan_profile(&self, doc: &RequestDocument) -> Result<BindPlan> {
        let plan = self.generate(doc)?;
        debug!(
            "Generated statement \"{}\" with {} bind values",
            plan.sql,
            plan.slots.len()
        );

        Ok(plan)
    }

    fn generate(&self, doc: &RequestDocument) -> Result<BindPlan> {
        let table = self.table()?;

        match self.config.kind {
            OperationKind::Get => {
                let body = doc.object()?;
                let mut sql = format!("SELECT * FROM {}", table);
                let mut slots = vec![];

                let clause = match (body, doc.where_override()) {
                    (None, None) => Clause::default(),
                    (body, text) => self.where_builder().build(body, text, 1)?,
                };

                if !clause.is_empty() {
                    sql = format!("{} WHERE {}", sql, clause.sql);
                    slots.extend(clause.slots);
                }

                if let Some(text) = doc.order_by_override() {
                    let clause = self
                        .where_builder()
                        .build_order_by(body, text, count_bind_markers(&sql) + 1)?;
                    sql = format!("{} ORDER BY {}", sql, clause.sql);
                    slots.extend(clause.slots);
                }

                Ok(BindPlan::new(sql, slots))
            }
            OperationKind::Delete => {
                let clause =
                    self.where_builder()
                        .build(doc.object()?, doc.where_override(), 1)?;

                if clause.is_empty() {
                    return Err(StatementError::malformed(
                        "A delete requires at least one WHERE predicate",
                    )
                    .into());
                }

                Ok(BindPlan::new(
                    format!("DELETE FROM {} WHERE {}", table, clause.sql),
                    clause.slots,
                ))
            }
            OperationKind::Insert => {
                let obj = doc.require_object()?;
                self.ensure_columns_exist(obj)?;

                let (names, slots) = self.assignments(obj);

                if slots.is_empty() {
                    return Err(StatementError::malformed("No values supplied to insert").into());
                }

                Ok(BindPlan::new(
                    format!(
                        "INSERT INTO {} ({}) VALUES ({})",
                        table,
                        names.join(", "),
                        names.iter().map(|_| "?").collect::<Vec<_>>().join(", ")
                    ),
                    slots,
                ))
            }
            OperationKind::Update => {
                let obj = doc.require_object()?;
                let set = match lookup_key(obj, "SET") {
                    Some((_, Value::Object(set))) if !set.is_empty() => set,
                    _ => {
                        return Err(StatementError::malformed(
                            "An update requires a non-empty SET object",
                        )
                        .into())
                    }
                };
                let filter = match lookup_key(obj, "WHERE") {
                    Some((_, Value::Object(filter))) => Some(filter),
                    Some((_, Value::Null)) | None => None,
                    Some(_) => {
                        return Err(StatementError::malformed(
                            "The WHERE of an update must be a JSON object",
                        )
                        .into())
                    }
                };

                self.ensure_columns_exist(set)?;
                let (names, mut slots) = self.assignments(set);
                let mut sql = format!(
                    "UPDATE {} SET {}",
                    table,
                    names
                        .iter()
                        .map(|n| format!("{} = ?", n))
                        .collect::<Vec<_>>()
                        .join(", ")
                );

                let clause = match (filter, doc.where_override()) {
                    (None, None) => Clause::default(),
                    (filter, text) => self.where_builder().build(filter, text, slots.len() + 1)?,
                };

                if !clause.is_empty() {
                    sql = format!("{} WHERE {}", sql, clause.sql);
                    slots.extend(clause.slots);
                }

                Ok(BindPlan::new(sql, slots))
            }
            OperationKind::Execute => Err(StatementError::ConfigurationMismatch(
                "An execute operation requires a query".into(),
            )
            .into()),
        }
    }

    /// The columns of the object in metadata order, with one slot each
    fn assignments(&self, obj: &Map<String, Value>) -> (Vec<String>, Vec<BindSlot>) {
        let mut names = vec![];
        let mut slots = vec![];

        for col in self.types.columns() {
            if let Some((_, value)) = lookup_key(obj, &col.name) {
                names.push(col.name.clone());
                slots.push(BindSlot::new(slots.len() + 1, col.clone(), value.clone()));
            }
        }

        (names, slots)
    }

    fn ensure_columns_exist(&self, obj: &Map<String, Value>) -> Result<()> {
        for key in obj.keys() {
            self.column(key)?;
        }

        Ok(())
    }

    fn column(&self, name: &str) -> Result<&'a ColumnInfo> {
        self.types
            .get(name)
            .ok_or_else(|| StatementError::column_not_found(name).into())
    }

    /// The qualified name of the single target table
    fn table(&self) -> Result<String> {
        let tables = self.config.table_names();

        let table = match tables.as_slice() {
            [table] => table,
            _ => {
                return Err(StatementError::ConfigurationMismatch(format!(
                    "Statements without a query require a single table, found \"{}\"",
                    self.config.tables
                ))
                .into())
            }
        };

        Ok(match self.config.schema.as_deref() {
            Some(schema) if !schema.trim().is_empty() => format!("{}.{}", schema.trim(), table),
            _ => table.clone(),
        })
    }
}

/// Resolves the bind values of the named parameters of a parsed template.
///
/// Slot indices are shifted by `offset`. Parameters without a column are
/// skipped. Array values are spread over the slots of their parameter
/// unless the column itself is an array, an array with more elements than
/// slots fails with [`StatementError::ArrayLengthMismatch`].
pub(crate) fn named_slots(
    parsed: &ParsedTemplate,
    types: &TypeMap,
    body: Option<&Map<String, Value>>,
    offset: usize,
    array_mode: ArrayMode,
) -> Result<Vec<BindSlot>> {
    let mut slots = vec![];

    for param in parsed.params() {
        let column = match types.get(&param.name) {
            Some(col) => col,
            None => {
                warn!(
                    "Parameter \"{}\" does not map to a known column, skipping",
                    param.name
                );
                continue;
            }
        };

        let value = body
            .and_then(|obj| lookup_key(obj, &param.name))
            .map(|(_, v)| v)
            .ok_or_else(|| {
                StatementError::malformed(format!("No value supplied for parameter {}", param.name))
            })?;

        match value {
            Value::Array(items) if column.column_type != ColumnType::Array => {
                let indices = &param.indices;

                if items.is_empty() {
                    return Err(StatementError::malformed(format!(
                        "The array for parameter {} is empty",
                        param.name
                    ))
                    .into());
                }

                if items.len() > indices.len()
                    || (items.len() < indices.len() && array_mode == ArrayMode::Strict)
                {
                    return Err(StatementError::ArrayLengthMismatch {
                        name: param.name.clone(),
                        elements: items.len(),
                        slots: indices.len(),
                    }
                    .into());
                }

                if items.len() < indices.len() {
                    warn!(
                        "Parameter {} has {} elements for {} slots, elements will be reused",
                        param.name,
                        items.len(),
                        indices.len()
                    );
                }

                for (k, idx) in indices.iter().enumerate() {
                    slots.push(BindSlot::new(
                        idx + offset,
                        column.clone(),
                        items[k % items.len()].clone(),
                    ));
                }
            }
            _ => {
                for idx in param.indices.iter() {
                    slots.push(BindSlot::new(idx + offset, column.clone(), value.clone()));
                }
            }
        }
    }

    slots.sort_by_key(|s| s.index);

    Ok(slots)
}
