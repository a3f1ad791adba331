use std::collections::HashSet;

use itertools::Itertools;
use serde_json::{Map, Value};
use sqlbind_core::{
    config::ArrayMode,
    err::{Result, StatementError},
};
use sqlbind_logging::debug;

use crate::{
    named_slots, request::lookup_key, template::ParsedTemplate, type_registry::TypeMap, BindSlot,
};

/// A generated SQL fragment and the values of its bind markers
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Clause {
    /// The clause body, without the leading keyword
    pub sql: String,
    pub slots: Vec<BindSlot>,
}

impl Clause {
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

/// Builds WHERE and ORDER BY clauses from a request document
pub struct DynamicWhereBuilder<'a> {
    types: &'a TypeMap,
    array_mode: ArrayMode,
}

impl<'a> DynamicWhereBuilder<'a> {
    pub fn new(types: &'a TypeMap, array_mode: ArrayMode) -> Self {
        Self { types, array_mode }
    }

    /// Builds the WHERE clause body, numbering its slots from `start_index`.
    ///
    /// A document-level override is used verbatim with its placeholders
    /// substituted from the body. Otherwise a predicate is generated for each
    /// column present in the body, in the order of the table metadata: an
    /// array value yields `COL IN (?,..)`, anything else `COL = ?`.
    pub fn build(
        &self,
        body: Option<&Map<String, Value>>,
        where_override: Option<&str>,
        start_index: usize,
    ) -> Result<Clause> {
        if let Some(text) = where_override {
            return self.substitute(text, body, start_index);
        }

        let obj = body.ok_or_else(|| {
            StatementError::malformed("A request document is required to build the WHERE clause")
        })?;

        let mut predicates = vec![];
        let mut slots = vec![];
        let mut matched = HashSet::new();
        let mut index = start_index;

        for col in self.types.columns() {
            let (key, value) = match lookup_key(obj, &col.name) {
                Some(entry) if !matched.contains(entry.0) => entry,
                _ => continue,
            };
            matched.insert(key);

            match value {
                Value::Array(items) => {
                    if items.is_empty() {
                        return Err(StatementError::malformed(format!(
                            "The array for column '{}' is empty",
                            col.name
                        ))
                        .into());
                    }

                    predicates.push(format!(
                        "{} IN ({})",
                        col.name,
                        items.iter().map(|_| "?").join(",")
                    ));

                    for item in items.iter() {
                        slots.push(BindSlot::new(index, col.clone(), item.clone()));
                        index += 1;
                    }
                }
                _ => {
                    predicates.push(format!("{} = ?", col.name));
                    slots.push(BindSlot::new(index, col.clone(), value.clone()));
                    index += 1;
                }
            }
        }

        if matched.len() != obj.len() {
            let unknown = obj
                .keys()
                .find(|k| !matched.contains(k.as_str()))
                .map(|k| k.as_str())
                .unwrap_or_default();

            return Err(StatementError::column_not_found(unknown).into());
        }

        let clause = Clause {
            sql: predicates.join(" AND "),
            slots,
        };
        debug!("Generated WHERE clause: {}", clause.sql);

        Ok(clause)
    }

    /// Builds the ORDER BY clause body from the document-level override,
    /// substituting its placeholders the same way as a WHERE override
    pub fn build_order_by(
        &self,
        body: Option<&Map<String, Value>>,
        order_by: &str,
        start_index: usize,
    ) -> Result<Clause> {
        self.substitute(order_by, body, start_index)
    }

    fn substitute(
        &self,
        text: &str,
        body: Option<&Map<String, Value>>,
        start_index: usize,
    ) -> Result<Clause> {
        let parsed = ParsedTemplate::parse(text);
        let slots = named_slots(
            &parsed,
            self.types,
            body,
            start_index.saturating_sub(1),
            self.array_mode,
        )?;

        Ok(Clause {
            sql: parsed.into_sql(),
            slots,
        })
    }
}
