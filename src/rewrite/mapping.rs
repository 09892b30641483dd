//! Logical table substitution.

use std::ops::ControlFlow;

use sqlparser::ast::{Ident, Statement, TableAlias, TableFactor, VisitMut, VisitorMut};

use super::extract::statement_tables;
use super::{parse_all, parse_one, RewriteError, RewriteResult};
use crate::sql::parse::single_relation;
use crate::sql::quoting::quote_identifiers;
use crate::sql::Dialect;

/// Alias used while parsing mapping values; always replaced on substitution.
/// It goes on its own line so a trailing line comment in a value cannot hide it.
const TARGET_ALIAS: &str = "__quarry_target";

/// What a logical table name is replaced by.
#[derive(Debug, Clone, PartialEq)]
pub enum MappingTarget {
    /// A table reference or a table-valued call, e.g. `sales.orders` or
    /// `read_parquet('/x.parquet')`.
    Relation(TableFactor),
    /// A full query, substituted as a derived table.
    Subquery(TableFactor),
}

impl MappingTarget {
    fn factor(&self) -> &TableFactor {
        match self {
            MappingTarget::Relation(f) | MappingTarget::Subquery(f) => f,
        }
    }
}

/// Logical table name to physical target, validated at construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableMapping {
    entries: Vec<(String, MappingTarget)>,
}

impl TableMapping {
    /// Parse every target with `dialect`'s grammar (generic when `None`).
    ///
    /// A value must be a single relation or a single query, and a query must
    /// not read another key of the same mapping.
    pub fn new<K, V>(
        entries: impl IntoIterator<Item = (K, V)>,
        dialect: Option<Dialect>,
    ) -> RewriteResult<Self>
    where
        K: Into<String>,
        V: AsRef<str>,
    {
        let raw: Vec<(String, String)> = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.as_ref().trim().to_string()))
            .collect();

        let mut parsed = Vec::with_capacity(raw.len());
        for (key, value) in &raw {
            let invalid = |reason: String| RewriteError::InvalidTableMapping {
                key: key.clone(),
                value: value.clone(),
                reason,
            };

            if key.is_empty() {
                return Err(invalid("mapping key is empty".to_string()));
            }
            if parsed.iter().any(|(k, _)| k == key) {
                return Err(invalid("duplicate mapping key".to_string()));
            }

            let target = parse_target(value, dialect).map_err(invalid)?;
            if let MappingTarget::Subquery(TableFactor::Derived { subquery, .. }) = &target {
                let reads = statement_tables(&Statement::Query(subquery.clone()));
                if let Some(other) = reads
                    .iter()
                    .find(|t| *t != key && raw.iter().any(|(k, _)| k == *t))
                {
                    return Err(invalid(format!(
                        "query reads mapped table '{}'; nested substitution is not supported",
                        other
                    )));
                }
            }
            parsed.push((key.clone(), target));
        }

        Ok(Self { entries: parsed })
    }

    pub fn get(&self, name: &str) -> Option<&MappingTarget> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, t)| t)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse a mapping value as `FROM <value>`, then as `FROM (<value>)`.
fn parse_target(value: &str, dialect: Option<Dialect>) -> Result<MappingTarget, String> {
    if value.is_empty() {
        return Err("mapping value is empty".to_string());
    }

    let relation = parse_relation(
        &format!("SELECT * FROM {}\nAS {}", value, TARGET_ALIAS),
        dialect,
    );
    if let Some(factor @ TableFactor::Table { .. }) = relation {
        return Ok(MappingTarget::Relation(factor));
    }

    // Only a query is accepted inside the derived table.
    match parse_all(value, dialect) {
        Ok(statements) if statements.len() == 1 => {
            if !matches!(statements[0], Statement::Query(_)) {
                return Err("value is neither a table nor a query".to_string());
            }
        }
        Ok(statements) => {
            return Err(format!("expected one statement, found {}", statements.len()));
        }
        Err(e) => return Err(e.to_string()),
    }

    match parse_relation(&format!("SELECT * FROM ({}\n) AS {}", value, TARGET_ALIAS), dialect) {
        Some(factor @ TableFactor::Derived { .. }) => Ok(MappingTarget::Subquery(factor)),
        _ => Err("value is neither a table nor a query".to_string()),
    }
}

/// The single relation of `sql`, only if it still carries the target alias.
fn parse_relation(sql: &str, dialect: Option<Dialect>) -> Option<TableFactor> {
    let mut statements = parse_all(sql, dialect).ok()?;
    if statements.len() != 1 {
        return None;
    }
    let factor = single_relation(statements.remove(0))?;
    let alias = match &factor {
        TableFactor::Table { alias, .. } | TableFactor::Derived { alias, .. } => alias.as_ref(),
        _ => None,
    };
    alias
        .is_some_and(|a| a.name.value == TARGET_ALIAS)
        .then_some(factor)
}

/// Replace every table reference whose name is a mapping key.
///
/// The replacement keeps the reference's alias, or is aliased with the
/// original name when it had none. Replacements are not revisited, and all
/// identifiers are quoted for `dialect` before serializing.
pub fn substitute_tables(
    sql: &str,
    mapping: &TableMapping,
    dialect: Dialect,
) -> RewriteResult<String> {
    let mut statement = parse_one(sql, Some(dialect))?;

    let mut substituter = Substituter {
        mapping,
        replaced: 0,
    };
    let _ = statement.visit(&mut substituter);
    quote_identifiers(&mut statement, dialect);

    let rewritten = statement.to_string();
    tracing::debug!(
        %dialect,
        replaced = substituter.replaced,
        sql = %rewritten,
        "substituted tables"
    );
    Ok(rewritten)
}

struct Substituter<'a> {
    mapping: &'a TableMapping,
    replaced: usize,
}

impl VisitorMut for Substituter<'_> {
    type Break = ();

    // Post-visit: children of the replacement are never walked.
    fn post_visit_table_factor(&mut self, factor: &mut TableFactor) -> ControlFlow<Self::Break> {
        let TableFactor::Table {
            name,
            alias,
            args: None,
            ..
        } = factor
        else {
            return ControlFlow::Continue(());
        };
        let Some(last) = name.0.last() else {
            return ControlFlow::Continue(());
        };
        let Some(target) = self.mapping.get(&last.value) else {
            return ControlFlow::Continue(());
        };

        let original_alias = alias.clone();
        let original_name = last.value.clone();
        let mut replacement = target.factor().clone();
        set_alias(&mut replacement, original_alias, &original_name);

        *factor = replacement;
        self.replaced += 1;
        ControlFlow::Continue(())
    }
}

fn set_alias(factor: &mut TableFactor, original: Option<TableAlias>, name: &str) {
    let slot = match factor {
        TableFactor::Table { alias, .. } | TableFactor::Derived { alias, .. } => alias,
        _ => return,
    };
    *slot = Some(original.unwrap_or_else(|| TableAlias {
        name: Ident::new(name),
        columns: vec![],
    }));
}
