//! Listing the tables a statement reads.

use std::collections::HashSet;
use std::ops::ControlFlow;

use sqlparser::ast::{Query as AstQuery, Statement, TableFactor, Visit, Visitor};

use super::{parse_all, RewriteResult};
use crate::sql::Dialect;

/// Table names referenced by every statement in `sql`, in first-seen order.
///
/// CTE names (from any statement) are excluded, as are table-valued function
/// calls. A name appears once per distinct alias it is referenced under.
pub fn extract_table_names(sql: &str, dialect: Option<Dialect>) -> RewriteResult<Vec<String>> {
    let statements = parse_all(sql, dialect)?;

    let mut ctes = CteNames::default();
    for statement in &statements {
        let _ = statement.visit(&mut ctes);
    }

    let mut tables = TableNames {
        ctes: ctes.names,
        seen: HashSet::new(),
        names: Vec::new(),
    };
    for statement in &statements {
        let _ = statement.visit(&mut tables);
    }

    tracing::debug!(tables = ?tables.names, "extracted table names");
    Ok(tables.names)
}

/// Table names referenced by an already parsed statement, ignoring the CTEs
/// it defines.
pub(crate) fn statement_tables(statement: &Statement) -> Vec<String> {
    let mut ctes = CteNames::default();
    let _ = statement.visit(&mut ctes);
    let mut tables = TableNames {
        ctes: ctes.names,
        seen: HashSet::new(),
        names: Vec::new(),
    };
    let _ = statement.visit(&mut tables);
    tables.names
}

#[derive(Default)]
struct CteNames {
    names: HashSet<String>,
}

impl Visitor for CteNames {
    type Break = ();

    fn pre_visit_query(&mut self, query: &AstQuery) -> ControlFlow<Self::Break> {
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                self.names.insert(cte.alias.name.value.clone());
            }
        }
        ControlFlow::Continue(())
    }
}

struct TableNames {
    ctes: HashSet<String>,
    seen: HashSet<(String, Option<String>)>,
    names: Vec<String>,
}

impl Visitor for TableNames {
    type Break = ();

    fn pre_visit_table_factor(&mut self, factor: &TableFactor) -> ControlFlow<Self::Break> {
        if let TableFactor::Table {
            name,
            alias,
            args: None,
            ..
        } = factor
        {
            let Some(last) = name.0.last() else {
                return ControlFlow::Continue(());
            };
            if self.ctes.contains(&last.value) {
                return ControlFlow::Continue(());
            }
            let key = (last.value.clone(), alias.as_ref().map(|a| a.name.value.clone()));
            if self.seen.insert(key) {
                self.names.push(last.value.clone());
            }
        }
        ControlFlow::Continue(())
    }
}
