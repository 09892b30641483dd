//! Identifier quoting over a parsed statement.
//!
//! A bare identifier is folded with the dialect's case rule before it is
//! quoted, which is how the database itself would read it. Quoted identifiers
//! keep their text, so a second pass changes nothing.

use std::ops::ControlFlow;

use sqlparser::ast::{
    Expr as AstExpr, Ident, Query as AstQuery, SelectItem, SetExpr, Statement, TableFactor,
    VisitMut, VisitorMut,
};

use super::dialect::{Dialect, SqlDialect};

/// Which identifiers a pass touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteMode {
    /// Quote identifiers that are currently bare.
    Missing,
    /// Swap existing delimiters for the target's; leave bare ones alone.
    Existing,
}

/// Fold and quote every bare identifier for `dialect`.
///
/// Covers column references, table names (not table functions), table and
/// derived-table aliases, CTE names and projection aliases. Function names are
/// left as they are.
pub fn quote_identifiers(statement: &mut Statement, dialect: Dialect) {
    let mut quoter = IdentifierQuoter {
        dialect,
        mode: QuoteMode::Missing,
    };
    let _ = statement.visit(&mut quoter);
}

/// Re-delimit already-quoted identifiers for another dialect.
pub fn requote_identifiers(statement: &mut Statement, dialect: Dialect) {
    let mut quoter = IdentifierQuoter {
        dialect,
        mode: QuoteMode::Existing,
    };
    let _ = statement.visit(&mut quoter);
}

struct IdentifierQuoter {
    dialect: Dialect,
    mode: QuoteMode,
}

impl IdentifierQuoter {
    fn apply(&self, ident: &mut Ident) {
        let quote = self.dialect.identifier_quote();
        match (self.mode, ident.quote_style) {
            (QuoteMode::Missing, None) => {
                ident.value = self.dialect.normalize_identifier(&ident.value);
                ident.quote_style = Some(quote);
            }
            (QuoteMode::Existing, Some('"' | '`' | '[')) => ident.quote_style = Some(quote),
            _ => {}
        }
    }

    fn apply_projection_aliases(&self, body: &mut SetExpr) {
        match body {
            SetExpr::Select(select) => {
                for item in &mut select.projection {
                    if let SelectItem::ExprWithAlias { alias, .. } = item {
                        self.apply(alias);
                    }
                }
            }
            SetExpr::SetOperation { left, right, .. } => {
                self.apply_projection_aliases(left);
                self.apply_projection_aliases(right);
            }
            _ => {}
        }
    }
}

impl VisitorMut for IdentifierQuoter {
    type Break = ();

    fn pre_visit_query(&mut self, query: &mut AstQuery) -> ControlFlow<Self::Break> {
        if let Some(with) = query.with.as_mut() {
            for cte in &mut with.cte_tables {
                self.apply(&mut cte.alias.name);
            }
        }
        self.apply_projection_aliases(&mut query.body);
        ControlFlow::Continue(())
    }

    fn pre_visit_table_factor(&mut self, factor: &mut TableFactor) -> ControlFlow<Self::Break> {
        match factor {
            TableFactor::Table {
                name, alias, args, ..
            } => {
                if args.is_none() {
                    for part in &mut name.0 {
                        self.apply(part);
                    }
                }
                if let Some(alias) = alias {
                    self.apply(&mut alias.name);
                }
            }
            TableFactor::Derived {
                alias: Some(alias), ..
            } => self.apply(&mut alias.name),
            _ => {}
        }
        ControlFlow::Continue(())
    }

    fn pre_visit_expr(&mut self, expr: &mut AstExpr) -> ControlFlow<Self::Break> {
        match expr {
            AstExpr::Identifier(ident) => self.apply(ident),
            AstExpr::CompoundIdentifier(parts) => {
                for part in parts {
                    self.apply(part);
                }
            }
            _ => {}
        }
        ControlFlow::Continue(())
    }
}
