//! Moving a statement between dialects.

use std::ops::ControlFlow;

use sqlparser::ast::{
    Expr as AstExpr, Fetch, Ident, Offset, OffsetRows, OrderBy, Query as AstQuery, Statement,
    Value, VisitMut, VisitorMut,
};

use super::{parse_one, RewriteResult};
use crate::sql::parse::parse_statements;
use crate::sql::quoting::requote_identifiers;
use crate::sql::{Dialect, SqlDialect};

/// Driver placeholder protected from the parser while transpiling.
const SOURCE_PLACEHOLDER: &str = "%s";

/// Inert identifier standing in for placeholders during the parse.
pub const PLACEHOLDER_TOKEN: &str = "___PLACEHOLDER___";

/// Rewrite `sql` from `from` (generic grammar when `None`) into `to`.
///
/// `%s` placeholders survive as the target's driver convention: `?` for
/// DuckDB, `%s` everywhere else. Quoted identifiers take the target's
/// delimiter, known functions are renamed, boolean literals follow the
/// target's style and LIMIT becomes FETCH where LIMIT does not exist.
pub fn transpile(sql: &str, to: Dialect, from: Option<Dialect>) -> RewriteResult<String> {
    let protected = sql.replace(SOURCE_PLACEHOLDER, PLACEHOLDER_TOKEN);
    let mut statement = parse_one(&protected, from)?;

    requote_identifiers(&mut statement, to);
    let mut converter = DialectConverter {
        target: to,
        numeric_bools: to.format_bool(true) == "1",
        order_placeholder: if to.requires_order_by_for_offset() {
            select_null_order()
        } else {
            None
        },
    };
    let _ = statement.visit(&mut converter);

    let transpiled = statement
        .to_string()
        .replace(PLACEHOLDER_TOKEN, to.placeholder_style().marker());
    tracing::debug!(
        from = ?from,
        to = %to,
        sql = %transpiled,
        "transpiled statement"
    );
    Ok(transpiled)
}

/// `ORDER BY (SELECT NULL)`, which T-SQL needs before OFFSET/FETCH.
fn select_null_order() -> Option<OrderBy> {
    let statement = parse_statements("SELECT 1 ORDER BY (SELECT NULL)", None)
        .ok()?
        .pop()?;
    match statement {
        Statement::Query(query) => query.order_by,
        _ => None,
    }
}

struct DialectConverter {
    target: Dialect,
    numeric_bools: bool,
    order_placeholder: Option<OrderBy>,
}

impl VisitorMut for DialectConverter {
    type Break = ();

    fn post_visit_query(&mut self, query: &mut AstQuery) -> ControlFlow<Self::Break> {
        if self.target.supports_limit_clause() {
            return ControlFlow::Continue(());
        }

        if let Some(limit) = query.limit.take() {
            query.fetch = Some(Fetch {
                with_ties: false,
                percent: false,
                quantity: Some(limit),
            });
        }
        if let Some(offset) = query.offset.as_mut() {
            offset.rows = OffsetRows::Rows;
        }

        let paginated = query.fetch.is_some() || query.offset.is_some();
        if paginated && self.target.requires_order_by_for_offset() {
            if query.offset.is_none() {
                query.offset = Some(Offset {
                    value: AstExpr::Value(Value::Number("0".to_string(), false)),
                    rows: OffsetRows::Rows,
                });
            }
            if query.order_by.is_none() {
                query.order_by = self.order_placeholder.clone();
            }
        }
        ControlFlow::Continue(())
    }

    fn pre_visit_expr(&mut self, expr: &mut AstExpr) -> ControlFlow<Self::Break> {
        match expr {
            AstExpr::Function(function) => {
                if let [name] = function.name.0.as_mut_slice() {
                    if name.quote_style.is_none() {
                        if let Some(remapped) = self.target.remap_function(&name.value) {
                            *name = Ident::new(remapped);
                        }
                    }
                }
            }
            AstExpr::Value(Value::Boolean(b)) if self.numeric_bools => {
                let digit = if *b { "1" } else { "0" };
                *expr = AstExpr::Value(Value::Number(digit.to_string(), false));
            }
            _ => {}
        }
        ControlFlow::Continue(())
    }
}
