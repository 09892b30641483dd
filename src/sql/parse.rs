//! Reading SQL text back into a syntax tree with sqlparser.
//!
//! Generated SQL is re-parsed before it leaves the compiler, and the rewrite
//! API works on caller-supplied SQL, so both go through these helpers.

use sqlparser::ast::{Expr as AstExpr, SetExpr, Statement, TableFactor};
use sqlparser::dialect::{Dialect as ParserDialect, GenericDialect};
use sqlparser::parser::{Parser, ParserError};
use sqlparser::tokenizer::Token as LexToken;

use super::dialect::{Dialect, SqlDialect};

/// The sqlparser grammar for a dialect; `None` reads with the generic grammar.
pub fn parser_for(dialect: Option<Dialect>) -> Box<dyn ParserDialect> {
    match dialect {
        Some(d) => d.parser_dialect(),
        None => Box::new(GenericDialect {}),
    }
}

/// Parse zero or more `;`-separated statements.
pub fn parse_statements(
    sql: &str,
    dialect: Option<Dialect>,
) -> Result<Vec<Statement>, ParserError> {
    let grammar = parser_for(dialect);
    Parser::parse_sql(&*grammar, sql)
}

/// Parse text that must be exactly one SQL expression.
pub fn parse_expression(text: &str, dialect: Option<Dialect>) -> Result<AstExpr, ParserError> {
    let grammar = parser_for(dialect);
    let mut parser = Parser::new(&*grammar).try_with_sql(text)?;
    let expr = parser.parse_expr()?;

    let next = parser.peek_token();
    if next.token != LexToken::EOF {
        return Err(ParserError::ParserError(format!(
            "unexpected '{}' after expression",
            next.token
        )));
    }
    Ok(expr)
}

/// Whether an expression binds tighter than any operator around it.
///
/// Anything else is parenthesized before it is used as an operand.
pub fn is_atomic(expr: &AstExpr) -> bool {
    matches!(
        expr,
        AstExpr::Identifier(_)
            | AstExpr::CompoundIdentifier(_)
            | AstExpr::Value(_)
            | AstExpr::Function(_)
            | AstExpr::Nested(_)
            | AstExpr::Cast { .. }
            | AstExpr::Case { .. }
    )
}

/// The only relation of `SELECT * FROM <relation>`, if the statement is
/// exactly that shape.
pub fn single_relation(statement: Statement) -> Option<TableFactor> {
    let Statement::Query(query) = statement else {
        return None;
    };
    let SetExpr::Select(select) = *query.body else {
        return None;
    };
    let mut from = select.from.into_iter();
    let first = from.next()?;
    if from.next().is_some() || !first.joins.is_empty() {
        return None;
    }
    Some(first.relation)
}
