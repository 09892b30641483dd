//! Rewriting caller-supplied SQL.
//!
//! Three pure operations over parsed statements:
//!
//! - [`substitute_tables`] swaps logical table names for physical targets
//! - [`transpile`] moves a statement from one dialect to another
//! - [`extract_table_names`] lists the tables a statement reads
//!
//! Inputs are parsed into owned trees; nothing here mutates caller data.

pub mod extract;
pub mod mapping;
pub mod transpile;

use sqlparser::ast::Statement;

use crate::sql::parse::parse_statements;
use crate::sql::Dialect;

pub use extract::extract_table_names;
pub use mapping::{substitute_tables, MappingTarget, TableMapping};
pub use transpile::{transpile, PLACEHOLDER_TOKEN};

/// Errors raised while rewriting SQL.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RewriteError {
    #[error("Failed to parse SQL: {message}\n{sql}")]
    Parse { sql: String, message: String },

    #[error("Invalid table mapping '{key}' => '{value}': {reason}")]
    InvalidTableMapping {
        key: String,
        value: String,
        reason: String,
    },

    #[error("SQL text contains no statement")]
    EmptyStatement,

    #[error("Expected a single statement, found {0}")]
    MultipleStatements(usize),
}

pub type RewriteResult<T> = Result<T, RewriteError>;

/// Parse every statement in `sql`.
fn parse_all(sql: &str, dialect: Option<Dialect>) -> RewriteResult<Vec<Statement>> {
    parse_statements(sql, dialect).map_err(|e| RewriteError::Parse {
        sql: sql.to_string(),
        message: e.to_string(),
    })
}

/// Parse `sql`, which must hold exactly one statement.
fn parse_one(sql: &str, dialect: Option<Dialect>) -> RewriteResult<Statement> {
    let mut statements = parse_all(sql, dialect)?;
    match statements.len() {
        0 => Err(RewriteError::EmptyStatement),
        1 => Ok(statements.remove(0)),
        n => Err(RewriteError::MultipleStatements(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_one_counts_statements() {
        assert_eq!(parse_one("", None), Err(RewriteError::EmptyStatement));
        assert_eq!(
            parse_one("SELECT 1; SELECT 2", None),
            Err(RewriteError::MultipleStatements(2))
        );
        assert!(parse_one("SELECT 1", None).is_ok());
    }

    #[test]
    fn test_parse_error_carries_input() {
        let err = parse_one("SELEC 1", None).unwrap_err();
        match err {
            RewriteError::Parse { sql, .. } => assert_eq!(sql, "SELEC 1"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
