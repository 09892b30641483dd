//! SQL generation and parsing.
//!
//! This module provides a type-safe SQL builder that generates multi-dialect
//! SQL, plus the bridge back into sqlparser's syntax tree:
//!
//! - [`query`] - SELECT query builder
//! - [`expr`] - Expression AST and builder DSL
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations
//! - [`parse`] - sqlparser entry points
//! - [`quoting`] - identifier quoting over parsed statements

pub mod dialect;
pub mod expr;
pub mod parse;
pub mod query;
pub mod quoting;
pub mod token;

// Re-export commonly used types at the sql module level
pub use dialect::{Dialect, PlaceholderStyle, SqlDialect, UnknownDialect};
pub use expr::{
    avg, case_when, cast, coalesce, col, count_star, func, lit_bool, lit_int,
    lit_null, lit_str, max, min, raw_sql, star, table_col, BinaryOperator, Expr, ExprExt,
    Literal, SortDir, WindowExt,
};
pub use query::{Join, JoinType, LimitOffset, OrderByExpr, Query, SelectExpr, TableExpr, TableRef};
pub use token::{Token, TokenStream};
