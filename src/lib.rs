//! # Quarry
//!
//! Compiles semantic dataset schemas to multi-dialect SQL and rewrites the
//! table references of caller-supplied SQL.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Schema (columns, source, transformations)         │
//! │        built in code or loaded from JSON / TOML          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [transform]
//! ┌─────────────────────────────────────────────────────────┐
//! │          Column expressions (typed SQL builder)          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compiler: render, parse back, quote]
//! ┌─────────────────────────────────────────────────────────┐
//! │             SQL for one of nine dialects                 │
//! └─────────────────────────────────────────────────────────┘
//!
//!   caller SQL ──▶ [rewrite] ──▶ substituted / transpiled SQL,
//!                                referenced table names
//! ```

pub mod compiler;
pub mod config;
pub mod model;
pub mod rewrite;
pub mod sql;
pub mod transform;

pub use compiler::{
    build_head_query, build_query, build_row_count_query, CompileError, CompileOptions,
    CompileResult, CompiledQuery,
};
pub use model::{Column, ColumnType, Schema, SchemaError, SchemaSource, Transformation};
pub use rewrite::{
    extract_table_names, substitute_tables, transpile, RewriteError, RewriteResult, TableMapping,
};
pub use sql::Dialect;
