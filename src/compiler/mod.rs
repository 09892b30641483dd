//! Schema to SQL compilation.
//!
//! A [`Schema`] compiles to three statements:
//!
//! - the full query (`build_query`): projection, grouping, ordering, limit
//! - a preview (`build_head_query`): the same rows without ordering, capped
//! - a row count (`build_row_count_query`)
//!
//! Every statement is built with the typed query builder, then parsed back
//! with the target dialect's grammar. A statement that does not parse is an
//! error, never returned. The parsed tree has its identifiers quoted and is
//! re-serialized, so the SQL handed out is exactly what the parser accepted.

pub mod table_expr;

use std::fmt;
use std::path::PathBuf;

use crate::model::{Schema, SchemaError, SchemaSource};
use crate::sql::expr::{col, count_star, raw_sql, star, table_col, Expr};
use crate::sql::parse::{is_atomic, parse_expression, parse_statements};
use crate::sql::query::{OrderByExpr, Query, SelectExpr, TableExpr};
use crate::sql::quoting::quote_identifiers;
use crate::sql::{Dialect, SortDir, SqlDialect};
use crate::transform;

use table_expr::FromClause;

/// Rows returned by a head query unless the caller asks for another count.
pub const DEFAULT_HEAD_ROWS: u64 = 5;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during compilation.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Generated SQL for schema '{schema}' does not parse: {message}\n{sql}")]
    InvalidGeneratedQuery {
        schema: String,
        sql: String,
        message: String,
    },

    #[error("Schema '{schema}' reads a {format} file, which {dialect} cannot scan")]
    UnsupportedSourceFormat {
        schema: String,
        format: String,
        dialect: Dialect,
    },

    #[error("Schema '{schema}' cannot group by expression column '{column}'")]
    InvalidGroupBy { schema: String, column: String },

    #[error("Invalid source path '{path}': {message}")]
    InvalidPath { path: String, message: String },
}

pub type CompileResult<T> = Result<T, CompileError>;

// ============================================================================
// Options
// ============================================================================

/// Options for compilation.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// SQL dialect to generate. `None` picks the source's natural dialect:
    /// the engine's for relational sources, DuckDB for files and views.
    pub dialect: Option<Dialect>,

    /// Directory relative file paths are resolved against.
    pub dataset_root: PathBuf,

    /// Row count for head queries.
    pub head_rows: u64,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            dialect: None,
            dataset_root: PathBuf::from("."),
            head_rows: DEFAULT_HEAD_ROWS,
        }
    }
}

impl CompileOptions {
    /// Set the SQL dialect.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    pub fn with_dataset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.dataset_root = root.into();
        self
    }

    pub fn with_head_rows(mut self, rows: u64) -> Self {
        self.head_rows = rows;
        self
    }

    /// The dialect used for `schema`.
    pub fn dialect_for(&self, schema: &Schema) -> Dialect {
        self.dialect.unwrap_or_else(|| match schema.source() {
            SchemaSource::Relational { engine, .. } => engine.dialect(),
            SchemaSource::File { .. } | SchemaSource::View { .. } => Dialect::DuckDb,
        })
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// A compiled statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    /// The SQL text, as re-serialized after the parse check.
    pub sql: String,

    /// The dialect the SQL was generated and checked for.
    pub dialect: Dialect,
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Compile the full query for `schema`.
pub fn build_query(schema: &Schema, options: &CompileOptions) -> CompileResult<CompiledQuery> {
    QueryCompiler::new(schema, options).full()
}

/// Compile a preview of at most `rows` rows (default: `options.head_rows`).
pub fn build_head_query(
    schema: &Schema,
    options: &CompileOptions,
    rows: Option<u64>,
) -> CompileResult<CompiledQuery> {
    QueryCompiler::new(schema, options).head(rows.unwrap_or(options.head_rows))
}

/// Compile a query counting the rows `build_query` would return, before
/// any limit.
pub fn build_row_count_query(
    schema: &Schema,
    options: &CompileOptions,
) -> CompileResult<CompiledQuery> {
    QueryCompiler::new(schema, options).row_count()
}

// ============================================================================
// Compiler
// ============================================================================

/// Compiles one schema for one dialect.
#[derive(Debug)]
pub struct QueryCompiler<'a> {
    schema: &'a Schema,
    options: &'a CompileOptions,
    dialect: Dialect,
}

impl<'a> QueryCompiler<'a> {
    pub fn new(schema: &'a Schema, options: &'a CompileOptions) -> Self {
        Self {
            schema,
            options,
            dialect: options.dialect_for(schema),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Base query plus ORDER BY and the schema's LIMIT.
    pub fn full(&self) -> CompileResult<CompiledQuery> {
        let mut query = self.base_query()?.order_by(self.order_by());
        if let Some(limit) = self.schema.limit() {
            query = query.limit(limit);
        }
        self.finish(query, "query")
    }

    /// Base query capped at `rows`; ordering and the schema's LIMIT are
    /// dropped.
    pub fn head(&self, rows: u64) -> CompileResult<CompiledQuery> {
        let query = self.base_query()?.limit(rows);
        self.finish(query, "head")
    }

    /// `SELECT COUNT(*)` over the source, or over the projection when
    /// grouping or de-duplication changes the number of output rows.
    pub fn row_count(&self) -> CompileResult<CompiledQuery> {
        let query = if !self.schema.group_by().is_empty() || self.schema.distinct() {
            let alias = self.dialect.normalize_identifier(self.schema.name());
            Query::new()
                .select(vec![count_star()])
                .from(TableExpr::subquery(self.base_query()?, &alias))
        } else {
            let from = self.from_clause()?;
            Query {
                select: vec![SelectExpr::new(count_star())],
                from: Some(from.table),
                joins: from.joins,
                ..Query::default()
            }
        };
        self.finish(query, "row count")
    }

    /// SELECT [DISTINCT] columns FROM source [GROUP BY ...].
    fn base_query(&self) -> CompileResult<Query> {
        let from = self.from_clause()?;
        let mut query = Query {
            select: self.select_list()?,
            distinct: self.schema.distinct(),
            from: Some(from.table),
            joins: from.joins,
            group_by: self.group_by()?,
            ..Query::default()
        };
        if query.select.is_empty() {
            query.select.push(SelectExpr::new(star()));
        }
        Ok(query)
    }

    fn from_clause(&self) -> CompileResult<FromClause> {
        table_expr::resolve(self.schema, self.dialect, &self.options.dataset_root)
    }

    /// Aliases the user wrote (`alias`, `rename`) are emitted verbatim and
    /// quoted, so they keep their case in every dialect. Aliases derived
    /// from column names are folded like the column itself.
    fn select_list(&self) -> CompileResult<Vec<SelectExpr>> {
        let is_view = self.schema.source().is_view();
        let mut select = Vec::with_capacity(self.schema.columns().len());

        for column in self.schema.columns() {
            let (expr, alias) = match (&column.expression, column.qualified_parts()) {
                (Some(expression), _) => {
                    let parsed = parse_expression(expression, None).map_err(|e| {
                        SchemaError::InvalidExpression {
                            column: column.name.clone(),
                            expression: expression.clone(),
                            message: e.to_string(),
                        }
                    })?;
                    // Re-serialized so source comments never reach the output.
                    let text = parsed.to_string();
                    let expr = if is_atomic(&parsed) {
                        raw_sql(&text)
                    } else {
                        Expr::Paren(Box::new(raw_sql(&text)))
                    };
                    let alias = column
                        .alias
                        .clone()
                        .unwrap_or_else(|| self.dialect.normalize_identifier(&column.name));
                    (expr, Some(alias))
                }
                (None, Some((table, name))) if is_view => {
                    let alias = column.alias.clone().unwrap_or_else(|| {
                        self.dialect
                            .normalize_identifier(&format!("{}_{}", table, name))
                    });
                    (self.qualified(table, name), Some(alias))
                }
                (None, _) => (
                    col(&self.dialect.normalize_identifier(&column.name)),
                    column.alias.clone(),
                ),
            };

            let out = transform::apply(
                expr,
                &column.name,
                alias.as_deref(),
                self.schema.transformations(),
                self.dialect,
            );
            select.push(SelectExpr {
                expr: out.expr,
                alias: out.alias,
            });
        }
        Ok(select)
    }

    fn group_by(&self) -> CompileResult<Vec<Expr>> {
        self.schema
            .group_by()
            .iter()
            .map(|entry| {
                if self
                    .schema
                    .column(entry)
                    .is_some_and(|c| c.expression.is_some())
                {
                    return Err(CompileError::InvalidGroupBy {
                        schema: self.schema.name().to_string(),
                        column: entry.clone(),
                    });
                }
                Ok(self.reference(entry))
            })
            .collect()
    }

    fn order_by(&self) -> Vec<OrderByExpr> {
        self.schema
            .order_by()
            .iter()
            .map(|spec| {
                let expr = self.reference(&spec.column);
                match spec.direction {
                    None => OrderByExpr::new(expr),
                    Some(SortDir::Asc) => OrderByExpr::asc(expr),
                    Some(SortDir::Desc) => OrderByExpr::desc(expr),
                }
            })
            .collect()
    }

    /// A column named in group_by/order_by; `table.column` in views.
    fn reference(&self, name: &str) -> Expr {
        match name.split_once('.') {
            Some((table, column)) if self.schema.source().is_view() => {
                self.qualified(table, column)
            }
            _ => col(&self.dialect.normalize_identifier(name)),
        }
    }

    fn qualified(&self, table: &str, column: &str) -> Expr {
        table_col(
            &self.dialect.normalize_identifier(table),
            &self.dialect.normalize_identifier(column),
        )
    }

    /// Render, parse back with the dialect's grammar, quote and re-serialize.
    fn finish(&self, query: Query, kind: &str) -> CompileResult<CompiledQuery> {
        let generated = query.to_sql(self.dialect);
        let sql = self_check(&generated, self.dialect, self.schema.name())?;
        tracing::debug!(
            schema = self.schema.name(),
            dialect = %self.dialect,
            kind,
            sql = %sql,
            "compiled statement"
        );
        Ok(CompiledQuery {
            sql,
            dialect: self.dialect,
        })
    }
}

/// Parse `sql` as exactly one statement of `dialect`, quote its identifiers
/// and return the re-serialized text.
pub fn self_check(sql: &str, dialect: Dialect, schema: &str) -> CompileResult<String> {
    let invalid = |message: String| CompileError::InvalidGeneratedQuery {
        schema: schema.to_string(),
        sql: sql.to_string(),
        message,
    };

    let mut statements = parse_statements(sql, Some(dialect)).map_err(|e| invalid(e.to_string()))?;
    if statements.len() != 1 {
        return Err(invalid(format!(
            "expected one statement, found {}",
            statements.len()
        )));
    }
    let mut statement = statements.remove(0);
    quote_identifiers(&mut statement, dialect);
    Ok(statement.to_string())
}
