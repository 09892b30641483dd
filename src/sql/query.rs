//! Query builder - construct SQL queries with a fluent API.

use super::dialect::{Dialect, SqlDialect};
use super::expr::{Expr, SortDir};
use super::token::{Token, TokenStream};

// =============================================================================
// Select Expression (column with optional alias)
// =============================================================================

/// A SELECT list item: expression with optional alias.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct SelectExpr {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectExpr {
    pub fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = self.expr.to_tokens(dialect);
        if let Some(alias) = &self.alias {
            ts.space()
                .push(Token::As)
                .space()
                .push(Token::Ident(alias.clone()));
        }
        ts
    }
}

impl From<Expr> for SelectExpr {
    fn from(expr: Expr) -> Self {
        SelectExpr::new(expr)
    }
}

// =============================================================================
// Table References
// =============================================================================

/// A table reference with optional schema.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct TableRef {
    pub schema: Option<String>,
    pub table: String,
}

impl TableRef {
    pub fn new(table: &str) -> Self {
        Self {
            schema: None,
            table: table.into(),
        }
    }

    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::QualifiedIdent {
            schema: self.schema.clone(),
            name: self.table.clone(),
        });
        ts
    }
}

/// Anything that can appear after FROM.
#[derive(Debug, Clone, PartialEq)]
pub enum TableExpr {
    /// A named table.
    Table(TableRef),
    /// A table-valued function call such as `read_parquet('/data/x.parquet')`.
    ///
    /// The name is emitted verbatim, so it must be a trusted constant.
    Function {
        name: &'static str,
        args: Vec<Expr>,
        alias: Option<String>,
    },
    /// A derived table: `(SELECT ...) AS alias`.
    Subquery { query: Box<Query>, alias: String },
}

impl TableExpr {
    /// A table-valued function call without alias.
    pub fn function(name: &'static str, args: Vec<Expr>) -> Self {
        TableExpr::Function {
            name,
            args,
            alias: None,
        }
    }

    /// A derived table.
    pub fn subquery(query: Query, alias: &str) -> Self {
        TableExpr::Subquery {
            query: Box::new(query),
            alias: alias.into(),
        }
    }

    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        match self {
            TableExpr::Table(table) => table.to_tokens(),
            TableExpr::Function { name, args, alias } => {
                let mut ts = TokenStream::new();
                ts.push(Token::Raw((*name).into())).lparen();
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    ts.append(&arg.to_tokens(dialect));
                }
                ts.rparen();
                if let Some(alias) = alias {
                    ts.space()
                        .push(Token::As)
                        .space()
                        .push(Token::Ident(alias.clone()));
                }
                ts
            }
            TableExpr::Subquery { query, alias } => {
                let mut ts = TokenStream::new();
                ts.lparen()
                    .append(&query.to_tokens(dialect))
                    .rparen()
                    .space()
                    .push(Token::As)
                    .space()
                    .push(Token::Ident(alias.clone()));
                ts
            }
        }
    }
}

impl From<TableRef> for TableExpr {
    fn from(table: TableRef) -> Self {
        TableExpr::Table(table)
    }
}

// =============================================================================
// Joins
// =============================================================================

/// Type of join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
}

/// A JOIN clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub table: TableRef,
    pub on: Expr,
}

impl Join {
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        match self.join_type {
            JoinType::Inner => ts.push(Token::Inner),
        };

        ts.space().push(Token::Join).space();
        ts.append(&self.table.to_tokens());
        ts.space().push(Token::On).space();
        ts.append(&self.on.to_tokens(dialect));

        ts
    }
}

// =============================================================================
// ORDER BY
// =============================================================================

/// An ORDER BY expression.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct OrderByExpr {
    pub expr: Expr,
    pub dir: Option<SortDir>,
}

impl OrderByExpr {
    pub fn new(expr: Expr) -> Self {
        Self {
            expr,
            dir: None,
        }
    }

    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            dir: Some(SortDir::Asc),
        }
    }

    pub fn desc(expr: Expr) -> Self {
        Self {
            expr,
            dir: Some(SortDir::Desc),
        }
    }

    /// Convert to tokens for a dialect.
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = self.expr.to_tokens(dialect);

        if let Some(dir) = &self.dir {
            ts.space().push(match dir {
                SortDir::Asc => Token::Asc,
                SortDir::Desc => Token::Desc,
            });
        }

        ts
    }
}

// =============================================================================
// LIMIT / OFFSET
// =============================================================================

/// LIMIT and OFFSET clause.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LimitOffset {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl LimitOffset {
    /// Delegates to `SqlDialect::emit_limit_offset()` for the actual formatting.
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        dialect.emit_limit_offset(self.limit, self.offset)
    }
}

// =============================================================================
// Query Builder
// =============================================================================

/// A SELECT query.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use = "Query has no effect until converted to SQL with to_sql() or to_tokens()"]
pub struct Query {
    pub select: Vec<SelectExpr>,
    pub distinct: bool,
    pub from: Option<TableExpr>,
    pub joins: Vec<Join>,
    pub group_by: Vec<Expr>,
    pub order_by: Vec<OrderByExpr>,
    pub limit_offset: Option<LimitOffset>,
}

impl Query {
    /// Create a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the SELECT list.
    pub fn select(mut self, exprs: Vec<impl Into<SelectExpr>>) -> Self {
        self.select = exprs.into_iter().map(|e| e.into()).collect();
        self
    }

    /// Set the FROM source.
    pub fn from(mut self, table: impl Into<TableExpr>) -> Self {
        self.from = Some(table.into());
        self
    }

    /// Set the ORDER BY clause.
    pub fn order_by(mut self, exprs: Vec<OrderByExpr>) -> Self {
        self.order_by = exprs;
        self
    }

    /// Set LIMIT.
    pub fn limit(mut self, limit: u64) -> Self {
        match &mut self.limit_offset {
            Some(lo) => lo.limit = Some(limit),
            None => {
                self.limit_offset = Some(LimitOffset {
                    limit: Some(limit),
                    offset: None,
                })
            }
        }
        self
    }


    /// Convert to token stream for a specific dialect.
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        // SELECT
        ts.push(Token::Select);
        if self.distinct {
            ts.space().push(Token::Distinct);
        }

        // Columns
        for (i, select_expr) in self.select.iter().enumerate() {
            if i == 0 {
                ts.newline().indent(1);
            } else {
                ts.comma().newline().indent(1);
            }
            ts.append(&select_expr.to_tokens(dialect));
        }

        // FROM
        if let Some(from) = &self.from {
            ts.newline().push(Token::From).space();
            ts.append(&from.to_tokens(dialect));
        }

        // JOINs
        for join in &self.joins {
            ts.newline();
            ts.append(&join.to_tokens(dialect));
        }

        // GROUP BY
        if !self.group_by.is_empty() {
            ts.newline().push(Token::GroupBy).space();
            for (i, expr) in self.group_by.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.append(&expr.to_tokens(dialect));
            }
        }

        // ORDER BY
        // T-SQL requires ORDER BY for OFFSET FETCH syntax. If ORDER BY is missing
        // but we have LIMIT/OFFSET, emit ORDER BY (SELECT NULL).
        let needs_order_by_placeholder = dialect.requires_order_by_for_offset()
            && self.order_by.is_empty()
            && self.limit_offset.is_some();

        if !self.order_by.is_empty() {
            ts.newline().push(Token::OrderBy).space();
            for (i, order_expr) in self.order_by.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.append(&order_expr.to_tokens(dialect));
            }
        } else if needs_order_by_placeholder {
            // Row order is unspecified here; the placeholder only makes the
            // pagination clause legal.
            ts.newline()
                .push(Token::OrderBy)
                .space()
                .lparen()
                .push(Token::Select)
                .space()
                .push(Token::Null)
                .rparen();
        }

        // LIMIT / OFFSET
        if let Some(lo) = &self.limit_offset {
            ts.newline();
            ts.append(&lo.to_tokens(dialect));
        }

        ts
    }

    /// Generate SQL string for a specific dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens(dialect).serialize(dialect)
    }
}

impl std::fmt::Display for Query {
    /// Formats the query using the default dialect (DuckDB).
    ///
    /// For dialect-specific SQL, use [`Query::to_sql`] instead.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_sql(Dialect::default()))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::expr::{col, count_star, func, lit_str, table_col, ExprExt};

    #[test]
    fn test_simple_select() {
        let query = Query::new()
            .select(vec![col("id"), col("name")])
            .from(TableRef::new("users").with_schema("dbo"));

        let sql = query.to_sql(Dialect::TSql);
        assert!(sql.contains("[dbo].[users]"));
        assert!(sql.contains("[id]"));
        assert!(sql.contains("[name]"));
    }

    #[test]
    fn test_table_function_source() {
        let query = Query::new()
            .select(vec![col("amount")])
            .from(TableExpr::function(
                "read_parquet",
                vec![lit_str("/data/sales.parquet")],
            ));

        assert_eq!(
            query.to_sql(Dialect::DuckDb),
            "SELECT\n  \"amount\"\nFROM read_parquet('/data/sales.parquet')"
        );
    }

    #[test]
    fn test_subquery_source() {
        let inner = Query {
            distinct: true,
            ..Query::new()
                .select(vec![col("region")])
                .from(TableRef::new("sales"))
        };
        let query = Query::new()
            .select(vec![count_star()])
            .from(TableExpr::subquery(inner, "sales"));

        let sql = query.to_sql(Dialect::Postgres);
        assert!(sql.starts_with("SELECT\n  COUNT(*)\nFROM (SELECT DISTINCT"));
        assert!(sql.ends_with(") AS \"sales\""));
    }

    #[test]
    fn test_join() {
        let query = Query {
            joins: vec![Join {
                join_type: JoinType::Inner,
                table: TableRef::new("customers"),
                on: table_col("orders", "customer_id").eq(table_col("customers", "id")),
            }],
            ..Query::new()
                .select(vec![table_col("orders", "amount")])
                .from(TableRef::new("orders"))
        };

        let sql = query.to_sql(Dialect::MySql);
        assert!(sql.contains(
            "INNER JOIN `customers` ON `orders`.`customer_id` = `customers`.`id`"
        ));
    }

    #[test]
    fn test_aggregation() {
        let query = Query::new()
            .select(vec![
                col("region").into(),
                SelectExpr {
                    expr: func("SUM", vec![col("amount")]),
                    alias: Some("total".into()),
                },
            ])
            .from(TableRef::new("orders"));
        let query = Query {
            group_by: vec![col("region")],
            ..query
        };

        let sql = query.to_sql(Dialect::Postgres);
        assert!(sql.contains("SUM(\"amount\") AS \"total\""));
        assert!(sql.contains("GROUP BY \"region\""));
    }

    #[test]
    fn test_order_by() {
        let query = Query::new()
            .select(vec![col("name"), col("age")])
            .from(TableRef::new("users"))
            .order_by(vec![
                OrderByExpr::desc(col("age")),
                OrderByExpr::asc(col("name")),
            ]);

        let sql = query.to_sql(Dialect::Postgres);
        assert!(sql.contains("ORDER BY \"age\" DESC, \"name\" ASC"));
    }

    #[test]
    fn test_limit_duckdb() {
        let query = Query::new()
            .select(vec![col("id")])
            .from(TableRef::new("users"))
            .limit(10);

        let sql = query.to_sql(Dialect::DuckDb);
        assert!(sql.ends_with("LIMIT 10"));
    }

    #[test]
    fn test_limit_tsql_without_order_by() {
        let query = Query::new()
            .select(vec![col("id")])
            .from(TableRef::new("users"))
            .limit(10);

        let sql = query.to_sql(Dialect::TSql);
        assert!(
            sql.contains("ORDER BY (SELECT NULL)"),
            "Expected ORDER BY (SELECT NULL) placeholder, got: {}",
            sql
        );
        assert!(sql.ends_with("OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY"));
    }

    #[test]
    fn test_limit_oracle() {
        let query = Query::new()
            .select(vec![col("id")])
            .from(TableRef::new("users"))
            .limit(5);

        let sql = query.to_sql(Dialect::Oracle);
        assert!(sql.ends_with("FETCH FIRST 5 ROWS ONLY"));
        assert!(!sql.contains("ORDER BY"));
    }

    #[test]
    fn test_distinct() {
        let query = Query {
            distinct: true,
            ..Query::new()
                .select(vec![col("category")])
                .from(TableRef::new("products"))
        };

        assert!(query.to_sql(Dialect::Postgres).starts_with("SELECT DISTINCT"));
    }

    #[test]
    fn test_query_display() {
        let query = Query::new()
            .select(vec![col("id")])
            .from(TableRef::new("users"));

        let display_sql = format!("{}", query);
        assert!(display_sql.contains("\"id\""));
        assert!(display_sql.contains("\"users\""));
    }
}
