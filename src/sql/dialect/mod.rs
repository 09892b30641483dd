//! SQL Dialect definitions and formatting rules.
//!
//! This module provides a trait-based abstraction for SQL dialect differences.
//! Each dialect implements `SqlDialect` to handle its specific syntax:
//!
//! - Identifier quoting: `"` (ANSI/PG/DuckDB/Oracle), `` ` `` (MySQL), `[]` (T-SQL)
//! - Identifier case: lower-case folding vs upper-case folding (Snowflake, Oracle)
//! - Pagination: LIMIT/OFFSET vs OFFSET FETCH vs FETCH FIRST
//! - Boolean literals: true/false vs 1/0
//! - String concatenation: `||` vs `+` vs CONCAT()
//! - Driver placeholders: `?` vs `%s`
//!
//! # Usage
//!
//! ```ignore
//! use quarry::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect: Dialect = "postgres".parse()?;
//! let quoted = dialect.quote_identifier("user");  // "user"
//! ```

mod bigquery;
mod databricks;
mod duckdb;
pub mod helpers;
mod mysql;
mod oracle;
mod postgres;
mod redshift;
mod snowflake;
mod tsql;

pub use bigquery::BigQuery;
pub use databricks::Databricks;
pub use duckdb::DuckDb;
pub use mysql::MySql;
pub use oracle::Oracle;
pub use postgres::Postgres;
pub use redshift::Redshift;
pub use snowflake::Snowflake;
pub use tsql::TSql;

use std::str::FromStr;

use sqlparser::dialect::Dialect as ParserDialect;

use super::token::TokenStream;
use crate::model::types::ColumnType;

/// How a database driver expects bound parameters to be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?` (DuckDB)
    QuestionMark,
    /// `%s` (psycopg, mysqlclient, pymssql and friends)
    Format,
}

impl PlaceholderStyle {
    /// The marker text for this style.
    pub fn marker(&self) -> &'static str {
        match self {
            PlaceholderStyle::QuestionMark => "?",
            PlaceholderStyle::Format => "%s",
        }
    }
}

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// Implementations handle dialect-specific syntax differences.
/// The default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifiers
    // =========================================================================

    /// Quote an identifier (table, column, alias).
    ///
    /// - ANSI/PostgreSQL/DuckDB/Oracle: `"identifier"`
    /// - MySQL/BigQuery/Databricks: `` `identifier` ``
    /// - T-SQL: `[identifier]`
    fn quote_identifier(&self, ident: &str) -> String;

    /// The opening quote character, as sqlparser records it on an `Ident`.
    fn identifier_quote(&self) -> char;

    /// Fold a name the way the database folds unquoted identifiers.
    ///
    /// Quoted output preserves case, so schema-defined names are folded
    /// before they are quoted.
    fn normalize_identifier(&self, ident: &str) -> String {
        helpers::fold_lower(ident)
    }

    // =========================================================================
    // Literals
    // =========================================================================

    /// Quote a string literal.
    ///
    /// All dialects use single quotes with `''` for escaping.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Format a boolean literal.
    ///
    /// - PostgreSQL/DuckDB: `true`/`false`
    /// - MySQL/T-SQL/Oracle: `1`/`0`
    fn format_bool(&self, b: bool) -> &'static str;

    /// Format a NULL literal.
    fn format_null(&self) -> &'static str {
        "NULL"
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Emit LIMIT/OFFSET or equivalent pagination clause.
    ///
    /// - PostgreSQL/DuckDB/MySQL: `LIMIT n OFFSET m` (default)
    /// - T-SQL: `OFFSET m ROWS FETCH NEXT n ROWS ONLY`
    /// - Oracle: `FETCH FIRST n ROWS ONLY`
    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_standard(limit, offset)
    }

    /// Whether this dialect accepts a `LIMIT` clause at all.
    fn supports_limit_clause(&self) -> bool {
        true
    }

    /// Whether this dialect requires ORDER BY for OFFSET/FETCH.
    fn requires_order_by_for_offset(&self) -> bool {
        false
    }

    // =========================================================================
    // Operators
    // =========================================================================

    /// String concatenation operator.
    ///
    /// - ANSI/PostgreSQL/DuckDB: `||`
    /// - T-SQL: `+`
    fn concat_operator(&self) -> &'static str {
        "||"
    }

    /// Whether this dialect supports the concat operator.
    ///
    /// MySQL uses `||` as logical OR by default, so it gets `CONCAT()`.
    fn supports_concat_operator(&self) -> bool {
        true
    }

    // =========================================================================
    // Functions and Types
    // =========================================================================

    /// Remap a function name for this dialect.
    ///
    /// Returns `Some(new_name)` if the function should be remapped, `None` to
    /// keep the original. The input is matched case-insensitively.
    fn remap_function(&self, name: &str) -> Option<&'static str> {
        let _ = name;
        None
    }

    /// The type name used in `CAST(... AS <type>)` for a column type.
    fn emit_data_type(&self, ty: ColumnType) -> &'static str {
        helpers::emit_data_type_ansi(ty)
    }

    /// Whether the engine can scan files directly (`read_csv`, `read_parquet`).
    fn supports_file_scan(&self) -> bool {
        false
    }

    // =========================================================================
    // Integration
    // =========================================================================

    /// Driver placeholder style for parameterized queries.
    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Format
    }

    /// The sqlparser dialect used to read SQL written for this database.
    fn parser_dialect(&self) -> Box<dyn ParserDialect>;
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    #[default]
    DuckDb,
    Postgres,
    MySql,
    TSql,
    Snowflake,
    BigQuery,
    Redshift,
    Databricks,
    Oracle,
}

impl Dialect {
    /// Every supported dialect.
    pub const ALL: [Dialect; 9] = [
        Dialect::DuckDb,
        Dialect::Postgres,
        Dialect::MySql,
        Dialect::TSql,
        Dialect::Snowflake,
        Dialect::BigQuery,
        Dialect::Redshift,
        Dialect::Databricks,
        Dialect::Oracle,
    ];

    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::DuckDb => &DuckDb,
            Dialect::Postgres => &Postgres,
            Dialect::MySql => &MySql,
            Dialect::TSql => &TSql,
            Dialect::Snowflake => &Snowflake,
            Dialect::BigQuery => &BigQuery,
            Dialect::Redshift => &Redshift,
            Dialect::Databricks => &Databricks,
            Dialect::Oracle => &Oracle,
        }
    }

    /// Resolve a dialect from its name or a common alias.
    pub fn from_name(name: &str) -> Option<Dialect> {
        match name.trim().to_lowercase().as_str() {
            "duckdb" => Some(Dialect::DuckDb),
            "postgres" | "postgresql" => Some(Dialect::Postgres),
            "mysql" | "mariadb" => Some(Dialect::MySql),
            "tsql" | "mssql" | "sqlserver" => Some(Dialect::TSql),
            "snowflake" => Some(Dialect::Snowflake),
            "bigquery" => Some(Dialect::BigQuery),
            "redshift" => Some(Dialect::Redshift),
            "databricks" | "spark" => Some(Dialect::Databricks),
            "oracle" => Some(Dialect::Oracle),
            _ => None,
        }
    }
}

/// Error returned when a dialect name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown SQL dialect '{0}'")]
pub struct UnknownDialect(pub String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::from_name(s).ok_or_else(|| UnknownDialect(s.to_string()))
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn identifier_quote(&self) -> char {
        self.dialect().identifier_quote()
    }

    fn normalize_identifier(&self, ident: &str) -> String {
        self.dialect().normalize_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        self.dialect().format_bool(b)
    }

    fn format_null(&self) -> &'static str {
        self.dialect().format_null()
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        self.dialect().emit_limit_offset(limit, offset)
    }

    fn supports_limit_clause(&self) -> bool {
        self.dialect().supports_limit_clause()
    }

    fn requires_order_by_for_offset(&self) -> bool {
        self.dialect().requires_order_by_for_offset()
    }

    fn concat_operator(&self) -> &'static str {
        self.dialect().concat_operator()
    }

    fn supports_concat_operator(&self) -> bool {
        self.dialect().supports_concat_operator()
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        self.dialect().remap_function(name)
    }

    fn emit_data_type(&self, ty: ColumnType) -> &'static str {
        self.dialect().emit_data_type(ty)
    }

    fn supports_file_scan(&self) -> bool {
        self.dialect().supports_file_scan()
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        self.dialect().placeholder_style()
    }

    fn parser_dialect(&self) -> Box<dyn ParserDialect> {
        self.dialect().parser_dialect()
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_display() {
        assert_eq!(Dialect::DuckDb.to_string(), "duckdb");
        assert_eq!(Dialect::Postgres.to_string(), "postgres");
        assert_eq!(Dialect::TSql.to_string(), "tsql");
        assert_eq!(Dialect::MySql.to_string(), "mysql");
        assert_eq!(Dialect::Oracle.to_string(), "oracle");
    }

    #[test]
    fn test_dialect_names_round_trip() {
        for dialect in Dialect::ALL {
            assert_eq!(dialect.to_string().parse::<Dialect>(), Ok(dialect));
        }
    }

    #[test]
    fn test_dialect_aliases() {
        assert_eq!(Dialect::from_name("PostgreSQL"), Some(Dialect::Postgres));
        assert_eq!(Dialect::from_name("sqlserver"), Some(Dialect::TSql));
        assert_eq!(Dialect::from_name("spark"), Some(Dialect::Databricks));
        assert_eq!(
            "sqlite".parse::<Dialect>(),
            Err(UnknownDialect("sqlite".into()))
        );
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(Dialect::DuckDb.quote_identifier("users"), "\"users\"");
        assert_eq!(Dialect::Postgres.quote_identifier("users"), "\"users\"");
        assert_eq!(Dialect::TSql.quote_identifier("users"), "[users]");
        assert_eq!(Dialect::MySql.quote_identifier("users"), "`users`");
        assert_eq!(Dialect::Oracle.quote_identifier("users"), "\"users\"");
    }

    #[test]
    fn test_quote_identifier_escaping() {
        assert_eq!(
            Dialect::DuckDb.quote_identifier("weird\"name"),
            "\"weird\"\"name\""
        );
        assert_eq!(
            Dialect::TSql.quote_identifier("weird]name"),
            "[weird]]name]"
        );
        assert_eq!(
            Dialect::MySql.quote_identifier("weird`name"),
            "`weird``name`"
        );
    }

    #[test]
    fn test_identifier_quote_matches_quote_identifier() {
        for dialect in Dialect::ALL {
            let quoted = dialect.quote_identifier("x");
            assert!(quoted.starts_with(dialect.identifier_quote()), "{dialect}");
        }
    }

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(Dialect::DuckDb.normalize_identifier("Amount"), "amount");
        assert_eq!(Dialect::Postgres.normalize_identifier("Amount"), "amount");
        assert_eq!(Dialect::Snowflake.normalize_identifier("Amount"), "AMOUNT");
        assert_eq!(Dialect::Oracle.normalize_identifier("amount"), "AMOUNT");
    }

    #[test]
    fn test_format_bool() {
        assert_eq!(Dialect::DuckDb.format_bool(true), "true");
        assert_eq!(Dialect::Postgres.format_bool(false), "false");
        assert_eq!(Dialect::TSql.format_bool(true), "1");
        assert_eq!(Dialect::MySql.format_bool(false), "0");
        assert_eq!(Dialect::Oracle.format_bool(true), "1");
    }

    #[test]
    fn test_concat_operator() {
        assert_eq!(Dialect::DuckDb.concat_operator(), "||");
        assert_eq!(Dialect::TSql.concat_operator(), "+");
        assert!(!Dialect::MySql.supports_concat_operator());
    }

    #[test]
    fn test_placeholder_style() {
        assert_eq!(Dialect::DuckDb.placeholder_style().marker(), "?");
        for dialect in Dialect::ALL.into_iter().filter(|d| *d != Dialect::DuckDb) {
            assert_eq!(dialect.placeholder_style(), PlaceholderStyle::Format);
        }
    }

    #[test]
    fn test_pagination_support() {
        assert!(Dialect::DuckDb.supports_limit_clause());
        assert!(!Dialect::TSql.supports_limit_clause());
        assert!(!Dialect::Oracle.supports_limit_clause());
        assert!(Dialect::TSql.requires_order_by_for_offset());
        assert!(!Dialect::Oracle.requires_order_by_for_offset());
    }

    #[test]
    fn test_file_scan_support() {
        assert!(Dialect::DuckDb.supports_file_scan());
        assert!(!Dialect::Postgres.supports_file_scan());
    }

    #[test]
    fn test_remap_function_datetime() {
        assert_eq!(Dialect::DuckDb.remap_function("STRFTIME"), None);
        assert_eq!(
            Dialect::Postgres.remap_function("STRFTIME"),
            Some("TO_CHAR")
        );
        assert_eq!(Dialect::TSql.remap_function("STRFTIME"), Some("FORMAT"));
        assert_eq!(
            Dialect::MySql.remap_function("STRFTIME"),
            Some("DATE_FORMAT")
        );
        assert_eq!(Dialect::DuckDb.remap_function("TO_CHAR"), Some("STRFTIME"));
        assert_eq!(
            Dialect::MySql.remap_function("strptime"),
            Some("STR_TO_DATE")
        );
    }

    #[test]
    fn test_remap_function_null_handling() {
        assert_eq!(Dialect::DuckDb.remap_function("NVL"), Some("COALESCE"));
        assert_eq!(Dialect::TSql.remap_function("NVL"), Some("ISNULL"));
        assert_eq!(Dialect::MySql.remap_function("NVL"), Some("IFNULL"));
        assert_eq!(Dialect::Oracle.remap_function("IFNULL"), Some("NVL"));
        assert_eq!(Dialect::Snowflake.remap_function("NVL"), None);
    }

    #[test]
    fn test_remap_function_regex() {
        assert_eq!(
            Dialect::Postgres.remap_function("REGEXP_MATCHES"),
            Some("REGEXP_LIKE")
        );
        assert_eq!(
            Dialect::BigQuery.remap_function("regexp_matches"),
            Some("REGEXP_CONTAINS")
        );
        assert_eq!(Dialect::DuckDb.remap_function("REGEXP_MATCHES"), None);
    }

    #[test]
    fn test_remap_function_case_insensitive() {
        assert_eq!(Dialect::TSql.remap_function("length"), Some("LEN"));
        assert_eq!(Dialect::TSql.remap_function("Length"), Some("LEN"));
    }

    #[test]
    fn test_remap_function_unknown() {
        for dialect in Dialect::ALL {
            assert_eq!(dialect.remap_function("CUSTOM_FUNC"), None);
        }
    }

    #[test]
    fn test_emit_data_type() {
        assert_eq!(
            Dialect::Postgres.emit_data_type(ColumnType::Float),
            "DOUBLE PRECISION"
        );
        assert_eq!(Dialect::MySql.emit_data_type(ColumnType::Float), "DOUBLE");
        assert_eq!(Dialect::TSql.emit_data_type(ColumnType::Float), "FLOAT");
        assert_eq!(
            Dialect::TSql.emit_data_type(ColumnType::Datetime),
            "DATETIME2"
        );
        assert_eq!(
            Dialect::BigQuery.emit_data_type(ColumnType::String),
            "STRING"
        );
    }
}
