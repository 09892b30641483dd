//! Shared helper functions for SQL dialect implementations.
//!
//! Dialects compose these building blocks to implement `SqlDialect`
//! with minimal duplication.

use crate::model::types::ColumnType;
use crate::sql::token::{Token, TokenStream};

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: Postgres, DuckDB, Snowflake, Redshift, Oracle
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote identifier with backticks.
/// Used by: MySQL, BigQuery, Databricks
pub fn quote_backtick(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// Quote identifier with square brackets.
/// Used by: T-SQL
pub fn quote_bracket(ident: &str) -> String {
    format!("[{}]", ident.replace(']', "]]"))
}

// =============================================================================
// String Quoting
// =============================================================================

/// Quote string with single quotes (standard SQL).
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Quote string with N prefix for Unicode (T-SQL).
pub fn quote_string_unicode(s: &str) -> String {
    format!("N'{}'", s.replace('\'', "''"))
}

// =============================================================================
// Identifier Case
// =============================================================================

/// Fold an unquoted identifier to lower case.
/// Used by: Postgres, DuckDB, Redshift, MySQL, T-SQL, BigQuery, Databricks
pub fn fold_lower(ident: &str) -> String {
    ident.to_lowercase()
}

/// Fold an unquoted identifier to upper case.
/// Used by: Snowflake, Oracle
pub fn fold_upper(ident: &str) -> String {
    ident.to_uppercase()
}

// =============================================================================
// Boolean Formatting
// =============================================================================

/// Format boolean as literal true/false.
pub fn format_bool_literal(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

/// Format boolean as numeric 1/0.
/// Used by: T-SQL, MySQL
pub fn format_bool_numeric(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Emit LIMIT ... OFFSET ... (standard SQL).
pub fn emit_limit_offset_standard(limit: Option<u64>, offset: Option<u64>) -> TokenStream {
    let mut ts = TokenStream::new();

    if let Some(lim) = limit {
        ts.push(Token::Limit)
            .space()
            .push(Token::LitInt(lim as i64));
    }

    if let Some(off) = offset {
        if limit.is_some() {
            ts.space();
        }
        ts.push(Token::Offset)
            .space()
            .push(Token::LitInt(off as i64));
    }

    ts
}

/// Emit OFFSET ... ROWS FETCH NEXT ... ROWS ONLY (T-SQL style).
/// Requires an ORDER BY clause.
pub fn emit_limit_offset_tsql(limit: Option<u64>, offset: Option<u64>) -> TokenStream {
    let mut ts = TokenStream::new();

    let off = offset.unwrap_or(0);
    ts.push(Token::Offset)
        .space()
        .push(Token::LitInt(off as i64))
        .space()
        .push(Token::Rows);

    if let Some(lim) = limit {
        ts.space()
            .push(Token::Fetch)
            .space()
            .push(Token::Next)
            .space()
            .push(Token::LitInt(lim as i64))
            .space()
            .push(Token::Rows)
            .space()
            .push(Token::Only);
    }

    ts
}

/// Emit [OFFSET ... ROWS] FETCH FIRST ... ROWS ONLY (Oracle 12c+ style).
pub fn emit_limit_offset_fetch_first(limit: Option<u64>, offset: Option<u64>) -> TokenStream {
    let mut ts = TokenStream::new();

    if let Some(off) = offset {
        ts.push(Token::Offset)
            .space()
            .push(Token::LitInt(off as i64))
            .space()
            .push(Token::Rows);
    }

    if let Some(lim) = limit {
        if offset.is_some() {
            ts.space();
        }
        ts.push(Token::Fetch)
            .space()
            .push(Token::First)
            .space()
            .push(Token::LitInt(lim as i64))
            .space()
            .push(Token::Rows)
            .space()
            .push(Token::Only);
    }

    ts
}

// =============================================================================
// Function Remapping
// =============================================================================

/// Remap functions for Postgres dialect.
pub fn remap_function_postgres(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "STRFTIME" => Some("TO_CHAR"),
        "DATE_FORMAT" => Some("TO_CHAR"),
        "STRPTIME" => Some("TO_TIMESTAMP"),
        "STR_TO_DATE" => Some("TO_TIMESTAMP"),
        "REGEXP_EXTRACT" => Some("REGEXP_SUBSTR"),
        "REGEXP_MATCHES" => Some("REGEXP_LIKE"),
        "NVL" => Some("COALESCE"),
        "IFNULL" => Some("COALESCE"),
        "ISNULL" => Some("COALESCE"),
        "LEN" => Some("LENGTH"),
        _ => None,
    }
}

/// Remap functions for DuckDB dialect.
pub fn remap_function_duckdb(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "TO_CHAR" => Some("STRFTIME"),
        "DATE_FORMAT" => Some("STRFTIME"),
        "TO_TIMESTAMP" => Some("STRPTIME"),
        "STR_TO_DATE" => Some("STRPTIME"),
        "REGEXP_SUBSTR" => Some("REGEXP_EXTRACT"),
        "REGEXP_LIKE" => Some("REGEXP_MATCHES"),
        "NVL" => Some("COALESCE"),
        "IFNULL" => Some("COALESCE"),
        "ISNULL" => Some("COALESCE"),
        "LEN" => Some("LENGTH"),
        _ => None,
    }
}

/// Remap functions for MySQL dialect.
pub fn remap_function_mysql(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "STRFTIME" => Some("DATE_FORMAT"),
        "TO_CHAR" => Some("DATE_FORMAT"),
        "STRPTIME" => Some("STR_TO_DATE"),
        "TO_TIMESTAMP" => Some("STR_TO_DATE"),
        "REGEXP_EXTRACT" => Some("REGEXP_SUBSTR"),
        "REGEXP_MATCHES" => Some("REGEXP_LIKE"),
        "NVL" => Some("IFNULL"),
        "ISNULL" => Some("IFNULL"),
        "LEN" => Some("LENGTH"),
        _ => None,
    }
}

/// Remap functions for T-SQL dialect.
pub fn remap_function_tsql(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "LENGTH" => Some("LEN"),
        "SUBSTR" => Some("SUBSTRING"),
        "NOW" => Some("GETDATE"),
        "STRFTIME" => Some("FORMAT"),
        "TO_CHAR" => Some("FORMAT"),
        "DATE_FORMAT" => Some("FORMAT"),
        "NVL" => Some("ISNULL"),
        "IFNULL" => Some("ISNULL"),
        _ => None,
    }
}

/// Remap functions for Snowflake dialect.
pub fn remap_function_snowflake(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "STRFTIME" => Some("TO_CHAR"),
        "DATE_FORMAT" => Some("TO_CHAR"),
        "STRPTIME" => Some("TO_TIMESTAMP"),
        "REGEXP_EXTRACT" => Some("REGEXP_SUBSTR"),
        "REGEXP_MATCHES" => Some("REGEXP_LIKE"),
        "IFNULL" => Some("NVL"),
        "ISNULL" => Some("NVL"),
        _ => None,
    }
}

/// Remap functions for BigQuery dialect.
pub fn remap_function_bigquery(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "STRFTIME" => Some("FORMAT_TIMESTAMP"),
        "TO_CHAR" => Some("FORMAT_TIMESTAMP"),
        "DATE_FORMAT" => Some("FORMAT_TIMESTAMP"),
        "STRPTIME" => Some("PARSE_TIMESTAMP"),
        "REGEXP_MATCHES" => Some("REGEXP_CONTAINS"),
        "REGEXP_LIKE" => Some("REGEXP_CONTAINS"),
        "NVL" => Some("IFNULL"),
        "ISNULL" => Some("IFNULL"),
        "LENGTH" => Some("CHAR_LENGTH"),
        _ => None,
    }
}

/// Remap functions for Redshift dialect.
/// Redshift is Postgres-based, so it delegates to Postgres remapping.
pub fn remap_function_redshift(name: &str) -> Option<&'static str> {
    remap_function_postgres(name)
}

/// Remap functions for Databricks (Spark SQL) dialect.
pub fn remap_function_databricks(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "TO_CHAR" => Some("DATE_FORMAT"),
        "STRFTIME" => Some("DATE_FORMAT"),
        "STRPTIME" => Some("TO_TIMESTAMP"),
        "REGEXP_MATCHES" => Some("REGEXP_LIKE"),
        "NVL" => Some("COALESCE"),
        "ISNULL" => Some("COALESCE"),
        "IFNULL" => Some("COALESCE"),
        _ => None,
    }
}

/// Remap functions for Oracle dialect.
pub fn remap_function_oracle(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "STRFTIME" => Some("TO_CHAR"),
        "DATE_FORMAT" => Some("TO_CHAR"),
        "STRPTIME" => Some("TO_TIMESTAMP"),
        "REGEXP_EXTRACT" => Some("REGEXP_SUBSTR"),
        "REGEXP_MATCHES" => Some("REGEXP_LIKE"),
        "IFNULL" => Some("NVL"),
        "ISNULL" => Some("NVL"),
        _ => None,
    }
}

// =============================================================================
// Data Type Emission
// =============================================================================

/// Emit data type for ANSI/Postgres style.
/// Used by: Postgres, DuckDB, Redshift
pub fn emit_data_type_ansi(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Boolean => "BOOLEAN",
        ColumnType::Integer => "BIGINT",
        ColumnType::Float => "DOUBLE PRECISION",
        ColumnType::String => "TEXT",
        ColumnType::Datetime => "TIMESTAMP",
    }
}

/// Emit data type for MySQL.
pub fn emit_data_type_mysql(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Boolean => "UNSIGNED",
        ColumnType::Integer => "SIGNED",
        ColumnType::Float => "DOUBLE",
        ColumnType::String => "CHAR",
        ColumnType::Datetime => "DATETIME",
    }
}

/// Emit data type for T-SQL.
pub fn emit_data_type_tsql(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Boolean => "BIT",
        ColumnType::Integer => "BIGINT",
        ColumnType::Float => "FLOAT",
        ColumnType::String => "NVARCHAR(MAX)",
        ColumnType::Datetime => "DATETIME2",
    }
}

/// Emit data type for Snowflake.
pub fn emit_data_type_snowflake(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Boolean => "BOOLEAN",
        ColumnType::Integer => "BIGINT",
        ColumnType::Float => "DOUBLE",
        ColumnType::String => "VARCHAR",
        ColumnType::Datetime => "TIMESTAMP_NTZ",
    }
}

/// Emit data type for BigQuery.
pub fn emit_data_type_bigquery(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Boolean => "BOOL",
        ColumnType::Integer => "INT64",
        ColumnType::Float => "FLOAT64",
        ColumnType::String => "STRING",
        ColumnType::Datetime => "TIMESTAMP",
    }
}

/// Emit data type for Databricks (Spark SQL).
pub fn emit_data_type_databricks(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Boolean => "BOOLEAN",
        ColumnType::Integer => "BIGINT",
        ColumnType::Float => "DOUBLE",
        ColumnType::String => "STRING",
        ColumnType::Datetime => "TIMESTAMP",
    }
}

/// Emit data type for Oracle.
pub fn emit_data_type_oracle(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Boolean => "NUMBER(1)",
        ColumnType::Integer => "NUMBER(19)",
        ColumnType::Float => "BINARY_DOUBLE",
        ColumnType::String => "VARCHAR2(4000)",
        ColumnType::Datetime => "TIMESTAMP",
    }
}
