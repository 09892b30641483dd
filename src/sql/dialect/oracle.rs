//! Oracle Database dialect.
//!
//! Oracle differences:
//! - Unquoted identifiers are stored upper-cased
//! - No LIMIT; 12c+ uses `FETCH FIRST n ROWS ONLY`
//! - No boolean SQL type before 23ai, so literals render as 1/0

use sqlparser::dialect::{Dialect as ParserDialect, GenericDialect};

use super::helpers;
use super::SqlDialect;
use crate::model::types::ColumnType;
use crate::sql::token::TokenStream;

/// Oracle dialect.
#[derive(Debug, Clone, Copy)]
pub struct Oracle;

impl SqlDialect for Oracle {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn identifier_quote(&self) -> char {
        '"'
    }

    fn normalize_identifier(&self, ident: &str) -> String {
        helpers::fold_upper(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_fetch_first(limit, offset)
    }

    fn supports_limit_clause(&self) -> bool {
        false
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_oracle(name)
    }

    fn emit_data_type(&self, ty: ColumnType) -> &'static str {
        helpers::emit_data_type_oracle(ty)
    }

    fn parser_dialect(&self) -> Box<dyn ParserDialect> {
        // sqlparser has no Oracle grammar; the generic one covers SELECT.
        Box::new(GenericDialect {})
    }
}
