//! MySQL / MariaDB dialect.
//!
//! MySQL differences:
//! - Backtick identifier quoting
//! - `||` is logical OR by default, so concatenation uses CONCAT()
//! - Booleans are TINYINT, literals render as 1/0

use sqlparser::dialect::{Dialect as ParserDialect, MySqlDialect};

use super::helpers;
use super::SqlDialect;
use crate::model::types::ColumnType;

/// MySQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn supports_concat_operator(&self) -> bool {
        false
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_mysql(name)
    }

    fn emit_data_type(&self, ty: ColumnType) -> &'static str {
        helpers::emit_data_type_mysql(ty)
    }

    fn parser_dialect(&self) -> Box<dyn ParserDialect> {
        Box::new(MySqlDialect {})
    }
}
