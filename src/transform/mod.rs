//! Transformation pipeline.
//!
//! Folds a schema's transformations over one column expression. The pipeline
//! is stateless: the same inputs always give the same expression and alias.
//! De-duplication is not a column rewrite; see [`Schema::distinct`].
//!
//! [`Schema::distinct`]: crate::model::Schema::distinct

pub mod rules;

use crate::model::transformation::{Rule, Transformation};
use crate::sql::expr::Expr;
use crate::sql::{Dialect, SqlDialect};

pub use rules::{rewrite, EMAIL_PATTERN};

/// A column expression after the pipeline, with its output alias.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedColumn {
    pub expr: Expr,
    pub alias: Option<String>,
}

/// Apply every transformation that targets `column_name`, in order.
///
/// The alias is resolved as follows: a `rename` sets it to its new name;
/// otherwise the given alias is kept; otherwise, if anything applied, the
/// dialect-normalized column name is used so the output keeps its name.
pub fn apply(
    expr: Expr,
    column_name: &str,
    alias: Option<&str>,
    transformations: &[Transformation],
    dialect: Dialect,
) -> TransformedColumn {
    let mut applied = false;
    let mut renamed: Option<&str> = None;

    let expr = transformations
        .iter()
        .filter(|t| t.targets(column_name))
        .fold(expr, |acc, t| {
            applied = true;
            if let Rule::Rename { new_name } = t.rule() {
                renamed = Some(new_name.as_str());
            }
            rewrite(t.rule(), acc, dialect)
        });

    let alias = match (renamed, alias) {
        (Some(new_name), _) => Some(new_name.to_string()),
        (None, Some(alias)) => Some(alias.to_string()),
        (None, None) if applied => Some(dialect.normalize_identifier(column_name)),
        (None, None) => None,
    };

    TransformedColumn { expr, alias }
}
