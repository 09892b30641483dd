//! One rewrite per transformation rule.
//!
//! Every rule takes the current column expression and returns a new one built
//! with the typed expression AST, so literals are escaped and function names
//! remapped for the target dialect.

use crate::model::transformation::{PadSide, Rule};
use crate::model::types::ColumnType;
use crate::sql::expr::{
    avg, case_when, cast, coalesce, col, func, lit_int, lit_null, lit_str, max, min, Expr, ExprExt,
    Literal, WindowExt,
};
use crate::sql::query::{Query, TableRef};
use crate::sql::{Dialect, SqlDialect};

/// Digits-only filter used by `normalize_phone`.
const NON_DIGITS: &str = "[^0-9]";

/// Email shape accepted by `validate_email`. Written without backslashes so
/// the literal means the same thing under every dialect's string rules.
pub const EMAIL_PATTERN: &str = "^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+[.][A-Za-z]{2,}$";

/// Apply one rule to `e`.
pub fn rewrite(rule: &Rule, e: Expr, dialect: Dialect) -> Expr {
    match rule {
        Rule::Anonymize => anonymize(e, dialect),
        Rule::ConvertTimezone { from, to } => convert_timezone(e, from, to, dialect),
        Rule::ToLowercase => func("LOWER", vec![e]),
        Rule::ToUppercase => func("UPPER", vec![e]),
        Rule::Strip => func("TRIM", vec![e]),
        Rule::RoundNumbers { decimals } => func("ROUND", vec![e, lit_int(*decimals)]),
        Rule::Scale { factor } => Expr::Paren(Box::new(e.grouped().mul(factor.clone()))),
        Rule::FormatDate { format } => format_date(e, format, dialect),
        Rule::ToNumeric => cast(e, dialect.emit_data_type(ColumnType::Float)),
        Rule::ToDatetime { format: None } => cast(e, dialect.emit_data_type(ColumnType::Datetime)),
        Rule::ToDatetime {
            format: Some(format),
        } => parse_datetime(e, format, dialect),
        Rule::FillNa { value } => coalesce(vec![e, value.clone().into()]),
        Rule::Replace {
            old_value,
            new_value,
        } => func("REPLACE", vec![e, lit_str(old_value), lit_str(new_value)]),
        Rule::Extract { pattern } => func("REGEXP_EXTRACT", vec![e, lit_str(pattern)]),
        Rule::Truncate {
            length,
            add_ellipsis,
        } => truncate(e, *length, *add_ellipsis),
        Rule::Pad {
            width,
            side,
            pad_char,
        } => {
            let name = match side {
                PadSide::Left => "LPAD",
                PadSide::Right => "RPAD",
            };
            func(name, vec![e, lit_int(*width), lit_str(pad_char)])
        }
        Rule::Clip { lower, upper } => clip(e, lower.as_ref(), upper.as_ref()),
        Rule::Bin { bins, labels } => bin(e, bins, labels),
        Rule::Normalize => normalize(e),
        Rule::Standardize => standardize(e),
        Rule::MapValues { mapping } => case_when(
            mapping
                .iter()
                .map(|(key, value)| (e.clone().grouped().eq(lit_str(key)), value.clone().into()))
                .collect(),
            Some(e),
        ),
        Rule::Rename { .. } | Rule::RemoveDuplicates { .. } => e,
        Rule::EncodeCategorical { value } => case_when(
            vec![(e.grouped().eq(value.clone()), lit_int(1))],
            Some(lit_int(0)),
        ),
        Rule::ValidateEmail => keep_when(
            func("REGEXP_MATCHES", vec![e.clone(), lit_str(EMAIL_PATTERN)]),
            e,
        ),
        Rule::ValidateDateRange {
            start_date,
            end_date,
        } => keep_when(
            e.clone()
                .grouped()
                .between(lit_str(start_date), lit_str(end_date)),
            e,
        ),
        Rule::NormalizePhone { country_code } => normalize_phone(e, country_code, dialect),
        Rule::ValidateForeignKey {
            ref_table,
            ref_column,
        } => {
            let table = match ref_table.split_once('.') {
                Some((schema, table)) => TableRef::new(table).with_schema(schema),
                None => TableRef::new(ref_table),
            };
            let lookup = Query::new().select(vec![col(ref_column)]).from(table);
            keep_when(e.clone().grouped().in_subquery(lookup), e)
        }
        Rule::EnsurePositive { drop_negative } => {
            if *drop_negative {
                keep_when(e.clone().grouped().gt(lit_int(0)), e)
            } else {
                func("ABS", vec![e])
            }
        }
        Rule::StandardizeCategories {
            mapping,
            case_sensitive,
        } => case_when(
            mapping
                .iter()
                .map(|(key, value)| {
                    let test = if *case_sensitive {
                        e.clone().grouped().eq(lit_str(key))
                    } else {
                        func("LOWER", vec![e.clone()]).eq(func("LOWER", vec![lit_str(key)]))
                    };
                    (test, value.clone().into())
                })
                .collect(),
            Some(e),
        ),
    }
}

/// `CASE WHEN condition THEN e ELSE NULL END`
fn keep_when(condition: Expr, e: Expr) -> Expr {
    case_when(vec![(condition, e)], Some(lit_null()))
}

fn anonymize(e: Expr, dialect: Dialect) -> Expr {
    let text = cast(e, dialect.emit_data_type(ColumnType::String));
    match dialect {
        Dialect::TSql => func("HASHBYTES", vec![lit_str("MD5"), text]),
        Dialect::Oracle => func("STANDARD_HASH", vec![text, lit_str("MD5")]),
        Dialect::BigQuery => func("TO_HEX", vec![func("MD5", vec![text])]),
        _ => func("MD5", vec![text]),
    }
}

fn convert_timezone(e: Expr, from: &str, to: &str, dialect: Dialect) -> Expr {
    match dialect {
        Dialect::MySql => func("CONVERT_TZ", vec![e, lit_str(from), lit_str(to)]),
        _ => func(
            "TIMEZONE",
            vec![lit_str(to), func("TIMEZONE", vec![lit_str(from), e])],
        ),
    }
}

/// BigQuery's formatting functions take the format first.
fn format_date(e: Expr, format: &str, dialect: Dialect) -> Expr {
    match dialect {
        Dialect::BigQuery => func("STRFTIME", vec![lit_str(format), e]),
        _ => func("STRFTIME", vec![e, lit_str(format)]),
    }
}

fn parse_datetime(e: Expr, format: &str, dialect: Dialect) -> Expr {
    match dialect {
        Dialect::BigQuery => func("STRPTIME", vec![lit_str(format), e]),
        _ => func("STRPTIME", vec![e, lit_str(format)]),
    }
}

fn truncate(e: Expr, length: i64, add_ellipsis: bool) -> Expr {
    let cut = func("SUBSTR", vec![e.clone(), lit_int(1), lit_int(length)]);
    if !add_ellipsis {
        return cut;
    }
    case_when(
        vec![(
            func("LENGTH", vec![e.clone()]).gt(lit_int(length)),
            cut.concat(lit_str("...")),
        )],
        Some(e),
    )
}

fn clip(e: Expr, lower: Option<&Literal>, upper: Option<&Literal>) -> Expr {
    let floored = match lower {
        Some(lo) => func("GREATEST", vec![e, lo.clone().into()]),
        None => e,
    };
    match upper {
        Some(hi) => func("LEAST", vec![floored, hi.clone().into()]),
        None => floored,
    }
}

/// Half-open buckets, except the last one which includes its upper edge.
fn bin(e: Expr, bins: &[Literal], labels: &[Literal]) -> Expr {
    let last = labels.len().saturating_sub(1);
    let clauses = bins
        .windows(2)
        .zip(labels)
        .enumerate()
        .map(|(i, (edges, label))| {
            let low = e.clone().grouped().gte(edges[0].clone());
            let high = if i == last {
                e.clone().grouped().lte(edges[1].clone())
            } else {
                e.clone().grouped().lt(edges[1].clone())
            };
            (low.and(high), label.clone().into())
        })
        .collect();
    case_when(clauses, None)
}

/// `(e - MIN(e) OVER ()) / NULLIF(MAX(e) OVER () - MIN(e) OVER (), 0)`
fn normalize(e: Expr) -> Expr {
    let low = min(e.clone()).over_all();
    let high = max(e.clone()).over_all();
    let range = func("NULLIF", vec![high.sub(low.clone()), lit_int(0)]);
    Expr::Paren(Box::new(e.grouped().sub(low))).div(range)
}

/// `(e - AVG(e) OVER ()) / NULLIF(STDDEV(e) OVER (), 0)`
fn standardize(e: Expr) -> Expr {
    let mean = avg(e.clone()).over_all();
    let spread = func("STDDEV", vec![e.clone()]).over_all();
    let divisor = func("NULLIF", vec![spread, lit_int(0)]);
    Expr::Paren(Box::new(e.grouped().sub(mean))).div(divisor)
}

/// Only DuckDB and Postgres replace the first match unless told `'g'`.
fn normalize_phone(e: Expr, country_code: &str, dialect: Dialect) -> Expr {
    let mut args = vec![e, lit_str(NON_DIGITS), lit_str("")];
    if matches!(dialect, Dialect::DuckDb | Dialect::Postgres) {
        args.push(lit_str("g"));
    }
    lit_str(country_code).concat(func("REGEXP_REPLACE", args))
}
