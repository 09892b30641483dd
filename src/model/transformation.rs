//! Declarative column transformations.
//!
//! A transformation is written as a `type` name plus a free-form `params`
//! map. Both are checked once, when the transformation is constructed, and
//! turned into a typed [`Rule`] so that emission never has to look at JSON.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use super::error::{SchemaError, SchemaResult};
use crate::sql::expr::Literal;

/// The closed catalog of transformation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformationKind {
    Anonymize,
    ConvertTimezone,
    ToLowercase,
    ToUppercase,
    Strip,
    RoundNumbers,
    Scale,
    FormatDate,
    ToNumeric,
    ToDatetime,
    FillNa,
    Replace,
    Extract,
    Truncate,
    Pad,
    Clip,
    Bin,
    Normalize,
    Standardize,
    MapValues,
    Rename,
    EncodeCategorical,
    ValidateEmail,
    ValidateDateRange,
    NormalizePhone,
    RemoveDuplicates,
    ValidateForeignKey,
    EnsurePositive,
    StandardizeCategories,
}

impl TransformationKind {
    pub const ALL: [TransformationKind; 29] = [
        TransformationKind::Anonymize,
        TransformationKind::ConvertTimezone,
        TransformationKind::ToLowercase,
        TransformationKind::ToUppercase,
        TransformationKind::Strip,
        TransformationKind::RoundNumbers,
        TransformationKind::Scale,
        TransformationKind::FormatDate,
        TransformationKind::ToNumeric,
        TransformationKind::ToDatetime,
        TransformationKind::FillNa,
        TransformationKind::Replace,
        TransformationKind::Extract,
        TransformationKind::Truncate,
        TransformationKind::Pad,
        TransformationKind::Clip,
        TransformationKind::Bin,
        TransformationKind::Normalize,
        TransformationKind::Standardize,
        TransformationKind::MapValues,
        TransformationKind::Rename,
        TransformationKind::EncodeCategorical,
        TransformationKind::ValidateEmail,
        TransformationKind::ValidateDateRange,
        TransformationKind::NormalizePhone,
        TransformationKind::RemoveDuplicates,
        TransformationKind::ValidateForeignKey,
        TransformationKind::EnsurePositive,
        TransformationKind::StandardizeCategories,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransformationKind::Anonymize => "anonymize",
            TransformationKind::ConvertTimezone => "convert_timezone",
            TransformationKind::ToLowercase => "to_lowercase",
            TransformationKind::ToUppercase => "to_uppercase",
            TransformationKind::Strip => "strip",
            TransformationKind::RoundNumbers => "round_numbers",
            TransformationKind::Scale => "scale",
            TransformationKind::FormatDate => "format_date",
            TransformationKind::ToNumeric => "to_numeric",
            TransformationKind::ToDatetime => "to_datetime",
            TransformationKind::FillNa => "fill_na",
            TransformationKind::Replace => "replace",
            TransformationKind::Extract => "extract",
            TransformationKind::Truncate => "truncate",
            TransformationKind::Pad => "pad",
            TransformationKind::Clip => "clip",
            TransformationKind::Bin => "bin",
            TransformationKind::Normalize => "normalize",
            TransformationKind::Standardize => "standardize",
            TransformationKind::MapValues => "map_values",
            TransformationKind::Rename => "rename",
            TransformationKind::EncodeCategorical => "encode_categorical",
            TransformationKind::ValidateEmail => "validate_email",
            TransformationKind::ValidateDateRange => "validate_date_range",
            TransformationKind::NormalizePhone => "normalize_phone",
            TransformationKind::RemoveDuplicates => "remove_duplicates",
            TransformationKind::ValidateForeignKey => "validate_foreign_key",
            TransformationKind::EnsurePositive => "ensure_positive",
            TransformationKind::StandardizeCategories => "standardize_categories",
        }
    }

    /// Whether `params.column` must name a target column.
    pub fn requires_column(&self) -> bool {
        !matches!(self, TransformationKind::RemoveDuplicates)
    }
}

impl FromStr for TransformationKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransformationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| SchemaError::UnsupportedTransformation(s.to_string()))
    }
}

impl fmt::Display for TransformationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side a `pad` transformation fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PadSide {
    #[default]
    Left,
    Right,
}

/// A validated transformation rule with typed parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Anonymize,
    ConvertTimezone {
        from: String,
        to: String,
    },
    ToLowercase,
    ToUppercase,
    Strip,
    RoundNumbers {
        decimals: i64,
    },
    Scale {
        factor: Literal,
    },
    FormatDate {
        format: String,
    },
    ToNumeric,
    ToDatetime {
        format: Option<String>,
    },
    FillNa {
        value: Literal,
    },
    Replace {
        old_value: String,
        new_value: String,
    },
    Extract {
        pattern: String,
    },
    Truncate {
        length: i64,
        add_ellipsis: bool,
    },
    Pad {
        width: i64,
        side: PadSide,
        pad_char: String,
    },
    Clip {
        lower: Option<Literal>,
        upper: Option<Literal>,
    },
    Bin {
        bins: Vec<Literal>,
        labels: Vec<Literal>,
    },
    Normalize,
    Standardize,
    MapValues {
        mapping: Vec<(String, Literal)>,
    },
    Rename {
        new_name: String,
    },
    EncodeCategorical {
        value: Literal,
    },
    ValidateEmail,
    ValidateDateRange {
        start_date: String,
        end_date: String,
    },
    NormalizePhone {
        country_code: String,
    },
    RemoveDuplicates {
        columns: Vec<String>,
    },
    ValidateForeignKey {
        ref_table: String,
        ref_column: String,
    },
    EnsurePositive {
        drop_negative: bool,
    },
    StandardizeCategories {
        mapping: Vec<(String, Literal)>,
        case_sensitive: bool,
    },
}

impl Rule {
    pub fn kind(&self) -> TransformationKind {
        match self {
            Rule::Anonymize => TransformationKind::Anonymize,
            Rule::ConvertTimezone { .. } => TransformationKind::ConvertTimezone,
            Rule::ToLowercase => TransformationKind::ToLowercase,
            Rule::ToUppercase => TransformationKind::ToUppercase,
            Rule::Strip => TransformationKind::Strip,
            Rule::RoundNumbers { .. } => TransformationKind::RoundNumbers,
            Rule::Scale { .. } => TransformationKind::Scale,
            Rule::FormatDate { .. } => TransformationKind::FormatDate,
            Rule::ToNumeric => TransformationKind::ToNumeric,
            Rule::ToDatetime { .. } => TransformationKind::ToDatetime,
            Rule::FillNa { .. } => TransformationKind::FillNa,
            Rule::Replace { .. } => TransformationKind::Replace,
            Rule::Extract { .. } => TransformationKind::Extract,
            Rule::Truncate { .. } => TransformationKind::Truncate,
            Rule::Pad { .. } => TransformationKind::Pad,
            Rule::Clip { .. } => TransformationKind::Clip,
            Rule::Bin { .. } => TransformationKind::Bin,
            Rule::Normalize => TransformationKind::Normalize,
            Rule::Standardize => TransformationKind::Standardize,
            Rule::MapValues { .. } => TransformationKind::MapValues,
            Rule::Rename { .. } => TransformationKind::Rename,
            Rule::EncodeCategorical { .. } => TransformationKind::EncodeCategorical,
            Rule::ValidateEmail => TransformationKind::ValidateEmail,
            Rule::ValidateDateRange { .. } => TransformationKind::ValidateDateRange,
            Rule::NormalizePhone { .. } => TransformationKind::NormalizePhone,
            Rule::RemoveDuplicates { .. } => TransformationKind::RemoveDuplicates,
            Rule::ValidateForeignKey { .. } => TransformationKind::ValidateForeignKey,
            Rule::EnsurePositive { .. } => TransformationKind::EnsurePositive,
            Rule::StandardizeCategories { .. } => TransformationKind::StandardizeCategories,
        }
    }
}

/// A transformation attached to a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformation {
    column: Option<String>,
    rule: Rule,
    params: Map<String, Value>,
}

impl Transformation {
    /// Build a transformation from its `type` name and `params` object.
    ///
    /// # Errors
    ///
    /// `UnsupportedTransformation` for a name outside the catalog and
    /// `InvalidTransformationParams` for a missing or ill-typed parameter.
    pub fn new(kind: &str, params: Value) -> SchemaResult<Self> {
        let kind: TransformationKind = kind.parse()?;
        Self::from_kind(kind, params)
    }

    pub fn from_kind(kind: TransformationKind, params: Value) -> SchemaResult<Self> {
        let params = match params {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(SchemaError::InvalidTransformationParams {
                    kind,
                    param: "params".into(),
                    message: format!("expected an object, got {}", json_type(&other)),
                })
            }
        };

        let p = Params { kind, map: &params };
        let column = if kind.requires_column() {
            Some(p.required_str("column")?)
        } else {
            p.optional_str("column")?
        };
        if column.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(p.invalid("column", "must not be empty"));
        }

        let rule = p.rule()?;
        Ok(Self {
            column,
            rule,
            params,
        })
    }

    pub fn kind(&self) -> TransformationKind {
        self.rule.kind()
    }

    /// The target column, if the kind has one.
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// The parameters as written, for persistence.
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Whether this transformation targets `column` (case-insensitive).
    pub fn targets(&self, column: &str) -> bool {
        self.column
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(column))
    }
}

// =============================================================================
// Parameter extraction
// =============================================================================

struct Params<'a> {
    kind: TransformationKind,
    map: &'a Map<String, Value>,
}

impl Params<'_> {
    fn invalid(&self, param: &str, message: impl Into<String>) -> SchemaError {
        SchemaError::InvalidTransformationParams {
            kind: self.kind,
            param: param.to_string(),
            message: message.into(),
        }
    }

    fn present(&self, name: &str) -> Option<&Value> {
        self.map.get(name).filter(|v| !v.is_null())
    }

    fn required(&self, name: &str) -> SchemaResult<&Value> {
        self.present(name)
            .ok_or_else(|| self.invalid(name, "is required"))
    }

    fn required_str(&self, name: &str) -> SchemaResult<String> {
        match self.required(name)? {
            Value::String(s) => Ok(s.clone()),
            other => Err(self.invalid(name, format!("expected a string, got {}", json_type(other)))),
        }
    }

    fn optional_str(&self, name: &str) -> SchemaResult<Option<String>> {
        match self.present(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.invalid(
                name,
                format!("expected a string, got {}", json_type(other)),
            )),
        }
    }

    fn optional_bool(&self, name: &str, default: bool) -> SchemaResult<bool> {
        match self.present(name) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(self.invalid(
                name,
                format!("expected a boolean, got {}", json_type(other)),
            )),
        }
    }

    fn optional_int(&self, name: &str) -> SchemaResult<Option<i64>> {
        match self.present(name) {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| self.invalid(name, format!("expected an integer, got {}", value))),
        }
    }

    fn positive_int(&self, name: &str) -> SchemaResult<i64> {
        match self.optional_int(name)? {
            Some(n) if n > 0 => Ok(n),
            Some(n) => Err(self.invalid(name, format!("must be positive, got {}", n))),
            None => Err(self.invalid(name, "is required")),
        }
    }

    fn optional_number(&self, name: &str) -> SchemaResult<Option<Literal>> {
        match self.present(name) {
            None => Ok(None),
            Some(value @ Value::Number(_)) => Ok(Some(json_literal(value).map_err(|m| self.invalid(name, m))?)),
            Some(other) => Err(self.invalid(
                name,
                format!("expected a number, got {}", json_type(other)),
            )),
        }
    }

    fn required_number(&self, name: &str) -> SchemaResult<Literal> {
        self.optional_number(name)?
            .ok_or_else(|| self.invalid(name, "is required"))
    }

    /// Any scalar; `null` is allowed and becomes `NULL`.
    fn required_scalar(&self, name: &str) -> SchemaResult<Literal> {
        let value = self
            .map
            .get(name)
            .ok_or_else(|| self.invalid(name, "is required"))?;
        json_literal(value).map_err(|m| self.invalid(name, m))
    }

    fn required_mapping(&self, name: &str) -> SchemaResult<Vec<(String, Literal)>> {
        let Value::Object(entries) = self.required(name)? else {
            return Err(self.invalid(name, "expected an object"));
        };
        if entries.is_empty() {
            return Err(self.invalid(name, "must not be empty"));
        }
        entries
            .iter()
            .map(|(key, value)| {
                json_literal(value)
                    .map(|lit| (key.clone(), lit))
                    .map_err(|m| self.invalid(name, format!("entry '{}' {}", key, m)))
            })
            .collect()
    }

    fn optional_str_list(&self, name: &str) -> SchemaResult<Vec<String>> {
        match self.present(name) {
            None => Ok(vec![]),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| self.invalid(name, "expected a list of strings"))
                })
                .collect(),
            Some(_) => Err(self.invalid(name, "expected a list of strings")),
        }
    }

    fn rule(&self) -> SchemaResult<Rule> {
        let rule = match self.kind {
            TransformationKind::Anonymize => Rule::Anonymize,
            TransformationKind::ConvertTimezone => Rule::ConvertTimezone {
                from: self.required_str("from")?,
                to: self.required_str("to")?,
            },
            TransformationKind::ToLowercase => Rule::ToLowercase,
            TransformationKind::ToUppercase => Rule::ToUppercase,
            TransformationKind::Strip => Rule::Strip,
            TransformationKind::RoundNumbers => Rule::RoundNumbers {
                decimals: self.optional_int("decimals")?.unwrap_or(0),
            },
            TransformationKind::Scale => Rule::Scale {
                factor: self.required_number("factor")?,
            },
            TransformationKind::FormatDate => Rule::FormatDate {
                format: self.required_str("format")?,
            },
            TransformationKind::ToNumeric => Rule::ToNumeric,
            TransformationKind::ToDatetime => Rule::ToDatetime {
                format: self.optional_str("format")?,
            },
            TransformationKind::FillNa => Rule::FillNa {
                value: self.required_scalar("value")?,
            },
            TransformationKind::Replace => Rule::Replace {
                old_value: self.required_str("old_value")?,
                new_value: self.required_str("new_value")?,
            },
            TransformationKind::Extract => Rule::Extract {
                pattern: self.required_str("pattern")?,
            },
            TransformationKind::Truncate => Rule::Truncate {
                length: self.positive_int("length")?,
                add_ellipsis: self.optional_bool("add_ellipsis", false)?,
            },
            TransformationKind::Pad => {
                let side = match self.optional_str("side")?.as_deref() {
                    None | Some("left") => PadSide::Left,
                    Some("right") => PadSide::Right,
                    Some(other) => {
                        return Err(self.invalid(
                            "side",
                            format!("expected 'left' or 'right', got '{}'", other),
                        ))
                    }
                };
                let pad_char = self.optional_str("pad_char")?.unwrap_or_else(|| " ".into());
                if pad_char.is_empty() {
                    return Err(self.invalid("pad_char", "must not be empty"));
                }
                Rule::Pad {
                    width: self.positive_int("width")?,
                    side,
                    pad_char,
                }
            }
            TransformationKind::Clip => {
                let lower = self.optional_number("lower")?;
                let upper = self.optional_number("upper")?;
                match (&lower, &upper) {
                    (None, None) => {
                        return Err(self.invalid("lower", "at least one of lower or upper is required"))
                    }
                    (Some(lo), Some(hi)) if numeric(lo) > numeric(hi) => {
                        return Err(self.invalid("lower", "must not exceed upper"))
                    }
                    _ => {}
                }
                Rule::Clip { lower, upper }
            }
            TransformationKind::Bin => self.bin()?,
            TransformationKind::Normalize => Rule::Normalize,
            TransformationKind::Standardize => Rule::Standardize,
            TransformationKind::MapValues => Rule::MapValues {
                mapping: self.required_mapping("mapping")?,
            },
            TransformationKind::Rename => {
                let new_name = self.required_str("new_name")?;
                if new_name.trim().is_empty() {
                    return Err(self.invalid("new_name", "must not be empty"));
                }
                Rule::Rename { new_name }
            }
            TransformationKind::EncodeCategorical => Rule::EncodeCategorical {
                value: self.required_scalar("value")?,
            },
            TransformationKind::ValidateEmail => Rule::ValidateEmail,
            TransformationKind::ValidateDateRange => Rule::ValidateDateRange {
                start_date: self.required_str("start_date")?,
                end_date: self.required_str("end_date")?,
            },
            TransformationKind::NormalizePhone => Rule::NormalizePhone {
                country_code: self
                    .optional_str("country_code")?
                    .unwrap_or_else(|| "+1".into()),
            },
            TransformationKind::RemoveDuplicates => Rule::RemoveDuplicates {
                columns: self.optional_str_list("columns")?,
            },
            TransformationKind::ValidateForeignKey => Rule::ValidateForeignKey {
                ref_table: self.required_str("ref_table")?,
                ref_column: self.required_str("ref_column")?,
            },
            TransformationKind::EnsurePositive => Rule::EnsurePositive {
                drop_negative: self.optional_bool("drop_negative", false)?,
            },
            TransformationKind::StandardizeCategories => Rule::StandardizeCategories {
                mapping: self.required_mapping("mapping")?,
                case_sensitive: self.optional_bool("case_sensitive", false)?,
            },
        };
        Ok(rule)
    }

    fn bin(&self) -> SchemaResult<Rule> {
        let Value::Array(raw_bins) = self.required("bins")? else {
            return Err(self.invalid("bins", "expected a list of numbers"));
        };
        let bins = raw_bins
            .iter()
            .map(|v| match v {
                Value::Number(_) => json_literal(v).map_err(|m| self.invalid("bins", m)),
                _ => Err(self.invalid("bins", "expected a list of numbers")),
            })
            .collect::<SchemaResult<Vec<_>>>()?;
        if bins.len() < 2 {
            return Err(self.invalid("bins", "needs at least two edges"));
        }
        if bins.windows(2).any(|w| numeric(&w[0]) >= numeric(&w[1])) {
            return Err(self.invalid("bins", "edges must be strictly ascending"));
        }

        let Value::Array(raw_labels) = self.required("labels")? else {
            return Err(self.invalid("labels", "expected a list"));
        };
        let labels = raw_labels
            .iter()
            .map(|v| json_literal(v).map_err(|m| self.invalid("labels", m)))
            .collect::<SchemaResult<Vec<_>>>()?;
        if labels.len() != bins.len() - 1 {
            return Err(self.invalid(
                "labels",
                format!(
                    "expected {} labels for {} bin edges, got {}",
                    bins.len() - 1,
                    bins.len(),
                    labels.len()
                ),
            ));
        }
        Ok(Rule::Bin { bins, labels })
    }
}

/// Convert a JSON scalar to a SQL literal. Arrays and objects have no
/// literal form.
pub fn json_literal(value: &Value) -> Result<Literal, String> {
    match value {
        Value::Null => Ok(Literal::Null),
        Value::Bool(b) => Ok(Literal::Bool(*b)),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(Literal::Int(i)),
            (None, Some(f)) if f.is_finite() => Ok(Literal::Float(f)),
            _ => Err(format!("number {} is out of range", n)),
        },
        Value::String(s) => Ok(Literal::String(s.clone())),
        Value::Array(_) | Value::Object(_) => {
            Err(format!("expected a scalar value, got {}", json_type(value)))
        }
    }
}

fn numeric(lit: &Literal) -> f64 {
    match lit {
        Literal::Int(i) => *i as f64,
        Literal::Float(f) => *f,
        _ => f64::NAN,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
