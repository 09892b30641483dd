//! The semantic schema of one dataset.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::column::Column;
use super::error::{SchemaError, SchemaResult};
use super::source::{plan_view, SchemaSource, ViewPlan};
use super::transformation::{Rule, Transformation, TransformationKind};
use crate::sql::expr::SortDir;
use crate::sql::parse::parse_expression;

/// Longest schema name kept after sanitizing.
pub const MAX_NAME_LEN: usize = 64;

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").unwrap());

static NAME_INVALID_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_]").unwrap());

/// Normalize a logical dataset name: lower-case, every character outside
/// `[a-z0-9_]` replaced by `_`, cut to [`MAX_NAME_LEN`] characters.
pub fn sanitize_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let replaced = NAME_INVALID_CHARS.replace_all(&lowered, "_");
    replaced.chars().take(MAX_NAME_LEN).collect()
}

/// One ORDER BY entry, written `"col"` or `"col ASC|DESC"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    pub column: String,
    pub direction: Option<SortDir>,
}

impl OrderSpec {
    pub fn parse(text: &str) -> Option<Self> {
        let mut words = text.split_whitespace();
        let column = words.next()?.to_string();
        let direction = match words.next() {
            None => None,
            Some(dir) if dir.eq_ignore_ascii_case("asc") => Some(SortDir::Asc),
            Some(dir) if dir.eq_ignore_ascii_case("desc") => Some(SortDir::Desc),
            Some(_) => return None,
        };
        if words.next().is_some() {
            return None;
        }
        Some(Self { column, direction })
    }
}

impl fmt::Display for OrderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            None => write!(f, "{}", self.column),
            Some(SortDir::Asc) => write!(f, "{} ASC", self.column),
            Some(SortDir::Desc) => write!(f, "{} DESC", self.column),
        }
    }
}

/// A validated dataset description.
///
/// Built through [`Schema::builder`]; every invariant is checked by
/// [`SchemaBuilder::build`] and the result is immutable apart from its
/// description.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name: String,
    description: Option<String>,
    columns: Vec<Column>,
    source: SchemaSource,
    transformations: Vec<Transformation>,
    group_by: Vec<String>,
    order_by: Vec<OrderSpec>,
    limit: Option<u64>,
    view_plan: Option<ViewPlan>,
}

impl Schema {
    pub fn builder(name: impl Into<String>, source: SchemaSource) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            source,
            description: None,
            columns: vec![],
            transformations: vec![],
            group_by: vec![],
            order_by: vec![],
            limit: None,
        }
    }

    /// The sanitized logical name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    /// Declared columns; empty means every physical column.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn source(&self) -> &SchemaSource {
        &self.source
    }

    pub fn transformations(&self) -> &[Transformation] {
        &self.transformations
    }

    pub fn group_by(&self) -> &[String] {
        &self.group_by
    }

    pub fn order_by(&self) -> &[OrderSpec] {
        &self.order_by
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// True iff a `remove_duplicates` transformation is present.
    pub fn distinct(&self) -> bool {
        self.transformations
            .iter()
            .any(|t| t.kind() == TransformationKind::RemoveDuplicates)
    }

    /// The join chain of a view source.
    pub fn view_plan(&self) -> Option<&ViewPlan> {
        self.view_plan.as_ref()
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Clone)]
#[must_use = "builders have no effect until build() is called"]
pub struct SchemaBuilder {
    name: String,
    source: SchemaSource,
    description: Option<String>,
    columns: Vec<Column>,
    transformations: Vec<Transformation>,
    group_by: Vec<String>,
    order_by: Vec<String>,
    limit: Option<u64>,
}

impl SchemaBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn columns(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.columns.extend(columns);
        self
    }

    pub fn transformation(mut self, transformation: Transformation) -> Self {
        self.transformations.push(transformation);
        self
    }

    pub fn transformations(
        mut self,
        transformations: impl IntoIterator<Item = Transformation>,
    ) -> Self {
        self.transformations.extend(transformations);
        self
    }

    pub fn group_by<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.group_by.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn order_by<S: Into<String>>(mut self, entries: impl IntoIterator<Item = S>) -> Self {
        self.order_by.extend(entries.into_iter().map(Into::into));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Validate and freeze the schema.
    pub fn build(self) -> SchemaResult<Schema> {
        let name = sanitize_name(&self.name);
        if !NAME_PATTERN.is_match(&name) {
            return Err(SchemaError::invalid(
                &self.name,
                "name must start with a letter or underscore",
            ));
        }

        if self.limit == Some(0) {
            return Err(SchemaError::invalid(&name, "limit must be a positive integer"));
        }

        self.check_columns(&name)?;
        self.check_group_by(&name)?;
        self.check_transformations(&name)?;
        let order_by = self.parse_order_by(&name)?;
        let view_plan = self.check_source(&name)?;

        Ok(Schema {
            name,
            description: self.description,
            columns: self.columns,
            source: self.source,
            transformations: self.transformations,
            group_by: self.group_by,
            order_by,
            limit: self.limit,
            view_plan,
        })
    }

    fn check_columns(&self, schema: &str) -> SchemaResult<()> {
        for (i, column) in self.columns.iter().enumerate() {
            if column.name.trim().is_empty() {
                return Err(SchemaError::invalid(schema, "column names must not be empty"));
            }
            let duplicate = self.columns[..i]
                .iter()
                .any(|earlier| earlier.name.eq_ignore_ascii_case(&column.name));
            if duplicate {
                return Err(SchemaError::DuplicateColumn {
                    schema: schema.to_string(),
                    column: column.name.clone(),
                });
            }
            if let Some(expression) = &column.expression {
                parse_expression(expression, None).map_err(|e| SchemaError::InvalidExpression {
                    column: column.name.clone(),
                    expression: expression.clone(),
                    message: e.to_string(),
                })?;
            }
        }
        Ok(())
    }

    fn check_group_by(&self, schema: &str) -> SchemaResult<()> {
        for entry in &self.group_by {
            if entry.trim().is_empty() {
                return Err(SchemaError::invalid(schema, "group_by entries must not be empty"));
            }
            let is_expression = self
                .columns
                .iter()
                .any(|c| c.name.eq_ignore_ascii_case(entry) && c.expression.is_some());
            if is_expression {
                return Err(SchemaError::InvalidGroupBy {
                    schema: schema.to_string(),
                    column: entry.clone(),
                });
            }
        }
        Ok(())
    }

    fn check_transformations(&self, schema: &str) -> SchemaResult<()> {
        if self.columns.is_empty() {
            return Ok(());
        }
        let declared = |name: &str| self.columns.iter().any(|c| c.name.eq_ignore_ascii_case(name));

        for transformation in &self.transformations {
            let mut targets: Vec<&str> = transformation.column().into_iter().collect();
            if let Rule::RemoveDuplicates { columns } = transformation.rule() {
                targets.extend(columns.iter().map(String::as_str));
            }
            if let Some(missing) = targets.into_iter().find(|t| !declared(t)) {
                return Err(SchemaError::UnknownColumn {
                    schema: schema.to_string(),
                    column: missing.to_string(),
                });
            }
        }
        Ok(())
    }

    fn parse_order_by(&self, schema: &str) -> SchemaResult<Vec<OrderSpec>> {
        self.order_by
            .iter()
            .map(|entry| {
                OrderSpec::parse(entry).ok_or_else(|| {
                    SchemaError::invalid(
                        schema,
                        format!("order_by entry '{}' is not `column [ASC|DESC]`", entry),
                    )
                })
            })
            .collect()
    }

    fn check_source(&self, schema: &str) -> SchemaResult<Option<ViewPlan>> {
        match &self.source {
            SchemaSource::File { path, .. } => {
                if path.trim().is_empty() {
                    return Err(SchemaError::invalid(schema, "file source needs a path"));
                }
                Ok(None)
            }
            SchemaSource::Relational {
                connection, table, ..
            } => {
                if table.trim().is_empty() {
                    return Err(SchemaError::invalid(schema, "relational source needs a table"));
                }
                if connection.host.trim().is_empty() || connection.database.trim().is_empty() {
                    return Err(SchemaError::invalid(
                        schema,
                        "connection needs a host and a database",
                    ));
                }
                Ok(None)
            }
            SchemaSource::View { relations } => {
                let column_tables: Vec<&str> = self
                    .columns
                    .iter()
                    .filter_map(|c| c.qualified_parts().map(|(table, _)| table))
                    .collect();
                let plan = plan_view(relations, &column_tables)
                    .map_err(|message| SchemaError::invalid(schema, message))?;
                if let Some(stray) = column_tables.iter().find(|t| !plan.contains(t)) {
                    return Err(SchemaError::invalid(
                        schema,
                        format!("view column table '{}' is not part of any relation", stray),
                    ));
                }
                Ok(Some(plan))
            }
        }
    }
}
