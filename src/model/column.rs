//! Column declarations.

use serde::{Deserialize, Serialize};

use super::source::split_qualified;
use super::types::ColumnType;

/// A column exposed by a dataset.
///
/// `expression` replaces the physical column reference with arbitrary SQL;
/// `alias` renames the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: ColumnType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
            expression: None,
            alias: None,
            description: None,
        }
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Split a view column name of the form `table.column`.
    pub fn qualified_parts(&self) -> Option<(&str, &str)> {
        split_qualified(&self.name)
    }
}
