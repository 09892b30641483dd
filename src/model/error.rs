//! Errors raised while constructing or loading a schema.

use super::transformation::TransformationKind;

/// Errors that can occur while building a [`Schema`](super::Schema).
///
/// Every variant is raised at construction time; a schema that exists has
/// already passed these checks.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("Unsupported transformation type: {0}")]
    UnsupportedTransformation(String),

    #[error("Invalid parameter '{param}' for transformation '{kind}': {message}")]
    InvalidTransformationParams {
        kind: TransformationKind,
        param: String,
        message: String,
    },

    #[error("Schema '{schema}' cannot group by expression column '{column}'")]
    InvalidGroupBy { schema: String, column: String },

    #[error("Unsupported source format: {0}")]
    UnsupportedSourceFormat(String),

    #[error("Duplicate column '{column}' in schema '{schema}'")]
    DuplicateColumn { schema: String, column: String },

    #[error("Schema '{schema}' has no column named '{column}'")]
    UnknownColumn { schema: String, column: String },

    #[error("Invalid expression for column '{column}' ({expression}): {message}")]
    InvalidExpression {
        column: String,
        expression: String,
        message: String,
    },

    #[error("Invalid schema '{schema}': {message}")]
    InvalidSchema { schema: String, message: String },

    #[error("Failed to read schema document: {0}")]
    Document(String),
}

pub type SchemaResult<T> = Result<T, SchemaError>;

impl SchemaError {
    pub(crate) fn invalid(schema: &str, message: impl Into<String>) -> Self {
        SchemaError::InvalidSchema {
            schema: schema.to_string(),
            message: message.into(),
        }
    }
}
