//! JSON and TOML schema documents.
//!
//! Example (TOML):
//! ```toml
//! name = "sales"
//! group_by = ["region"]
//!
//! [source]
//! type = "csv"
//! path = "sales/sales.csv"
//!
//! [[columns]]
//! name = "amount"
//! type = "float"
//! expression = "sum(amount)"
//! alias = "total"
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::column::Column;
use super::error::{SchemaError, SchemaResult};
use super::schema::Schema;
use super::source::{Connection, Relation, SchemaSource};
use super::transformation::Transformation;
use super::types::{Engine, FileFormat};

/// The persisted form of a [`Schema`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub view: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceDocument>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<Column>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<Relation>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transformations: Vec<TransformationDocument>,
}

/// `{type, path}` for files, `{type, connection, table}` for databases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<Connection>,
}

/// `{type, params}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationDocument {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub params: Value,
}

impl SchemaDocument {
    pub fn from_json(text: &str) -> SchemaResult<Self> {
        serde_json::from_str(text).map_err(|e| SchemaError::Document(e.to_string()))
    }

    pub fn from_toml(text: &str) -> SchemaResult<Self> {
        toml::from_str(text).map_err(|e| SchemaError::Document(e.to_string()))
    }

    pub fn to_json(&self) -> SchemaResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SchemaError::Document(e.to_string()))
    }

    pub fn to_toml(&self) -> SchemaResult<String> {
        toml::to_string(self).map_err(|e| SchemaError::Document(e.to_string()))
    }

    /// Validate the document into a [`Schema`].
    pub fn into_schema(self) -> SchemaResult<Schema> {
        let source = match (self.source, self.view) {
            (Some(_), true) => {
                return Err(SchemaError::invalid(
                    &self.name,
                    "a schema has either a source or `view = true`, not both",
                ))
            }
            (None, false) => {
                return Err(SchemaError::invalid(
                    &self.name,
                    "a schema needs a source or `view = true`",
                ))
            }
            (None, true) => SchemaSource::view(self.relations),
            (Some(source), false) => {
                if !self.relations.is_empty() {
                    return Err(SchemaError::invalid(
                        &self.name,
                        "relations are only allowed on views",
                    ));
                }
                source.into_source(&self.name)?
            }
        };

        let transformations = self
            .transformations
            .into_iter()
            .map(|t| Transformation::new(&t.kind, t.params))
            .collect::<SchemaResult<Vec<_>>>()?;

        let mut builder = Schema::builder(self.name, source)
            .columns(self.columns)
            .transformations(transformations)
            .group_by(self.group_by)
            .order_by(self.order_by);
        if let Some(description) = self.description {
            builder = builder.description(description);
        }
        if let Some(limit) = self.limit {
            builder = builder.limit(limit);
        }
        builder.build()
    }
}

impl SourceDocument {
    fn into_source(self, schema: &str) -> SchemaResult<SchemaSource> {
        if let Some(format) = FileFormat::from_name(&self.kind) {
            let path = self.path.ok_or_else(|| {
                SchemaError::invalid(schema, format!("{} source needs a path", format))
            })?;
            return Ok(SchemaSource::file(format, path));
        }
        if let Some(engine) = Engine::from_name(&self.kind) {
            let connection = self.connection.ok_or_else(|| {
                SchemaError::invalid(schema, format!("{} source needs a connection", engine))
            })?;
            let table = self.table.ok_or_else(|| {
                SchemaError::invalid(schema, format!("{} source needs a table", engine))
            })?;
            return Ok(SchemaSource::relational(engine, connection, table));
        }
        Err(SchemaError::UnsupportedSourceFormat(self.kind))
    }
}

impl Schema {
    /// Load a schema from a JSON document.
    pub fn from_json(text: &str) -> SchemaResult<Self> {
        SchemaDocument::from_json(text)?.into_schema()
    }

    /// Load a schema from a TOML document.
    pub fn from_toml(text: &str) -> SchemaResult<Self> {
        SchemaDocument::from_toml(text)?.into_schema()
    }

    /// The persisted form of this schema.
    pub fn to_document(&self) -> SchemaDocument {
        let (source, view, relations) = match self.source() {
            SchemaSource::File { format, path } => (
                Some(SourceDocument {
                    kind: format.to_string(),
                    path: Some(path.clone()),
                    table: None,
                    connection: None,
                }),
                false,
                vec![],
            ),
            SchemaSource::Relational {
                engine,
                connection,
                table,
            } => (
                Some(SourceDocument {
                    kind: engine.to_string(),
                    path: None,
                    table: Some(table.clone()),
                    connection: Some(connection.clone()),
                }),
                false,
                vec![],
            ),
            SchemaSource::View { relations } => (None, true, relations.clone()),
        };

        SchemaDocument {
            name: self.name().to_string(),
            description: self.description().map(str::to_string),
            limit: self.limit(),
            view,
            group_by: self.group_by().to_vec(),
            order_by: self.order_by().iter().map(ToString::to_string).collect(),
            source,
            columns: self.columns().to_vec(),
            relations,
            transformations: self
                .transformations()
                .iter()
                .map(|t| TransformationDocument {
                    kind: t.kind().to_string(),
                    params: Value::Object(t.params().clone()),
                })
                .collect(),
        }
    }
}
