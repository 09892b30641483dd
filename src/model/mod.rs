//! Semantic dataset model.
//!
//! A [`Schema`] describes one dataset: its columns, physical source,
//! declarative transformations and the grouping, ordering and limit applied
//! on output. Schemas are validated once, at construction, and are
//! immutable afterwards.

pub mod column;
pub mod document;
pub mod error;
pub mod schema;
pub mod source;
pub mod transformation;
pub mod types;

pub use column::Column;
pub use document::{SchemaDocument, SourceDocument, TransformationDocument};
pub use error::{SchemaError, SchemaResult};
pub use schema::{sanitize_name, OrderSpec, Schema, SchemaBuilder};
pub use source::{Connection, JoinStep, Relation, SchemaSource, ViewPlan};
pub use transformation::{PadSide, Rule, Transformation, TransformationKind};
pub use types::{ColumnType, Engine, FileFormat};
