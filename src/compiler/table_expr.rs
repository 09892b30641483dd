//! Resolving a schema's source to what goes after FROM.

use std::path::{Component, Path, PathBuf};

use super::{CompileError, CompileResult};
use crate::model::{Schema, SchemaError, SchemaSource};
use crate::sql::expr::{lit_str, table_col, ExprExt};
use crate::sql::query::{Join, JoinType, TableExpr, TableRef};
use crate::sql::{Dialect, SqlDialect};

/// The FROM clause of a schema: a table expression plus any joins.
#[derive(Debug, Clone, PartialEq)]
pub struct FromClause {
    pub table: TableExpr,
    pub joins: Vec<Join>,
}

/// Resolve the physical table expression for `schema`.
///
/// Files become a scan call on an absolute path, relational sources a
/// (possibly schema-qualified) table name, and views their base table joined
/// to every related table in relation order.
pub fn resolve(schema: &Schema, dialect: Dialect, dataset_root: &Path) -> CompileResult<FromClause> {
    match schema.source() {
        SchemaSource::File { format, path } => {
            if !dialect.supports_file_scan() {
                return Err(CompileError::UnsupportedSourceFormat {
                    schema: schema.name().to_string(),
                    format: format.to_string(),
                    dialect,
                });
            }
            let absolute = absolute_path(dataset_root, path).map_err(|message| {
                CompileError::InvalidPath {
                    path: path.clone(),
                    message,
                }
            })?;
            Ok(FromClause {
                table: TableExpr::function(format.scan_function(), vec![lit_str(&absolute)]),
                joins: vec![],
            })
        }

        SchemaSource::Relational {
            connection, table, ..
        } => {
            let table_ref = match table.split_once('.') {
                Some((schema_name, name)) => TableRef::new(&dialect.normalize_identifier(name))
                    .with_schema(&dialect.normalize_identifier(schema_name)),
                None => {
                    let base = TableRef::new(&dialect.normalize_identifier(table));
                    match &connection.schema {
                        Some(schema_name) => {
                            base.with_schema(&dialect.normalize_identifier(schema_name))
                        }
                        None => base,
                    }
                }
            };
            Ok(FromClause {
                table: TableExpr::Table(table_ref),
                joins: vec![],
            })
        }

        SchemaSource::View { .. } => {
            let plan = schema
                .view_plan()
                .ok_or_else(|| SchemaError::invalid(schema.name(), "view has no join plan"))?;
            let norm = |name: &str| dialect.normalize_identifier(name);

            let joins = plan
                .joins
                .iter()
                .map(|step| Join {
                    join_type: JoinType::Inner,
                    table: TableRef::new(&norm(&step.table)),
                    on: table_col(&norm(&step.left.0), &norm(&step.left.1))
                        .eq(table_col(&norm(&step.right.0), &norm(&step.right.1))),
                })
                .collect();

            Ok(FromClause {
                table: TableExpr::Table(TableRef::new(&norm(&plan.base))),
                joins,
            })
        }
    }
}

/// `root.join(path)` made absolute without touching the filesystem.
///
/// `.` components are dropped and `..` pops the previous component.
pub fn absolute_path(root: &Path, path: &str) -> Result<String, String> {
    let joined = root.join(path);
    let absolute = std::path::absolute(&joined)
        .map_err(|e| format!("cannot make {} absolute: {}", joined.display(), e))?;

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized.to_string_lossy().into_owned())
}
