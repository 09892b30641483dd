//! Physical sources a dataset reads from.

use serde::{Deserialize, Serialize};

use super::types::{Engine, FileFormat};
use crate::config::{expand_env_vars, SettingsError};

/// Where a dataset's rows come from.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaSource {
    /// A local file scanned in place.
    File { format: FileFormat, path: String },

    /// A table in a remote relational database.
    Relational {
        engine: Engine,
        connection: Connection,
        table: String,
    },

    /// A join of other datasets described by column relations.
    View { relations: Vec<Relation> },
}

impl SchemaSource {
    pub fn file(format: FileFormat, path: impl Into<String>) -> Self {
        SchemaSource::File {
            format,
            path: path.into(),
        }
    }

    pub fn relational(engine: Engine, connection: Connection, table: impl Into<String>) -> Self {
        SchemaSource::Relational {
            engine,
            connection,
            table: table.into(),
        }
    }

    pub fn view(relations: Vec<Relation>) -> Self {
        SchemaSource::View { relations }
    }

    pub fn is_view(&self) -> bool {
        matches!(self, SchemaSource::View { .. })
    }

    /// The source's `type` name as written in a schema document.
    pub fn type_name(&self) -> &'static str {
        match self {
            SchemaSource::File { format, .. } => format.as_str(),
            SchemaSource::Relational { engine, .. } => engine.as_str(),
            SchemaSource::View { .. } => "view",
        }
    }
}

/// Connection details for a relational source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub host: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Password, possibly containing `${VAR}` references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    pub database: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

impl Connection {
    pub fn new(host: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            user: None,
            password: None,
            database: database.into(),
            schema: None,
        }
    }

    /// The configured port, or the engine's well-known port.
    pub fn port_for(&self, engine: Engine) -> u16 {
        self.port.unwrap_or_else(|| engine.default_port())
    }

    /// The password with environment variables expanded.
    pub fn resolved_password(&self) -> Result<Option<String>, SettingsError> {
        self.password.as_deref().map(expand_env_vars).transpose()
    }
}

/// An equality join between two dataset columns, written `table.column`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub from: String,

    pub to: String,
}

impl Relation {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            name: None,
            description: None,
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn from_parts(&self) -> Option<(&str, &str)> {
        split_qualified(&self.from)
    }

    pub fn to_parts(&self) -> Option<(&str, &str)> {
        split_qualified(&self.to)
    }
}

/// One step of a view's join chain: `JOIN table ON left = right`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinStep {
    pub table: String,
    pub left: (String, String),
    pub right: (String, String),
}

/// The tables a view reads, as a base table plus joins in relation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewPlan {
    pub base: String,
    pub joins: Vec<JoinStep>,
}

impl ViewPlan {
    /// Every table in the plan, base first.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.base.as_str()).chain(self.joins.iter().map(|j| j.table.as_str()))
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables().any(|t| t == table)
    }
}

/// Order a view's relations into a join chain.
///
/// Each relation must bring exactly one new table into the chain (the first
/// brings two). Without relations, the view reads `fallback_tables`, which
/// must name exactly one table.
pub fn plan_view(relations: &[Relation], fallback_tables: &[&str]) -> Result<ViewPlan, String> {
    let Some(first) = relations.first() else {
        let mut tables: Vec<&str> = vec![];
        for &table in fallback_tables {
            if !tables.contains(&table) {
                tables.push(table);
            }
        }
        return match tables.as_slice() {
            [table] => Ok(ViewPlan {
                base: table.to_string(),
                joins: vec![],
            }),
            [] => Err("a view needs relations or qualified `table.column` columns".into()),
            _ => Err(format!(
                "tables {} are not connected by any relation",
                tables.join(", ")
            )),
        };
    };

    let parts = |rel: &Relation| -> Result<((String, String), (String, String)), String> {
        let (ft, fc) = rel
            .from_parts()
            .ok_or_else(|| format!("relation source '{}' is not `table.column`", rel.from))?;
        let (tt, tc) = rel
            .to_parts()
            .ok_or_else(|| format!("relation target '{}' is not `table.column`", rel.to))?;
        if ft == tt {
            return Err(format!(
                "relation '{} = {}' joins a table to itself",
                rel.from, rel.to
            ));
        }
        Ok(((ft.into(), fc.into()), (tt.into(), tc.into())))
    };

    let (from, to) = parts(first)?;
    let mut plan = ViewPlan {
        base: from.0.clone(),
        joins: vec![JoinStep {
            table: to.0.clone(),
            left: from,
            right: to,
        }],
    };

    for rel in &relations[1..] {
        let (from, to) = parts(rel)?;
        let table = match (plan.contains(&from.0), plan.contains(&to.0)) {
            (true, false) => to.0.clone(),
            (false, true) => from.0.clone(),
            (true, true) => {
                return Err(format!(
                    "relation '{} = {}' joins two tables that are already joined",
                    rel.from, rel.to
                ))
            }
            (false, false) => {
                return Err(format!(
                    "relation '{} = {}' is not connected to the preceding relations",
                    rel.from, rel.to
                ))
            }
        };
        plan.joins.push(JoinStep {
            table,
            left: from,
            right: to,
        });
    }

    Ok(plan)
}

/// Split `table.column` on the first dot; both halves must be non-empty.
pub fn split_qualified(name: &str) -> Option<(&str, &str)> {
    name.split_once('.')
        .filter(|(table, column)| !table.is_empty() && !column.is_empty())
}
