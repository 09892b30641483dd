//! Primitive model types: column types, file formats and relational engines.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::SchemaError;
use crate::sql::Dialect;

/// Logical type of a dataset column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Integer,
    Float,
    Datetime,
    Boolean,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Datetime => "datetime",
            ColumnType::Boolean => "boolean",
        }
    }
}

impl FromStr for ColumnType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Ok(ColumnType::String),
            "integer" => Ok(ColumnType::Integer),
            "float" => Ok(ColumnType::Float),
            "datetime" => Ok(ColumnType::Datetime),
            "boolean" => Ok(ColumnType::Boolean),
            other => Err(SchemaError::Document(format!(
                "Unknown column type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local file formats that can be scanned in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Parquet,
    Xlsx,
    Xls,
}

impl FileFormat {
    /// Name of the table function that reads this format.
    pub fn scan_function(&self) -> &'static str {
        match self {
            FileFormat::Csv => "read_csv",
            FileFormat::Parquet => "read_parquet",
            FileFormat::Xlsx | FileFormat::Xls => "read_excel",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Parquet => "parquet",
            FileFormat::Xlsx => "xlsx",
            FileFormat::Xls => "xls",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "csv" => Some(FileFormat::Csv),
            "parquet" => Some(FileFormat::Parquet),
            "xlsx" => Some(FileFormat::Xlsx),
            "xls" => Some(FileFormat::Xls),
            _ => None,
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote relational engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[serde(rename = "mysql")]
    MySql,
    Postgres,
    #[serde(rename = "sqlserver")]
    SqlServer,
    Oracle,
}

impl Engine {
    /// The SQL dialect queries against this engine are compiled for.
    pub fn dialect(&self) -> Dialect {
        match self {
            Engine::MySql => Dialect::MySql,
            Engine::Postgres => Dialect::Postgres,
            Engine::SqlServer => Dialect::TSql,
            Engine::Oracle => Dialect::Oracle,
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Engine::MySql => 3306,
            Engine::Postgres => 5432,
            Engine::SqlServer => 1433,
            Engine::Oracle => 1521,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::MySql => "mysql",
            Engine::Postgres => "postgres",
            Engine::SqlServer => "sqlserver",
            Engine::Oracle => "oracle",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "mysql" => Some(Engine::MySql),
            "postgres" | "postgresql" => Some(Engine::Postgres),
            "sqlserver" | "mssql" => Some(Engine::SqlServer),
            "oracle" => Some(Engine::Oracle),
            _ => None,
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
