//! TOML-based configuration for Quarry.
//!
//! Supports a config file (quarry.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [compile]
//! dialect = "duckdb"
//! dataset_root = "${DATA_HOME}/datasets"
//! head_rows = 10
//!
//! [mappings]
//! orders = "read_parquet('/lake/orders.parquet')"
//! active_users = "SELECT * FROM users WHERE active"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::compiler::CompileOptions;
use crate::rewrite::{RewriteResult, TableMapping};
use crate::sql::Dialect;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "QUARRY_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Unsupported dialect: {0}")]
    UnsupportedDialect(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Compiler defaults.
    pub compile: CompileSettings,

    /// Logical table name to physical target, for `rewrite`.
    pub mappings: BTreeMap<String, String>,
}

/// Compiler defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CompileSettings {
    /// Target dialect name (any alias accepted by `Dialect::from_str`).
    pub dialect: Option<String>,

    /// Root for relative file paths (supports ${ENV_VAR} expansion).
    pub dataset_root: Option<String>,

    /// Default head size.
    pub head_rows: Option<u64>,
}

impl CompileSettings {
    /// Get the configured dialect, if any.
    pub fn dialect(&self) -> Result<Option<Dialect>, SettingsError> {
        self.dialect
            .as_deref()
            .map(|name| {
                name.parse::<Dialect>()
                    .map_err(|_| SettingsError::UnsupportedDialect(name.to_string()))
            })
            .transpose()
    }

    /// Get the dataset root with environment variables expanded.
    pub fn resolved_dataset_root(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.dataset_root
            .as_deref()
            .map(|root| expand_env_vars(root).map(PathBuf::from))
            .transpose()
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        if settings.compile.head_rows == Some(0) {
            return Err(SettingsError::InvalidConfig(
                "compile.head_rows must be at least 1".to_string(),
            ));
        }
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `QUARRY_CONFIG`
    /// 2. `./quarry.toml`
    /// 3. `~/.config/quarry/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("quarry.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("quarry").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Compiler options from the `[compile]` section.
    pub fn compile_options(&self) -> Result<CompileOptions, SettingsError> {
        let mut options = CompileOptions::default();
        if let Some(dialect) = self.compile.dialect()? {
            options = options.with_dialect(dialect);
        }
        if let Some(root) = self.compile.resolved_dataset_root()? {
            options = options.with_dataset_root(root);
        }
        if let Some(rows) = self.compile.head_rows {
            options = options.with_head_rows(rows);
        }
        Ok(options)
    }

    /// The `[mappings]` table, validated for `dialect`.
    pub fn table_mapping(&self, dialect: Option<Dialect>) -> RewriteResult<TableMapping> {
        TableMapping::new(
            self.mappings.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            dialect,
        )
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name = if chars.next_if_eq(&'{').is_some() {
            let mut var_name = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                var_name.push(ch);
            }
            if !closed {
                return Err(SettingsError::InvalidConfig(format!(
                    "unterminated variable reference '${{{}'",
                    var_name
                )));
            }
            var_name
        } else {
            // $VAR ends at the first non-alphanumeric/underscore
            let mut var_name = String::new();
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                var_name.push(ch);
            }
            if var_name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
            var_name
        };

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
