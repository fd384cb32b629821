//! Table definitions loaded from a JSON file
//!
//! ```json
//! {
//!   "terminator": "space_newline",
//!   "tables": {
//!     "people": {
//!       "path": "data/people.txt",
//!       "model": "Person",
//!       "fields": [
//!         { "name": "id", "type": "unsigned" },
//!         { "name": "name", "type": "text", "width": 10 }
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! Relative table paths are resolved against the directory holding the
//! config file.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{log_event_with_fields, Event};
use crate::schema::{FieldDef, RecordSchema, SchemaBuilder, SchemaError};
use crate::storage::{RecordTerminator, StoreOptions};

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config JSON in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("no table named {0} in config")]
    UnknownTable(String),

    #[error("table {table}: {source}")]
    Schema {
        table: String,
        #[source]
        source: SchemaError,
    },
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Schema { .. } => "TXT_SCHEMA_ERROR",
            _ => "TXT_CONFIG_ERROR",
        }
    }
}

fn default_create_dirs() -> bool {
    true
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Record terminator (optional, default "space_newline")
    #[serde(default)]
    pub terminator: RecordTerminator,

    /// Create missing parent directories (optional, default true)
    #[serde(default = "default_create_dirs")]
    pub create_dirs: bool,

    /// Tables by name
    pub tables: BTreeMap<String, TableConfig>,

    /// Directory relative table paths are resolved against
    #[serde(skip)]
    base_dir: PathBuf,
}

/// One table definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// Path of the table file
    pub path: PathBuf,

    /// Model name shown in entity output (optional, defaults to table name)
    #[serde(default)]
    pub model: Option<String>,

    /// Fields in record order
    pub fields: Vec<FieldDef>,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_json(&content).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let path_str = path.display().to_string();
        let tables = config.tables.len().to_string();
        log_event_with_fields(Event::ConfigLoaded, &[("path", &path_str), ("tables", &tables)]);

        Ok(config)
    }

    /// Parses and validates a config held in memory; relative paths stay
    /// relative to the working directory
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_json::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.tables.is_empty() {
            return Err(ConfigError::Invalid("at least one table must be declared".into()));
        }

        for (name, table) in &self.tables {
            if table.path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(format!("table {} has an empty path", name)));
            }
            self.schema_for(name)?;
        }

        Ok(())
    }

    /// Options for opening every configured table
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            terminator: self.terminator,
            create_dirs: self.create_dirs,
        }
    }

    /// Builds the schema of table `name`
    pub fn schema_for(&self, name: &str) -> ConfigResult<RecordSchema> {
        let table = self.table(name)?;
        let model = table.model.clone().unwrap_or_else(|| name.to_string());
        SchemaBuilder::new(model)
            .fields(table.fields.iter().cloned())
            .build()
            .map_err(|source| ConfigError::Schema {
                table: name.to_string(),
                source,
            })
    }

    /// Resolved path of table `name`
    pub fn path_for(&self, name: &str) -> ConfigResult<PathBuf> {
        let table = self.table(name)?;
        if table.path.is_absolute() {
            Ok(table.path.clone())
        } else {
            Ok(self.base_dir.join(&table.path))
        }
    }

    pub fn table(&self, name: &str) -> ConfigResult<&TableConfig> {
        self.tables
            .get(name)
            .ok_or_else(|| ConfigError::UnknownTable(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::FieldCodec;
    use tempfile::TempDir;

    const PEOPLE: &str = r#"{
        "tables": {
            "people": {
                "path": "data/people.txt",
                "model": "Person",
                "fields": [
                    { "name": "id", "type": "unsigned" },
                    { "name": "name", "type": "text", "width": 10 }
                ]
            }
        }
    }"#;

    #[test]
    fn test_defaults() {
        let config = Config::from_json(PEOPLE).unwrap();
        assert_eq!(config.terminator, RecordTerminator::SpaceNewline);
        assert!(config.create_dirs);
        assert_eq!(config.store_options(), StoreOptions::default());
    }

    #[test]
    fn test_schema_for_table() {
        let config = Config::from_json(PEOPLE).unwrap();
        let schema = config.schema_for("people").unwrap();
        assert_eq!(schema.name(), "Person");
        assert_eq!(schema.fields()[0].codec, FieldCodec::unsigned());
        assert_eq!(schema.total_width(), 21);
    }

    #[test]
    fn test_model_defaults_to_table_name() {
        let config = Config::from_json(
            r#"{"tables": {"tags": {
                "path": "t.txt",
                "fields": [{"name": "label", "type": "text", "width": 4}]
            }}}"#,
        )
        .unwrap();
        assert_eq!(config.schema_for("tags").unwrap().name(), "tags");
    }

    #[test]
    fn test_empty_tables_rejected() {
        let err = Config::from_json(r#"{"tables":{}}"#).unwrap_err();
        assert_eq!(err.code(), "TXT_CONFIG_ERROR");
    }

    #[test]
    fn test_table_without_fields_rejected() {
        let err =
            Config::from_json(r#"{"tables":{"t":{"path":"t.txt","fields":[]}}}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Schema {
                source: SchemaError::NoFields { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_text_field_requires_width() {
        let err = Config::from_json(
            r#"{"tables":{"t":{"path":"t.txt","fields":[{"name":"a","type":"text"}]}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_crlf_terminator() {
        let config = Config::from_json(
            r#"{"terminator": "crlf", "tables": {"t": {
                "path": "t.txt",
                "fields": [{"name": "a", "type": "unsigned", "width": 3}]
            }}}"#,
        )
        .unwrap();
        assert_eq!(config.store_options().terminator, RecordTerminator::Crlf);
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("txtdb.json");
        fs::write(&config_path, PEOPLE).unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(
            config.path_for("people").unwrap(),
            dir.path().join("data/people.txt")
        );
        assert!(matches!(
            config.path_for("nope"),
            Err(ConfigError::UnknownTable(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
