//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::schema::registry::{SchemaLoadError, SchemaRegistry};

/// ISTVON configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schema file to use instead of the bundled one
    pub schema_path: Option<PathBuf>,

    /// Location of the conversion history database
    pub history_db: Option<PathBuf>,

    /// Default output format (json or yaml)
    pub default_format: Option<String>,

    /// Record conversions in the history database
    pub save_history: Option<bool>,
}

/// A registry that is either the process-wide bundled schema or an override
pub enum RegistryHandle {
    Global(&'static SchemaRegistry),
    Owned(SchemaRegistry),
}

impl std::ops::Deref for RegistryHandle {
    type Target = SchemaRegistry;

    fn deref(&self) -> &SchemaRegistry {
        match self {
            RegistryHandle::Global(r) => r,
            RegistryHandle::Owned(r) => r,
        }
    }
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(explicit: Option<&Path>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/istvon/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Explicit --config file
        if let Some(path) = explicit {
            match Self::read_file(path) {
                Some(file_config) => config.merge(file_config),
                None => tracing::warn!(path = %path.display(), "config file not loaded"),
            }
        }

        // 4. Environment variables
        config.merge(Self::from_env(|key| std::env::var(key).ok()));

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "loaded config");
                Some(config)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config");
                None
            }
        }
    }

    /// Build the environment layer from a variable lookup
    fn from_env(lookup: impl Fn(&str) -> Option<String>) -> Config {
        Config {
            schema_path: lookup("ISTVON_SCHEMA").map(PathBuf::from),
            history_db: lookup("ISTVON_HISTORY_DB").map(PathBuf::from),
            default_format: lookup("ISTVON_FORMAT"),
            save_history: lookup("ISTVON_SAVE_HISTORY").map(|v| !matches!(v.as_str(), "0" | "false" | "no")),
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "istvon")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.schema_path.is_some() {
            self.schema_path = other.schema_path;
        }
        if other.history_db.is_some() {
            self.history_db = other.history_db;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.save_history.is_some() {
            self.save_history = other.save_history;
        }
    }

    /// Path of the history database, falling back to the user data dir
    pub fn history_path(&self) -> PathBuf {
        if let Some(ref path) = self.history_db {
            return path.clone();
        }
        directories::ProjectDirs::from("", "", "istvon")
            .map(|dirs| dirs.data_dir().join("history.db"))
            .unwrap_or_else(|| PathBuf::from(".istvon-history.db"))
    }

    /// Whether conversions should be written to history
    pub fn save_history(&self) -> bool {
        self.save_history.unwrap_or(true)
    }

    /// The schema registry selected by this configuration
    pub fn schema_registry(&self) -> Result<RegistryHandle, SchemaLoadError> {
        match self.schema_path {
            Some(ref path) => SchemaRegistry::from_path(path).map(RegistryHandle::Owned),
            None => SchemaRegistry::global().map(RegistryHandle::Global),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config {
            default_format: Some("json".to_string()),
            save_history: Some(true),
            ..Default::default()
        };
        base.merge(Config {
            default_format: Some("yaml".to_string()),
            ..Default::default()
        });
        assert_eq!(base.default_format.as_deref(), Some("yaml"));
        assert_eq!(base.save_history, Some(true));
    }

    #[test]
    fn test_env_layer() {
        let env: HashMap<&str, &str> = [
            ("ISTVON_HISTORY_DB", "/tmp/h.db"),
            ("ISTVON_SAVE_HISTORY", "false"),
        ]
        .into_iter()
        .collect();
        let config = Config::from_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.history_db, Some(PathBuf::from("/tmp/h.db")));
        assert_eq!(config.save_history, Some(false));
        assert!(config.schema_path.is_none());
    }

    #[test]
    fn test_read_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "default_format: yaml\nsave_history: false\n").unwrap();
        let config = Config::read_file(&path).unwrap();
        assert_eq!(config.default_format.as_deref(), Some("yaml"));
        assert!(!config.save_history());
    }

    #[test]
    fn test_history_path_override() {
        let config = Config {
            history_db: Some(PathBuf::from("custom.db")),
            ..Default::default()
        };
        assert_eq!(config.history_path(), PathBuf::from("custom.db"));
    }

    #[test]
    fn test_default_registry_is_global() {
        let config = Config::default();
        let registry = config.schema_registry().unwrap();
        assert!(matches!(registry, RegistryHandle::Global(_)));
        assert_eq!(registry.required_fields().len(), 6);
    }
}
