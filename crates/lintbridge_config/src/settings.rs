//! Tool settings file (`.lintbridge.json`).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use jsonschema::Validator;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ConfigError;

/// File name looked up by [`BridgeSettings::discover`].
pub const SETTINGS_FILE_NAME: &str = ".lintbridge.json";

// Embed the schema
const SCHEMA_JSON: &str = include_str!("../../../schemas/v1/settings.json");
static SETTINGS_SCHEMA: OnceLock<Result<Validator, String>> = OnceLock::new();

/// Settings for running scans.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BridgeSettings {
    /// Rule configuration location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,

    /// Engine WebAssembly module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<PathBuf>,

    /// Version identifier to register the engine under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,

    /// Bindings for `${name}` references.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,

    /// Class path directories for the engine.
    #[serde(default)]
    pub class_path: Vec<PathBuf>,

    /// Fallback tab width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_width: Option<usize>,

    /// Base directory for engine-reported file names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,

    /// Checker cache validity window in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Whether resolved problems are marked suppressed.
    #[serde(default)]
    pub suppress_errors: bool,

    /// Directory containing the settings file. Relative paths in the
    /// settings are resolved against it.
    #[serde(skip)]
    pub settings_dir: Option<PathBuf>,
}

fn default_cache_ttl_secs() -> u64 {
    60
}

impl BridgeSettings {
    /// Creates default settings.
    pub fn new() -> Self {
        Self {
            config: None,
            engine: None,
            engine_version: None,
            properties: BTreeMap::new(),
            class_path: Vec::new(),
            tab_width: None,
            base_dir: None,
            cache_ttl_secs: default_cache_ttl_secs(),
            suppress_errors: false,
            settings_dir: None,
        }
    }

    /// Loads settings from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::settings(format!("Failed to read {}: {}", path.display(), e)))?;

        let mut settings = Self::from_json(&content)?;
        settings.settings_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf);

        Ok(settings)
    }

    /// Parses settings from JSON with schema validation.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| ConfigError::settings(format!("Invalid JSON: {}", e)))?;

        let schema = SETTINGS_SCHEMA
            .get_or_init(|| {
                let schema_json: serde_json::Value = serde_json::from_str(SCHEMA_JSON)
                    .map_err(|e| format!("Invalid embedded settings schema: {}", e))?;
                Validator::new(&schema_json)
                    .map_err(|e| format!("Invalid settings schema compilation: {}", e))
            })
            .as_ref()
            .map_err(|e| ConfigError::settings(e.clone()))?;

        if let Err(e) = schema.validate(&value) {
            return Err(ConfigError::settings(format!(
                "Settings validation failed: {} at {}",
                e,
                e.instance_path()
            )));
        }

        serde_json::from_value(value)
            .map_err(|e| ConfigError::settings(format!("Invalid settings: {}", e)))
    }

    /// Finds a settings file for a project.
    ///
    /// Search order:
    /// 1. `<dir>/.lintbridge.json`
    /// 2. `<config dir>/lintbridge/settings.json`
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        let local = dir.join(SETTINGS_FILE_NAME);
        if local.is_file() {
            return Some(local);
        }

        let global = dirs::config_dir()?.join("lintbridge").join("settings.json");
        if global.is_file() {
            debug!("Using global settings {}", global.display());
            return Some(global);
        }

        None
    }

    /// Checker cache validity window.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Resolves a path from the settings against the settings directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.settings_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self::new()
    }
}
