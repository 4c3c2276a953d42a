//! Where a rule configuration comes from.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::{BundledConfig, ConfigError};

/// Timeout for fetching remote rule configurations.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// A rule configuration source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConfigSource {
    /// A local file.
    File(PathBuf),
    /// An HTTP(S) URL.
    Url(String),
    /// Literal configuration text.
    Text(String),
    /// A resource looked up on the module's class path.
    ClassPath(String),
    /// A configuration shipped with lintbridge.
    Bundled(BundledConfig),
}

impl ConfigSource {
    /// Interprets a user-supplied location.
    ///
    /// `classpath:` and `bundled:` prefixes select those sources; a bundled
    /// name is matched by id first, then by description. HTTP(S) locations
    /// are URLs and anything else is a file path.
    pub fn from_location(location: &str) -> Self {
        if let Some(name) = location.strip_prefix("classpath:") {
            return Self::ClassPath(name.to_string());
        }
        if let Some(name) = location.strip_prefix("bundled:") {
            let config =
                BundledConfig::from_id(name).unwrap_or_else(|| BundledConfig::from_description(name));
            return Self::Bundled(config);
        }

        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::File(PathBuf::from(location))
        }
    }

    /// Reads the configuration text without a class path.
    pub fn read(&self) -> Result<String, ConfigError> {
        self.read_with(&[])
    }

    /// Reads the configuration text. URLs are fetched synchronously and
    /// class path resources are searched for in `class_path` order.
    pub fn read_with(&self, class_path: &[PathBuf]) -> Result<String, ConfigError> {
        match self {
            Self::File(path) => {
                debug!("Reading rule configuration from {}", path.display());
                Ok(std::fs::read_to_string(path)?)
            }
            Self::Url(url) => fetch(url),
            Self::Text(text) => Ok(text.clone()),
            Self::ClassPath(name) => {
                let path = find_on_class_path(name, class_path)
                    .ok_or_else(|| ConfigError::class_path_resource(name.as_str()))?;
                debug!("Reading rule configuration from {}", path.display());
                Ok(std::fs::read_to_string(path)?)
            }
            Self::Bundled(config) => Ok(config.text().to_string()),
        }
    }

    /// Directory that relative references in the configuration are resolved
    /// against. Only file sources have one.
    pub fn base_dir(&self) -> Option<&Path> {
        match self {
            Self::File(path) => path.parent().filter(|p| !p.as_os_str().is_empty()),
            Self::Url(_) | Self::Text(_) | Self::ClassPath(_) | Self::Bundled(_) => None,
        }
    }

    /// Stable identifier, used as part of cache keys.
    pub fn location(&self) -> String {
        match self {
            Self::File(path) => format!("file:{}", path.display()),
            Self::Url(url) => format!("url:{}", url),
            Self::Text(text) => format!("text:{}", blake3::hash(text.as_bytes()).to_hex()),
            Self::ClassPath(name) => format!("classpath:{}", name),
            Self::Bundled(config) => format!("bundled:{}", config.id()),
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
            Self::Text(_) => f.write_str("<inline configuration>"),
            Self::ClassPath(name) => f.write_str(name),
            Self::Bundled(config) => f.write_str(config.description()),
        }
    }
}

fn find_on_class_path(name: &str, class_path: &[PathBuf]) -> Option<PathBuf> {
    let relative = name.trim_start_matches('/');
    if relative.is_empty() {
        return None;
    }
    class_path
        .iter()
        .map(|dir| dir.join(relative))
        .find(|candidate| candidate.is_file())
}

fn fetch(url: &str) -> Result<String, ConfigError> {
    info!("Fetching rule configuration from {}", url);

    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|e| ConfigError::fetch(format!("Failed to create HTTP client: {}", e)))?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| ConfigError::fetch(format!("{}: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ConfigError::fetch(format!("{}: HTTP {}", url, status)));
    }

    response
        .text()
        .map_err(|e| ConfigError::fetch(format!("{}: {}", url, e)))
}
