//! What a checker is built from, and how it is cached.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use lintbridge_config::{ConfigSource, ModuleContext};
use lintbridge_text::DEFAULT_TAB_WIDTH;

/// Everything needed to build a checker for one project module.
#[derive(Debug, Clone)]
pub struct CheckerRequest {
    /// Where the rule configuration comes from.
    pub source: ConfigSource,
    /// Name of the project module being checked. Empty for none.
    pub module: String,
    /// Values for `${name}` references in the configuration.
    pub properties: BTreeMap<String, String>,
    /// Directories file references and class path lookups use.
    pub context: ModuleContext,
    /// Tab width used when the configuration does not set one.
    pub default_tab_width: usize,
    /// Base directory used when the configuration does not set one.
    pub default_base_dir: Option<PathBuf>,
}

impl CheckerRequest {
    pub fn new(source: ConfigSource, context: ModuleContext) -> Self {
        Self {
            source,
            module: String::new(),
            properties: BTreeMap::new(),
            context,
            default_tab_width: DEFAULT_TAB_WIDTH,
            default_base_dir: None,
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn with_properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.properties.extend(properties);
        self
    }

    pub fn with_default_tab_width(mut self, tab_width: usize) -> Self {
        self.default_tab_width = tab_width;
        self
    }

    pub fn with_default_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.default_base_dir = Some(dir.into());
        self
    }

    /// Cache key for this request.
    pub fn key(&self) -> CheckerKey {
        let mut hasher = blake3::Hasher::new();
        for (name, value) in &self.properties {
            hasher.update(name.as_bytes());
            hasher.update(b"\0");
            hasher.update(value.as_bytes());
            hasher.update(b"\0");
        }
        hasher.update(&(self.default_tab_width as u64).to_le_bytes());
        if let Some(dir) = &self.default_base_dir {
            hasher.update(dir.to_string_lossy().as_bytes());
        }
        CheckerKey {
            location: self.source.location(),
            module: self.module.clone(),
            fingerprint: hasher.finalize().to_hex().to_string(),
        }
    }
}

/// Identity of a cached checker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CheckerKey {
    location: String,
    module: String,
    fingerprint: String,
}

impl CheckerKey {
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn module(&self) -> &str {
        &self.module
    }
}

impl fmt::Display for CheckerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.module.is_empty() {
            write!(f, "{}", self.location)
        } else {
            write!(f, "{} [{}]", self.location, self.module)
        }
    }
}
