//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while loading rule configurations or settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The rule configuration is not well-formed.
    #[error("Failed to parse rule configuration: {0}")]
    Parse(String),

    /// The source contained no root `module` element.
    #[error("Couldn't find root module in {0}")]
    NoRootModule(String),

    /// A property reference could not be substituted.
    #[error("Invalid property reference: {0}")]
    Property(String),

    /// Fetching a remote rule configuration failed.
    #[error("Failed to fetch rule configuration: {0}")]
    Fetch(String),

    /// A class path resource was not found in any class path entry.
    #[error("Couldn't read class path resource: {0}")]
    ClassPathResource(String),

    /// The tool settings file is invalid.
    #[error("Invalid settings: {0}")]
    Settings(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Creates a missing root module error for the named source.
    pub fn no_root_module(source: impl Into<String>) -> Self {
        Self::NoRootModule(source.into())
    }

    /// Creates a property substitution error.
    pub fn property(message: impl Into<String>) -> Self {
        Self::Property(message.into())
    }

    /// Creates a fetch error.
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch(message.into())
    }

    /// Creates a missing class path resource error.
    pub fn class_path_resource(name: impl Into<String>) -> Self {
        Self::ClassPathResource(name.into())
    }

    /// Creates a settings error.
    pub fn settings(message: impl Into<String>) -> Self {
        Self::Settings(message.into())
    }
}
