//! Bridge error types.

use lintbridge_config::ConfigError;
use thiserror::Error;

use crate::EngineFault;

/// Errors surfaced by the bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The rule configuration or grammar is incompatible with the loaded
    /// engine version.
    #[error("Rule configuration incompatible with the loaded engine version: {message}")]
    Parse {
        message: String,
        #[source]
        cause: Option<EngineFault>,
    },

    /// The engine failed while processing a file.
    #[error("Engine failed processing a file: {message}")]
    Tool {
        message: String,
        #[source]
        cause: Option<EngineFault>,
    },

    /// A defect in the adapter, such as a handle from one engine version
    /// passed to another.
    #[error("Adapter defect: {message}")]
    Internal {
        message: String,
        #[source]
        cause: Option<EngineFault>,
    },

    /// The rule configuration could not be loaded.
    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

/// Classification of a [`BridgeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Parse,
    Tool,
    Internal,
    Configuration,
}

impl BridgeError {
    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a tool error.
    pub fn tool(message: impl Into<String>) -> Self {
        Self::Tool {
            message: message.into(),
            cause: None,
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            cause: None,
        }
    }

    /// Attaches the originating engine fault.
    pub fn with_cause(mut self, fault: EngineFault) -> Self {
        match &mut self {
            Self::Parse { cause, .. } | Self::Tool { cause, .. } | Self::Internal { cause, .. } => {
                *cause = Some(fault);
            }
            Self::Configuration(_) => {}
        }
        self
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Tool { .. } => ErrorKind::Tool,
            Self::Internal { .. } => ErrorKind::Internal,
            Self::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Returns the originating engine fault, if any.
    pub fn fault(&self) -> Option<&EngineFault> {
        match self {
            Self::Parse { cause, .. } | Self::Tool { cause, .. } | Self::Internal { cause, .. } => {
                cause.as_ref()
            }
            Self::Configuration(_) => None,
        }
    }
}
