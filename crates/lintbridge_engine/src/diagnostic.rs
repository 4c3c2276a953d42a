//! Diagnostics and audit events reported by the engine.

use serde::{Deserialize, Serialize};

use crate::EngineFault;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    /// Error - must be fixed.
    #[default]
    Error,
    /// Warning - should be reviewed.
    Warning,
    /// Info - informational message.
    Info,
    /// Any level the bridge does not know.
    Ignore,
}

impl Severity {
    /// Maps an engine severity level name. Unknown names map to `Ignore`.
    pub fn from_level(level: &str) -> Self {
        match level.to_ascii_lowercase().as_str() {
            "error" => Self::Error,
            "warning" => Self::Warning,
            "info" => Self::Info,
            _ => Self::Ignore,
        }
    }

    /// Lowercase name of the severity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Ignore => "ignore",
        }
    }
}

impl From<String> for Severity {
    fn from(level: String) -> Self {
        Self::from_level(&level)
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        severity.as_str().to_string()
    }
}

/// One problem in engine coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    /// File name as reported by the engine.
    pub file: String,

    /// Line (1-based); 0 means relative to the start of the file.
    pub line: usize,

    /// Column (0-based), already tab-expanded by the engine.
    #[serde(default)]
    pub column: usize,

    pub message: String,

    #[serde(default)]
    pub severity: Severity,

    /// Identifier of the rule that produced the problem.
    #[serde(default)]
    pub source: String,
}

impl Diagnostic {
    /// Creates an error-level diagnostic.
    pub fn new(
        file: impl Into<String>,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            message: message.into(),
            severity: Severity::Error,
            source: String::new(),
        }
    }

    /// Sets the severity level.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the rule identifier.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

/// Audit callbacks emitted by the engine during `process`, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    AuditStarted,
    FileStarted {
        file: String,
    },
    Diagnostic {
        diagnostic: Diagnostic,
    },
    /// The engine failed on a file; `diagnostic` describes where.
    Exception {
        diagnostic: Diagnostic,
        fault: EngineFault,
    },
    FileFinished {
        file: String,
    },
    AuditFinished,
}
