//! Exceptions raised inside the engine, as data.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An exception reported by the engine, with its cause chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineFault {
    /// Fully qualified exception class.
    pub class: String,

    /// Exception message, if any.
    #[serde(default)]
    pub message: String,

    /// Superclasses of `class`, nearest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ancestors: Vec<String>,

    /// Underlying cause.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<EngineFault>>,
}

impl EngineFault {
    /// Creates a fault without a cause.
    pub fn new(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            message: message.into(),
            ancestors: Vec::new(),
            cause: None,
        }
    }

    /// Sets the superclasses of this fault's class.
    pub fn with_ancestors<I, S>(mut self, ancestors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ancestors = ancestors.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the cause.
    pub fn caused_by(mut self, cause: EngineFault) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Returns the cause, if any.
    pub fn cause(&self) -> Option<&EngineFault> {
        self.cause.as_deref()
    }

    /// True if this fault is of `class` or one of its subclasses.
    pub fn is_a(&self, class: &str) -> bool {
        self.class == class || self.ancestors.iter().any(|a| a == class)
    }

    /// Iterates over this fault and its causes, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &EngineFault> {
        std::iter::successors(Some(self), |fault| fault.cause())
    }
}

impl fmt::Display for EngineFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            f.write_str(&self.class)
        } else {
            write!(f, "{}: {}", self.class, self.message)
        }
    }
}

impl std::error::Error for EngineFault {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}
