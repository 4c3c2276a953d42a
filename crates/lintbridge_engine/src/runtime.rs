//! Engine runtime abstraction.
//!
//! This module provides the `EngineRuntime` trait which abstracts
//! how an engine release is loaded and instantiated, so the bridge can be
//! driven by the Extism backend in production and by scripted fakes in
//! tests.

use std::path::PathBuf;

use crate::EngineFault;

/// Class name used for faults raised by the runtime itself rather than by
/// the engine.
pub const RUNTIME_FAULT: &str = "lintbridge.RuntimeFault";

/// Execution context of the code under analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ExecutionContext {
    /// Directories the engine loads compiled rule classes and resources
    /// from.
    pub class_path: Vec<PathBuf>,
}

impl ExecutionContext {
    /// Creates a context with the given class path.
    pub fn new(class_path: Vec<PathBuf>) -> Self {
        Self { class_path }
    }

    /// Class path entries as strings.
    pub fn class_path_strings(&self) -> Vec<String> {
        self.class_path
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect()
    }
}

/// One loaded engine release.
pub trait EngineRuntime: Send + Sync {
    /// Version identifier of the release.
    fn version(&self) -> &str;

    /// Checks whether the release exports `name`.
    fn has_export(&self, name: &str) -> bool;

    /// Creates a fresh engine instance bound to `context`.
    fn instantiate(&self, context: &ExecutionContext) -> Result<Box<dyn EngineInstance>, EngineFault>;
}

/// A live engine instance. Instances are not reentrant.
pub trait EngineInstance: Send {
    /// Calls an export with a raw payload.
    fn call(&mut self, export: &str, input: &[u8]) -> Result<Vec<u8>, EngineFault>;
}
