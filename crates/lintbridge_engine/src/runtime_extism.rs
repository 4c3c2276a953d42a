//! Extism-based engine runtime for native environments.
//!
//! The engine is a WebAssembly module. Every checker gets its own Extism
//! plugin instance, created from the same module bytes, with the class path
//! of the analysed code mapped in as allowed paths.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use extism::{Manifest, Plugin, Wasm};
// We need MemoryOptions from extism-manifest to configure memory limits
use extism_manifest::MemoryOptions;
use tracing::{debug, info};

use crate::api::ALL_EXPORTS;
use crate::runtime::{EngineInstance, EngineRuntime, ExecutionContext, RUNTIME_FAULT};
use crate::{BridgeError, EngineFault};

/// Default memory limit for engine instances (256 MB = 4096 pages).
/// Each WASM page is 64KB.
const DEFAULT_MEMORY_MAX_PAGES: u32 = 4096;

/// Default timeout for a single export call (60 s).
const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Config key carrying the class path as a JSON array.
const CLASS_PATH_CONFIG_KEY: &str = "classpath";

/// An engine release loaded from a WebAssembly module.
pub struct ExtismRuntime {
    version: String,
    wasm: Vec<u8>,
    exports: BTreeSet<String>,
}

impl ExtismRuntime {
    /// Loads an engine release from module bytes.
    pub fn load(version: impl Into<String>, wasm: Vec<u8>) -> Result<Self, BridgeError> {
        let version = version.into();
        info!("Loading engine {} ({} bytes)", version, wasm.len());

        let manifest = Self::configure_manifest(&wasm, &ExecutionContext::default())?;
        let plugin = Plugin::new(&manifest, [], true)
            .map_err(|e| BridgeError::internal(format!("Failed to create plugin: {}", e)))?;

        let exports: BTreeSet<String> = ALL_EXPORTS
            .iter()
            .filter(|name| plugin.function_exists(**name))
            .map(|name| name.to_string())
            .collect();
        debug!("Engine {} exports {:?}", version, exports);

        Ok(Self {
            version,
            wasm,
            exports,
        })
    }

    /// Loads an engine release from a file.
    pub fn load_file(version: impl Into<String>, path: &Path) -> Result<Self, BridgeError> {
        info!("Loading engine from file: {}", path.display());
        let wasm = std::fs::read(path).map_err(|e| {
            BridgeError::internal(format!("Failed to read engine {}: {}", path.display(), e))
        })?;
        Self::load(version, wasm)
    }

    /// Builds the manifest with security limits and the class path.
    fn configure_manifest(
        wasm: &[u8],
        context: &ExecutionContext,
    ) -> Result<Manifest, BridgeError> {
        let mut manifest = Manifest::new([Wasm::data(wasm.to_vec())]);

        // Set execution timeout to prevent infinite loops
        manifest.timeout_ms = Some(DEFAULT_TIMEOUT_MS);

        // Set memory limits to prevent DoS via memory exhaustion
        manifest.memory = MemoryOptions {
            max_pages: Some(DEFAULT_MEMORY_MAX_PAGES),
            max_http_response_bytes: None,
            max_var_bytes: None,
        };

        if !context.class_path.is_empty() {
            let allowed: BTreeMap<String, _> = context
                .class_path
                .iter()
                .map(|dir| (dir.to_string_lossy().into_owned(), dir.clone()))
                .collect();
            manifest.allowed_paths = Some(allowed);
        }

        let class_path = serde_json::to_string(&context.class_path_strings())
            .map_err(|e| BridgeError::internal(format!("Failed to encode class path: {}", e)))?;
        manifest
            .config
            .insert(CLASS_PATH_CONFIG_KEY.to_string(), class_path);

        Ok(manifest)
    }
}

impl EngineRuntime for ExtismRuntime {
    fn version(&self) -> &str {
        &self.version
    }

    fn has_export(&self, name: &str) -> bool {
        self.exports.contains(name)
    }

    fn instantiate(
        &self,
        context: &ExecutionContext,
    ) -> Result<Box<dyn EngineInstance>, EngineFault> {
        let manifest = Self::configure_manifest(&self.wasm, context)
            .map_err(|e| EngineFault::new(RUNTIME_FAULT, e.to_string()))?;
        let plugin = Plugin::new(&manifest, [], true).map_err(|e| {
            EngineFault::new(RUNTIME_FAULT, format!("Failed to instantiate engine: {}", e))
        })?;
        Ok(Box::new(ExtismInstance { plugin }))
    }
}

struct ExtismInstance {
    plugin: Plugin,
}

impl EngineInstance for ExtismInstance {
    fn call(&mut self, export: &str, input: &[u8]) -> Result<Vec<u8>, EngineFault> {
        self.plugin
            .call::<&[u8], Vec<u8>>(export, input)
            .map_err(|e| fault_from_error(export, &e))
    }
}

/// Engines report exceptions as a JSON-encoded [`EngineFault`] in the
/// plugin error message; anything else is a runtime failure.
fn fault_from_error(export: &str, error: &extism::Error) -> EngineFault {
    let message = error.to_string();
    serde_json::from_str::<EngineFault>(&message).unwrap_or_else(|_| {
        EngineFault::new(RUNTIME_FAULT, format!("Export '{}' failed: {}", export, message))
    })
}
