//! Explicit registry of loaded engine releases.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::EngineAdapter;

/// Adapters keyed by engine version.
///
/// Nothing is unloaded implicitly. A disposed adapter stays alive for as
/// long as callers hold it.
#[derive(Debug, Default)]
pub struct EngineRegistry {
    adapters: RwLock<HashMap<String, Arc<EngineAdapter>>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `adapter` under its version, replacing any previous one.
    pub fn register(&self, adapter: EngineAdapter) -> Arc<EngineAdapter> {
        let version = adapter.version().to_string();
        let adapter = Arc::new(adapter);
        if self
            .adapters
            .write()
            .insert(version.clone(), adapter.clone())
            .is_some()
        {
            info!("Replaced engine {}", version);
        } else {
            info!("Registered engine {}", version);
        }
        adapter
    }

    pub fn get(&self, version: &str) -> Option<Arc<EngineAdapter>> {
        self.adapters.read().get(version).cloned()
    }

    /// Removes the adapter for `version`.
    pub fn dispose(&self, version: &str) -> Option<Arc<EngineAdapter>> {
        let removed = self.adapters.write().remove(version);
        if removed.is_some() {
            debug!("Disposed engine {}", version);
        }
        removed
    }

    /// Registered versions, sorted.
    pub fn versions(&self) -> Vec<String> {
        let mut versions: Vec<String> = self.adapters.read().keys().cloned().collect();
        versions.sort();
        versions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ScriptedRuntime;
    use pretty_assertions::assert_eq;

    fn adapter(version: &str) -> EngineAdapter {
        EngineAdapter::new(Arc::new(ScriptedRuntime::current(version))).unwrap()
    }

    #[test]
    fn test_register_and_get() {
        let registry = EngineRegistry::new();
        registry.register(adapter("10.3"));
        registry.register(adapter("8.0"));

        assert_eq!(registry.versions(), vec!["10.3", "8.0"]);
        assert_eq!(registry.get("8.0").map(|a| a.version().to_string()), Some("8.0".into()));
        assert!(registry.get("9.0").is_none());
    }

    #[test]
    fn test_register_replaces_same_version() {
        let registry = EngineRegistry::new();
        let first = registry.register(adapter("10.3"));
        let second = registry.register(adapter("10.3"));

        assert_eq!(registry.versions().len(), 1);
        let current = registry.get("10.3").unwrap();
        assert!(Arc::ptr_eq(&current, &second));
        assert!(!Arc::ptr_eq(&current, &first));
    }

    #[test]
    fn test_dispose_keeps_outstanding_references_usable() {
        let registry = EngineRegistry::new();
        let held = registry.register(adapter("10.3"));

        let removed = registry.dispose("10.3");
        assert!(removed.is_some());
        assert!(registry.get("10.3").is_none());
        assert!(registry.dispose("10.3").is_none());
        assert_eq!(held.version(), "10.3");
    }
}
