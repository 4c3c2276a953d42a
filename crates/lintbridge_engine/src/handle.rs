//! Configured engine instances.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use lintbridge_config::RuleConfig;
use lintbridge_text::DEFAULT_TAB_WIDTH;
use parking_lot::{Mutex, MutexGuard};

use crate::runtime::EngineInstance;

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Per-checker values derived from the rule configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerSettings {
    /// Tab width used to map engine columns to offsets.
    pub tab_width: usize,
    /// Directory engine-reported file names are relative to.
    pub base_dir: Option<PathBuf>,
}

impl Default for CheckerSettings {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
            base_dir: None,
        }
    }
}

/// A live, configured engine instance together with its configuration.
///
/// Handles are created by [`crate::EngineAdapter::create_checker`] and
/// remember which adapter made them. Scans against one handle never overlap.
/// Handles are not destroyed when dropped from a cache; call
/// [`crate::EngineAdapter::destroy`].
pub struct EngineHandle {
    id: u64,
    adapter_id: u64,
    version: String,
    config: Arc<RuleConfig>,
    settings: CheckerSettings,
    instance: Mutex<Box<dyn EngineInstance>>,
    created_at: Instant,
    destroyed: AtomicBool,
}

impl EngineHandle {
    pub(crate) fn new(
        adapter_id: u64,
        version: String,
        config: Arc<RuleConfig>,
        settings: CheckerSettings,
        instance: Box<dyn EngineInstance>,
    ) -> Self {
        Self {
            id: NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed),
            adapter_id,
            version,
            config,
            settings,
            instance: Mutex::new(instance),
            created_at: Instant::now(),
            destroyed: AtomicBool::new(false),
        }
    }

    /// Unique identifier of this handle.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Engine version the handle was created with.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Rule configuration the engine was configured with.
    pub fn config(&self) -> &Arc<RuleConfig> {
        &self.config
    }

    pub fn settings(&self) -> &CheckerSettings {
        &self.settings
    }

    pub fn tab_width(&self) -> usize {
        self.settings.tab_width
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.settings.base_dir.as_deref()
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// True once the handle has been destroyed.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    pub(crate) fn adapter_id(&self) -> u64 {
        self.adapter_id
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Box<dyn EngineInstance>> {
        self.instance.lock()
    }

    /// Marks the handle destroyed; returns false if it already was.
    pub(crate) fn mark_destroyed(&self) -> bool {
        !self.destroyed.swap(true, Ordering::AcqRel)
    }
}

impl fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineHandle")
            .field("id", &self.id)
            .field("version", &self.version)
            .field("config", &self.config.name())
            .field("settings", &self.settings)
            .field("destroyed", &self.is_destroyed())
            .finish_non_exhaustive()
    }
}
