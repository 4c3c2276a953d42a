//! Time-bounded cache of configured checkers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lintbridge_engine::{BridgeError, EngineHandle};
use parking_lot::Mutex;
use tracing::debug;

use crate::CheckerKey;

/// How long a checker stays valid after its last fetch.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

struct Entry {
    handle: Arc<EngineHandle>,
    last_fetch: Instant,
}

/// One key's entry. Its mutex is held while the checker is built, so
/// concurrent requests for the same key wait for a single build.
#[derive(Default)]
struct Slot {
    entry: Mutex<Option<Entry>>,
}

/// Caches engine handles per [`CheckerKey`].
///
/// Replaced and invalidated handles are handed back or dropped, never
/// destroyed; that is up to the caller.
pub struct CheckerCache {
    ttl: Duration,
    slots: Mutex<HashMap<CheckerKey, Arc<Slot>>>,
}

impl CheckerCache {
    /// Creates a cache with the default window.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached handle for `key`, building one with `build` when
    /// there is none or it has gone stale.
    pub fn get<F>(&self, key: &CheckerKey, build: F) -> Result<Arc<EngineHandle>, BridgeError>
    where
        F: FnOnce() -> Result<EngineHandle, BridgeError>,
    {
        loop {
            let slot = self.slots.lock().entry(key.clone()).or_default().clone();
            let mut entry = slot.entry.lock();

            // An invalidation may have drained the map before the lock was
            // taken; anything built into that slot would be unreachable.
            if !self.is_current(key, &slot) {
                debug!("Checker slot for {} was invalidated, retrying", key);
                continue;
            }

            let now = Instant::now();
            if let Some(cached) = entry.as_mut() {
                if now.duration_since(cached.last_fetch) < self.ttl && !cached.handle.is_destroyed() {
                    debug!("Checker cache hit: {}", key);
                    cached.last_fetch = now;
                    return Ok(cached.handle.clone());
                }
                debug!("Checker for {} is stale", key);
            } else {
                debug!("Checker cache miss: {}", key);
            }

            let handle = Arc::new(build()?);
            *entry = Some(Entry {
                handle: handle.clone(),
                last_fetch: Instant::now(),
            });
            return Ok(handle);
        }
    }

    fn is_current(&self, key: &CheckerKey, slot: &Arc<Slot>) -> bool {
        self.slots
            .lock()
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
    }

    /// Empties the cache and returns the handles it held.
    ///
    /// A build already under way finishes first and its handle is returned
    /// here rather than cached.
    pub fn invalidate(&self) -> Vec<Arc<EngineHandle>> {
        let slots: Vec<Arc<Slot>> = self.slots.lock().drain().map(|(_, slot)| slot).collect();
        let handles: Vec<Arc<EngineHandle>> = slots
            .iter()
            .filter_map(|slot| slot.entry.lock().take())
            .map(|entry| entry.handle)
            .collect();
        debug!("Invalidated {} cached checkers", handles.len());
        handles
    }

    /// Number of cached handles.
    pub fn len(&self) -> usize {
        let slots: Vec<Arc<Slot>> = self.slots.lock().values().cloned().collect();
        slots.iter().filter(|slot| slot.entry.lock().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CheckerCache {
    fn default() -> Self {
        Self::new()
    }
}
