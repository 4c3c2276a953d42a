//! Scripted engine runtime for tests.
//!
//! Enabled with the `test-utils` feature.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use crate::api::{
    DESTROY, LOAD_CONFIGURATION, LOAD_CONFIGURATION_STREAM, PROCESS, SET_CLASS_LOADER,
    SET_CLASSLOADER,
};
use crate::runtime::{EngineInstance, EngineRuntime, ExecutionContext};
use crate::wire::{self, ProcessRequest};
use crate::{AuditEvent, Diagnostic, EngineFault};

type Responder = Arc<dyn Fn(&[String]) -> Result<Vec<AuditEvent>, EngineFault> + Send + Sync>;

/// One export call seen by a [`ScriptedRuntime`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Sequence number of the instance, starting at 1.
    pub instance: usize,
    pub export: String,
    pub input: Vec<u8>,
}

impl RecordedCall {
    /// Input decoded as UTF-8.
    pub fn input_text(&self) -> String {
        String::from_utf8_lossy(&self.input).into_owned()
    }
}

#[derive(Default)]
struct Script {
    calls: Vec<RecordedCall>,
    responder: Option<Responder>,
    configure_fault: Option<EngineFault>,
    instantiate_fault: Option<EngineFault>,
    process_delay: Duration,
    active: usize,
    max_active: usize,
}

/// An in-memory engine release with scripted behaviour.
///
/// Clones share their script and call log, so a test can keep one clone
/// after handing another to an adapter.
#[derive(Clone)]
pub struct ScriptedRuntime {
    version: String,
    exports: BTreeSet<String>,
    script: Arc<Mutex<Script>>,
    instances: Arc<AtomicUsize>,
}

impl ScriptedRuntime {
    /// A release with the given exports.
    pub fn with_exports(version: impl Into<String>, exports: &[&str]) -> Self {
        Self {
            version: version.into(),
            exports: exports.iter().map(|e| e.to_string()).collect(),
            script: Arc::new(Mutex::new(Script::default())),
            instances: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A release of the current family.
    pub fn current(version: impl Into<String>) -> Self {
        Self::with_exports(version, &[PROCESS, LOAD_CONFIGURATION, SET_CLASS_LOADER, DESTROY])
    }

    /// A release of the legacy family without `destroy`.
    pub fn legacy(version: impl Into<String>) -> Self {
        Self::with_exports(version, &[PROCESS, LOAD_CONFIGURATION_STREAM, SET_CLASSLOADER])
    }

    /// Answers every `process` call with `responder`.
    pub fn with_responder<F>(self, responder: F) -> Self
    where
        F: Fn(&[String]) -> Result<Vec<AuditEvent>, EngineFault> + Send + Sync + 'static,
    {
        self.script.lock().responder = Some(Arc::new(responder));
        self
    }

    /// Answers every `process` call with a complete audit of `diagnostics`.
    pub fn with_diagnostics(self, diagnostics: Vec<Diagnostic>) -> Self {
        self.with_responder(move |_| Ok(audit_of(diagnostics.clone())))
    }

    /// Fails every `process` call with `fault`.
    pub fn with_process_fault(self, fault: EngineFault) -> Self {
        self.with_responder(move |_| Err(fault.clone()))
    }

    /// Fails configuration loading with `fault`.
    pub fn with_configure_fault(self, fault: EngineFault) -> Self {
        self.script.lock().configure_fault = Some(fault);
        self
    }

    /// Fails instantiation with `fault`.
    pub fn with_instantiate_fault(self, fault: EngineFault) -> Self {
        self.script.lock().instantiate_fault = Some(fault);
        self
    }

    /// Makes every `process` call take at least `delay`.
    pub fn with_process_delay(self, delay: Duration) -> Self {
        self.script.lock().process_delay = delay;
        self
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.script.lock().calls.clone()
    }

    /// Calls of one export.
    pub fn calls_to(&self, export: &str) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|c| c.export == export).collect()
    }

    /// Number of instances created.
    pub fn instances_created(&self) -> usize {
        self.instances.load(Ordering::SeqCst)
    }

    /// Highest number of `process` calls observed running at once.
    pub fn max_concurrent_process(&self) -> usize {
        self.script.lock().max_active
    }
}

impl EngineRuntime for ScriptedRuntime {
    fn version(&self) -> &str {
        &self.version
    }

    fn has_export(&self, name: &str) -> bool {
        self.exports.contains(name)
    }

    fn instantiate(&self, _context: &ExecutionContext) -> Result<Box<dyn EngineInstance>, EngineFault> {
        if let Some(fault) = self.script.lock().instantiate_fault.clone() {
            return Err(fault);
        }
        let id = self.instances.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Box::new(ScriptedInstance {
            id,
            script: self.script.clone(),
        }))
    }
}

struct ScriptedInstance {
    id: usize,
    script: Arc<Mutex<Script>>,
}

impl ScriptedInstance {
    fn process(&self, input: &[u8]) -> Result<Vec<u8>, EngineFault> {
        let (responder, delay) = {
            let mut script = self.script.lock();
            script.active += 1;
            script.max_active = script.max_active.max(script.active);
            (script.responder.clone(), script.process_delay)
        };

        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        let result = wire::decode::<ProcessRequest>(input)
            .map_err(|e| EngineFault::new("java.io.IOException", e))
            .and_then(|request| match &responder {
                Some(responder) => responder(&request.files),
                None => Ok(audit_of(Vec::new())),
            })
            .and_then(|events| {
                wire::encode(&events).map_err(|e| EngineFault::new("java.io.IOException", e))
            });

        self.script.lock().active -= 1;
        result
    }
}

impl EngineInstance for ScriptedInstance {
    fn call(&mut self, export: &str, input: &[u8]) -> Result<Vec<u8>, EngineFault> {
        let configure_fault = {
            let mut script = self.script.lock();
            script.calls.push(RecordedCall {
                instance: self.id,
                export: export.to_string(),
                input: input.to_vec(),
            });
            script.configure_fault.clone()
        };

        match export {
            PROCESS => self.process(input),
            LOAD_CONFIGURATION | LOAD_CONFIGURATION_STREAM => match configure_fault {
                Some(fault) => Err(fault),
                None => Ok(Vec::new()),
            },
            _ => Ok(Vec::new()),
        }
    }
}

/// A complete audit reporting `diagnostics`.
pub fn audit_of(diagnostics: Vec<Diagnostic>) -> Vec<AuditEvent> {
    let mut events = vec![AuditEvent::AuditStarted];
    events.extend(
        diagnostics
            .into_iter()
            .map(|diagnostic| AuditEvent::Diagnostic { diagnostic }),
    );
    events.push(AuditEvent::AuditFinished);
    events
}
