//! Audit listener collecting diagnostics for one scan.

use tracing::{debug, warn};

use crate::{AuditEvent, Diagnostic, EngineFault};

/// Receives the engine's audit callbacks.
pub trait AuditListener {
    fn audit_started(&mut self);

    fn file_started(&mut self, _file: &str) {}

    fn add_diagnostic(&mut self, diagnostic: Diagnostic);

    /// The engine failed on a file.
    fn add_exception(&mut self, diagnostic: Diagnostic, fault: &EngineFault);

    fn file_finished(&mut self, _file: &str) {}

    fn audit_finished(&mut self);
}

/// Feeds recorded audit events to a listener, in order.
///
/// Returns whether the stream contained `AuditFinished`.
pub fn replay(events: Vec<AuditEvent>, listener: &mut dyn AuditListener) -> bool {
    let mut finished = false;
    for event in events {
        match event {
            AuditEvent::AuditStarted => listener.audit_started(),
            AuditEvent::FileStarted { file } => listener.file_started(&file),
            AuditEvent::Diagnostic { diagnostic } => listener.add_diagnostic(diagnostic),
            AuditEvent::Exception { diagnostic, fault } => listener.add_exception(diagnostic, &fault),
            AuditEvent::FileFinished { file } => listener.file_finished(&file),
            AuditEvent::AuditFinished => {
                listener.audit_finished();
                finished = true;
            }
        }
    }
    finished
}

/// Accumulates diagnostics and hands them on when the audit finishes.
pub struct DiagnosticCollector<F>
where
    F: FnMut(Vec<Diagnostic>),
{
    diagnostics: Vec<Diagnostic>,
    on_finished: F,
}

impl<F> DiagnosticCollector<F>
where
    F: FnMut(Vec<Diagnostic>),
{
    /// Creates a collector that passes the full list to `on_finished`.
    pub fn new(on_finished: F) -> Self {
        Self {
            diagnostics: Vec::new(),
            on_finished,
        }
    }

    /// Diagnostics collected so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl<F> AuditListener for DiagnosticCollector<F>
where
    F: FnMut(Vec<Diagnostic>),
{
    fn audit_started(&mut self) {
        self.diagnostics.clear();
    }

    fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn add_exception(&mut self, diagnostic: Diagnostic, fault: &EngineFault) {
        warn!(
            "Engine exception while checking {}: {}",
            diagnostic.file, fault
        );
        self.diagnostics.push(diagnostic);
    }

    fn audit_finished(&mut self) {
        debug!("Audit finished with {} diagnostics", self.diagnostics.len());
        (self.on_finished)(self.diagnostics.clone());
    }
}
