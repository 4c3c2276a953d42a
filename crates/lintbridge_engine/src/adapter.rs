//! Entry point for talking to one engine release.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use lintbridge_config::RuleConfig;
use lintbridge_text::TextBuffer;
use tracing::{debug, info, warn};

use crate::api::{CallError, EngineApi, ReleaseFamily, select_api};
use crate::collector::{AuditListener, DiagnosticCollector, replay};
use crate::handle::{CheckerSettings, EngineHandle};
use crate::peruse::{ConfigurationModule, peruse};
use crate::problem::{ProblemResolver, ScanOptions, ScanResults};
use crate::runtime::{EngineRuntime, ExecutionContext};
use crate::taxonomy::FaultTaxonomy;
use crate::BridgeError;

static NEXT_ADAPTER_ID: AtomicU64 = AtomicU64::new(1);

/// Drives one loaded engine release.
///
/// The release family is detected once, when the adapter is created. Every
/// handle remembers the adapter that made it and is rejected by any other.
pub struct EngineAdapter {
    id: u64,
    runtime: Arc<dyn EngineRuntime>,
    api: Box<dyn EngineApi>,
    taxonomy: FaultTaxonomy,
}

impl EngineAdapter {
    /// Creates an adapter for `runtime`.
    pub fn new(runtime: Arc<dyn EngineRuntime>) -> Result<Self, BridgeError> {
        let api = select_api(runtime.as_ref()).ok_or_else(|| {
            BridgeError::internal(format!(
                "Engine {} exports no supported configuration API",
                runtime.version()
            ))
        })?;

        let id = NEXT_ADAPTER_ID.fetch_add(1, Ordering::Relaxed);
        info!(
            "Engine adapter {} ready for version {} ({:?})",
            id,
            runtime.version(),
            api.family()
        );

        Ok(Self {
            id,
            runtime,
            api,
            taxonomy: FaultTaxonomy::default(),
        })
    }

    /// Replaces the fault classification rules.
    pub fn with_taxonomy(mut self, taxonomy: FaultTaxonomy) -> Self {
        self.taxonomy = taxonomy;
        self
    }

    pub fn version(&self) -> &str {
        self.runtime.version()
    }

    pub fn family(&self) -> ReleaseFamily {
        self.api.family()
    }

    fn call_error(&self, error: CallError) -> BridgeError {
        match error {
            CallError::Fault(fault) => self.taxonomy.wrap(fault),
            CallError::Codec(message) => {
                BridgeError::internal(format!("Malformed engine payload: {}", message))
            }
        }
    }

    fn check_handle(&self, handle: &EngineHandle) -> Result<(), BridgeError> {
        if handle.adapter_id() != self.id {
            return Err(BridgeError::internal(format!(
                "Checker {} belongs to engine {} and cannot be used with engine {}",
                handle.id(),
                handle.version(),
                self.version()
            )));
        }
        if handle.is_destroyed() {
            return Err(BridgeError::internal(format!(
                "Checker {} has been destroyed",
                handle.id()
            )));
        }
        Ok(())
    }

    /// Creates a configured engine instance for `config`.
    pub fn create_checker(
        &self,
        config: Arc<RuleConfig>,
        context: &ExecutionContext,
        settings: CheckerSettings,
    ) -> Result<EngineHandle, BridgeError> {
        debug!(
            "Creating checker for '{}' on engine {}",
            config.name(),
            self.version()
        );

        let mut instance = self
            .runtime
            .instantiate(context)
            .map_err(|fault| self.taxonomy.wrap(fault))?;
        self.api
            .bind_class_path(instance.as_mut(), context)
            .map_err(|e| self.call_error(e))?;
        self.api
            .configure(instance.as_mut(), &config)
            .map_err(|e| self.call_error(e))?;

        let handle = EngineHandle::new(
            self.id,
            self.version().to_string(),
            config,
            settings,
            instance,
        );
        info!("Created checker {} on engine {}", handle.id(), self.version());
        Ok(handle)
    }

    /// Releases the engine-side resources of `handle`.
    pub fn destroy(&self, handle: &EngineHandle) -> Result<(), BridgeError> {
        self.check_handle(handle)?;

        let mut instance = handle.lock();
        if !handle.mark_destroyed() {
            return Err(BridgeError::internal(format!(
                "Checker {} has been destroyed",
                handle.id()
            )));
        }
        debug!("Destroying checker {}", handle.id());
        self.api
            .destroy(&mut **instance)
            .map_err(|e| self.call_error(e))
    }

    /// Runs the checker over `buffers` and resolves the reported problems.
    ///
    /// Scans against one handle are serialised. The handle's lock is
    /// released before diagnostics are mapped onto the buffers.
    pub fn scan(
        &self,
        handle: &EngineHandle,
        buffers: &[&dyn TextBuffer],
        options: &ScanOptions,
    ) -> Result<ScanResults, BridgeError> {
        self.check_handle(handle)?;
        if buffers.is_empty() {
            return Ok(ScanResults::new());
        }

        let files: Vec<&Path> = buffers.iter().map(|buffer| buffer.path()).collect();
        let events = {
            let mut instance = handle.lock();
            if handle.is_destroyed() {
                return Err(BridgeError::internal(format!(
                    "Checker {} has been destroyed",
                    handle.id()
                )));
            }
            self.api
                .process(&mut **instance, &files)
                .map_err(|e| self.call_error(e))?
        };
        debug!(
            "Checker {} reported {} audit events for {} files",
            handle.id(),
            events.len(),
            files.len()
        );

        let resolver = ProblemResolver::new(buffers, handle.tab_width(), handle.base_dir(), options);
        let mut results = ScanResults::new();
        {
            let mut collector =
                DiagnosticCollector::new(|diagnostics| results = resolver.resolve(diagnostics));
            if !replay(events, &mut collector) {
                warn!("Engine did not report the end of the audit");
                collector.audit_finished();
            }
        }
        Ok(results)
    }

    /// Walks `config` in pre-order.
    pub fn peruse(&self, config: &RuleConfig, visitor: &mut dyn FnMut(&ConfigurationModule)) {
        peruse(config, visitor);
    }
}

impl std::fmt::Debug for EngineAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineAdapter")
            .field("id", &self.id)
            .field("version", &self.version())
            .field("family", &self.family())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        DESTROY, LOAD_CONFIGURATION, LOAD_CONFIGURATION_STREAM, PROCESS, SET_CLASS_LOADER,
        SET_CLASSLOADER,
    };
    use crate::taxonomy::ENGINE_EXCEPTION;
    use crate::test_utils::ScriptedRuntime;
    use crate::wire::{self, ClassPathRequest, ProcessRequest};
    use crate::{AuditEvent, Diagnostic, EngineFault, ErrorKind};
    use lintbridge_text::{Anchor, SourceText};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn config() -> Arc<RuleConfig> {
        Arc::new(
            RuleConfig::builder("Checker")
                .child(
                    RuleConfig::builder("TreeWalker")
                        .child(RuleConfig::builder("MemberName").build())
                        .build(),
                )
                .build(),
        )
    }

    fn adapter(runtime: &ScriptedRuntime) -> EngineAdapter {
        EngineAdapter::new(Arc::new(runtime.clone())).unwrap()
    }

    #[test]
    fn test_prefers_current_family() {
        let runtime = ScriptedRuntime::with_exports(
            "10.3",
            &[
                PROCESS,
                LOAD_CONFIGURATION,
                LOAD_CONFIGURATION_STREAM,
                SET_CLASS_LOADER,
                SET_CLASSLOADER,
            ],
        );
        assert_eq!(adapter(&runtime).family(), ReleaseFamily::Current);
        assert_eq!(adapter(&ScriptedRuntime::legacy("8.0")).family(), ReleaseFamily::Legacy);
    }

    #[test]
    fn test_unknown_api_is_internal_error() {
        let runtime = ScriptedRuntime::with_exports("0.1", &[PROCESS]);
        let err = EngineAdapter::new(Arc::new(runtime)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.to_string().contains("0.1"));
    }

    #[test]
    fn test_current_release_gets_structured_configuration() {
        let runtime = ScriptedRuntime::current("10.3");
        let context = ExecutionContext::new(vec![PathBuf::from("/work/classes")]);
        adapter(&runtime)
            .create_checker(config(), &context, CheckerSettings::default())
            .unwrap();

        let exports: Vec<String> = runtime.calls().into_iter().map(|c| c.export).collect();
        assert_eq!(exports, vec![SET_CLASS_LOADER, LOAD_CONFIGURATION]);

        let bind: ClassPathRequest = wire::decode(&runtime.calls()[0].input).unwrap();
        assert_eq!(bind.class_path, vec!["/work/classes".to_string()]);

        let sent: RuleConfig = wire::decode(&runtime.calls()[1].input).unwrap();
        assert_eq!(sent, *config());
    }

    #[test]
    fn test_legacy_release_gets_rule_xml() {
        let runtime = ScriptedRuntime::legacy("8.0");
        adapter(&runtime)
            .create_checker(config(), &ExecutionContext::default(), CheckerSettings::default())
            .unwrap();

        let exports: Vec<String> = runtime.calls().into_iter().map(|c| c.export).collect();
        assert_eq!(exports, vec![SET_CLASSLOADER, LOAD_CONFIGURATION_STREAM]);

        let xml = runtime.calls()[1].input_text();
        assert!(xml.contains(r#"<module name="Checker">"#));
        assert!(xml.contains(r#"<module name="MemberName">"#));
    }

    #[test]
    fn test_configuration_fault_is_classified() {
        let runtime = ScriptedRuntime::current("10.3").with_configure_fault(
            EngineFault::new(ENGINE_EXCEPTION, "cannot initialize module TreeWalker")
                .caused_by(EngineFault::new("java.lang.NullPointerException", "")),
        );

        let err = adapter(&runtime)
            .create_checker(config(), &ExecutionContext::default(), CheckerSettings::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_instantiation_fault_outside_engine_is_internal() {
        let runtime = ScriptedRuntime::current("10.3")
            .with_instantiate_fault(EngineFault::new("lintbridge.RuntimeFault", "no memory"));

        let err = adapter(&runtime)
            .create_checker(config(), &ExecutionContext::default(), CheckerSettings::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_scan_resolves_problems() {
        let runtime = ScriptedRuntime::current("10.3").with_diagnostics(vec![
            Diagnostic::new("/src/A.java", 2, 4, "Name 'X' must match pattern")
                .with_source("com.puppycrawl.tools.checkstyle.checks.naming.MemberNameCheck"),
        ]);
        let adapter = adapter(&runtime);
        let handle = adapter
            .create_checker(
                config(),
                &ExecutionContext::default(),
                CheckerSettings {
                    tab_width: 4,
                    base_dir: None,
                },
            )
            .unwrap();

        let buffer = SourceText::new("/src/A.java", "class A {\n\tint X;\n}\n");
        let results = adapter
            .scan(&handle, &[&buffer], &ScanOptions::default())
            .unwrap();

        let problems = &results[Path::new("/src/A.java")];
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].offset, 11);
        assert!(matches!(problems[0].anchor, Anchor::Element(_)));

        let request: ProcessRequest = wire::decode(&runtime.calls_to(PROCESS)[0].input).unwrap();
        assert_eq!(request.files, vec!["/src/A.java".to_string()]);
    }

    #[test]
    fn test_scan_of_nothing_skips_engine() {
        let runtime = ScriptedRuntime::current("10.3");
        let adapter = adapter(&runtime);
        let handle = adapter
            .create_checker(config(), &ExecutionContext::default(), CheckerSettings::default())
            .unwrap();

        let results = adapter.scan(&handle, &[], &ScanOptions::default()).unwrap();
        assert!(results.is_empty());
        assert!(runtime.calls_to(PROCESS).is_empty());
    }

    #[test]
    fn test_scan_fault_is_tool_error() {
        let runtime = ScriptedRuntime::current("10.3").with_process_fault(
            EngineFault::new(ENGINE_EXCEPTION, "Exception was thrown while processing A.java")
                .caused_by(EngineFault::new("java.io.FileNotFoundException", "A.java")),
        );
        let adapter = adapter(&runtime);
        let handle = adapter
            .create_checker(config(), &ExecutionContext::default(), CheckerSettings::default())
            .unwrap();

        let buffer = SourceText::new("/src/A.java", "class A {}\n");
        let err = adapter
            .scan(&handle, &[&buffer], &ScanOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Tool);
    }

    #[test]
    fn test_unfinished_audit_still_resolves() {
        let runtime = ScriptedRuntime::current("10.3").with_responder(|_| {
            Ok(vec![
                AuditEvent::AuditStarted,
                AuditEvent::Diagnostic {
                    diagnostic: Diagnostic::new("/src/A.java", 1, 0, "partial"),
                },
            ])
        });
        let adapter = adapter(&runtime);
        let handle = adapter
            .create_checker(config(), &ExecutionContext::default(), CheckerSettings::default())
            .unwrap();

        let buffer = SourceText::new("/src/A.java", "class A {}\n");
        let results = adapter
            .scan(&handle, &[&buffer], &ScanOptions::default())
            .unwrap();
        assert_eq!(results[Path::new("/src/A.java")][0].message, "partial");
    }

    #[test]
    fn test_handle_from_other_adapter_is_rejected() {
        let first = adapter(&ScriptedRuntime::current("10.3"));
        let second = adapter(&ScriptedRuntime::current("10.4"));
        let handle = first
            .create_checker(config(), &ExecutionContext::default(), CheckerSettings::default())
            .unwrap();

        let buffer = SourceText::new("/src/A.java", "class A {}\n");
        let err = second
            .scan(&handle, &[&buffer], &ScanOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(second.destroy(&handle).unwrap_err().kind(), ErrorKind::Internal);
        assert!(!handle.is_destroyed());
    }

    #[test]
    fn test_destroy_calls_export_once() {
        let runtime = ScriptedRuntime::current("10.3");
        let adapter = adapter(&runtime);
        let handle = adapter
            .create_checker(config(), &ExecutionContext::default(), CheckerSettings::default())
            .unwrap();

        adapter.destroy(&handle).unwrap();
        assert!(handle.is_destroyed());
        assert_eq!(runtime.calls_to(DESTROY).len(), 1);

        let buffer = SourceText::new("/src/A.java", "class A {}\n");
        let err = adapter
            .scan(&handle, &[&buffer], &ScanOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(adapter.destroy(&handle).unwrap_err().kind(), ErrorKind::Internal);
        assert_eq!(runtime.calls_to(DESTROY).len(), 1);
    }

    #[test]
    fn test_destroy_without_export_only_marks_handle() {
        let runtime = ScriptedRuntime::legacy("8.0");
        let adapter = adapter(&runtime);
        let handle = adapter
            .create_checker(config(), &ExecutionContext::default(), CheckerSettings::default())
            .unwrap();

        adapter.destroy(&handle).unwrap();
        assert!(handle.is_destroyed());
        assert!(runtime.calls_to(DESTROY).is_empty());
    }

    #[test]
    fn test_scans_on_one_handle_do_not_overlap() {
        let runtime = ScriptedRuntime::current("10.3")
            .with_process_delay(std::time::Duration::from_millis(20));
        let adapter = adapter(&runtime);
        let handle = adapter
            .create_checker(config(), &ExecutionContext::default(), CheckerSettings::default())
            .unwrap();

        std::thread::scope(|scope| {
            for i in 0..4 {
                let adapter = &adapter;
                let handle = &handle;
                scope.spawn(move || {
                    let buffer = SourceText::new(format!("/src/F{i}.java"), "class F {}\n");
                    adapter
                        .scan(handle, &[&buffer], &ScanOptions::default())
                        .unwrap();
                });
            }
        });

        assert_eq!(runtime.calls_to(PROCESS).len(), 4);
        assert_eq!(runtime.max_concurrent_process(), 1);
    }

    #[test]
    fn test_peruse_visits_every_module() {
        let adapter = adapter(&ScriptedRuntime::current("10.3"));
        let mut names = Vec::new();
        adapter.peruse(&config(), &mut |module| names.push(module.name.clone()));
        assert_eq!(names, vec!["Checker", "TreeWalker", "MemberName"]);
    }
}
