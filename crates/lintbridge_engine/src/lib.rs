//! # lintbridge_engine
//!
//! Versioned bridge to a sandboxed static-analysis engine.
//!
//! This crate provides:
//! - The runtime abstraction over a loaded engine release
//! - Release family detection and the per-family call shapes
//! - Engine handles with serialised access
//! - Replay of audit events into a diagnostic collector
//! - Resolution of diagnostics against text buffers
//! - Classification of engine faults
//!
//! ## Architecture
//!
//! An engine release is a WebAssembly module exposing a small set of
//! exports. Releases differ in how they accept a configuration, so each
//! family is implemented once behind [`api::EngineApi`] and selected when
//! the [`EngineAdapter`] is created.
//!
//! ## Features
//!
//! - `native` (default): Extism backend ([`ExtismRuntime`])
//! - `test-utils`: scripted in-memory runtime for tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lintbridge_engine::{CheckerSettings, EngineAdapter, ExecutionContext, ExtismRuntime, ScanOptions};
//!
//! let runtime = ExtismRuntime::load_file("10.3", "engines/checkstyle-10.3.wasm".as_ref())?;
//! let adapter = EngineAdapter::new(Arc::new(runtime))?;
//! let handle = adapter.create_checker(config, &ExecutionContext::default(), CheckerSettings::default())?;
//! let results = adapter.scan(&handle, &[&buffer], &ScanOptions::default())?;
//! ```

mod adapter;
pub mod api;
mod collector;
mod diagnostic;
mod error;
mod fault;
mod handle;
mod peruse;
mod problem;
mod registry;
mod runtime;
mod taxonomy;
pub mod wire;

#[cfg(feature = "native")]
mod runtime_extism;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapter::EngineAdapter;
pub use api::ReleaseFamily;
pub use collector::{AuditListener, DiagnosticCollector, replay};
pub use diagnostic::{AuditEvent, Diagnostic, Severity};
pub use error::{BridgeError, ErrorKind};
pub use fault::EngineFault;
pub use handle::{CheckerSettings, EngineHandle};
pub use peruse::{ConfigurationModule, KnownToken, peruse};
pub use problem::{AcceptanceCheck, ProblemResolver, ResolvedProblem, ScanOptions, ScanResults};
pub use registry::EngineRegistry;
pub use runtime::{EngineInstance, EngineRuntime, ExecutionContext, RUNTIME_FAULT};
pub use taxonomy::{ENGINE_EXCEPTION, FaultTaxonomy};

#[cfg(feature = "native")]
pub use runtime_extism::ExtismRuntime;
