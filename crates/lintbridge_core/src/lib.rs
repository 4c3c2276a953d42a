//! # lintbridge_core
//!
//! Checker lifecycle and scanning for lintbridge.
//!
//! This crate provides:
//! - [`CheckerRequest`] and its cache key
//! - [`CheckerFactory`], which loads a configuration and configures an engine
//! - [`CheckerCache`], a time-bounded, single-flight cache of checkers
//! - Acceptance checks refining engine reports
//! - [`Scanner`], tying the above together
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lintbridge_config::{ConfigSource, ModuleContext};
//! use lintbridge_core::{CheckerRequest, Scanner};
//!
//! let scanner = Scanner::new(Arc::new(adapter));
//! let request = CheckerRequest::new(
//!     ConfigSource::from_location("config/checkstyle.xml"),
//!     ModuleContext::new("/work/project"),
//! );
//! let results = scanner.scan(&request, &[&buffer], false)?;
//! ```

mod cache;
pub mod checks;
mod factory;
mod request;
mod scanner;

pub use cache::{CheckerCache, DEFAULT_TTL};
pub use factory::{CheckerFactory, base_dir, effective_properties, load_rule_config, tab_width};
pub use request::{CheckerKey, CheckerRequest};
pub use scanner::Scanner;
