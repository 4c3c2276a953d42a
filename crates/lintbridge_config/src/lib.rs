//! # lintbridge_config
//!
//! Rule configuration handling for lintbridge.
//!
//! This crate provides:
//! - The immutable [`RuleConfig`] tree
//! - Loading from files, URLs, class path resources, bundled configurations
//!   or literal text with `${name}` substitution
//! - Rewriting of file-valued module attributes against project directories
//! - The tool's own settings file
//!
//! ## Example
//!
//! ```rust,ignore
//! use lintbridge_config::{ConfigLoader, ConfigSource, ModuleContext, Variables};
//!
//! let context = ModuleContext::new("/work/project").with_config_dir("/work/project/config");
//! let config = ConfigLoader::new(Variables::Ignore)
//!     .with_locator(&context)
//!     .load(&ConfigSource::from_location("/work/project/config/checks.xml"))?;
//! println!("{} top-level modules", config.children().len());
//! ```

mod bundled;
mod error;
mod loader;
pub mod locator;
mod model;
pub mod notify;
mod parser;
pub mod property;
mod settings;
mod source;

pub use bundled::BundledConfig;
pub use error::ConfigError;
pub use loader::{ConfigLoader, Variables, file_attribute_for, rewrite_file_paths};
pub use locator::{FileLocator, ModuleContext, absolute_normalized, normalize_path};
pub use model::{RuleConfig, RuleConfigBuilder, TREE_WALKER};
pub use notify::{CollectingNotifier, Notifier, TracingNotifier};
pub use parser::parse_rule_config;
pub use property::{IgnoringResolver, MapResolver, PropertyResolver};
pub use settings::{BridgeSettings, SETTINGS_FILE_NAME};
pub use source::ConfigSource;
