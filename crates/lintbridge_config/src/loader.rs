//! Rule configuration loading.
//!
//! Loading reads the source, substitutes `${name}` references and, when a
//! [`FileLocator`] is supplied, rewrites the handful of attributes that name
//! files so the engine receives paths it can open.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::locator::FileLocator;
use crate::model::TREE_WALKER;
use crate::notify::{Notifier, TracingNotifier};
use crate::parser::parse_rule_config;
use crate::property::{IgnoringResolver, MapResolver, PropertyResolver};
use crate::{ConfigError, ConfigSource, RuleConfig};

/// Modules whose file-valued attribute is rewritten, and that attribute.
const FILE_ATTRIBUTES: &[(&str, &str)] = &[
    ("Header", "headerFile"),
    ("RegexpHeader", "headerFile"),
    ("SuppressionFilter", "file"),
    ("ImportControl", "file"),
];

/// Returns the file-valued attribute rewritten for a module, if any.
pub fn file_attribute_for(module: &str) -> Option<&'static str> {
    FILE_ATTRIBUTES
        .iter()
        .find(|(name, _)| *name == module)
        .map(|(_, attribute)| *attribute)
}

/// How `${name}` references are substituted.
#[derive(Debug, Clone, Default)]
pub enum Variables {
    /// Every reference becomes the empty string.
    #[default]
    Ignore,
    /// References are looked up in the map; unbound ones stay as written.
    Bind(BTreeMap<String, String>),
}

impl Variables {
    fn resolver(&self) -> Box<dyn PropertyResolver + '_> {
        match self {
            Self::Ignore => Box::new(IgnoringResolver),
            Self::Bind(values) => Box::new(MapResolver::new(values.clone())),
        }
    }
}

/// Loads rule configurations.
///
/// # Example
///
/// ```rust,ignore
/// use lintbridge_config::{ConfigLoader, ConfigSource, ModuleContext, Variables};
///
/// let context = ModuleContext::new("/work/project");
/// let config = ConfigLoader::new(Variables::Ignore)
///     .with_locator(&context)
///     .load(&ConfigSource::from_location("config/checks.xml"))?;
/// ```
pub struct ConfigLoader<'a> {
    variables: Variables,
    locator: Option<&'a dyn FileLocator>,
    class_path: &'a [PathBuf],
    notifier: &'a dyn Notifier,
}

impl<'a> ConfigLoader<'a> {
    /// Creates a loader that does not rewrite file paths and logs
    /// notifications through `tracing`.
    pub fn new(variables: Variables) -> Self {
        Self {
            variables,
            locator: None,
            class_path: &[],
            notifier: &TracingNotifier,
        }
    }

    /// Rewrites file-valued attributes using `locator`.
    pub fn with_locator(mut self, locator: &'a dyn FileLocator) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Searches `class_path` for class path sources.
    pub fn with_class_path(mut self, class_path: &'a [PathBuf]) -> Self {
        self.class_path = class_path;
        self
    }

    /// Sends path resolution problems to `notifier`.
    pub fn with_notifier(mut self, notifier: &'a dyn Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    /// Loads and, if a locator is set, path-rewrites the configuration.
    pub fn load(&self, source: &ConfigSource) -> Result<RuleConfig, ConfigError> {
        let text = source.read_with(self.class_path)?;
        let config = self.load_text(&text, &source.to_string())?;
        info!("Loaded rule configuration from {}", source);
        Ok(config)
    }

    fn load_text(&self, text: &str, origin: &str) -> Result<RuleConfig, ConfigError> {
        let resolver = self.variables.resolver();
        let config = parse_rule_config(text, resolver.as_ref(), origin)?;

        Ok(match self.locator {
            Some(locator) => rewrite_file_paths(&config, locator, self.notifier),
            None => config,
        })
    }
}

/// Rewrites the file-valued attributes of the root's children and of the
/// `TreeWalker` subtree. Other modules are not visited.
pub fn rewrite_file_paths(
    root: &RuleConfig,
    locator: &dyn FileLocator,
    notifier: &dyn Notifier,
) -> RuleConfig {
    rewrite_children(root, locator, notifier).unwrap_or_else(|| root.clone())
}

enum Rewrite {
    Keep,
    Replace(RuleConfig),
    Remove,
}

/// Returns `None` when nothing below `parent` changed.
fn rewrite_children(
    parent: &RuleConfig,
    locator: &dyn FileLocator,
    notifier: &dyn Notifier,
) -> Option<RuleConfig> {
    let mut current: Option<RuleConfig> = None;
    let mut index = 0;

    loop {
        let node = current.as_ref().unwrap_or(parent);
        let Some(child) = node.children().get(index).map(Arc::clone) else {
            break;
        };

        let rewrite = if let Some(attribute) = file_attribute_for(child.name()) {
            resolve_file_attribute(&child, attribute, locator, notifier)
        } else if child.name() == TREE_WALKER {
            rewrite_children(&child, locator, notifier).map_or(Rewrite::Keep, Rewrite::Replace)
        } else {
            Rewrite::Keep
        };

        match rewrite {
            Rewrite::Keep => index += 1,
            Rewrite::Replace(replacement) => {
                current = Some(node.with_child_replaced(index, Arc::new(replacement)));
                index += 1;
            }
            Rewrite::Remove => current = Some(node.without_child(index)),
        }
    }

    current
}

fn resolve_file_attribute(
    module: &RuleConfig,
    attribute: &str,
    locator: &dyn FileLocator,
    notifier: &dyn Notifier,
) -> Rewrite {
    let Some(file_name) = module.attribute(attribute) else {
        return Rewrite::Keep;
    };
    if file_name.trim().is_empty() {
        return Rewrite::Keep;
    }

    match locator.locate(file_name) {
        Ok(Some(resolved)) if resolved == file_name => Rewrite::Keep,
        Ok(Some(resolved)) => {
            debug!("{}: {} resolved to {}", module.name(), file_name, resolved);
            Rewrite::Replace(module.with_attribute(attribute, resolved))
        }
        Ok(None) => {
            if !is_optional(module) {
                notifier.warn(&format!(
                    "{}: the file \"{}\" could not be found; the module has been disabled",
                    module.name(),
                    file_name
                ));
            } else {
                debug!("{}: optional file {} not found", module.name(), file_name);
            }
            Rewrite::Remove
        }
        Err(e) => {
            notifier.error(&format!(
                "{}: failed to resolve \"{}\": {}",
                module.name(),
                file_name,
                e
            ));
            Rewrite::Keep
        }
    }
}

fn is_optional(module: &RuleConfig) -> bool {
    module
        .attribute("optional")
        .is_some_and(|value| value.eq_ignore_ascii_case("true"))
}
