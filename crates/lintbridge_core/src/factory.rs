//! Building configured checkers from requests.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use lintbridge_config::{
    ConfigError, ConfigLoader, Notifier, RuleConfig, TREE_WALKER, TracingNotifier, Variables,
};
use lintbridge_engine::{BridgeError, CheckerSettings, EngineAdapter, EngineHandle, ExecutionContext};
use tracing::{debug, warn};

use crate::CheckerRequest;

const TAB_WIDTH_ATTRIBUTE: &str = "tabWidth";
const BASE_DIR_ATTRIBUTE: &str = "basedir";

/// Properties a request resolves `${name}` references with.
///
/// Blank values are dropped. Locations the rule files of other tools
/// commonly refer to are filled in when absent.
pub fn effective_properties(request: &CheckerRequest) -> BTreeMap<String, String> {
    let mut properties: BTreeMap<String, String> = request
        .properties
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    let project_dir = request.context.project_dir();
    let module_dir = request.context.module_dir().or(project_dir);
    let config_dir = request.source.base_dir().or(project_dir);

    let defaults = [
        ("basedir", module_dir),
        ("project_loc", project_dir),
        ("workspace_loc", project_dir),
        ("config_loc", config_dir),
        ("samedir", config_dir),
    ];
    for (name, dir) in defaults {
        if let Some(dir) = dir {
            properties
                .entry(name.to_string())
                .or_insert_with(|| dir.to_string_lossy().into_owned());
        }
    }
    properties
}

/// Loads the rule configuration a request names.
pub fn load_rule_config(request: &CheckerRequest, notifier: &dyn Notifier) -> Result<RuleConfig, ConfigError> {
    let mut context = request.context.clone();
    if context.config_dir().is_none() {
        if let Some(dir) = request.source.base_dir() {
            context = context.with_config_dir(dir);
        }
    }

    ConfigLoader::new(Variables::Bind(effective_properties(request)))
        .with_locator(&context)
        .with_class_path(request.context.class_path())
        .with_notifier(notifier)
        .load(&request.source)
}

/// Tab width set on the `TreeWalker` module, or `default`.
pub fn tab_width(config: &RuleConfig, default: usize) -> usize {
    let Some(value) = config
        .children()
        .iter()
        .filter(|child| child.name() == TREE_WALKER)
        .find_map(|child| child.attribute(TAB_WIDTH_ATTRIBUTE))
    else {
        return default;
    };

    match value.trim().parse::<usize>() {
        Ok(width) if width > 0 => width,
        _ => {
            warn!("Ignoring invalid tab width '{}'", value);
            default
        }
    }
}

/// Directory the root module's `basedir` names.
pub fn base_dir(config: &RuleConfig) -> Option<PathBuf> {
    config
        .attribute(BASE_DIR_ATTRIBUTE)
        .filter(|dir| !dir.trim().is_empty())
        .map(PathBuf::from)
}

/// Creates engine checkers for requests.
pub struct CheckerFactory {
    adapter: Arc<EngineAdapter>,
    notifier: Arc<dyn Notifier>,
}

impl CheckerFactory {
    pub fn new(adapter: Arc<EngineAdapter>) -> Self {
        Self {
            adapter,
            notifier: Arc::new(TracingNotifier),
        }
    }

    /// Sends path resolution problems to `notifier`.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn adapter(&self) -> &Arc<EngineAdapter> {
        &self.adapter
    }

    /// Loads the configuration and creates a checker for it.
    pub fn build(&self, request: &CheckerRequest) -> Result<EngineHandle, BridgeError> {
        let config = load_rule_config(request, self.notifier.as_ref())?;
        let settings = CheckerSettings {
            tab_width: tab_width(&config, request.default_tab_width),
            base_dir: base_dir(&config).or_else(|| request.default_base_dir.clone()),
        };
        debug!(
            "Building checker for {} (tab width {}, base dir {:?})",
            request.source, settings.tab_width, settings.base_dir
        );

        let context = ExecutionContext::new(request.context.class_path().to_vec());
        self.adapter.create_checker(Arc::new(config), &context, settings)
    }
}
