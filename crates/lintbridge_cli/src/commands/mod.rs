//! Command implementations

pub mod rules;
pub mod scan;

use std::path::{Path, PathBuf};

use lintbridge_config::{BridgeSettings, ConfigSource, ModuleContext};
use lintbridge_core::CheckerRequest;
use miette::{IntoDiagnostic, Result, miette};
use tracing::info;

use crate::cli::{Cli, RuleArgs};

/// Settings from `--settings`, a discovered settings file, or defaults.
pub fn load_settings(cli: &Cli, project_dir: &Path) -> Result<BridgeSettings> {
    if let Some(path) = &cli.settings {
        return BridgeSettings::from_file(path).into_diagnostic();
    }
    if let Some(path) = BridgeSettings::discover(project_dir) {
        info!("Using settings: {}", path.display());
        return BridgeSettings::from_file(&path).into_diagnostic();
    }
    Ok(BridgeSettings::new())
}

/// Builds the checker request from flags, falling back to settings.
pub fn checker_request(
    rules: &RuleArgs,
    settings: &BridgeSettings,
    project_dir: &Path,
    class_path: &[PathBuf],
) -> Result<CheckerRequest> {
    let source = match (&rules.location, &settings.config) {
        (Some(location), _) => ConfigSource::from_location(location),
        (None, Some(location)) => match ConfigSource::from_location(location) {
            ConfigSource::File(path) => ConfigSource::File(settings.resolve_path(&path)),
            other => other,
        },
        (None, None) => {
            return Err(miette!(
                "No rule configuration given; pass --rules or set \"config\" in the settings"
            ));
        }
    };

    let mut context = ModuleContext::new(project_dir);
    let settings_class_path = settings.class_path.iter().map(|dir| settings.resolve_path(dir));
    for dir in settings_class_path.chain(class_path.iter().cloned()) {
        context = context.with_class_path(dir);
    }

    let mut request = CheckerRequest::new(source, context)
        .with_properties(settings.properties.clone())
        .with_properties(rules.properties.iter().cloned().collect());
    if let Some(tab_width) = settings.tab_width {
        request = request.with_default_tab_width(tab_width);
    }
    if let Some(dir) = &settings.base_dir {
        request = request.with_default_base_dir(settings.resolve_path(dir));
    }
    Ok(request)
}

pub fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().into_diagnostic()
}
