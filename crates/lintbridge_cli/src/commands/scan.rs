//! Scan command implementation

use std::path::PathBuf;
use std::sync::Arc;

use lintbridge_core::Scanner;
use lintbridge_engine::{EngineAdapter, ExtismRuntime};
use lintbridge_text::{SourceText, TextBuffer};
use miette::{IntoDiagnostic, Result, miette};
use tracing::{debug, info};

use crate::cli::{Cli, ScanArgs};
use crate::commands::{checker_request, current_dir, load_settings};
use crate::output::output_results;

const UNVERSIONED: &str = "unversioned";

pub fn run_scan(cli: &Cli, args: &ScanArgs) -> Result<bool> {
    let project_dir = current_dir()?;
    let settings = load_settings(cli, &project_dir)?;

    let engine = match (&args.engine, &settings.engine) {
        (Some(path), _) => path.clone(),
        (None, Some(path)) => settings.resolve_path(path),
        (None, None) => {
            return Err(miette!(
                "No engine given; pass --engine or set \"engine\" in the settings"
            ));
        }
    };
    let version = args
        .engine_version
        .clone()
        .or_else(|| settings.engine_version.clone())
        .unwrap_or_else(|| UNVERSIONED.to_string());

    let mut request = checker_request(&args.rules, &settings, &project_dir, &args.class_path)?;
    if let Some(tab_width) = args.tab_width {
        request = request.with_default_tab_width(tab_width);
    }
    if let Some(dir) = &args.base_dir {
        request = request.with_default_base_dir(dir);
    }

    let buffers = read_buffers(&args.files, &project_dir)?;

    let runtime = ExtismRuntime::load_file(version, &engine).into_diagnostic()?;
    let adapter = EngineAdapter::new(Arc::new(runtime)).into_diagnostic()?;
    let scanner = Scanner::new(Arc::new(adapter)).with_cache_ttl(settings.cache_ttl());

    let buffer_refs: Vec<&dyn TextBuffer> = buffers.iter().map(|b| b as &dyn TextBuffer).collect();
    let suppress_errors = args.suppress_errors || settings.suppress_errors;
    let results = scanner
        .scan(&request, &buffer_refs, suppress_errors)
        .into_diagnostic()?;
    info!(
        "Scanned {} files with engine {}",
        buffers.len(),
        scanner.adapter().version()
    );

    scanner.invalidate();
    output_results(&results, buffers.len(), args.format)
}

fn read_buffers(files: &[PathBuf], project_dir: &std::path::Path) -> Result<Vec<SourceText>> {
    files
        .iter()
        .map(|file| {
            let path = if file.is_absolute() {
                file.clone()
            } else {
                project_dir.join(file)
            };
            debug!("Reading {}", path.display());
            SourceText::from_file(&path)
                .map_err(|e| miette!("Failed to read {}: {}", path.display(), e))
        })
        .collect()
}
