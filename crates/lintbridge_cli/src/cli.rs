//! CLI argument definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// lintbridge - run static-analysis engines over source files
#[derive(Parser)]
#[command(name = "lbridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file path
    #[arg(short, long, global = true)]
    pub settings: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check files against a rule configuration
    Scan(ScanArgs),

    /// Print the modules of a rule configuration
    Rules(RulesArgs),
}

#[derive(Args)]
pub struct ScanArgs {
    /// Files to check
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Engine WebAssembly module
    #[arg(long)]
    pub engine: Option<PathBuf>,

    /// Version identifier of the engine
    #[arg(long)]
    pub engine_version: Option<String>,

    #[command(flatten)]
    pub rules: RuleArgs,

    /// Class path directory for the engine (repeatable)
    #[arg(long = "class-path", value_name = "DIR")]
    pub class_path: Vec<PathBuf>,

    /// Tab width when the rule configuration sets none
    #[arg(long)]
    pub tab_width: Option<usize>,

    /// Directory engine-reported file names are relative to
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// Mark reported problems as suppressed
    #[arg(long)]
    pub suppress_errors: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct RulesArgs {
    #[command(flatten)]
    pub rules: RuleArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Where the rule configuration comes from.
#[derive(Args)]
pub struct RuleArgs {
    /// Rule configuration file, URL, `classpath:` resource or `bundled:` name
    #[arg(long = "rules", value_name = "LOCATION")]
    pub location: Option<String>,

    /// Property binding for the rule configuration (repeatable)
    #[arg(short = 'p', long = "property", value_name = "NAME=VALUE", value_parser = parse_property)]
    pub properties: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn parse_property(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{}'", raw)),
    }
}
