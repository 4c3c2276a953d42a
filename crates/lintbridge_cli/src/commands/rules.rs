//! Rules command implementation

use lintbridge_config::TracingNotifier;
use lintbridge_core::load_rule_config;
use lintbridge_engine::{ConfigurationModule, peruse};
use miette::{IntoDiagnostic, Result};

use crate::cli::{Cli, OutputFormat, RulesArgs};
use crate::commands::{checker_request, current_dir, load_settings};

pub fn run_rules(cli: &Cli, args: &RulesArgs) -> Result<()> {
    let project_dir = current_dir()?;
    let settings = load_settings(cli, &project_dir)?;
    let request = checker_request(&args.rules, &settings, &project_dir, &[])?;

    let config = load_rule_config(&request, &TracingNotifier).into_diagnostic()?;

    let mut modules = Vec::new();
    peruse(&config, &mut |module| modules.push(module.clone()));

    match args.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&modules).into_diagnostic()?
            );
        }
        OutputFormat::Text => {
            for module in &modules {
                print_module(module);
            }
        }
    }
    Ok(())
}

fn print_module(module: &ConfigurationModule) {
    println!("{}", module.name);
    for (name, value) in &module.properties {
        println!("  {} = {}", name, value);
    }
    if !module.tokens.is_empty() {
        let tokens: Vec<&str> = module.tokens.iter().map(|t| t.as_str()).collect();
        println!("  tokens: {}", tokens.join(", "));
    }
    for (key, value) in &module.messages {
        println!("  message {} = {}", key, value);
    }
}
