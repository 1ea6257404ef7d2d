use super::{load_project, LoaderOptions};
use autoload_core::version::SCHEMA_VERSION;
use autoload_core::{Config, ResolveResultWithTrace};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ExplainOutput<'a> {
    schema_version: u32,
    manifest: &'a Path,
    #[serde(flatten)]
    explained: &'a ResolveResultWithTrace,
}

pub fn run(config: &Config, options: &LoaderOptions, symbol: &str) -> Result<()> {
    let project = load_project(config, options)?;
    let explained = project.loader.explain(symbol);

    if config.json_logs {
        let output = ExplainOutput {
            schema_version: SCHEMA_VERSION,
            manifest: &project.manifest_path,
            explained: &explained,
        };
        println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
    } else {
        print_explain_human(&explained);
    }

    Ok(())
}

fn print_explain_human(explained: &ResolveResultWithTrace) {
    let result = &explained.result;

    println!("Symbol: {}", result.symbol);
    match (&result.resolved, result.source) {
        (Some(path), Some(source)) => {
            println!("Resolved: {}", path.display());
            println!("Source: {}", source.as_str());
        }
        _ => {
            println!("Status: UNRESOLVED");
            if let Some(reason) = result.reason {
                println!("Reason: {reason}");
            }
        }
    }
    println!();

    println!("Resolution trace:");
    for (i, step) in explained.trace.steps.iter().enumerate() {
        let status = if step.ok { "OK" } else { "FAIL" };
        println!("  {}. [{}] {}: {}", i + 1, status, step.step, step.detail);

        if let Some(ref path) = step.path {
            println!("      path: {}", path.display());
        }
        if let Some(strategy) = step.strategy {
            println!("      strategy: {strategy}");
        }
        if let Some(extension) = step.extension {
            println!("      extension: {extension}");
        }
        if let Some(ref prefix) = step.prefix {
            println!("      prefix: {prefix}");
        }
    }

    if !explained.trace.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &explained.trace.warnings {
            println!("  [{}] {}", warning.code, warning.message);
        }
    }
}
