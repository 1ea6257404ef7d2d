use super::{load_project, LoaderOptions};
use autoload_core::version::SCHEMA_VERSION;
use autoload_core::{Config, ResolveResult};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ResolveOutput<'a> {
    schema_version: u32,
    manifest: &'a Path,
    results: &'a [ResolveResult],
}

/// Resolve each symbol in order. Exits with status 1 if any stays unresolved.
pub fn run(config: &Config, options: &LoaderOptions, symbols: &[String]) -> Result<()> {
    let project = load_project(config, options)?;

    let results: Vec<ResolveResult> = symbols
        .iter()
        .map(|symbol| project.loader.lookup(symbol))
        .collect();

    if config.json_logs {
        let output = ResolveOutput {
            schema_version: SCHEMA_VERSION,
            manifest: &project.manifest_path,
            results: &results,
        };
        println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
    } else {
        for result in &results {
            print_human(result);
        }
    }

    let unresolved = results.iter().filter(|r| !r.is_resolved()).count();
    if unresolved > 0 {
        tracing::debug!(unresolved, "unresolved symbols");
        std::process::exit(1);
    }
    Ok(())
}

fn print_human(result: &ResolveResult) {
    match (&result.resolved, result.source) {
        (Some(path), Some(source)) => {
            println!("{} -> {} ({})", result.symbol, path.display(), source.as_str());
        }
        _ => {
            let reason = result
                .reason
                .map_or_else(|| "unknown".to_string(), |r| r.to_string());
            println!("{}: unresolved ({reason})", result.symbol);
        }
    }
}
