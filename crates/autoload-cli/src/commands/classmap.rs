use super::absolutize;
use autoload_core::classmap::{self, ClassMap, DuplicateSymbol};
use autoload_core::version::SCHEMA_VERSION;
use autoload_core::Config;
use autoload_util::fs::write_atomic;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct ClassMapOutput<'a> {
    schema_version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<&'a Path>,
    symbols: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    entries: Option<&'a indexmap::IndexMap<String, PathBuf>>,
    duplicates: &'a [DuplicateSymbol],
}

/// Scan `dirs` into a class map. With `output`, the bare symbol -> path
/// object is written atomically to that file; otherwise entries are printed.
pub fn run(config: &Config, dirs: &[PathBuf], exclude: &[String], output: Option<&Path>) -> Result<()> {
    let dirs: Vec<PathBuf> = dirs.iter().map(|d| absolutize(&config.cwd, d)).collect();
    let map = classmap::generate(&dirs, exclude, &config.cwd).into_diagnostic()?;

    for dup in &map.duplicates {
        tracing::warn!(
            symbol = %dup.symbol,
            kept = %dup.kept.display(),
            ignored = %dup.ignored.display(),
            "symbol declared more than once"
        );
    }

    let output = output.map(|p| absolutize(&config.cwd, p));
    if let Some(ref path) = output {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).into_diagnostic()?;
        }
        let body = serde_json::to_vec_pretty(&map.entries).into_diagnostic()?;
        write_atomic(path, &body).into_diagnostic()?;
        tracing::info!(path = %path.display(), symbols = map.entries.len(), "wrote class map");
    }

    if config.json_logs {
        print_json(&map, output.as_deref())?;
    } else {
        print_human(&map, output.as_deref());
    }
    Ok(())
}

fn print_json(map: &ClassMap, output: Option<&Path>) -> Result<()> {
    let out = ClassMapOutput {
        schema_version: SCHEMA_VERSION,
        output,
        symbols: map.entries.len(),
        entries: output.is_none().then_some(&map.entries),
        duplicates: &map.duplicates,
    };
    println!("{}", serde_json::to_string_pretty(&out).into_diagnostic()?);
    Ok(())
}

fn print_human(map: &ClassMap, output: Option<&Path>) {
    match output {
        Some(path) => println!("Wrote {} symbols to {}", map.entries.len(), path.display()),
        None => {
            for (symbol, path) in &map.entries {
                println!("{symbol} => {}", path.display());
            }
        }
    }
}
