use super::{load_project, LoaderOptions, Project};
use autoload_core::version::SCHEMA_VERSION;
use autoload_core::{Config, ResolverConfig};
use indexmap::IndexMap;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct DumpOutput<'a> {
    schema_version: u32,
    manifest: &'a Path,
    base_dir: &'a Path,
    config: ResolverConfig,
    class_map_authoritative: bool,
    use_include_path: bool,
    include_path: &'a [PathBuf],
    psr4: &'a IndexMap<String, Vec<PathBuf>>,
    psr4_fallback: &'a [PathBuf],
    psr0: IndexMap<String, Vec<PathBuf>>,
    psr0_fallback: &'a [PathBuf],
    class_map: &'a IndexMap<String, PathBuf>,
}

impl<'a> DumpOutput<'a> {
    fn new(project: &'a Project) -> Self {
        let loader = &project.loader;
        Self {
            schema_version: SCHEMA_VERSION,
            manifest: &project.manifest_path,
            base_dir: &project.base_dir,
            config: loader.config(),
            class_map_authoritative: loader.is_class_map_authoritative(),
            use_include_path: loader.use_include_path(),
            include_path: &project.include_path,
            psr4: loader.prefixes_psr4(),
            psr4_fallback: loader.fallback_dirs_psr4(),
            psr0: loader.prefixes(),
            psr0_fallback: loader.fallback_dirs(),
            class_map: loader.class_map(),
        }
    }
}

pub fn run(config: &Config, options: &LoaderOptions) -> Result<()> {
    let project = load_project(config, options)?;
    let dump = DumpOutput::new(&project);

    if config.json_logs {
        println!("{}", serde_json::to_string_pretty(&dump).into_diagnostic()?);
    } else {
        print_human(&dump);
    }
    Ok(())
}

fn print_dirs(dirs: &[PathBuf]) {
    for dir in dirs {
        println!("      {}", dir.display());
    }
}

fn print_table(title: &str, table: &IndexMap<String, Vec<PathBuf>>, fallback: &[PathBuf]) {
    println!("\x1b[1m## {title}\x1b[0m");
    if table.is_empty() && fallback.is_empty() {
        println!("  (none)");
    }
    for (prefix, dirs) in table {
        println!("  {prefix}");
        print_dirs(dirs);
    }
    if !fallback.is_empty() {
        println!("  (fallback)");
        print_dirs(fallback);
    }
    println!();
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn print_human(dump: &DumpOutput<'_>) {
    println!("\x1b[1m## Manifest\x1b[0m");
    println!("  Path:           {}", dump.manifest.display());
    println!("  Base dir:       {}", dump.base_dir.display());
    let extensions: Vec<&str> = dump.config.extensions().collect();
    println!("  Extensions:     {}", extensions.join(", "));
    println!("  Authoritative:  {}", yes_no(dump.class_map_authoritative));
    println!("  Include path:   {}", yes_no(dump.use_include_path));
    print_dirs(dump.include_path);
    println!();

    print_table("PSR-4", dump.psr4, dump.psr4_fallback);
    print_table("PSR-0", &dump.psr0, dump.psr0_fallback);

    println!("\x1b[1m## Class map\x1b[0m");
    println!("  {} entries", dump.class_map.len());
    for (symbol, path) in dump.class_map {
        println!("  {symbol} => {}", path.display());
    }
}
