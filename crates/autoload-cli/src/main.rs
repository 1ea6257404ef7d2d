#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;

use autoload_core::Config;
use clap::Parser;
use commands::LoaderOptions;
use miette::Result;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "autoload")]
#[command(author, version, about = "Resolve PHP class names to source files", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    /// Manifest to read (default: autoload.json or composer.json found from the working directory)
    #[arg(long, global = true, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Also register the autoload-dev section
    #[arg(long, global = true)]
    dev: bool,

    /// Resolve only through the class map
    #[arg(long, global = true)]
    authoritative: bool,

    /// Extra include-path directories (platform path-list syntax); enables include-path lookup
    #[arg(long, global = true, value_name = "PATHS")]
    include_path: Option<OsString>,

    /// Also try the .hh extension after .php
    #[arg(
        long,
        global = true,
        env = "AUTOLOAD_SECONDARY_EXT",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    secondary_ext: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Resolve one or more symbols to files
    Resolve {
        /// Fully-qualified class, interface, trait or enum names
        #[arg(required = true)]
        symbols: Vec<String>,
    },

    /// Show every step taken while resolving a symbol
    Explain {
        /// Fully-qualified symbol name
        symbol: String,
    },

    /// Print the registrations built from the manifest
    Dump,

    /// Scan directories and build a class map
    Classmap {
        /// Directories (or files) to scan
        #[arg(required = true)]
        dirs: Vec<PathBuf>,

        /// Glob patterns (relative to the working directory) to skip
        #[arg(long)]
        exclude: Vec<String>,

        /// Write the map to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Version => "version",
            Self::Resolve { .. } => "resolve",
            Self::Explain { .. } => "explain",
            Self::Dump => "dump",
            Self::Classmap { .. } => "classmap",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let config = Config::new(cwd.clone())
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json)
        .with_manifest(cli.manifest)
        .with_dev(cli.dev);

    let Some(command) = cli.command else {
        println!("{}", autoload_core::version::BuildInfo::current());
        return Ok(());
    };

    logging::init(config.verbosity, config.json_logs);
    let span = tracing::info_span!("autoload", cmd = command.name(), cwd = %cwd.display());
    let _guard = span.enter();

    let options = LoaderOptions {
        authoritative: cli.authoritative,
        include_path: cli.include_path,
        secondary_extension: cli.secondary_ext,
    };

    match command {
        Commands::Version => commands::version::run(config.json_logs),
        Commands::Resolve { symbols } => commands::resolve::run(&config, &options, &symbols),
        Commands::Explain { symbol } => commands::explain::run(&config, &options, &symbol),
        Commands::Dump => commands::dump::run(&config, &options),
        Commands::Classmap {
            dirs,
            exclude,
            output,
        } => commands::classmap::run(&config, &dirs, &exclude, output.as_deref()),
    }
}
