pub mod classmap;
pub mod dump;
pub mod explain;
pub mod resolve;
pub mod version;

use autoload_core::resolver::IncludePath;
use autoload_core::{paths, ClassLoader, Config, Manifest, ResolverConfig};
use miette::{IntoDiagnostic, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Loader settings taken from global flags, applied over the manifest.
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    pub authoritative: bool,
    pub include_path: Option<OsString>,
    pub secondary_extension: bool,
}

/// A loader built from the project's manifest.
#[derive(Debug)]
pub struct Project {
    pub manifest_path: PathBuf,
    pub base_dir: PathBuf,
    /// Effective include path: manifest, then environment, then `--include-path`.
    pub include_path: Vec<PathBuf>,
    pub loader: ClassLoader,
}

/// Resolve a user-supplied path against the working directory.
pub fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Locate and load the manifest, then build the loader.
pub fn load_project(config: &Config, options: &LoaderOptions) -> Result<Project> {
    let manifest_path = match &config.manifest {
        Some(path) => absolutize(&config.cwd, path),
        None => paths::find_manifest(&config.cwd).into_diagnostic()?,
    };
    let manifest = Manifest::load(&manifest_path).into_diagnostic()?;
    let base_dir = Manifest::base_dir(&manifest_path);

    let mut loader = manifest
        .build_loader(&base_dir, config.include_dev)
        .into_diagnostic()?
        .with_config(ResolverConfig {
            secondary_extension: options.secondary_extension,
        });

    if options.authoritative {
        loader.set_class_map_authoritative(true);
    }

    let mut search = manifest.include_path(&base_dir);
    search.extend(IncludePath::from_env().dirs().to_vec());
    if let Some(extra) = &options.include_path {
        search.extend(IncludePath::parse(extra).dirs().to_vec());
        loader.set_use_include_path(true);
    }
    let include_path = search.dirs().to_vec();
    loader.set_search_path(Box::new(search));

    tracing::debug!(
        manifest = %manifest_path.display(),
        include_dev = config.include_dev,
        "loaded project"
    );

    Ok(Project {
        manifest_path,
        base_dir,
        include_path,
        loader,
    })
}
