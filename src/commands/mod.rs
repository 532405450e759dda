use anyhow::Result;
use log::{debug, info, warn};
use std::path::PathBuf;

use crate::{
    outcome::Outcome,
    package::{ModuleArgs, PackageSpec, Scope},
    reconcile::Reconciler,
    runtime::Runtime,
    winget::Winget,
};

mod args_file;
pub mod config;

pub use args_file::{LoadedArgs, load_args, parse_args};
use config::Config;

/// Where the module parameters come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgsSource {
    /// Parameters given directly, e.g. as command-line flags.
    Inline(ModuleArgs),
    /// A JSON argument file written by the automation controller.
    File(PathBuf),
}

/// Resolve parameters, validate them and reconcile the package.
#[tracing::instrument(skip(runtime, config))]
pub fn run<R: Runtime>(runtime: &R, source: ArgsSource, config: Config) -> Result<Outcome> {
    let (args, check_mode) = match source {
        ArgsSource::Inline(args) => (args, config.check_mode),
        ArgsSource::File(path) => {
            let loaded = load_args(runtime, &path)?;
            (loaded.args, config.check_mode || loaded.check_mode)
        }
    };

    let spec = PackageSpec::try_from(args)?;
    info!("Reconciling {}", spec);
    debug!("Using package manager {:?}, check mode {}", config.winget, check_mode);

    if spec.scope == Some(Scope::Machine) && !check_mode && !runtime.is_privileged() {
        warn!(
            "{} targets machine scope but this process is not elevated; winget may prompt or fail",
            spec.app_id
        );
    }

    let winget = Winget::new(runtime, config.winget);
    Reconciler::new(&winget)
        .check_mode(check_mode)
        .reconcile(&spec)
}
