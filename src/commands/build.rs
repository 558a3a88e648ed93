//! Build command implementation

use std::path::PathBuf;

use crate::builder::{BuildOptions, BuildOrchestrator};
use crate::bundler::esbuild::EsbuildCli;
use crate::cli::BuildArgs;
use crate::config::BuildConfig;
use crate::error::Result;
use crate::typecheck::Tsc;

/// Run build command
pub fn run(cwd: Option<PathBuf>, args: BuildArgs) -> Result<()> {
    let project_root = super::helpers::project_root(cwd)?;
    let config = BuildConfig::load(&project_root)?;

    let bundler = EsbuildCli::new();
    let typechecker = Tsc::new();
    let orchestrator = BuildOrchestrator::new(&bundler, &typechecker, config, &project_root);
    orchestrator.run(&BuildOptions {
        name_filters: args.names,
        watch: args.watch,
        skip_types: args.skip_types,
    })
}
