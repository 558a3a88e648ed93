//! Monobuild - monorepo workspace build and test orchestrator
//!
//! Builds each workspace of a monorepo into its own bundle by driving esbuild,
//! rewriting intra-monorepo imports to already-built sibling output, and runs
//! all discovered test modules as one aggregate program with guaranteed
//! ordering and cleanup.

use clap::Parser;

mod builder;
mod bundler;
mod cli;
mod commands;
mod config;
mod error;
mod fsops;
mod resolve;
#[cfg(test)]
mod test_fixtures;
mod testrun;
mod tools;
mod tsconfig;
mod typecheck;
mod workspace;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build(args) => commands::build::run(cli.cwd, args),
        Commands::Test(args) => commands::test::run(cli.cwd, args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
