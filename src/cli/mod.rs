//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - build: Build command arguments
//! - test: Test command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod build;
pub mod completions;

pub use build::BuildArgs;
pub use completions::CompletionsArgs;
pub use test::TestArgs;

/// Monobuild - monorepo workspace build and test orchestrator
#[derive(Parser, Debug)]
#[command(
    name = "monobuild",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Build and test monorepo workspaces with esbuild and tsc",
    long_about = "Monobuild builds each workspace of a monorepo into a self-contained bundle, \
                  rewriting intra-monorepo imports to sibling build output, and runs all \
                  discovered test modules as one aggregate program.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  monobuild build                \x1b[90m# Build all workspaces\x1b[0m\n   \
                  monobuild build core ui -w     \x1b[90m# Rebuild matching workspaces on change\x1b[0m\n   \
                  monobuild build --skip-types   \x1b[90m# Build without generating types\x1b[0m\n   \
                  monobuild test                 \x1b[90m# Run all test modules\x1b[0m\n   \
                  monobuild test parser          \x1b[90m# Run test files matching \"parser\"\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Project root directory (defaults to current directory)
    #[arg(long, global = true, env = "MONOBUILD_CWD")]
    pub cwd: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build workspaces
    Build(BuildArgs),

    /// Test workspaces
    Test(TestArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_build() {
        let cli = Cli::try_parse_from(["monobuild", "build"]).unwrap();
        match cli.command {
            Commands::Build(args) => {
                assert!(args.names.is_empty());
                assert!(!args.watch);
                assert!(!args.skip_types);
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_parsing_build_with_names_and_flags() {
        let cli = Cli::try_parse_from(["monobuild", "build", "core", "ui", "-w", "--skip-types"])
            .unwrap();
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.names, vec!["core".to_string(), "ui".to_string()]);
                assert!(args.watch);
                assert!(args.skip_types);
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_parsing_skip_types_alias() {
        let cli = Cli::try_parse_from(["monobuild", "build", "--sk"]).unwrap();
        match cli.command {
            Commands::Build(args) => assert!(args.skip_types),
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_parsing_test_pattern() {
        let cli = Cli::try_parse_from(["monobuild", "test", "parser"]).unwrap();
        match cli.command {
            Commands::Test(args) => assert_eq!(args.pattern, Some("parser".to_string())),
            _ => panic!("Expected Test command"),
        }
    }

    #[test]
    fn test_cli_parsing_test_no_pattern() {
        let cli = Cli::try_parse_from(["monobuild", "test"]).unwrap();
        match cli.command {
            Commands::Test(args) => assert_eq!(args.pattern, None),
            _ => panic!("Expected Test command"),
        }
    }

    #[test]
    fn test_cli_parsing_version() {
        let cli = Cli::try_parse_from(["monobuild", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_cli_global_cwd() {
        let path = if cfg!(windows) {
            r"C:\temp\repo"
        } else {
            "/tmp/repo"
        };
        let cli = Cli::try_parse_from(["monobuild", "--cwd", path, "build"]).unwrap();
        assert_eq!(cli.cwd, Some(PathBuf::from(path)));
    }
}
