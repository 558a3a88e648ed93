use clap::Parser;

/// Arguments for build command
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Only build workspaces whose location contains one of these substrings
    pub names: Vec<String>,

    /// Rebuild on source file changes
    #[arg(short = 'w', long)]
    pub watch: bool,

    /// Skip generating typescript types
    #[arg(long, alias = "sk")]
    pub skip_types: bool,
}
