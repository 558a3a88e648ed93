//! Test command implementation

use std::path::PathBuf;

use crate::bundler::esbuild::EsbuildCli;
use crate::cli::TestArgs;
use crate::error::Result;
use crate::testrun::{NodeRunner, TestBundleAssembler};

/// Run test command
pub fn run(cwd: Option<PathBuf>, args: TestArgs) -> Result<()> {
    let project_root = super::helpers::project_root(cwd)?;

    let bundler = EsbuildCli::new();
    let runner = NodeRunner::new();
    let assembler = TestBundleAssembler::new(&bundler, &runner, &project_root);
    assembler.run(args.pattern.as_deref())
}
