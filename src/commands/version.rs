//! Version command implementation

use crate::error::Result;

/// Print version information
pub fn run() -> Result<()> {
    println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    Ok(())
}
