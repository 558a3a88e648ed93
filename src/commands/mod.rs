//! Command implementations
//!
//! Each submodule wires parsed CLI arguments to the real collaborators and
//! runs one command. This layer owns final reporting and exit-code
//! translation; orchestration errors surface here unhandled.

pub mod build;
pub mod completions;
pub mod helpers;
pub mod test;
pub mod version;
