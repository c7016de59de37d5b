//! CLI command implementations.
//!
//! - `run`: run named tasks (the default)
//! - `list`: list the declared tasks (`--tasks`)

pub mod list;
pub mod run;

pub use list::ListCommand;
pub use run::RunCommand;
