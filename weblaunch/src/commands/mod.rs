//! CLI commands.
//!
//!   launch: the full sequence (default when no subcommand is given)
//!   check : precondition report only, no processes started

pub mod check;
pub mod launch;
