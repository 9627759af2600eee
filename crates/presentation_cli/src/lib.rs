//! Weather agent command-line front end
//!
//! Argument parsing and the interactive prompt loop. The binary in
//! `main.rs` wires these to the configured agent.

pub mod cli;
pub mod repl;

pub use cli::{Cli, log_filter_from_verbosity};
pub use repl::{Assistant, PROMPT, banner, is_exit_command, run_repl};
