//! Command handlers for the CLI
//!
//! - `shell`: interactive session over one long-lived client
//! - `oneshot`: single commands that print and exit
//! - `shell_commands`: parser for lines typed into the shell

pub mod oneshot;
pub mod shell;
pub mod shell_commands;

pub use oneshot::Credentials;
pub use shell::run_shell;
