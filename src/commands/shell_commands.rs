//! Command parser for the interactive shell
//!
//! Each line typed at the `chemviz>` prompt is a command word followed by
//! optional arguments. Command words are case-insensitive; a leading `/`
//! is accepted and ignored.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while parsing a shell line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0}\n\nType 'help' to see available commands")]
    UnknownCommand(String),

    #[error("Unsupported argument for {command}: {arg}\n\nType 'help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// A parsed shell line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Login,
    Register,
    Logout,
    /// Show the current identity
    Whoami,
    /// Re-fetch and print the recent datasets
    Datasets,
    Select(u64),
    /// Choose the file for the next upload
    File(PathBuf),
    /// Upload, optionally choosing the file in the same step
    Upload(Option<PathBuf>),
    /// Download a report; defaults to the selected dataset
    Report(Option<u64>),
    /// Full analysis of the selected dataset
    Show,
    Charts,
    Table,
    Help,
    Exit,
}

fn parse_id(command: &str, arg: &str) -> Result<u64, CommandError> {
    arg.parse().map_err(|_| CommandError::UnsupportedArgument {
        command: command.to_string(),
        arg: arg.to_string(),
    })
}

fn no_args(command: ShellCommand, name: &str, rest: &str) -> Result<ShellCommand, CommandError> {
    if rest.is_empty() {
        Ok(command)
    } else {
        Err(CommandError::UnsupportedArgument {
            command: name.to_string(),
            arg: rest.to_string(),
        })
    }
}

/// Parse one non-empty shell line
///
/// # Errors
///
/// Returns [`CommandError::UnknownCommand`] for an unrecognized word,
/// [`CommandError::MissingArgument`] when `select` or `file` has no argument,
/// and [`CommandError::UnsupportedArgument`] for malformed ids or arguments
/// to commands that take none.
///
/// # Examples
///
/// ```
/// use chemviz::commands::shell_commands::{parse_shell_command, ShellCommand};
///
/// assert_eq!(parse_shell_command("select 3"), Ok(ShellCommand::Select(3)));
/// assert_eq!(parse_shell_command("/report"), Ok(ShellCommand::Report(None)));
/// ```
pub fn parse_shell_command(input: &str) -> Result<ShellCommand, CommandError> {
    let input = input.trim();
    let input = input.strip_prefix('/').unwrap_or(input);
    let (word, rest) = match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    };
    let name = word.to_lowercase();

    match name.as_str() {
        "login" => no_args(ShellCommand::Login, &name, rest),
        "register" | "signup" => no_args(ShellCommand::Register, &name, rest),
        "logout" => no_args(ShellCommand::Logout, &name, rest),
        "whoami" | "status" => no_args(ShellCommand::Whoami, &name, rest),
        "datasets" | "refresh" | "ls" => no_args(ShellCommand::Datasets, &name, rest),
        "select" | "open" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: name,
                    usage: "select <dataset-id>".to_string(),
                });
            }
            parse_id(&name, rest).map(ShellCommand::Select)
        }
        "file" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: name,
                    usage: "file <path-to-csv>".to_string(),
                });
            }
            Ok(ShellCommand::File(PathBuf::from(rest)))
        }
        "upload" => Ok(ShellCommand::Upload(
            (!rest.is_empty()).then(|| PathBuf::from(rest)),
        )),
        "report" | "pdf" => {
            if rest.is_empty() {
                Ok(ShellCommand::Report(None))
            } else {
                parse_id(&name, rest).map(|id| ShellCommand::Report(Some(id)))
            }
        }
        "show" => no_args(ShellCommand::Show, &name, rest),
        "charts" => no_args(ShellCommand::Charts, &name, rest),
        "table" => no_args(ShellCommand::Table, &name, rest),
        "help" | "?" => Ok(ShellCommand::Help),
        "exit" | "quit" | "q" => Ok(ShellCommand::Exit),
        _ => Err(CommandError::UnknownCommand(word.to_string())),
    }
}

/// Print the shell command reference
pub fn print_help() {
    println!(
        r#"
Commands:
  login                 Log in (prompts for username and password)
  register              Create an account and log in
  logout                End the session
  whoami                Show the logged-in user

  datasets              Refresh and list the 5 most recent datasets
  select <id>           Load a dataset and show its analysis
  show                  Show the analysis of the selected dataset
  charts                Show only the charts of the selected dataset
  table                 Show only the equipment table

  file <path>           Choose a CSV file to upload
  upload [path]         Upload the chosen (or given) CSV file
  report [id]           Download the PDF report (default: selected dataset)

  help                  Show this help
  exit                  Leave the shell
"#
    );
}
