//! Command-line interface definition for chemviz
//!
//! This module defines the CLI structure using clap's derive API: an
//! interactive shell plus one-shot commands for the common read paths.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// chemviz - Chemical Equipment Visualizer client
///
/// Log in, upload equipment CSV files, and inspect the summary statistics,
/// charts and equipment tables of the five most recent datasets.
#[derive(Parser, Debug, Clone)]
#[command(name = "chemviz")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults to the platform config dir)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the API base URL
    #[arg(long)]
    pub api_base: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Log in as this user before running a one-shot command
    #[arg(short, long, env = "CHEMVIZ_USERNAME", global = true)]
    pub username: Option<String>,

    /// Password for --username
    #[arg(long, env = "CHEMVIZ_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for chemviz
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start an interactive session
    Shell,

    /// Show whether the session is authenticated
    Status,

    /// List the five most recent datasets
    Datasets,

    /// Show summary, charts and equipment table of one dataset
    Show {
        /// Dataset id
        id: u64,

        /// Print the raw dataset as JSON
        #[arg(long)]
        json: bool,
    },

    /// Upload a CSV file and show the resulting analysis
    Upload {
        /// Path to the CSV file
        file: PathBuf,
    },

    /// Download the PDF report of a dataset
    Report {
        /// Dataset id
        id: u64,

        /// Directory to save the report into (overrides config)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: None,
            verbose: false,
            api_base: None,
            no_color: false,
            username: None,
            password: None,
            command: Commands::Shell,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert!(cli.config.is_none());
        assert!(!cli.verbose);
        assert_eq!(cli.command, Commands::Shell);
    }

    #[test]
    fn test_cli_parse_shell_command() {
        let cli = Cli::try_parse_from(["chemviz", "shell"]).unwrap();
        assert_eq!(cli.command, Commands::Shell);
    }

    #[test]
    fn test_cli_parse_show_with_json() {
        let cli = Cli::try_parse_from(["chemviz", "show", "12", "--json"]).unwrap();
        assert_eq!(cli.command, Commands::Show { id: 12, json: true });
    }

    #[test]
    fn test_cli_parse_show_rejects_non_numeric_id() {
        assert!(Cli::try_parse_from(["chemviz", "show", "abc"]).is_err());
    }

    #[test]
    fn test_cli_parse_upload() {
        let cli = Cli::try_parse_from(["chemviz", "upload", "data/pumps.csv"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Upload {
                file: PathBuf::from("data/pumps.csv")
            }
        );
    }

    #[test]
    fn test_cli_parse_report_with_output_dir() {
        let cli = Cli::try_parse_from(["chemviz", "report", "3", "-o", "/tmp"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Report {
                id: 3,
                output_dir: Some(PathBuf::from("/tmp"))
            }
        );
    }

    #[test]
    fn test_cli_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "chemviz",
            "--api-base",
            "http://example.com/api/",
            "--verbose",
            "datasets",
            "--username",
            "alice",
        ])
        .unwrap();
        assert_eq!(cli.api_base.as_deref(), Some("http://example.com/api/"));
        assert!(cli.verbose);
        assert_eq!(cli.username.as_deref(), Some("alice"));
        assert_eq!(cli.command, Commands::Datasets);
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["chemviz"]).is_err());
    }
}
