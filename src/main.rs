//! chemviz - Chemical Equipment Visualizer client
//!
//! Main entry point for the chemviz command-line client.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chemviz::cli::{Cli, Commands};
use chemviz::commands::{self, Credentials};
use chemviz::config::Config;
use chemviz::gateway::HttpGateway;
use chemviz::App;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref(), &cli)?;
    config.validate()?;

    if !config.display.color {
        colored::control::set_override(false);
    }

    let gateway = Arc::new(HttpGateway::from_config(&config.api)?);
    tracing::debug!("Using API at {}", gateway.base_url());
    let mut app = App::new(gateway, &config);

    match cli.command {
        Commands::Shell => {
            tracing::info!("Starting interactive shell");
            commands::run_shell(app, &config.display).await
        }
        command => {
            let credentials = Credentials {
                username: cli.username.clone(),
                password: cli.password.clone(),
            };
            let output =
                commands::oneshot::run(&mut app, command, &credentials, &config.display).await?;
            println!("{}", output);
            Ok(())
        }
    }
}

/// Initialize tracing on stderr so command output stays clean
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "chemviz=debug" } else { "chemviz=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
