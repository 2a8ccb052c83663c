//! Non-interactive commands
//!
//! Each command runs against a fresh [`App`], optionally logging in first
//! with `--username`/`--password`, prints its result and exits. Any visible
//! error becomes the process error.

use std::path::PathBuf;

use anyhow::{anyhow, bail};

use crate::cli::Commands;
use crate::config::DisplayConfig;
use crate::error::Result;
use crate::render;
use crate::state::{App, SelectOutcome};

/// Credentials given on the command line
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

async fn authenticate(app: &mut App, credentials: &Credentials) -> Result<()> {
    match (&credentials.username, &credentials.password) {
        (Some(username), Some(password)) => {
            if !app.login(username, password).await {
                bail!("{}", app.session.error().unwrap_or_default());
            }
            Ok(())
        }
        (Some(_), None) => bail!("--password is required with --username"),
        (None, Some(_)) => bail!("--username is required with --password"),
        _ => {
            app.check_session().await;
            Ok(())
        }
    }
}

/// Run one non-interactive command and return what it prints
pub async fn run(
    app: &mut App,
    command: Commands,
    credentials: &Credentials,
    display: &DisplayConfig,
) -> Result<String> {
    authenticate(app, credentials).await?;

    match command {
        Commands::Shell => Err(anyhow!("the shell is not a one-shot command")),
        Commands::Status => Ok(render::render_identity(app.identity())),
        Commands::Datasets => {
            if !app.refresh().await {
                bail!("{}", app.registry.error().unwrap_or_default());
            }
            Ok(render::render_datasets(app.registry.datasets()))
        }
        Commands::Show { id, json } => {
            if app.select(id).await != SelectOutcome::Applied {
                bail!("{}", app.selection.error().unwrap_or_default());
            }
            let detail = app
                .selected()
                .ok_or_else(|| anyhow!("dataset {} was not selected", id))?;
            if json {
                Ok(serde_json::to_string_pretty(detail)?)
            } else {
                Ok(render::render_analysis(
                    detail,
                    &app.charts(),
                    display.chart_width,
                ))
            }
        }
        Commands::Upload { file } => {
            app.select_file(&file);
            let id = match app.upload().await {
                Some(id) => id,
                None => bail!("{}", app.upload.error().unwrap_or_default()),
            };
            let analysis = app
                .selected()
                .map(|detail| render::render_analysis(detail, &app.charts(), display.chart_width))
                .unwrap_or_default();
            Ok(format!("Uploaded dataset {}\n{}", id, analysis))
        }
        Commands::Report { id, output_dir } => {
            if let Some(dir) = output_dir {
                app.set_report_dir(dir);
            }
            let path: PathBuf = match app.request_report(id).await {
                Some(path) => path,
                None => bail!("{}", app.selection.report_error().unwrap_or_default()),
            };
            Ok(format!("Saved report to {}", path.display()))
        }
    }
}
