//! chemviz - Chemical Equipment Visualizer client library
//!
//! Talks to the visualizer's REST API and holds the client-side state of a
//! session: who is logged in, the recent datasets, the pending upload and
//! the dataset under inspection.
//!
//! # Architecture
//!
//! - `gateway`: the [`gateway::Gateway`] seam, its HTTP and in-memory
//!   implementations, and typed endpoint calls
//! - `state`: session, dataset registry, upload and selection components,
//!   owned together by [`state::App`]
//! - `charts`: pure chart projections of a dataset summary
//! - `render`: terminal output
//! - `commands`: shell and one-shot command handlers
//! - `config`, `cli`, `error`: configuration, argument parsing, error types
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use chemviz::{App, Config};
//! use chemviz::gateway::HttpGateway;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None, &Default::default())?;
//!     config.validate()?;
//!
//!     let gateway = Arc::new(HttpGateway::from_config(&config.api)?);
//!     let mut app = App::new(gateway, &config);
//!     app.start().await;
//!     println!("{} recent datasets", app.registry.datasets().len());
//!     Ok(())
//! }
//! ```

pub mod charts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod render;
pub mod state;

pub use config::Config;
pub use error::{ChemvizError, GatewayError, Result};
pub use state::App;
