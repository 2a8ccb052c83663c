//! Application state container
//!
//! [`App`] owns one instance of each component plus the gateway they share.
//! Its methods are the user-level actions; each one touches only the state
//! of the component that owns it, except upload success, which also adopts
//! the new dataset as the selection and refreshes the registry.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::charts::ChartData;
use crate::config::Config;
use crate::gateway::Gateway;
use crate::models::{DatasetDetail, Identity};
use crate::state::registry::DatasetRegistry;
use crate::state::selection::{SelectOutcome, SelectionEngine};
use crate::state::session::SessionStore;
use crate::state::upload::UploadController;

/// Client state plus the gateway every action goes through.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use chemviz::config::Config;
/// use chemviz::gateway::{FakeGateway, Method};
/// use chemviz::state::App;
/// use serde_json::json;
///
/// # #[tokio::main]
/// # async fn main() {
/// let gateway = Arc::new(FakeGateway::new());
/// gateway.on_json(Method::Get, "auth/status/", json!({"authenticated": false}));
/// gateway.on_json(Method::Get, "datasets/", json!([]));
///
/// let mut app = App::new(gateway, &Config::default());
/// app.start().await;
/// assert!(app.identity().is_none());
/// assert!(app.errors().is_empty());
/// # }
/// ```
#[derive(Debug)]
pub struct App {
    gateway: Arc<dyn Gateway>,
    pub session: SessionStore,
    pub registry: DatasetRegistry,
    pub upload: UploadController,
    pub selection: SelectionEngine,
    report_dir: PathBuf,
}

impl App {
    pub fn new(gateway: Arc<dyn Gateway>, config: &Config) -> Self {
        Self {
            gateway,
            session: SessionStore::new(config.session.logout_policy),
            registry: DatasetRegistry::default(),
            upload: UploadController::default(),
            selection: SelectionEngine::default(),
            report_dir: config.report.output_dir.clone(),
        }
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    pub fn set_report_dir(&mut self, dir: impl Into<PathBuf>) {
        self.report_dir = dir.into();
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.session.identity()
    }

    pub fn selected(&self) -> Option<&DatasetDetail> {
        self.selection.detail()
    }

    /// Chart projections of the current selection
    pub fn charts(&self) -> ChartData {
        self.selection.charts()
    }

    /// Client start: session check and registry refresh, run concurrently
    pub async fn start(&mut self) {
        let gateway = &*self.gateway;
        tokio::join!(
            self.session.check_session(gateway),
            self.registry.refresh(gateway)
        );
    }

    pub async fn login(&mut self, username: &str, password: &str) -> bool {
        self.session.login(&*self.gateway, username, password).await
    }

    pub async fn register(&mut self, username: &str, email: &str, password: &str) -> bool {
        self.session
            .register(&*self.gateway, username, email, password)
            .await
    }

    /// Log in with whatever the shell put into `session.form`
    pub async fn submit_login(&mut self) -> bool {
        self.session.submit_login(&*self.gateway).await
    }

    pub async fn submit_register(&mut self) -> bool {
        self.session.submit_register(&*self.gateway).await
    }

    pub async fn check_session(&mut self) {
        self.session.check_session(&*self.gateway).await;
    }

    pub async fn logout(&mut self) {
        self.session.logout(&*self.gateway).await;
    }

    pub async fn refresh(&mut self) -> bool {
        self.registry.refresh(&*self.gateway).await
    }

    pub async fn select(&mut self, id: u64) -> SelectOutcome {
        self.selection.select(&*self.gateway, id).await
    }

    pub fn select_file(&mut self, path: impl AsRef<Path>) -> bool {
        self.upload.select_file(path)
    }

    /// Upload the selected file
    ///
    /// On success the uploaded dataset becomes the selection, the registry is
    /// refreshed, and its id is returned.
    pub async fn upload(&mut self) -> Option<u64> {
        let detail = self.upload.submit(&*self.gateway).await?;
        let id = detail.id;
        self.selection.adopt(detail);
        self.registry.refresh(&*self.gateway).await;
        Some(id)
    }

    /// Download a report into the configured report directory
    pub async fn request_report(&mut self, id: u64) -> Option<PathBuf> {
        let dir = self.report_dir.clone();
        self.selection
            .request_report(&*self.gateway, id, &dir)
            .await
    }

    /// Every error currently visible, one per component channel
    pub fn errors(&self) -> Vec<&str> {
        [
            self.session.error(),
            self.registry.error(),
            self.upload.error(),
            self.selection.error(),
            self.selection.report_error(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
