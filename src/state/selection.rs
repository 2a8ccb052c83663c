//! Selection and derivation engine
//!
//! Holds the one dataset currently under inspection. Selections are fenced
//! by generation: every [`SelectionEngine::begin_select`] (and every
//! [`SelectionEngine::adopt`]) bumps a counter, and a completion carrying an
//! older generation is dropped, so a slow response for an abandoned choice
//! can never overwrite a newer one.
//!
//! Chart data is never stored here; [`SelectionEngine::charts`] recomputes
//! it from the held detail on every call.

use std::path::{Path, PathBuf};

use crate::charts::{derive_charts, ChartData};
use crate::error::GatewayResult;
use crate::gateway::{api, Gateway};
use crate::models::{report_file_name, DatasetDetail};

pub const LOAD_FAILED: &str = "Failed to load dataset details";
pub const REPORT_FAILED: &str = "Failed to generate PDF";

/// Token identifying one select request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectTicket {
    pub id: u64,
    generation: u64,
}

impl SelectTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What a completion did to the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Applied,
    Failed,
    /// A newer selection was issued meanwhile; the result was dropped
    Stale,
}

#[derive(Debug, Default)]
pub struct SelectionEngine {
    detail: Option<DatasetDetail>,
    generation: u64,
    error: Option<String>,
    report_error: Option<String>,
}

impl SelectionEngine {
    pub fn detail(&self) -> Option<&DatasetDetail> {
        self.detail.as_ref()
    }

    pub fn selected_id(&self) -> Option<u64> {
        self.detail.as_ref().map(|d| d.id)
    }

    /// Error of the last select
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Error of the last report request
    pub fn report_error(&self) -> Option<&str> {
        self.report_error.as_deref()
    }

    /// Chart projections of the current detail, derived afresh
    pub fn charts(&self) -> ChartData {
        derive_charts(self.detail.as_ref())
    }

    /// Issue a new select; older in-flight selects become stale
    pub fn begin_select(&mut self, id: u64) -> SelectTicket {
        self.generation += 1;
        self.error = None;
        SelectTicket {
            id,
            generation: self.generation,
        }
    }

    /// Apply the response to `ticket`
    ///
    /// Failures keep the previous selection and record [`LOAD_FAILED`].
    pub fn complete_select(
        &mut self,
        ticket: SelectTicket,
        result: GatewayResult<DatasetDetail>,
    ) -> SelectOutcome {
        if ticket.generation != self.generation {
            tracing::debug!(
                "Dropping stale response for dataset {} (generation {} < {})",
                ticket.id,
                ticket.generation,
                self.generation
            );
            return SelectOutcome::Stale;
        }
        match result {
            Ok(detail) => {
                tracing::debug!("Selected dataset {} ({})", detail.id, detail.filename);
                self.detail = Some(detail);
                SelectOutcome::Applied
            }
            Err(e) => {
                tracing::warn!("{} {}: {}", LOAD_FAILED, ticket.id, e);
                self.error = Some(LOAD_FAILED.to_string());
                SelectOutcome::Failed
            }
        }
    }

    /// Make an already-fetched detail the selection (e.g. a fresh upload)
    pub fn adopt(&mut self, detail: DatasetDetail) {
        self.generation += 1;
        self.error = None;
        self.detail = Some(detail);
    }

    /// Fetch and select one dataset
    pub async fn select(&mut self, gateway: &dyn Gateway, id: u64) -> SelectOutcome {
        let ticket = self.begin_select(id);
        let result = api::get_dataset(gateway, id).await;
        self.complete_select(ticket, result)
    }

    /// Download a dataset's PDF report into `output_dir`
    ///
    /// The file is named `report_{id}.pdf`. Returns the saved path; any
    /// failure records [`REPORT_FAILED`] and leaves the selection alone.
    pub async fn request_report(
        &mut self,
        gateway: &dyn Gateway,
        id: u64,
        output_dir: &Path,
    ) -> Option<PathBuf> {
        self.report_error = None;
        let bytes = match api::generate_report(gateway, id).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("{} for dataset {}: {}", REPORT_FAILED, id, e);
                self.report_error = Some(REPORT_FAILED.to_string());
                return None;
            }
        };

        match save_report(output_dir, id, &bytes).await {
            Ok(path) => {
                tracing::info!("Saved report to {}", path.display());
                Some(path)
            }
            Err(e) => {
                tracing::warn!("Failed to save report for dataset {}: {}", id, e);
                self.report_error = Some(REPORT_FAILED.to_string());
                None
            }
        }
    }
}

async fn save_report(output_dir: &Path, id: u64, bytes: &[u8]) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(report_file_name(id));
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::gateway::{FakeGateway, Method};
    use crate::models::AggregateStats;
    use serde_json::json;

    fn detail(id: u64, flowrate: f64) -> DatasetDetail {
        DatasetDetail {
            id,
            filename: format!("set_{}.csv", id),
            summary: Some(AggregateStats {
                avg_flowrate: Some(flowrate),
                ..Default::default()
            }),
            equipment: Vec::new(),
        }
    }

    #[test]
    fn test_stale_completion_is_dropped() {
        let mut engine = SelectionEngine::default();
        let first = engine.begin_select(1);
        let second = engine.begin_select(2);

        assert_eq!(
            engine.complete_select(second, Ok(detail(2, 2.0))),
            SelectOutcome::Applied
        );
        assert_eq!(
            engine.complete_select(first, Ok(detail(1, 1.0))),
            SelectOutcome::Stale
        );
        assert_eq!(engine.selected_id(), Some(2));
    }

    #[test]
    fn test_stale_failure_does_not_set_error() {
        let mut engine = SelectionEngine::default();
        let first = engine.begin_select(1);
        let second = engine.begin_select(2);
        engine.complete_select(second, Ok(detail(2, 2.0)));

        let outcome =
            engine.complete_select(first, Err(GatewayError::Transport("timeout".into())));
        assert_eq!(outcome, SelectOutcome::Stale);
        assert!(engine.error().is_none());
    }

    #[test]
    fn test_failure_keeps_previous_selection() {
        let mut engine = SelectionEngine::default();
        engine.adopt(detail(1, 1.0));

        let ticket = engine.begin_select(2);
        let outcome = engine.complete_select(
            ticket,
            Err(GatewayError::Rejected {
                status: 404,
                message: Some("Not found.".to_string()),
            }),
        );
        assert_eq!(outcome, SelectOutcome::Failed);
        assert_eq!(engine.selected_id(), Some(1));
        assert_eq!(engine.error(), Some(LOAD_FAILED));
    }

    #[test]
    fn test_adopt_supersedes_in_flight_select() {
        let mut engine = SelectionEngine::default();
        let ticket = engine.begin_select(1);
        engine.adopt(detail(9, 9.0));

        assert_eq!(
            engine.complete_select(ticket, Ok(detail(1, 1.0))),
            SelectOutcome::Stale
        );
        assert_eq!(engine.selected_id(), Some(9));
    }

    #[test]
    fn test_charts_follow_selection() {
        let mut engine = SelectionEngine::default();
        assert!(engine.charts().is_empty());

        engine.adopt(detail(1, 4.0));
        match engine.charts() {
            ChartData::Charts { bar, .. } => assert_eq!(bar.values[0], 4.0),
            ChartData::NoData => panic!("expected charts"),
        }

        engine.adopt(detail(2, 8.0));
        match engine.charts() {
            ChartData::Charts { bar, .. } => assert_eq!(bar.values[0], 8.0),
            ChartData::NoData => panic!("expected charts"),
        }
    }

    #[tokio::test]
    async fn test_select_fetches_detail() {
        let gateway = FakeGateway::new();
        gateway.on_json(
            Method::Get,
            "datasets/3/",
            json!({"id": 3, "filename": "c.csv", "summary": {"avg_flowrate": 12.5}, "equipment": []}),
        );
        let mut engine = SelectionEngine::default();

        assert_eq!(engine.select(&gateway, 3).await, SelectOutcome::Applied);
        assert_eq!(engine.detail().unwrap().filename, "c.csv");
    }

    #[tokio::test]
    async fn test_request_report_saves_named_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let gateway = FakeGateway::new();
        gateway.on_bytes(Method::Get, "datasets/5/generate_pdf/", b"%PDF-1.4 fake".to_vec());
        let mut engine = SelectionEngine::default();

        let path = engine
            .request_report(&gateway, 5, dir.path())
            .await
            .expect("report saved");
        assert_eq!(path, dir.path().join("report_5.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4 fake");
        assert!(engine.report_error().is_none());
    }

    #[tokio::test]
    async fn test_report_failure_leaves_selection_untouched() {
        let dir = tempfile::TempDir::new().unwrap();
        let gateway = FakeGateway::new();
        gateway.on_reject(Method::Get, "datasets/1/generate_pdf/", 500, None);
        let mut engine = SelectionEngine::default();
        engine.adopt(detail(1, 1.0));

        assert!(engine.request_report(&gateway, 1, dir.path()).await.is_none());
        assert_eq!(engine.report_error(), Some(REPORT_FAILED));
        assert!(engine.error().is_none());
        assert_eq!(engine.selected_id(), Some(1));
        assert!(!dir.path().join("report_1.pdf").exists());
    }
}
