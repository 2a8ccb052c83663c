//! Dataset registry: the bounded list of recent dataset summaries.

use crate::gateway::{api, Gateway};
use crate::models::{DatasetSummary, MAX_RECENT_DATASETS};

pub const FETCH_FAILED: &str = "Failed to fetch datasets";

/// Recent datasets, most recent first, at most [`MAX_RECENT_DATASETS`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DatasetRegistry {
    datasets: Vec<DatasetSummary>,
    error: Option<String>,
}

impl DatasetRegistry {
    pub fn datasets(&self) -> &[DatasetSummary] {
        &self.datasets
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn get(&self, id: u64) -> Option<&DatasetSummary> {
        self.datasets.iter().find(|d| d.id == id)
    }

    /// Fetch the list and replace the held one wholesale
    ///
    /// On failure the previous list stays visible and [`FETCH_FAILED`] is
    /// recorded. Returns whether the refresh succeeded.
    pub async fn refresh(&mut self, gateway: &dyn Gateway) -> bool {
        self.error = None;
        match api::list_datasets(gateway).await {
            Ok(mut datasets) => {
                if datasets.len() > MAX_RECENT_DATASETS {
                    tracing::warn!(
                        "Server returned {} datasets, keeping the first {}",
                        datasets.len(),
                        MAX_RECENT_DATASETS
                    );
                    datasets.truncate(MAX_RECENT_DATASETS);
                }
                tracing::debug!("Registry refreshed with {} datasets", datasets.len());
                self.datasets = datasets;
                true
            }
            Err(e) => {
                tracing::warn!("{}: {}", FETCH_FAILED, e);
                self.error = Some(FETCH_FAILED.to_string());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{FakeGateway, Method};
    use serde_json::{json, Value};

    fn summary(id: u64) -> Value {
        json!({
            "id": id,
            "filename": format!("set_{}.csv", id),
            "uploaded_at": "2026-03-01T12:00:00Z",
            "total_rows": id * 10
        })
    }

    #[tokio::test]
    async fn test_refresh_replaces_list() {
        let gateway = FakeGateway::new();
        gateway.on_json(Method::Get, api::DATASETS, json!([summary(2), summary(1)]));
        gateway.on_json(Method::Get, api::DATASETS, json!([summary(3)]));
        let mut registry = DatasetRegistry::default();

        assert!(registry.refresh(&gateway).await);
        assert_eq!(registry.datasets().len(), 2);
        assert_eq!(registry.datasets()[0].id, 2);

        assert!(registry.refresh(&gateway).await);
        let ids: Vec<u64> = registry.datasets().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![3]);
    }

    #[tokio::test]
    async fn test_refresh_accepts_offset_less_timestamps() {
        let gateway = FakeGateway::new();
        let mut naive = summary(2);
        naive["uploaded_at"] = json!("2026-03-01T12:00:00");
        gateway.on_json(Method::Get, api::DATASETS, json!([naive, summary(1)]));
        let mut registry = DatasetRegistry::default();

        assert!(registry.refresh(&gateway).await);
        assert_eq!(registry.datasets().len(), 2);
        assert!(registry.error().is_none());
        assert_eq!(
            registry.datasets()[0].uploaded_at,
            registry.datasets()[1].uploaded_at
        );
    }

    #[tokio::test]
    async fn test_refresh_is_idempotent() {
        let gateway = FakeGateway::new();
        gateway.on_json(Method::Get, api::DATASETS, json!([summary(5), summary(4)]));
        let mut registry = DatasetRegistry::default();

        registry.refresh(&gateway).await;
        let first = registry.clone();
        registry.refresh(&gateway).await;
        assert_eq!(registry, first);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_list() {
        let gateway = FakeGateway::new();
        gateway.on_json(Method::Get, api::DATASETS, json!([summary(1)]));
        gateway.on_transport_error(Method::Get, api::DATASETS);
        let mut registry = DatasetRegistry::default();

        assert!(registry.refresh(&gateway).await);
        assert!(!registry.refresh(&gateway).await);
        assert_eq!(registry.datasets().len(), 1);
        assert_eq!(registry.error(), Some(FETCH_FAILED));
    }

    #[tokio::test]
    async fn test_refresh_clears_previous_error() {
        let gateway = FakeGateway::new();
        gateway.on_reject(Method::Get, api::DATASETS, 500, None);
        gateway.on_json(Method::Get, api::DATASETS, json!([]));
        let mut registry = DatasetRegistry::default();

        registry.refresh(&gateway).await;
        assert!(registry.error().is_some());
        registry.refresh(&gateway).await;
        assert!(registry.error().is_none());
        assert!(registry.datasets().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_never_exceeds_bound() {
        let gateway = FakeGateway::new();
        let many: Vec<Value> = (1..=7).rev().map(summary).collect();
        gateway.on_json(Method::Get, api::DATASETS, Value::Array(many));
        let mut registry = DatasetRegistry::default();

        registry.refresh(&gateway).await;
        assert_eq!(registry.datasets().len(), MAX_RECENT_DATASETS);
        assert_eq!(registry.datasets()[0].id, 7);
        assert!(registry.get(3).is_some());
        assert!(registry.get(2).is_none());
    }
}
