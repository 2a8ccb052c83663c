//! Upload controller
//!
//! Lifecycle of a single pending file upload:
//!
//! ```text
//! Idle --select--> FileSelected --submit--> Uploading --ok--> Idle
//!   ^                   ^                        |
//!   |                   +-------select-------- Error <--failure--+
//! ```
//!
//! Submitting without a file is rejected locally. Submitting while
//! `Uploading` is a no-op. A failed upload keeps the file so it can be
//! retried.

use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::error::GatewayResult;
use crate::gateway::{api, Gateway};
use crate::models::DatasetDetail;

pub const NO_FILE_SELECTED: &str = "Please select a file";
pub const UPLOAD_FAILED: &str = "Upload failed";

/// File chosen for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    /// Name reported to the server
    pub file_name: String,
}

impl SelectedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload.csv".to_string());
        Self { path, file_name }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadStatus {
    #[default]
    Idle,
    FileSelected,
    Uploading,
    Error(String),
}

/// Why a submission did not start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRefused {
    /// No file chosen; recorded as a validation error
    NoFile,
    /// An upload is already in flight; nothing changed
    InFlight,
}

/// Permission to perform one upload, handed out by
/// [`UploadController::begin_submit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    pub file: SelectedFile,
}

#[derive(Debug, Default)]
pub struct UploadController {
    file: Option<SelectedFile>,
    status: UploadStatus,
}

impl UploadController {
    pub fn status(&self) -> &UploadStatus {
        &self.status
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn is_uploading(&self) -> bool {
        self.status == UploadStatus::Uploading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            UploadStatus::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }

    /// Choose the file to upload, clearing any earlier error
    ///
    /// Refused (returns `false`) while an upload is in flight.
    pub fn select_file(&mut self, path: impl AsRef<Path>) -> bool {
        if self.is_uploading() {
            tracing::debug!("Ignoring file selection while uploading");
            return false;
        }
        let path = path.as_ref();
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            tracing::warn!("{} does not look like a CSV file", path.display());
        }
        self.file = Some(SelectedFile::new(path));
        self.status = UploadStatus::FileSelected;
        true
    }

    /// Drop the chosen file and return to idle
    pub fn clear(&mut self) {
        if !self.is_uploading() {
            self.file = None;
            self.status = UploadStatus::Idle;
        }
    }

    /// Start a submission
    ///
    /// # Errors
    ///
    /// [`SubmitRefused::NoFile`] when nothing is selected (the status becomes
    /// `Error("Please select a file")`), [`SubmitRefused::InFlight`] while
    /// uploading (the status is left untouched).
    pub fn begin_submit(&mut self) -> Result<UploadTicket, SubmitRefused> {
        if self.is_uploading() {
            tracing::debug!("Upload already in flight, ignoring submission");
            return Err(SubmitRefused::InFlight);
        }
        match &self.file {
            Some(file) => {
                self.status = UploadStatus::Uploading;
                Ok(UploadTicket { file: file.clone() })
            }
            None => {
                self.status = UploadStatus::Error(NO_FILE_SELECTED.to_string());
                Err(SubmitRefused::NoFile)
            }
        }
    }

    /// Settle the in-flight upload
    ///
    /// Returns the uploaded dataset on success. Outcomes arriving when no
    /// upload is in flight are ignored.
    pub fn complete(&mut self, result: GatewayResult<DatasetDetail>) -> Option<DatasetDetail> {
        if !self.is_uploading() {
            tracing::debug!("Ignoring upload completion with no upload in flight");
            return None;
        }
        match result {
            Ok(detail) => {
                tracing::info!("Uploaded {} as dataset {}", detail.filename, detail.id);
                self.file = None;
                self.status = UploadStatus::Idle;
                Some(detail)
            }
            Err(e) => {
                tracing::warn!("{}: {}", UPLOAD_FAILED, e);
                self.status = UploadStatus::Error(e.message_or(UPLOAD_FAILED));
                None
            }
        }
    }

    fn fail_locally(&mut self, message: String) {
        if self.is_uploading() {
            self.status = UploadStatus::Error(message);
        }
    }

    /// Read the selected file and upload it
    ///
    /// Returns the uploaded dataset on success; every failure is recorded
    /// in the controller's status.
    pub async fn submit(&mut self, gateway: &dyn Gateway) -> Option<DatasetDetail> {
        let ticket = self.begin_submit().ok()?;
        let bytes = match read_file(&ticket.file.path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", ticket.file.path.display(), e);
                self.fail_locally(format!(
                    "Failed to read {}: {}",
                    ticket.file.path.display(),
                    e
                ));
                return None;
            }
        };
        let result = api::upload_dataset(gateway, &ticket.file.file_name, bytes).await;
        self.complete(result)
    }
}

async fn read_file(path: &Path) -> std::io::Result<Bytes> {
    tokio::fs::read(path).await.map(Bytes::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::gateway::{FakeGateway, Method, RequestBody};
    use serde_json::json;
    use std::io::Write;

    fn detail(id: u64) -> DatasetDetail {
        DatasetDetail {
            id,
            filename: "pumps.csv".to_string(),
            summary: None,
            equipment: Vec::new(),
        }
    }

    fn csv_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Equipment Name,Type,Flowrate,Pressure,Temperature").unwrap();
        writeln!(file, "Pump-1,Pump,120.5,5.2,110").unwrap();
        file
    }

    #[test]
    fn test_submit_without_file_is_rejected_locally() {
        let mut upload = UploadController::default();
        assert_eq!(upload.begin_submit(), Err(SubmitRefused::NoFile));
        assert_eq!(upload.error(), Some(NO_FILE_SELECTED));
    }

    #[tokio::test]
    async fn test_submit_without_file_makes_no_request() {
        let gateway = FakeGateway::new();
        let mut upload = UploadController::default();
        assert!(upload.submit(&gateway).await.is_none());
        assert_eq!(gateway.request_count(), 0);
        assert_eq!(upload.error(), Some("Please select a file"));
    }

    #[test]
    fn test_select_clears_error() {
        let mut upload = UploadController::default();
        let _ = upload.begin_submit();
        assert!(upload.select_file("data.csv"));
        assert_eq!(upload.status(), &UploadStatus::FileSelected);
        assert!(upload.error().is_none());
        assert_eq!(upload.file().unwrap().file_name, "data.csv");
    }

    #[test]
    fn test_second_submission_while_uploading_is_noop() {
        let mut upload = UploadController::default();
        upload.select_file("data.csv");
        assert!(upload.begin_submit().is_ok());

        for _ in 0..3 {
            assert_eq!(upload.begin_submit(), Err(SubmitRefused::InFlight));
            assert_eq!(upload.status(), &UploadStatus::Uploading);
        }
        assert!(!upload.select_file("other.csv"));
        assert_eq!(upload.file().unwrap().file_name, "data.csv");
    }

    #[test]
    fn test_success_returns_to_idle_and_clears_file() {
        let mut upload = UploadController::default();
        upload.select_file("data.csv");
        upload.begin_submit().unwrap();

        let uploaded = upload.complete(Ok(detail(4)));
        assert_eq!(uploaded.map(|d| d.id), Some(4));
        assert_eq!(upload.status(), &UploadStatus::Idle);
        assert!(upload.file().is_none());
    }

    #[test]
    fn test_failure_keeps_file_for_retry() {
        let mut upload = UploadController::default();
        upload.select_file("data.csv");
        upload.begin_submit().unwrap();

        let uploaded = upload.complete(Err(GatewayError::Rejected {
            status: 400,
            message: Some("Missing columns: Flowrate".to_string()),
        }));
        assert!(uploaded.is_none());
        assert_eq!(upload.error(), Some("Missing columns: Flowrate"));
        assert!(upload.file().is_some());

        assert!(upload.begin_submit().is_ok());
        upload.complete(Err(GatewayError::Transport("timeout".to_string())));
        assert_eq!(upload.error(), Some(UPLOAD_FAILED));
    }

    #[test]
    fn test_stray_completion_is_ignored() {
        let mut upload = UploadController::default();
        assert!(upload.complete(Ok(detail(1))).is_none());
        assert_eq!(upload.status(), &UploadStatus::Idle);
    }

    #[tokio::test]
    async fn test_submit_sends_multipart_file() {
        let file = csv_file();
        let gateway = FakeGateway::new();
        gateway.on_json(
            Method::Post,
            api::DATASET_UPLOAD,
            json!({"id": 11, "filename": "pumps.csv", "summary": null, "equipment": []}),
        );
        let mut upload = UploadController::default();
        upload.select_file(file.path());

        let uploaded = upload.submit(&gateway).await.unwrap();
        assert_eq!(uploaded.id, 11);

        match &gateway.requests()[0].body {
            Some(RequestBody::Multipart {
                field,
                file_name,
                bytes,
            }) => {
                assert_eq!(field, "file");
                assert!(file_name.ends_with(".csv"));
                assert!(bytes.starts_with(b"Equipment Name"));
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreadable_file_settles_as_error() {
        let gateway = FakeGateway::new();
        let mut upload = UploadController::default();
        upload.select_file("/nonexistent/dir/data.csv");

        assert!(upload.submit(&gateway).await.is_none());
        assert!(upload.error().unwrap().starts_with("Failed to read"));
        assert_eq!(gateway.request_count(), 0);
        assert!(upload.file().is_some());
    }
}
