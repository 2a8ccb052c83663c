//! Client state machine
//!
//! One module per component, each owning its own slice of state and its own
//! error channel:
//!
//! - [`session`] -- authenticated identity
//! - [`registry`] -- the recent datasets list
//! - [`upload`] -- the single pending upload
//! - [`selection`] -- the inspected dataset and its report downloads
//! - [`app`] -- the container tying them to one gateway

pub mod app;
pub mod registry;
pub mod selection;
pub mod session;
pub mod upload;

pub use app::App;
pub use registry::DatasetRegistry;
pub use selection::{SelectOutcome, SelectTicket, SelectionEngine};
pub use session::{CredentialForm, LogoutPolicy, SessionPhase, SessionStore};
pub use upload::{SelectedFile, SubmitRefused, UploadController, UploadStatus, UploadTicket};
