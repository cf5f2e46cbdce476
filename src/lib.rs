pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod normalize;
pub mod payload;
pub mod preview;
pub mod submission;
pub mod types;

pub use client::{ApiClient, ClientConfig};
pub use controller::{
    Completed, Controller, DesktopController, DocumentController, PendingSubmission, WebController,
};
pub use error::ApiError;
pub use form::{AutomationForm, FieldErrors, FormState};
pub use normalize::{DocumentResult, ErrorModel, JobResult, Message};
pub use submission::SubmissionState;
pub use types::{AppName, AutomationRequest, DesktopAction, SelectedFile};
