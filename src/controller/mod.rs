//! Form controllers: one generic driver, three automation domains.
//!
//! A `Controller<F>` owns the draft for one domain and the submission state
//! machine. Submitting is split in two so that an event loop can run the
//! HTTP call elsewhere: [`Controller::begin_submit`] hands out a
//! [`PendingSubmission`], and its [`Completed`] result is fed back through
//! [`Controller::complete`].

pub mod desktop;
pub mod document;
pub mod web;

use std::marker::PhantomData;

use tracing::{debug, info, warn};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::form::{AutomationForm, FormState};
use crate::normalize::ErrorModel;
use crate::submission::{Submission, SubmissionState, Ticket};
use crate::types::AutomationRequest;

pub use desktop::{DesktopDraft, DesktopField};
pub use document::{DocumentDraft, DocumentField};
pub use web::{WebDraft, WebField};

pub type WebController = Controller<WebDraft>;
pub type DesktopController = Controller<DesktopDraft>;
pub type DocumentController = Controller<DocumentDraft>;

#[derive(Debug)]
pub struct Controller<F: AutomationForm> {
    form: FormState<F>,
    submission: Submission<F::Outcome>,
}

impl<F: AutomationForm + Default> Default for Controller<F> {
    fn default() -> Self {
        Self::new(F::default())
    }
}

impl<F: AutomationForm> Controller<F> {
    pub fn new(draft: F) -> Self {
        Self {
            form: FormState::new(draft),
            submission: Submission::default(),
        }
    }

    pub fn form(&self) -> &FormState<F> {
        &self.form
    }

    pub fn draft(&self) -> &F {
        self.form.draft()
    }

    pub fn edit(&mut self, apply: impl FnOnce(&mut F)) {
        self.form.edit(apply);
    }

    pub fn blur(&mut self, field: F::Field) {
        self.form.blur(field);
    }

    pub fn state(&self) -> &SubmissionState<F::Outcome> {
        self.submission.state()
    }

    pub fn can_submit(&self) -> bool {
        !self.submission.state().is_submitting()
    }

    /// Validates and, when clean, moves to Submitting.
    ///
    /// Returns `None` while another submission is in flight, or when
    /// validation fails; in the latter case the errors become visible.
    pub fn begin_submit(&mut self) -> Option<PendingSubmission<F>> {
        if !self.submission.reset() {
            debug!("submit ignored, request already in flight");
            return None;
        }
        let Some(request) = self.form.attempt() else {
            debug!(errors = self.form.errors().len(), "submit blocked by validation");
            return None;
        };
        let ticket = self.submission.start()?;
        Some(PendingSubmission {
            ticket,
            request,
            _form: PhantomData,
        })
    }

    /// Applies a finished dispatch. Returns false for stale completions.
    pub fn complete(&mut self, done: Completed<F>) -> bool {
        let outcome = done.outcome.map_err(|err| {
            let model = ErrorModel::from(&err);
            warn!(error = %err, display = %model.display_message, "automation job failed");
            model
        });
        let applied = self.submission.finish(done.ticket, outcome);
        if applied {
            info!(state = self.state().label(), "submission settled");
        } else {
            warn!("ignoring completion for a superseded submission");
        }
        applied
    }

    /// Validate, dispatch and settle in one go.
    pub async fn submit(&mut self, client: &ApiClient) -> &SubmissionState<F::Outcome> {
        if let Some(pending) = self.begin_submit() {
            let done = pending.run(client.clone()).await;
            self.complete(done);
        }
        self.state()
    }
}

/// A validated request waiting to be sent.
#[derive(Debug)]
pub struct PendingSubmission<F: AutomationForm> {
    ticket: Ticket,
    request: AutomationRequest,
    _form: PhantomData<fn() -> F>,
}

impl<F: AutomationForm> PendingSubmission<F> {
    pub fn request(&self) -> &AutomationRequest {
        &self.request
    }

    pub async fn run(self, client: ApiClient) -> Completed<F> {
        let outcome = client.send(&self.request).await.and_then(F::decode);
        Completed {
            ticket: self.ticket,
            outcome,
        }
    }
}

#[derive(Debug)]
pub struct Completed<F: AutomationForm> {
    ticket: Ticket,
    outcome: Result<F::Outcome, ApiError>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{JobResult, Message};
    use serde_json::json;

    fn valid_web() -> WebController {
        let mut controller = WebController::default();
        controller.edit(|d| d.url = "https://example.com".into());
        controller
    }

    #[test]
    fn test_second_submit_while_submitting_is_noop() {
        let mut controller = valid_web();
        let pending = controller.begin_submit().unwrap();
        assert!(controller.begin_submit().is_none());
        assert!(!controller.can_submit());
        assert_eq!(pending.request().domain(), "web");
    }

    #[test]
    fn test_completion_settles_state() {
        let mut controller = valid_web();
        let pending = controller.begin_submit().unwrap();
        let done = Completed {
            ticket: pending.ticket,
            outcome: WebDraft::decode(json!({"status": "ok", "message": [{"msg": "slow response"}]})),
        };
        assert!(controller.complete(done));

        let SubmissionState::Succeeded(JobResult { status, message }) = controller.state() else {
            panic!("expected success, got {:?}", controller.state());
        };
        assert_eq!(status, "ok");
        assert_eq!(message, &Message::Entries(vec!["slow response".into()]));
    }

    #[test]
    fn test_resubmit_clears_prior_failure() {
        let mut controller = valid_web();
        let pending = controller.begin_submit().unwrap();
        controller.complete(Completed {
            ticket: pending.ticket,
            outcome: Err(ApiError::UnexpectedShape("nope".into())),
        });
        assert!(matches!(controller.state(), SubmissionState::Failed(_)));

        controller.edit(|d| d.url = "nope".into());
        assert!(controller.begin_submit().is_none());
        assert_eq!(controller.state(), &SubmissionState::Idle);
    }

    #[test]
    fn test_stale_completion_is_dropped() {
        let mut controller = valid_web();
        let first = controller.begin_submit().unwrap();
        let first_ticket = first.ticket;
        controller.complete(Completed {
            ticket: first_ticket,
            outcome: Err(ApiError::UnexpectedShape("x".into())),
        });
        let _second = controller.begin_submit().unwrap();

        let late = Completed {
            ticket: first_ticket,
            outcome: Ok(JobResult {
                status: "ok".into(),
                message: Message::Text("late".into()),
            }),
        };
        assert!(!controller.complete(late));
        assert!(controller.state().is_submitting());
    }

    #[test]
    fn test_invalid_submit_surfaces_errors() {
        let mut controller = WebController::default();
        assert!(controller.form().visible_errors(WebField::Url).is_empty());
        assert!(controller.begin_submit().is_none());
        assert!(controller.form().submit_attempted());
        assert_eq!(controller.form().visible_errors(WebField::Url), ["Required"]);
        assert!(controller.can_submit());
    }
}
