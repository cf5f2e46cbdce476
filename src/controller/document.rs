use serde_json::Value;
use tracing::debug;

use crate::controller::Controller;
use crate::error::ApiError;
use crate::form::{AutomationForm, FieldErrors};
use crate::normalize::{self, DocumentResult};
use crate::preview::{Preview, PreviewJob, PreviewReady, PreviewTracker};
use crate::types::{ALLOWED_MIME_TYPES, AutomationRequest, DocumentRequest, MAX_UPLOAD_BYTES, SelectedFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DocumentField {
    File,
}

#[derive(Debug, Clone, Default)]
pub struct DocumentDraft {
    pub file: Option<SelectedFile>,
    preview: PreviewTracker,
    selection: u64,
}

impl DocumentDraft {
    pub fn with_file(file: SelectedFile) -> Self {
        Self {
            file: Some(file),
            ..Default::default()
        }
    }

    pub fn preview(&self) -> &Preview {
        self.preview.preview()
    }
}

impl AutomationForm for DocumentDraft {
    type Field = DocumentField;
    type Outcome = DocumentResult;

    fn check(&self) -> Result<AutomationRequest, FieldErrors<DocumentField>> {
        let mut errors = FieldErrors::default();
        let Some(file) = &self.file else {
            errors.add(DocumentField::File, "A file is required");
            return Err(errors);
        };

        if !ALLOWED_MIME_TYPES.contains(&file.mime_type.as_str()) {
            errors.add(
                DocumentField::File,
                "Unsupported file format. Please upload a PDF, JPG, or PNG file.",
            );
        }
        if file.size_bytes() > MAX_UPLOAD_BYTES {
            errors.add(DocumentField::File, "File size must be less than 10MB");
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(AutomationRequest::Document(DocumentRequest { file: file.clone() }))
    }

    fn decode(body: Value) -> Result<DocumentResult, ApiError> {
        normalize::decode_document(body)
    }
}

impl Controller<DocumentDraft> {
    /// Reserves a token for a file that is still being read. Only the most
    /// recently reserved token is accepted by [`Self::accept_selection`].
    pub fn begin_selection(&mut self) -> u64 {
        let mut token = 0;
        self.edit(|draft| {
            draft.selection += 1;
            token = draft.selection;
        });
        token
    }

    pub fn is_latest_selection(&self, token: u64) -> bool {
        self.draft().selection == token
    }

    /// Stores a file whose read started under `token`. Files from superseded
    /// selections are dropped.
    pub fn accept_selection(&mut self, token: u64, file: SelectedFile) -> Option<PreviewJob> {
        if !self.is_latest_selection(token) {
            debug!(token, latest = self.draft().selection, name = %file.name, "discarding stale file load");
            return None;
        }
        self.store_file(file)
    }

    /// Stores a newly picked file, superseding any load still in flight.
    /// For images, returns the preview read the caller should run in the
    /// background.
    pub fn select_file(&mut self, file: SelectedFile) -> Option<PreviewJob> {
        self.begin_selection();
        self.store_file(file)
    }

    fn store_file(&mut self, file: SelectedFile) -> Option<PreviewJob> {
        debug!(name = %file.name, mime = %file.mime_type, size = file.size_bytes(), "file selected");
        let mut job = None;
        self.edit(|draft| {
            job = draft.preview.select(&file);
            draft.file = Some(file);
        });
        self.blur(DocumentField::File);
        job
    }

    pub fn apply_preview(&mut self, ready: PreviewReady) -> bool {
        let mut applied = false;
        self.edit(|draft| applied = draft.preview.apply(ready));
        applied
    }

    pub fn preview(&self) -> &Preview {
        self.draft().preview()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::DocumentController;
    use crate::submission::SubmissionState;

    fn file(name: &str, mime: &str, size: usize) -> SelectedFile {
        SelectedFile::new(name, mime, vec![0u8; size])
    }

    #[test]
    fn test_missing_file_only_required() {
        let errors = DocumentDraft::default().validate();
        assert_eq!(errors.messages(DocumentField::File), ["A file is required"]);
    }

    #[test]
    fn test_oversized_pdf_blocked() {
        let mut controller = DocumentController::default();
        let job = controller.select_file(file("big.pdf", "application/pdf", 12 * 1024 * 1024));
        assert!(job.is_none());
        assert_eq!(
            controller.form().visible_errors(DocumentField::File),
            ["File size must be less than 10MB"]
        );
        assert!(controller.begin_submit().is_none());
        assert_eq!(controller.state(), &SubmissionState::Idle);
        assert_eq!(controller.preview(), &Preview::FileName("big.pdf".into()));
    }

    #[test]
    fn test_format_and_size_both_reported() {
        let draft = DocumentDraft::with_file(file("huge.gif", "image/gif", MAX_UPLOAD_BYTES + 1));
        assert_eq!(draft.validate().messages(DocumentField::File).len(), 2);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let draft = DocumentDraft::with_file(file("huge.gif", "image/gif", MAX_UPLOAD_BYTES + 1));
        let first = draft.validate();
        assert_eq!(first, draft.validate());
        assert_eq!(first.messages(DocumentField::File).len(), 2);
    }

    #[test]
    fn test_exact_limit_is_allowed() {
        let draft = DocumentDraft::with_file(file("edge.png", "image/png", MAX_UPLOAD_BYTES));
        assert!(draft.validate().is_empty());
    }

    #[test]
    fn test_image_selection_previews_latest() {
        let mut controller = DocumentController::default();
        let first = controller.select_file(file("a.png", "image/png", 3)).unwrap();
        let second = controller.select_file(file("b.jpg", "image/jpeg", 3)).unwrap();

        assert!(controller.apply_preview(second.run()));
        assert!(!controller.apply_preview(first.run()));
        assert_eq!(
            controller.preview(),
            &Preview::Image("data:image/jpeg;base64,AAAA".into())
        );
        assert_eq!(controller.draft().file.as_ref().unwrap().name, "b.jpg");
    }

    #[test]
    fn test_out_of_order_loads_keep_latest_click() {
        let mut controller = DocumentController::default();
        let slow = controller.begin_selection();
        let fast = controller.begin_selection();

        assert!(controller.accept_selection(fast, file("b.pdf", "application/pdf", 4)).is_none());
        assert!(controller.accept_selection(slow, file("a.png", "image/png", 4)).is_none());

        assert_eq!(controller.draft().file.as_ref().unwrap().name, "b.pdf");
        assert_eq!(controller.preview(), &Preview::FileName("b.pdf".into()));
        assert!(controller.is_latest_selection(fast));
    }

    #[test]
    fn test_direct_selection_supersedes_pending_load() {
        let mut controller = DocumentController::default();
        let pending = controller.begin_selection();
        controller.select_file(file("picked.pdf", "application/pdf", 4));

        assert!(!controller.is_latest_selection(pending));
        assert!(controller.accept_selection(pending, file("old.png", "image/png", 4)).is_none());
        assert_eq!(controller.draft().file.as_ref().unwrap().name, "picked.pdf");
    }

    #[test]
    fn test_valid_file_dispatches() {
        let mut controller = DocumentController::default();
        controller.select_file(file("scan.png", "image/png", 16));
        let pending = controller.begin_submit().unwrap();
        assert_eq!(pending.request().endpoint(), "/api/document/extract-text");
    }
}
