use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use crate::types::SelectedFile;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Preview {
    #[default]
    None,
    /// `data:<mime>;base64,...`, ready to render.
    Image(String),
    /// Non-image files only show their name.
    FileName(String),
}

/// An image read that the caller runs off the UI thread.
#[derive(Debug, Clone)]
pub struct PreviewJob {
    pub token: u64,
    pub file: SelectedFile,
}

impl PreviewJob {
    pub fn run(self) -> PreviewReady {
        PreviewReady {
            token: self.token,
            data_url: data_url(&self.file.mime_type, &self.file.bytes),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PreviewReady {
    pub token: u64,
    pub data_url: String,
}

pub fn data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Keeps the preview in step with the latest file selection.
#[derive(Debug, Clone, Default)]
pub struct PreviewTracker {
    latest: u64,
    preview: Preview,
}

impl PreviewTracker {
    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    /// Registers a new selection. Images clear the preview and hand back a
    /// job to encode; anything else shows the file name straight away.
    pub fn select(&mut self, file: &SelectedFile) -> Option<PreviewJob> {
        self.latest += 1;
        if file.is_image() {
            self.preview = Preview::None;
            Some(PreviewJob {
                token: self.latest,
                file: file.clone(),
            })
        } else {
            self.preview = Preview::FileName(file.name.clone());
            None
        }
    }

    /// Applies a finished read unless a newer selection superseded it.
    pub fn apply(&mut self, ready: PreviewReady) -> bool {
        if ready.token != self.latest {
            debug!(token = ready.token, latest = self.latest, "discarding stale preview");
            return false;
        }
        self.preview = Preview::Image(ready.data_url);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(name: &str) -> SelectedFile {
        SelectedFile::new(name, "image/png", vec![1u8, 2, 3])
    }

    #[test]
    fn test_data_url() {
        assert_eq!(data_url("image/png", &[1, 2, 3]), "data:image/png;base64,AQID");
    }

    #[test]
    fn test_latest_selection_wins() {
        let mut tracker = PreviewTracker::default();
        let first = tracker.select(&png("a.png")).unwrap();
        let second = tracker.select(&png("b.png")).unwrap();

        assert!(tracker.apply(second.run()));
        assert!(!tracker.apply(first.run()));
        assert_eq!(tracker.preview(), &Preview::Image("data:image/png;base64,AQID".into()));
    }

    #[test]
    fn test_pdf_after_image_drops_late_image() {
        let mut tracker = PreviewTracker::default();
        let job = tracker.select(&png("a.png")).unwrap();
        let pdf = SelectedFile::new("report.pdf", "application/pdf", vec![0u8; 4]);
        assert!(tracker.select(&pdf).is_none());

        assert!(!tracker.apply(job.run()));
        assert_eq!(tracker.preview(), &Preview::FileName("report.pdf".into()));
    }
}
