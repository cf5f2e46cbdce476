use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Desktop applications the backend knows how to drive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AppName {
    Notepad,
    Wordpad,
    Calculator,
    Paint,
    Chrome,
    Firefox,
    Edge,
}

impl AppName {
    pub fn label(self) -> &'static str {
        match self {
            AppName::Notepad => "Notepad",
            AppName::Wordpad => "WordPad",
            AppName::Calculator => "Calculator",
            AppName::Paint => "Paint",
            AppName::Chrome => "Chrome",
            AppName::Firefox => "Firefox",
            AppName::Edge => "Edge",
        }
    }
}

/// What the backend should do with the chosen application.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DesktopAction {
    Type,
    Open,
    Close,
    Press,
}

impl DesktopAction {
    /// `type` and `press` carry a text argument; the rest never do.
    pub fn takes_text(self) -> bool {
        matches!(self, DesktopAction::Type | DesktopAction::Press)
    }

    pub fn label(self) -> &'static str {
        match self {
            DesktopAction::Type => "Type Text",
            DesktopAction::Open => "Open Application",
            DesktopAction::Close => "Close Application",
            DesktopAction::Press => "Press Keys",
        }
    }
}

/// A file picked for text extraction. Bytes are shared so the preview task
/// and the upload can both hold them without copying.
///
/// `size_bytes` is the size on disk. Files over [`MAX_UPLOAD_BYTES`] are
/// never buffered, so their `bytes` stay empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: usize,
    pub bytes: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes: bytes.len(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension.
    pub async fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow::anyhow!("{} is not a file path", path.display()))?;
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        let size_bytes = usize::try_from(tokio::fs::metadata(path).await?.len()).unwrap_or(usize::MAX);
        if size_bytes > MAX_UPLOAD_BYTES {
            return Ok(Self {
                name,
                mime_type,
                size_bytes,
                bytes: Arc::from(Vec::new()),
            });
        }

        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(name, mime_type, bytes))
    }

    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebRequest {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub search_query: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopRequest {
    pub app_name: AppName,
    pub action: DesktopAction,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRequest {
    pub file: SelectedFile,
}

/// A validated job request, one variant per automation domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutomationRequest {
    Web(WebRequest),
    Desktop(DesktopRequest),
    Document(DocumentRequest),
}

impl AutomationRequest {
    /// Path of the backend endpoint that runs this job.
    pub fn endpoint(&self) -> &'static str {
        match self {
            AutomationRequest::Web(_) => "/api/web-automate",
            AutomationRequest::Desktop(_) => "/api/desktop-automate",
            AutomationRequest::Document(_) => "/api/document/extract-text",
        }
    }

    pub fn domain(&self) -> &'static str {
        match self {
            AutomationRequest::Web(_) => "web",
            AutomationRequest::Desktop(_) => "desktop",
            AutomationRequest::Document(_) => "document",
        }
    }
}

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const ALLOWED_MIME_TYPES: [&str; 3] = ["application/pdf", "image/jpeg", "image/png"];
