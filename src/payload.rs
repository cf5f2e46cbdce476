use serde::Serialize;

use crate::types::{AppName, AutomationRequest, DesktopAction, DesktopRequest, SelectedFile, WebRequest};

/// Body of `POST /api/web-automate`. Missing credentials go out as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebPayload {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub search_query: String,
}

/// Body of `POST /api/desktop-automate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesktopPayload {
    #[serde(rename = "appName")]
    pub app_name: AppName,
    pub action: DesktopAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// The exact request body for one job.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(serde_json::Value),
    /// Multipart body with a single part named `file`.
    Multipart(SelectedFile),
}

pub const FILE_PART: &str = "file";

impl From<&WebRequest> for WebPayload {
    fn from(req: &WebRequest) -> Self {
        Self {
            url: req.url.clone(),
            username: req.username.clone().filter(|s| !s.is_empty()),
            password: req.password.clone().filter(|s| !s.is_empty()),
            search_query: req.search_query.clone(),
        }
    }
}

impl From<&DesktopRequest> for DesktopPayload {
    fn from(req: &DesktopRequest) -> Self {
        Self {
            app_name: req.app_name,
            action: req.action,
            text: if req.action.takes_text() {
                req.text.clone()
            } else {
                None
            },
        }
    }
}

pub fn build(request: &AutomationRequest) -> Result<Payload, serde_json::Error> {
    Ok(match request {
        AutomationRequest::Web(req) => Payload::Json(serde_json::to_value(WebPayload::from(req))?),
        AutomationRequest::Desktop(req) => {
            Payload::Json(serde_json::to_value(DesktopPayload::from(req))?)
        }
        AutomationRequest::Document(req) => Payload::Multipart(req.file.clone()),
    })
}
