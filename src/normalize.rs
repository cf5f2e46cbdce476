//! Turns backend bodies and failures into display-ready models.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;

pub const FALLBACK_ERROR: &str = "An unexpected error occurred.";
pub const NO_TEXT_PLACEHOLDER: &str = "No text could be extracted from the document.";

/// The polymorphic `message` field of web/desktop responses.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Text(String),
    /// A list of entries, one display line each.
    Entries(Vec<String>),
    /// A nested object, shown as a formatted block.
    Structured(Value),
}

impl Message {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => Message::Text(String::new()),
            Value::String(s) => Message::Text(s),
            Value::Array(items) => Message::Entries(items.into_iter().map(entry_line).collect()),
            Value::Object(_) => Message::Structured(value),
            other => Message::Text(other.to_string()),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        match self {
            Message::Text(s) if s.is_empty() => Vec::new(),
            Message::Text(s) => vec![s.clone()],
            Message::Entries(lines) => lines.clone(),
            Message::Structured(value) => serde_json::to_string_pretty(value)
                .unwrap_or_else(|_| value.to_string())
                .lines()
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn render(&self) -> String {
        self.lines().join("\n")
    }
}

fn entry_line(entry: Value) -> String {
    match entry {
        Value::Object(ref map) => match map.get("msg") {
            Some(Value::String(msg)) => msg.clone(),
            Some(other) => other.to_string(),
            None => entry.to_string(),
        },
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Result of a web or desktop job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobResult {
    pub status: String,
    pub message: Message,
}

#[derive(Deserialize)]
struct RawJobResult {
    status: String,
    #[serde(default)]
    message: Value,
}

/// Result of a document extraction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentResult {
    #[serde(default)]
    pub extracted_text: Option<String>,
}

impl DocumentResult {
    pub fn display_text(&self) -> &str {
        match self.extracted_text.as_deref() {
            Some(text) if !text.is_empty() => text,
            _ => NO_TEXT_PLACEHOLDER,
        }
    }
}

/// Backends report some failures as `200 {"status": "error", ...}`.
fn reject_error_status(body: Value) -> Result<Value, ApiError> {
    if body.get("status").and_then(Value::as_str) == Some("error") {
        return Err(ApiError::Backend {
            status: reqwest::StatusCode::OK,
            body,
        });
    }
    Ok(body)
}

pub fn decode_job(body: Value) -> Result<JobResult, ApiError> {
    let body = reject_error_status(body)?;
    let raw: RawJobResult =
        serde_json::from_value(body).map_err(|e| ApiError::UnexpectedShape(e.to_string()))?;
    Ok(JobResult {
        status: raw.status,
        message: Message::from_value(raw.message),
    })
}

pub fn decode_document(body: Value) -> Result<DocumentResult, ApiError> {
    let body = reject_error_status(body)?;
    if !body.is_object() {
        return Err(ApiError::UnexpectedShape(format!("expected an object, got {body}")));
    }
    serde_json::from_value(body).map_err(|e| ApiError::UnexpectedShape(e.to_string()))
}

/// What the failure banner shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorModel {
    pub display_message: String,
}

impl ErrorModel {
    pub fn new(display_message: impl Into<String>) -> Self {
        Self {
            display_message: display_message.into(),
        }
    }
}

impl From<&ApiError> for ErrorModel {
    fn from(err: &ApiError) -> Self {
        let message = match err {
            ApiError::Backend { status, body } => field_text(body, "detail")
                .or_else(|| field_text(body, "message"))
                .or_else(|| {
                    (!status.is_success())
                        .then(|| format!("Request failed with status code {}", status.as_u16()))
                }),
            ApiError::Transport(e) => Some(e.to_string()),
            ApiError::UnexpectedShape(_) | ApiError::Encode(_) | ApiError::Config(_) => None,
        };
        ErrorModel::new(message.filter(|m| !m.trim().is_empty()).unwrap_or_else(|| FALLBACK_ERROR.to_string()))
    }
}

fn field_text(body: &Value, key: &str) -> Option<String> {
    let value = body.get(key)?.clone();
    let text = Message::from_value(value).render();
    (!text.trim().is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_entries_use_msg() {
        let msg = Message::from_value(json!([{"msg": "slow response"}, {"code": 7}, "plain"]));
        assert_eq!(msg.lines(), vec!["slow response", "{\"code\":7}", "plain"]);
    }

    #[test]
    fn test_message_object_is_pretty_block() {
        let msg = Message::from_value(json!({"opened": "notepad"}));
        assert_eq!(msg.render(), "{\n  \"opened\": \"notepad\"\n}");
    }

    #[test]
    fn test_message_text_passthrough() {
        let msg = Message::from_value(json!("Successfully opened notepad"));
        assert_eq!(msg, Message::Text("Successfully opened notepad".into()));
        assert!(Message::from_value(Value::Null).lines().is_empty());
    }

    #[test]
    fn test_decode_job_requires_status() {
        let err = decode_job(json!({"message": "hi"})).unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedShape(_)));
        assert_eq!(ErrorModel::from(&err).display_message, FALLBACK_ERROR);

        let err = decode_job(json!(["not", "an", "object"])).unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedShape(_)));
    }

    #[test]
    fn test_decode_job_error_status_is_backend_error() {
        let err = decode_job(json!({"status": "error", "message": "Application 'excel' is not supported"}))
            .unwrap_err();
        assert_eq!(
            ErrorModel::from(&err).display_message,
            "Application 'excel' is not supported"
        );
    }

    #[test]
    fn test_document_placeholder() {
        let empty = decode_document(json!({"extracted_text": ""})).unwrap();
        assert_eq!(empty.display_text(), NO_TEXT_PLACEHOLDER);
        let missing = decode_document(json!({"status": "success"})).unwrap();
        assert_eq!(missing.display_text(), NO_TEXT_PLACEHOLDER);
        let text = decode_document(json!({"extracted_text": "  Invoice #42\n"})).unwrap();
        assert_eq!(text.display_text(), "  Invoice #42\n");
    }

    #[test]
    fn test_error_precedence() {
        let both = ApiError::Backend {
            status: reqwest::StatusCode::BAD_REQUEST,
            body: json!({"detail": "from detail", "message": "from message"}),
        };
        assert_eq!(ErrorModel::from(&both).display_message, "from detail");

        let message_only = ApiError::Backend {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            body: json!({"message": "from message"}),
        };
        assert_eq!(ErrorModel::from(&message_only).display_message, "from message");

        let bare = ApiError::Backend {
            status: reqwest::StatusCode::BAD_GATEWAY,
            body: json!("<html>bad gateway</html>"),
        };
        assert_eq!(
            ErrorModel::from(&bare).display_message,
            "Request failed with status code 502"
        );
    }

    #[test]
    fn test_structured_detail_renders_msgs() {
        let err = ApiError::Backend {
            status: reqwest::StatusCode::UNPROCESSABLE_ENTITY,
            body: json!({"detail": [
                {"loc": ["body", "url"], "msg": "field required", "type": "value_error.missing"}
            ]}),
        };
        assert_eq!(ErrorModel::from(&err).display_message, "field required");
    }

    #[test]
    fn test_empty_detail_falls_through() {
        let err = ApiError::Backend {
            status: reqwest::StatusCode::OK,
            body: json!({"status": "error", "detail": ""}),
        };
        assert_eq!(ErrorModel::from(&err).display_message, FALLBACK_ERROR);
    }
}
