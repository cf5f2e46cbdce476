use std::time::Duration;

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::ApiError;
use crate::payload::{self, FILE_PART, Payload};
use crate::types::AutomationRequest;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    /// `None` leaves the transport without a deadline.
    pub timeout: Option<Duration>,
}

/// Handle to the automation backend. Cheap to clone; clones share one
/// connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        if config.base_url.cannot_be_a_base() {
            return Err(ApiError::Config(format!("{} cannot be a base url", config.base_url)));
        }
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base: config.base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Dispatch one job and return the raw 2xx body.
    pub async fn send(&self, request: &AutomationRequest) -> Result<Value, ApiError> {
        let url = self.url(request.endpoint());
        let payload = payload::build(request).map_err(|e| ApiError::Encode(e.to_string()))?;
        info!(domain = request.domain(), %url, "dispatching automation job");

        let builder = self.client.post(&url);
        let builder = match payload {
            Payload::Json(body) => builder.json(&body),
            Payload::Multipart(file) => {
                let part = Part::bytes(file.bytes.to_vec())
                    .file_name(file.name.clone())
                    .mime_str(&file.mime_type)
                    .map_err(|e| ApiError::Encode(format!("{}: {e}", file.name)))?;
                builder.multipart(Form::new().part(FILE_PART, part))
            }
        };

        let response = builder.send().await.inspect_err(|e| {
            warn!(domain = request.domain(), error = %e, "transport failure");
        })?;

        let status = response.status();
        let text = response.text().await?;
        // Non-JSON bodies (proxy error pages) still carry the status.
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));

        if !status.is_success() {
            warn!(domain = request.domain(), %status, "backend rejected job");
            return Err(ApiError::Backend { status, body });
        }

        debug!(domain = request.domain(), %status, "job finished");
        Ok(body)
    }

    /// `GET /health`; true when the backend reports itself healthy.
    pub async fn health(&self) -> Result<bool, ApiError> {
        let response = self.client.get(self.url("/health")).send().await?;
        if !response.status().is_success() {
            return Ok(false);
        }
        let body: Value = response.json().await?;
        Ok(body["status"].as_str() == Some("healthy"))
    }
}
