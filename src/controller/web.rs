use serde_json::Value;
use url::Url;

use crate::error::ApiError;
use crate::form::{AutomationForm, FieldErrors};
use crate::normalize::{self, JobResult};
use crate::types::{AutomationRequest, WebRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WebField {
    Url,
    Username,
    Password,
    SearchQuery,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebDraft {
    pub url: String,
    pub username: String,
    pub password: String,
    pub search_query: String,
}

const URL_SCHEMES: [&str; 3] = ["http", "https", "ftp"];

fn is_absolute_url(input: &str) -> bool {
    match Url::parse(input) {
        Ok(url) => URL_SCHEMES.contains(&url.scheme()) && url.has_host(),
        Err(_) => false,
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl AutomationForm for WebDraft {
    type Field = WebField;
    type Outcome = JobResult;

    fn check(&self) -> Result<AutomationRequest, FieldErrors<WebField>> {
        let mut errors = FieldErrors::default();
        let url = self.url.trim();
        if url.is_empty() {
            errors.add(WebField::Url, "Required");
        } else if !is_absolute_url(url) {
            errors.add(WebField::Url, "Invalid URL");
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(AutomationRequest::Web(WebRequest {
            url: url.to_string(),
            username: non_empty(&self.username),
            password: non_empty(&self.password),
            search_query: self.search_query.clone(),
        }))
    }

    fn decode(body: Value) -> Result<JobResult, ApiError> {
        normalize::decode_job(body)
    }
}
