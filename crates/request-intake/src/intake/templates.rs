use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use super::categories::{STEP_OUT_NOTICE, STEP_OUT_OF_ASHRAM};
use super::domain::RequestId;

pub const REQUEST_RECEIVED: &str = "request_received";
pub const STEP_OUT_CONFIRMATION: &str = "step_out_confirmation";

pub const REQUEST_ID_PLACEHOLDER: &str = "{request_id}";
pub const FALLBACK_MESSAGE: &str = "Your request has been submitted.";

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("failed to read message templates: {0}")]
    Io(#[from] std::io::Error),
    #[error("message templates must be a JSON object of strings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key to message body lookup with a fixed fallback for unknown keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplates {
    entries: HashMap<String, String>,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MessageTemplates {
    pub fn builtin() -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            REQUEST_RECEIVED.to_string(),
            "We have received your request (Request ID: {request_id}). \
             The respective team will get back to you shortly."
                .to_string(),
        );
        entries.insert(
            STEP_OUT_CONFIRMATION.to_string(),
            "Please request your department coordinator to send an approval email for your \
             step out request to the volunteer office, for us to process it further. \
             Your request ID: {request_id}"
                .to_string(),
        );
        entries.insert(
            STEP_OUT_NOTICE.to_string(),
            "Please raise the request at least 72 hrs before the travel date. Mention the \
             dates of departure and expected return, and the reason for travel in the \
             description."
                .to_string(),
        );
        Self { entries }
    }

    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Built-ins overlaid with the entries of a JSON object.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TemplateError> {
        let overrides: HashMap<String, String> = serde_json::from_reader(reader)?;
        let mut templates = Self::builtin();
        templates.entries.extend(overrides);
        Ok(templates)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, TemplateError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn insert(&mut self, key: impl Into<String>, body: impl Into<String>) {
        self.entries.insert(key.into(), body.into());
    }

    pub fn get(&self, key: &str) -> &str {
        self.entries
            .get(key)
            .map(String::as_str)
            .unwrap_or(FALLBACK_MESSAGE)
    }

    pub fn render(&self, key: &str, request_id: &RequestId) -> String {
        self.get(key)
            .replace(REQUEST_ID_PLACEHOLDER, request_id.as_str())
    }

    /// Confirmation template for a stored request.
    pub fn confirmation_key(sub_category: Option<&str>) -> &'static str {
        match sub_category {
            Some(STEP_OUT_OF_ASHRAM) => STEP_OUT_CONFIRMATION,
            _ => REQUEST_RECEIVED,
        }
    }
}
