//! Sub-responses of the multiplexed batch call.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One entry of the aggregate response, answering one [`RequestDescriptor`](super::RequestDescriptor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubResponse {
    /// Correlation id echoed by the server. Some endpoints omit it.
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(rename = "status")]
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl SubResponse {
    pub fn new(status_code: u16) -> Self {
        Self {
            correlation_id: None,
            status_code,
            body: None,
            headers: None,
            error_message: None,
        }
    }

    pub fn ok(body: serde_json::Value) -> Self {
        Self::new(200).with_body(body)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_error_message(mut self, msg: impl Into<String>) -> Self {
        self.error_message = Some(msg.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Error text embedded in the body as `{"error": {"message": ...}}`.
    pub fn embedded_error_message(&self) -> Option<&str> {
        self.body
            .as_ref()?
            .get("error")?
            .get("message")?
            .as_str()
    }
}
