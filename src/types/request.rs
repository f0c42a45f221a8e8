//! Request descriptors for the multiplexed batch call.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// HTTP method of a single bundled operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the caller-supplied request builder for one input item.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestFields {
    pub method: Method,
    /// URL or path relative to the batch endpoint's service root.
    pub target: String,
    pub payload: Option<serde_json::Value>,
    pub headers: Option<HashMap<String, String>>,
}

impl RequestFields {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            payload: None,
            headers: None,
        }
    }

    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::Get, target)
    }

    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::Post, target)
    }

    pub fn patch(target: impl Into<String>) -> Self {
        Self::new(Method::Patch, target)
    }

    pub fn delete(target: impl Into<String>) -> Self {
        Self::new(Method::Delete, target)
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }
}

/// One bundled operation as it appears inside the batch envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    #[serde(rename = "id")]
    pub correlation_id: String,
    pub method: Method,
    #[serde(rename = "url")]
    pub target: String,
    #[serde(rename = "body", default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
}

impl RequestDescriptor {
    /// Attach a fresh v4 UUID as correlation id.
    pub fn from_fields(fields: RequestFields) -> Self {
        Self::with_correlation_id(Uuid::new_v4().to_string(), fields)
    }

    pub fn with_correlation_id(id: impl Into<String>, fields: RequestFields) -> Self {
        Self {
            correlation_id: id.into(),
            method: fields.method,
            target: fields.target,
            payload: fields.payload,
            headers: fields.headers,
        }
    }
}
