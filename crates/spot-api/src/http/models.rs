//! Request and response envelopes used by the control-plane REST API.

use serde::{Deserialize, Serialize};

/// List response wrapper.
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemList<T> {
    /// Returned resources.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Error response body.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    /// Error detail message.
    pub message: Option<String>,
    /// Short machine-readable reason.
    pub reason: Option<String>,
}

impl ErrorBody {
    /// Pick the most useful text from an error body, falling back to the raw text.
    pub fn describe(raw: &str) -> String {
        serde_json::from_str::<Self>(raw)
            .ok()
            .and_then(|body| body.message.or(body.reason))
            .unwrap_or_else(|| raw.trim().to_string())
    }
}
