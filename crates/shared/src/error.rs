use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error body returned by the backend on non-2xx responses.
///
/// `detail` is usually a string, but request validation failures carry a list of
/// `{loc, msg, type}` objects instead, so it is kept as raw JSON until read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    /// Parses an error body, returning `None` when the bytes are not a JSON object.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        serde_json::from_slice(bytes).ok()
    }

    /// Human readable detail text, if the body carried any.
    pub fn detail_text(&self) -> Option<String> {
        let text = match self.detail.as_ref()? {
            Value::String(text) => text.trim().to_string(),
            Value::Array(items) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(text) => Some(text.clone()),
                    Value::Object(fields) => fields
                        .get("msg")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("; "),
            Value::Null => return None,
            other => other.to_string(),
        };

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
