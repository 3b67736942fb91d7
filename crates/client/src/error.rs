//! Transport failure type and message normalization.

use serde_json::Value;

/// Message used when nothing more specific can be said about a failure.
pub const FALLBACK_MESSAGE: &str = "request failed";

/// Any failure of a request to the API, reduced to a single message.
///
/// The message is picked, in order, from the error body's `detail`,
/// `message` or `error` field, then from the HTTP status or network
/// error itself, and finally [`FALLBACK_MESSAGE`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    /// HTTP status when the server answered at all.
    pub status: Option<u16>,
    pub message: String,
}

impl TransportError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            message
        };
        Self { status, message }
    }

    /// Build the error for a non-success response from its status and body.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let message = server_message(body)
            .unwrap_or_else(|| format!("request failed with status code {}", status));
        Self::new(Some(status), message)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        let status = e.status().map(|s| s.as_u16());
        if e.is_timeout() {
            return Self::new(status, "request timed out");
        }
        if e.is_decode() {
            return Self::new(status, format!("invalid response body: {}", e));
        }
        Self::new(status, e.to_string())
    }
}

/// Extract the server's own explanation from a JSON error body.
fn server_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    ["detail", "message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(field_text))
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        // Validation failures carry a list of `{loc, msg, type}` objects.
        Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_preferred_over_message_and_error() {
        let body = br#"{"error":"E","message":"M","detail":"D"}"#;
        let err = TransportError::from_response(400, body);
        assert_eq!(err.message, "D");
        assert_eq!(err.status, Some(400));
    }

    #[test]
    fn test_message_then_error() {
        let err = TransportError::from_response(500, br#"{"error":"E","message":"M"}"#);
        assert_eq!(err.to_string(), "M");

        let err = TransportError::from_response(500, br#"{"error":"E","detail":null}"#);
        assert_eq!(err.to_string(), "E");
    }

    #[test]
    fn test_empty_detail_is_skipped() {
        let err = TransportError::from_response(500, br#"{"detail":"","message":"M"}"#);
        assert_eq!(err.to_string(), "M");
    }

    #[test]
    fn test_validation_detail_list() {
        let body = br#"{"detail":[{"loc":["body","url"],"msg":"field required","type":"missing"},
                                  {"loc":["body","x"],"msg":"bad x","type":"value_error"}]}"#;
        let err = TransportError::from_response(422, body);
        assert_eq!(err.to_string(), "field required; bad x");
    }

    #[test]
    fn test_status_text_when_body_unhelpful() {
        let err = TransportError::from_response(502, b"<html>Bad Gateway</html>");
        assert_eq!(err.to_string(), "request failed with status code 502");

        let err = TransportError::from_response(404, br#"{"other":"x"}"#);
        assert_eq!(err.to_string(), "request failed with status code 404");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_blank_message_falls_back() {
        let err = TransportError::new(None, "  ");
        assert_eq!(err.to_string(), FALLBACK_MESSAGE);
    }
}
