//! Maps failed provider responses onto one user-facing message and status.
//!
//! Both the chat provider and the image provider go through here, so the
//! caller sees the same wording for the same failure class regardless of
//! which upstream produced it.

use axum::http::StatusCode;
use serde_json::Value;

pub const AUTH_FAILED: &str =
    "Authentication error: the AI service rejected the API key. Check the server configuration.";
pub const RATE_LIMITED: &str =
    "AI service request limit exceeded. Please wait a moment and try again.";
pub const UNAVAILABLE: &str = "AI service is temporarily unavailable. Please try again later.";
pub const GENERIC_FAILURE: &str = "An error occurred while contacting the AI service.";
const UPSTREAM_PREFIX: &str = "AI service error";

/// Body of a non-2xx provider response.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamBody {
    Json(Value),
    Text(String),
    Empty,
}

impl UpstreamBody {
    /// JSON when it parses, plain text otherwise.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return UpstreamBody::Empty;
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => UpstreamBody::Json(value),
            Err(_) => UpstreamBody::Text(raw.to_string()),
        }
    }
}

pub fn upstream_message(status: u16, body: &UpstreamBody) -> String {
    match status {
        401 => AUTH_FAILED.to_string(),
        429 => RATE_LIMITED.to_string(),
        500 | 502 | 503 => UNAVAILABLE.to_string(),
        _ => match body {
            UpstreamBody::Json(value) => {
                if let Some(message) = value.pointer("/error/message").and_then(Value::as_str) {
                    format!("{}: {}", UPSTREAM_PREFIX, message)
                } else if let Some(text) = value.as_str() {
                    format!("{}: {}", UPSTREAM_PREFIX, text)
                } else {
                    GENERIC_FAILURE.to_string()
                }
            }
            UpstreamBody::Text(text) => format!("{}: {}", UPSTREAM_PREFIX, text),
            UpstreamBody::Empty => GENERIC_FAILURE.to_string(),
        },
    }
}

/// 4xx statuses pass through unchanged; anything 5xx becomes a flat 500.
pub fn outward_status(status: u16) -> StatusCode {
    if status >= 500 {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn auth_failure_ignores_payload() {
        let body = UpstreamBody::Json(json!({ "error": { "message": "bad key sk-123" } }));
        assert_eq!(upstream_message(401, &body), AUTH_FAILED);
        assert_eq!(upstream_message(401, &UpstreamBody::Empty), AUTH_FAILED);
    }

    #[test]
    fn fixed_messages_for_rate_limit_and_outages() {
        assert_eq!(upstream_message(429, &UpstreamBody::Empty), RATE_LIMITED);
        for status in [500, 502, 503] {
            assert_eq!(upstream_message(status, &UpstreamBody::Json(json!({}))), UNAVAILABLE);
        }
    }

    #[test]
    fn nested_error_message_is_surfaced() {
        let body = UpstreamBody::Json(json!({ "error": { "message": "X" } }));
        let message = upstream_message(418, &body);
        assert!(message.contains('X'));
        assert!(message.starts_with(UPSTREAM_PREFIX));
        assert_eq!(outward_status(418), StatusCode::IM_A_TEAPOT);
    }

    #[test]
    fn plain_text_payload_is_surfaced() {
        let body = UpstreamBody::parse("model overloaded");
        assert_eq!(body, UpstreamBody::Text("model overloaded".to_string()));
        assert_eq!(upstream_message(400, &body), "AI service error: model overloaded");
    }

    #[test]
    fn unknown_shapes_get_generic_message() {
        let body = UpstreamBody::Json(json!({ "detail": "secret internals" }));
        assert_eq!(upstream_message(422, &body), GENERIC_FAILURE);
        assert_eq!(upstream_message(504, &UpstreamBody::Empty), GENERIC_FAILURE);
    }

    #[test]
    fn server_statuses_clamp_to_500() {
        assert_eq!(outward_status(503), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(outward_status(504), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(outward_status(429), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(outward_status(404), StatusCode::NOT_FOUND);
    }
}
