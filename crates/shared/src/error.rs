use thiserror::Error;

/// Fallback shown when a failed response carries no usable message.
pub const GENERIC_ERROR: &str = "Something went wrong. Please try again.";

/// Failure of a call to the fleet API.
///
/// Every variant collapses to a single user-facing message through `Display`;
/// the carried detail is for logs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Unable to reach the server")]
    Network(String),
    #[error("{message}")]
    Unauthorized { message: String },
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("Unexpected response from the server")]
    Decode(String),
}

impl ApiError {
    /// Build the error for a non-2xx response. The message is the body's
    /// `detail`/`message`/`error` string if present, else the status text,
    /// else the generic fallback.
    pub fn from_response(status: u16, status_text: Option<&str>, body: &str) -> ApiError {
        let message = message_from_body(body)
            .or_else(|| {
                status_text
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| GENERIC_ERROR.to_string());
        if status == 401 {
            ApiError::Unauthorized { message }
        } else {
            ApiError::Status { status, message }
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

/// Extract a human-readable message from a JSON error body.
pub fn message_from_body(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["detail", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_detail_wins() {
        let err = ApiError::from_response(
            400,
            Some("Bad Request"),
            r#"{"detail":"Incorrect email or password"}"#,
        );
        assert_eq!(err.to_string(), "Incorrect email or password");
    }

    #[test]
    fn test_body_message_key() {
        let err =
            ApiError::from_response(500, Some("Internal Server Error"), r#"{"message":"db down"}"#);
        assert_eq!(err.to_string(), "db down");
    }

    #[test]
    fn test_status_text_fallback() {
        let err = ApiError::from_response(503, Some("Service Unavailable"), "<html>oops</html>");
        assert_eq!(err.to_string(), "Service Unavailable");
        assert_eq!(
            err,
            ApiError::Status {
                status: 503,
                message: "Service Unavailable".to_string()
            }
        );
    }

    #[test]
    fn test_generic_fallback() {
        let err = ApiError::from_response(599, None, "");
        assert_eq!(err.to_string(), GENERIC_ERROR);
    }

    #[test]
    fn test_non_string_detail_is_ignored() {
        let err = ApiError::from_response(
            422,
            Some("Unprocessable Entity"),
            r#"{"detail":[{"loc":["body"]}]}"#,
        );
        assert_eq!(err.to_string(), "Unprocessable Entity");
    }

    #[test]
    fn test_401_is_unauthorized() {
        let err =
            ApiError::from_response(401, Some("Unauthorized"), r#"{"detail":"Not authenticated"}"#);
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "Not authenticated");
    }

    #[test]
    fn test_network_and_decode_hide_detail() {
        assert_eq!(
            ApiError::Network("dns error".to_string()).to_string(),
            "Unable to reach the server"
        );
        assert_eq!(
            ApiError::Decode("expected value at line 1".to_string()).to_string(),
            "Unexpected response from the server"
        );
    }
}
