//! Token response model.
//!
//! The provider's JSON body is passed through mostly opaquely. Only the two
//! fields every caller needs are required; everything else (including the
//! logged-in user subtree) rides along untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AuthError, Result};

/// Decoded body of a successful token-endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    /// Logged-in user info subtree, opaque to this tool.
    #[serde(default)]
    pub user: Option<Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl TokenResponse {
    /// Type a raw token-endpoint body, failing with the raw text when either
    /// required field is absent (error responses, HTML error pages after
    /// being rate limited, etc. all end up here).
    pub fn from_body(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body).map_err(|_| AuthError::MalformedResponse {
            field: "access_token".to_string(),
            body: body.to_string(),
        })?;

        for field in ["access_token", "refresh_token"] {
            if value.get(field).and_then(Value::as_str).is_none() {
                return Err(AuthError::MalformedResponse {
                    field: field.to_string(),
                    body: body.to_string(),
                });
            }
        }

        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_full_response() {
        let body = r#"{
            "access_token": "a",
            "refresh_token": "b",
            "expires_in": 3600,
            "token_type": "bearer",
            "scope": "",
            "user": {"id": "123", "name": "someone"}
        }"#;

        let res = TokenResponse::from_body(body).unwrap();
        assert_eq!(res.access_token, "a");
        assert_eq!(res.refresh_token, "b");
        assert_eq!(res.expires_in, 3600);
        assert_eq!(res.user.unwrap()["id"], "123");
    }

    #[test]
    fn test_expires_in_defaults_to_zero() {
        let body = r#"{"access_token": "a", "refresh_token": "b"}"#;
        let res = TokenResponse::from_body(body).unwrap();
        assert_eq!(res.expires_in, 0);
    }

    #[test]
    fn test_missing_access_token_keeps_raw_body() {
        let body = r#"{"error": "invalid_grant"}"#;
        let err = TokenResponse::from_body(body).unwrap_err();

        match err {
            AuthError::MalformedResponse { field, body } => {
                assert_eq!(field, "access_token");
                assert!(body.contains("invalid_grant"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_refresh_token_is_malformed() {
        let body = r#"{"access_token": "a"}"#;
        let err = TokenResponse::from_body(body).unwrap_err();
        assert!(matches!(
            err,
            AuthError::MalformedResponse { ref field, .. } if field == "refresh_token"
        ));
    }

    #[test]
    fn test_non_json_body_is_malformed_not_panic() {
        let err = TokenResponse::from_body("<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, AuthError::MalformedResponse { .. }));
    }
}
