//! Error types for pixauth operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("browser driver error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    #[error("browser automation failed: {0}")]
    Driver(String),

    #[error("{0}")]
    Timeout(String),

    #[error("no authorization code was captured from the login redirect")]
    MissingCode,

    #[error("token endpoint response is missing `{field}`")]
    MalformedResponse { field: String, body: String },

    #[error("login failed after {0} attempts")]
    LoginFailed(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AuthError>;
