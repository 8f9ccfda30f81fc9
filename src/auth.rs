//! Stored-or-prompted authentication.
//!
//! Tries credentials from a JSON file first, then falls back to masked
//! interactive prompts, retrying the whole login a fixed number of times
//! before giving up.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{AuthError, Result};
use crate::login::PixivLogin;
use crate::proxy::ProxyConfig;
use crate::token::TokenResponse;

const MAX_ATTEMPTS: usize = 3;

/// Stored login credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCred {
    pub pixiv_id: String,
    pub password: String,
}

/// Load credentials from a JSON file.
///
/// Anything other than an object with exactly the keys `pixiv_id` and
/// `password` counts as "no stored credentials": a missing file, unreadable
/// content, or a mismatched key set all return `None` rather than failing.
pub fn read_client_cred(path: impl AsRef<Path>) -> Option<LoginCred> {
    let raw = fs::read_to_string(path).ok()?;
    let value: Value = serde_json::from_str(&raw).ok()?;

    let keys: BTreeSet<&str> = value.as_object()?.keys().map(String::as_str).collect();
    let expected: BTreeSet<&str> = ["pixiv_id", "password"].into();
    if keys != expected {
        return None;
    }

    serde_json::from_value(value).ok()
}

/// Interactive authentication flow with a small fixed retry budget.
pub struct PixivAuth {
    auth_json_path: PathBuf,
}

impl PixivAuth {
    pub fn new(auth_json_path: impl Into<PathBuf>) -> Self {
        Self {
            auth_json_path: auth_json_path.into(),
        }
    }

    /// Log in with stored credentials if present, prompting interactively on
    /// every later attempt. Gives up after three failed attempts.
    pub async fn auth(&self, proxy: &ProxyConfig) -> Result<TokenResponse> {
        let stored = read_client_cred(&self.auth_json_path);

        for attempt in 0..MAX_ATTEMPTS {
            let (username, password) = match (&stored, attempt) {
                (Some(cred), 0) => (cred.pixiv_id.clone(), cred.password.clone()),
                _ => prompt_credentials()?,
            };

            info!(attempt = attempt + 1, "logging in");
            let login = PixivLogin::new(true, Some(username), Some(password));
            match login.login(proxy).await {
                Ok(response) => return Ok(response),
                Err(err @ AuthError::MalformedResponse { .. }) => return Err(err),
                Err(err) => {
                    warn!("login attempt {} failed: {err}", attempt + 1);
                    eprintln!("[!]: Failed to login. Check your ID or PW.");
                }
            }
        }

        eprintln!("[!]: The number of login attempts has been exceeded.");
        Err(AuthError::LoginFailed(MAX_ATTEMPTS))
    }
}

/// Prompt for credentials with masked input.
fn prompt_credentials() -> Result<(String, String)> {
    eprintln!("[+]: ID is mail address, username, or account name.");
    let id = rpassword::prompt_password("[?]: ID: ")?;
    let pw = rpassword::prompt_password("[?]: PW: ")?;
    Ok((id, pw))
}
