//! Token exchange against the fixed Pixiv OAuth endpoint.
//!
//! Two stateless POSTs: authorization-code exchange and refresh. Both mimic
//! the official mobile app's headers so the embedded client id is accepted.
//! No retry logic; transport and malformed-body failures propagate.

use std::time::Duration;

use tracing::debug;

use crate::consts::{AUTH_TOKEN_URL, CALLBACK_URI, CLIENT_ID, CLIENT_SECRET, USER_AGENT};
use crate::error::Result;
use crate::proxy::ProxyConfig;
use crate::token::TokenResponse;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the token endpoint.
pub struct TokenClient {
    http: reqwest::Client,
    token_url: String,
}

impl TokenClient {
    /// Create a client against the production token endpoint.
    pub fn new(proxy: &ProxyConfig) -> Result<Self> {
        Self::with_token_url(proxy, AUTH_TOKEN_URL)
    }

    /// Create a client against a custom token endpoint. Exists so tests can
    /// point at a local stub server.
    pub fn with_token_url(proxy: &ProxyConfig, token_url: impl Into<String>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(REQUEST_TIMEOUT);

        if let Some(server) = &proxy.server {
            builder = builder.proxy(reqwest::Proxy::all(server)?);
        }

        Ok(Self {
            http: builder.build()?,
            token_url: token_url.into(),
        })
    }

    /// Exchange an authorization code (plus the PKCE verifier it is bound
    /// to) for an access/refresh token pair.
    pub async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<TokenResponse> {
        debug!("exchanging authorization code");
        self.post_form(&[
            ("client_id", CLIENT_ID),
            ("client_secret", CLIENT_SECRET),
            ("code", code),
            ("code_verifier", code_verifier),
            ("grant_type", "authorization_code"),
            ("include_policy", "true"),
            ("redirect_uri", CALLBACK_URI),
        ])
        .await
    }

    /// Obtain a fresh token pair from a refresh token, no browser involved.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        debug!("refreshing token");
        self.post_form(&[
            ("client_id", CLIENT_ID),
            ("client_secret", CLIENT_SECRET),
            ("grant_type", "refresh_token"),
            ("include_policy", "true"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn post_form(&self, params: &[(&str, &str)]) -> Result<TokenResponse> {
        let body = self
            .http
            .post(&self.token_url)
            .header("user-agent", USER_AGENT)
            .header("app-os", "ios")
            .header("app-os-version", "14.6")
            .form(params)
            .send()
            .await?
            .text()
            .await?;

        TokenResponse::from_body(&body)
    }
}
