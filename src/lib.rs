//! pixauth - Pixiv OAuth 2.0 token retrieval with PKCE
//!
//! Pixiv's mobile API has no documented login endpoint, so this crate drives
//! a real Chromium instance through the human login page, captures the
//! authorization code from the `pixiv://` redirect as the request is
//! initiated, and exchanges it for an access/refresh token pair. Refreshing
//! an existing token needs no browser.
//!
//! # Example
//!
//! ```no_run
//! use pixauth::prelude::*;
//!
//! # async fn run() -> pixauth::error::Result<()> {
//! let proxy = ProxyConfig::from_env();
//!
//! // Browser login (headless only works with both credentials set)
//! let login = PixivLogin::new(true, Some("id".into()), Some("pw".into()));
//! let tokens = login.login(&proxy).await?;
//!
//! // Later: refresh without a browser
//! let tokens = TokenClient::new(&proxy)?.refresh(&tokens.refresh_token).await?;
//! println!("{}", tokens.access_token);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod browser;
pub mod consts;
pub mod error;
pub mod login;
pub mod oauth;
pub mod pkce;
pub mod proxy;
pub mod token;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::auth::{read_client_cred, LoginCred, PixivAuth};
    pub use crate::browser::{BrowserOptions, CdpPage, LoginPage};
    pub use crate::error::{AuthError, Result};
    pub use crate::login::{extract_code, login_with_page, PixivLogin};
    pub use crate::oauth::TokenClient;
    pub use crate::pkce::Pkce;
    pub use crate::proxy::ProxyConfig;
    pub use crate::token::TokenResponse;
}
