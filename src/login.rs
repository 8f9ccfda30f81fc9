//! Login flow orchestration.
//!
//! Drives one browser session end to end: navigate to the login page with a
//! fresh PKCE challenge, autofill or wait for manual credential entry, wait
//! for the post-login redirect, pull the authorization code out of the
//! observed request stream, then exchange it for tokens. Timeouts are fatal
//! for the session; retrying is the caller's business.

use std::time::Duration;

use tracing::info;
use url::Url;

use crate::browser::{BrowserOptions, CdpPage, LoginPage};
use crate::consts::{
    APP_SCHEME, LOGIN_BUTTON_LABELS, LOGIN_FORM_SELECTOR, LOGIN_URL, PASSWORD_SELECTOR,
    REDIRECT_URI, USERNAME_SELECTOR,
};
use crate::error::{AuthError, Result};
use crate::oauth::TokenClient;
use crate::pkce::Pkce;
use crate::proxy::ProxyConfig;
use crate::token::TokenResponse;

const FORM_TIMEOUT: Duration = Duration::from_secs(20);
const REDIRECT_TIMEOUT: Duration = Duration::from_secs(60);
/// With a human at the keyboard the wait is generous, but still bounded so
/// an abandoned session eventually releases its browser.
const MANUAL_REDIRECT_TIMEOUT: Duration = Duration::from_secs(600);

/// One login attempt against the Pixiv login page.
#[derive(Debug, Clone, Default)]
pub struct PixivLogin {
    headless: bool,
    username: Option<String>,
    password: Option<String>,
}

impl PixivLogin {
    pub fn new(headless: bool, username: Option<String>, password: Option<String>) -> Self {
        Self {
            headless,
            username,
            password,
        }
    }

    /// Headless only works when both credentials are present; a manual form
    /// needs a visible window, so the flag silently downgrades.
    fn effective_headless(&self) -> bool {
        self.headless && self.username.is_some() && self.password.is_some()
    }

    /// Run the full login flow and exchange the captured code for tokens.
    ///
    /// The browser is released on every exit path, success or failure.
    pub async fn login(&self, proxy: &ProxyConfig) -> Result<TokenResponse> {
        let pkce = Pkce::generate();
        let login_url = Url::parse_with_params(
            LOGIN_URL,
            &[
                ("code_challenge", pkce.code_challenge()),
                ("code_challenge_method", Pkce::code_challenge_method()),
                ("client", "pixiv-android"),
            ],
        )?;

        let opts = BrowserOptions {
            headless: self.effective_headless(),
            proxy: proxy.clone(),
        };
        let page = CdpPage::launch(&opts).await?;

        let credentials = self.username.as_deref().zip(self.password.as_deref());
        let code = login_with_page(page, login_url.as_str(), credentials).await?;

        TokenClient::new(proxy)?
            .exchange_code(&code, pkce.code_verifier())
            .await
    }
}

/// Drive a page through the login flow, releasing the browser on every exit
/// path before the outcome is surfaced.
pub async fn login_with_page<P: LoginPage>(
    mut page: P,
    login_url: &str,
    credentials: Option<(&str, &str)>,
) -> Result<String> {
    let outcome = obtain_code(&page, login_url, credentials).await;
    let _ = page.close().await;
    outcome
}

/// Drive a [`LoginPage`] through the login UI and return the authorization
/// code. Generic over the page so tests can substitute a fake driver.
pub async fn obtain_code<P: LoginPage>(
    page: &P,
    login_url: &str,
    credentials: Option<(&str, &str)>,
) -> Result<String> {
    page.goto(login_url).await?;

    page.wait_for_selector(LOGIN_FORM_SELECTOR, FORM_TIMEOUT)
        .await
        .map_err(|err| match err {
            AuthError::Timeout(_) => AuthError::Timeout(format!(
                "login form did not appear; check connectivity for {LOGIN_URL}"
            )),
            other => other,
        })?;

    match credentials {
        Some((username, password)) => {
            page.type_slowly(USERNAME_SELECTOR, username).await?;
            page.type_slowly(PASSWORD_SELECTOR, password).await?;
            page.submit_login(LOGIN_BUTTON_LABELS).await?;
            wait_for_redirect(page, REDIRECT_TIMEOUT).await?;
        }
        None => {
            info!("waiting for manual login");
            wait_for_redirect(page, MANUAL_REDIRECT_TIMEOUT).await?;
        }
    }

    let requests = page.observed_requests();
    extract_code(requests.iter().map(String::as_str)).ok_or(AuthError::MissingCode)
}

async fn wait_for_redirect<P: LoginPage>(page: &P, limit: Duration) -> Result<()> {
    page.wait_for_url_prefix(REDIRECT_URI, limit)
        .await
        .map_err(|err| match err {
            AuthError::Timeout(_) => AuthError::Timeout(
                "failed to login; check your credentials, network, or proxy \
                 (maybe restricted by pixiv?)"
                    .to_string(),
            ),
            other => other,
        })
}

/// Pull the `code` query parameter out of the first observed request whose
/// URL uses the provider's app scheme. Returns `None` rather than failing
/// when nothing matches or the parameter is absent.
pub fn extract_code<'a, I>(urls: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    for raw in urls {
        if raw.starts_with(APP_SCHEME) {
            let parsed = Url::parse(raw).ok()?;
            return parsed
                .query_pairs()
                .find(|(key, _)| key == "code")
                .map(|(_, value)| value.into_owned());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_code_from_app_scheme_request() {
        let urls = [
            "https://accounts.pixiv.net/login",
            "https://app-api.pixiv.net/web/v1/login",
            "pixiv://account/login?code=ABC123&via=login",
            "https://accounts.pixiv.net/post-redirect",
        ];
        assert_eq!(extract_code(urls), Some("ABC123".to_string()));
    }

    #[test]
    fn test_extract_code_without_matching_request() {
        let urls = ["https://accounts.pixiv.net/login", "https://example.com/"];
        assert_eq!(extract_code(urls), None);
    }

    #[test]
    fn test_extract_code_when_parameter_absent() {
        let urls = ["pixiv://account/login?via=login"];
        assert_eq!(extract_code(urls), None);
    }

    #[test]
    fn test_extract_code_takes_first_match() {
        let urls = [
            "pixiv://account/login?code=first",
            "pixiv://account/login?code=second",
        ];
        assert_eq!(extract_code(urls), Some("first".to_string()));
    }

    #[test]
    fn test_headless_downgrades_without_credentials() {
        let login = PixivLogin::new(true, Some("user".into()), None);
        assert!(!login.effective_headless());

        let login = PixivLogin::new(true, None, Some("pass".into()));
        assert!(!login.effective_headless());

        let login = PixivLogin::new(true, Some("user".into()), Some("pass".into()));
        assert!(login.effective_headless());
    }
}
