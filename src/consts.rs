//! Fixed Pixiv endpoints and the embedded mobile-app client identity.
//!
//! These identify the app being impersonated, not a user secret. The login
//! flow only works while they match what the official Android/iOS clients
//! send, so they are constants rather than configuration.

/// User agent of the official iOS app; sent by both the browser and the
/// token-exchange calls so the OAuth client id matches its expected app.
pub const USER_AGENT: &str = "PixivIOSApp/7.13.3 (iOS 14.6; iPhone13,2)";

/// Redirect URI sent in the authorization-code exchange. Never fetched by us.
pub const CALLBACK_URI: &str = "https://app-api.pixiv.net/web/v1/users/auth/pixiv/callback";

/// Post-login page the browser lands on. Used only for prefix matching.
pub const REDIRECT_URI: &str = "https://accounts.pixiv.net/post-redirect";

/// Login page that renders the credential form.
pub const LOGIN_URL: &str = "https://app-api.pixiv.net/web/v1/login";

/// Token endpoint for both authorization-code and refresh-token grants.
pub const AUTH_TOKEN_URL: &str = "https://oauth.secure.pixiv.net/auth/token";

/// Custom URI scheme of the terminal redirect. Requests to it never complete
/// as HTTP (the app intercepts them at the OS level), so the authorization
/// code has to be scraped at request-initiation time.
pub const APP_SCHEME: &str = "pixiv://";

pub const CLIENT_ID: &str = "MOBrBDS8blbauoSck0ZfDbtuzpyT";
pub const CLIENT_SECRET: &str = "lsACyCD94FhDUtGTXi3QzcFE2uU1hqtDaKeqrdwj";

/// CSS class of the rendered login form. Chases pixiv's generated markup and
/// breaks whenever their front-end build changes.
pub const LOGIN_FORM_SELECTOR: &str = ".sc-bn9ph6-6";

pub const USERNAME_SELECTOR: &str = "input[autocomplete='username']";
pub const PASSWORD_SELECTOR: &str = "input[autocomplete='current-password']";

/// Accepted labels of the submit button. The page renders in the visitor's
/// locale, so the lookup has to try all of them. New locales silently break
/// autofill submission; extend this list when they do.
pub const LOGIN_BUTTON_LABELS: &[&str] = &["ログイン", "Log In", "登录", "로그인", "登入"];
