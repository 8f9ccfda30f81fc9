//! Outbound proxy configuration.
//!
//! Read once from the environment at startup and passed explicitly to both
//! the browser launch and the token client, so sessions stay independently
//! testable with different proxy settings instead of sharing ambient global
//! state.

use std::env;

/// Proxy settings applied to all outbound traffic.
#[derive(Debug, Clone, Default)]
pub struct ProxyConfig {
    /// Proxy server URL, e.g. `http://proxy.example:3128`.
    pub server: Option<String>,
}

impl ProxyConfig {
    /// Read the ambient proxy environment, preferring the most specific
    /// conventional variable: `ALL_PROXY`, then `HTTPS_PROXY`, then
    /// `HTTP_PROXY` (lowercase variants included).
    pub fn from_env() -> Self {
        let server = [
            "ALL_PROXY",
            "all_proxy",
            "HTTPS_PROXY",
            "https_proxy",
            "HTTP_PROXY",
            "http_proxy",
        ]
        .iter()
        .find_map(|key| env::var(key).ok())
        .filter(|value| !value.is_empty());

        Self { server }
    }

    /// No proxy. Used by tests talking to a local stub endpoint.
    pub fn direct() -> Self {
        Self { server: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_has_no_server() {
        assert!(ProxyConfig::direct().server.is_none());
    }

    #[test]
    fn test_explicit_server_survives() {
        let config = ProxyConfig {
            server: Some("http://proxy.invalid:3128".to_string()),
        };
        assert_eq!(config.server.as_deref(), Some("http://proxy.invalid:3128"));
    }
}
