//! Browser-driven login session.
//!
//! The automation engine sits behind the narrow [`LoginPage`] trait so the
//! flow logic stays testable against a fake page. The real implementation
//! drives a Chromium instance over CDP and records every outgoing request
//! URL from `Network.requestWillBeSent`. Capture has to happen at
//! request-initiation: the terminal redirect uses a custom URI scheme that
//! never completes as an HTTP response.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{EnableParams, EventRequestWillBeSent};
use chromiumoxide::Page;
use futures::StreamExt;
use parking_lot::Mutex;
use rand::Rng;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info};

use crate::consts::USER_AGENT;
use crate::error::{AuthError, Result};
use crate::proxy::ProxyConfig;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Launch options for a login session's browser.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub proxy: ProxyConfig,
}

/// Chromium arguments matching a plain interactive browser closely enough
/// to pass the login page's bot-detection heuristics.
fn chrome_args(proxy: &ProxyConfig) -> Vec<String> {
    let mut args: Vec<String> = [
        "--disable-gpu",
        "--disable-extensions",
        "--disable-infobars",
        "--disable-dev-shm-usage",
        "--disable-browser-side-navigation",
        "--disable-blink-features=AutomationControlled",
        "--start-maximized",
        "--no-first-run",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    args.push(format!("--user-agent={USER_AGENT}"));

    if let Some(server) = &proxy.server {
        args.push(format!("--proxy-server={server}"));
    }

    args
}

/// Minimal surface of a controllable login page.
///
/// Everything the flow needs and nothing more, so the underlying driver is
/// swappable and a fake can stand in for tests.
#[async_trait]
pub trait LoginPage: Send + Sync {
    /// Navigate to a URL.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Wait until an element matching the CSS selector is present.
    async fn wait_for_selector(&self, selector: &str, limit: Duration) -> Result<()>;

    /// Type text into the element matching the selector, one character at a
    /// time with a randomized 0.3-0.7 s pause between keystrokes.
    async fn type_slowly(&self, selector: &str, text: &str) -> Result<()>;

    /// Click the submit button whose visible label matches one of the given
    /// localized strings.
    async fn submit_login(&self, labels: &[&str]) -> Result<()>;

    /// Block until the page URL starts with the given prefix.
    async fn wait_for_url_prefix(&self, prefix: &str, limit: Duration) -> Result<()>;

    /// All request URLs observed so far, in initiation order.
    fn observed_requests(&self) -> Vec<String>;

    /// Release the browser. Must be called on every exit path.
    async fn close(&mut self) -> Result<()>;
}

/// [`LoginPage`] backed by a real Chromium instance over CDP.
pub struct CdpPage {
    browser: Option<Browser>,
    page: Page,
    requests: Arc<Mutex<Vec<String>>>,
    handler_task: JoinHandle<()>,
    listener_task: JoinHandle<()>,
}

impl CdpPage {
    /// Launch Chromium and attach the request-observation hook.
    pub async fn launch(opts: &BrowserOptions) -> Result<Self> {
        let mut builder = BrowserConfig::builder();
        if !opts.headless {
            builder = builder.with_head();
        }
        let config = builder
            .no_sandbox()
            .args(chrome_args(&opts.proxy))
            .build()
            .map_err(AuthError::Driver)?;

        info!(headless = opts.headless, "launching browser");
        let (mut browser, mut handler) = Browser::launch(config).await?;

        // CDP messages are dispatched by polling the handler stream.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    error!("CDP handler error: {e}");
                    break;
                }
            }
        });

        let setup = async {
            let page = browser.new_page("about:blank").await?;
            page.execute(EnableParams::default()).await?;
            let events = page.event_listener::<EventRequestWillBeSent>().await?;
            Ok::<_, AuthError>((page, events))
        }
        .await;

        let (page, mut events) = match setup {
            Ok(attached) => attached,
            Err(err) => {
                let _ = browser.close().await;
                let _ = browser.wait().await;
                handler_task.abort();
                return Err(err);
            }
        };

        // Record every outgoing request URL the moment it is initiated.
        // `documentURL` is what carries the custom-scheme navigation.
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);
        let listener_task = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                let mut log = log.lock();
                if !event.document_url.is_empty() {
                    log.push(event.document_url.clone());
                }
                log.push(event.request.url.clone());
            }
        });

        Ok(Self {
            browser: Some(browser),
            page,
            requests,
            handler_task,
            listener_task,
        })
    }
}

#[async_trait]
impl LoginPage for CdpPage {
    async fn goto(&self, url: &str) -> Result<()> {
        debug!(url, "navigating");
        self.page.goto(url).await?;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, limit: Duration) -> Result<()> {
        let waited = timeout(limit, async {
            loop {
                if self.page.find_element(selector).await.is_ok() {
                    return;
                }
                sleep(POLL_INTERVAL).await;
            }
        })
        .await;

        waited.map_err(|_| {
            AuthError::Timeout(format!(
                "element `{selector}` did not appear within {}s",
                limit.as_secs()
            ))
        })
    }

    async fn type_slowly(&self, selector: &str, text: &str) -> Result<()> {
        let element = self.page.find_element(selector).await?;
        element.click().await?;

        for ch in text.chars() {
            element.type_str(ch.to_string()).await?;
            let pause = rand::thread_rng().gen_range(0.3..0.7);
            sleep(Duration::from_secs_f64(pause)).await;
        }

        Ok(())
    }

    async fn submit_login(&self, labels: &[&str]) -> Result<()> {
        let buttons = self.page.find_elements("button[type='submit']").await?;

        for button in buttons {
            let text = button.inner_text().await?.unwrap_or_default();
            if labels.iter().any(|label| text.contains(label)) {
                debug!(label = %text.trim(), "clicking submit button");
                button.click().await?;
                return Ok(());
            }
        }

        Err(AuthError::Driver(format!(
            "no submit button with a label in {labels:?}"
        )))
    }

    async fn wait_for_url_prefix(&self, prefix: &str, limit: Duration) -> Result<()> {
        let waited = timeout(limit, async {
            loop {
                if let Some(url) = self.page.url().await? {
                    if url.starts_with(prefix) {
                        debug!(url = %url, "redirect observed");
                        return Ok(());
                    }
                }
                sleep(POLL_INTERVAL).await;
            }
        })
        .await;

        match waited {
            Ok(inner) => inner,
            Err(_) => Err(AuthError::Timeout(format!(
                "no redirect to {prefix} within {}s",
                limit.as_secs()
            ))),
        }
    }

    fn observed_requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    async fn close(&mut self) -> Result<()> {
        self.listener_task.abort();
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                error!("failed to close browser: {e}");
            }
            let _ = browser.wait().await;
        }
        self.handler_task.abort();
        info!("browser released");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrome_args_carry_user_agent() {
        let args = chrome_args(&ProxyConfig::direct());
        assert!(args.iter().any(|a| a.starts_with("--user-agent=PixivIOSApp")));
        assert!(!args.iter().any(|a| a.starts_with("--proxy-server=")));
    }

    #[test]
    fn test_chrome_args_include_proxy_when_configured() {
        let proxy = ProxyConfig {
            server: Some("http://proxy.invalid:3128".to_string()),
        };
        let args = chrome_args(&proxy);
        assert!(args.contains(&"--proxy-server=http://proxy.invalid:3128".to_string()));
    }

    #[test]
    fn test_chrome_args_suppress_automation_fingerprint() {
        let args = chrome_args(&ProxyConfig::direct());
        assert!(args.contains(&"--disable-blink-features=AutomationControlled".to_string()));
    }
}
