use crate::core::{BrowserProfile, BrowserType, Locator, RemoteSession, TimeoutConfig};
use crate::errors::{BrowserError, Result};
use async_trait::async_trait;
use headless_chrome::protocol::cdp::DOM::NodeId;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use tracing::{debug, info};

/// Called with `this` bound to the element.
const IS_DISPLAYED_FN: &str = r#"
    function() {
        if (!this.isConnected) {
            return false;
        }
        for (let node = this; node && node.nodeType === 1; node = node.parentElement) {
            const style = window.getComputedStyle(node);
            if (style.display === 'none') {
                return false;
            }
        }
        const style = window.getComputedStyle(this);
        if (style.visibility === 'hidden' || style.visibility === 'collapse' || style.opacity === '0') {
            return false;
        }
        const rect = this.getBoundingClientRect();
        return rect.width > 0 && rect.height > 0;
    }
"#;

/// Driver messages meaning the node is gone or has not been attached yet.
const TRANSIENT_MESSAGES: &[&str] = &[
    "couldn't find element",
    "could not find node",
    "no node with given id",
    "no element found",
    "node is detached",
    "cannot find context with specified id",
];

const CLOSED_MESSAGES: &[&str] = &["connection is closed", "target closed", "no such target"];

/// Reference to a node located in a [`ChromeSession`] tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromeElement {
    pub node_id: NodeId,
}

/// [`RemoteSession`] backed by a local Chrome driven over CDP.
pub struct ChromeSession {
    // keeps the browser process alive for as long as the tab is used
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeSession {
    pub fn launch(profile: &BrowserProfile, timeouts: &TimeoutConfig) -> Result<Self> {
        if profile.browser_type != BrowserType::Chrome {
            return Err(BrowserError::ConfigurationError(format!(
                "{:?} is not supported, only Chrome can be launched",
                profile.browser_type
            )));
        }

        let window_size_arg = format!(
            "--window-size={},{}",
            profile.viewport.width, profile.viewport.height
        );
        let user_agent_arg = profile
            .user_agent
            .as_ref()
            .map(|ua| format!("--user-agent={}", ua));

        let mut args = vec![
            OsStr::new("--no-sandbox"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new(&window_size_arg),
        ];
        if let Some(ref ua_arg) = user_agent_arg {
            args.push(OsStr::new(ua_arg));
        }
        for arg in &profile.args {
            args.push(OsStr::new(arg));
        }

        let launch_options = LaunchOptions::default_builder()
            .headless(profile.headless)
            .args(args)
            .build()
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        let browser =
            Browser::new(launch_options).map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;
        tab.set_default_timeout(timeouts.page_load());

        info!(headless = profile.headless, "Chrome session started");
        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    pub fn navigate(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| BrowserError::NavigationFailed(e.to_string()))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| BrowserError::NavigationFailed(e.to_string()))?;
        debug!(url, "Navigation finished");
        Ok(())
    }
}

#[async_trait]
impl RemoteSession for ChromeSession {
    type Handle = ChromeElement;

    async fn find_all(&self, locator: &Locator) -> Result<Vec<ChromeElement>> {
        let locator = locator.clone();
        run_blocking(Arc::clone(&self.tab), move |tab| {
            let found = match locator.to_css() {
                Some(selector) => tab.find_elements(&selector),
                None => tab.find_elements_by_xpath(locator.value()),
            };

            match found {
                Ok(elements) => Ok(elements
                    .iter()
                    .map(|element| ChromeElement {
                        node_id: element.node_id,
                    })
                    .collect()),
                Err(err) => match classify(&err.to_string(), &locator) {
                    // the driver reports "no match" as an error, the trait does not
                    BrowserError::ElementNotFound(_) => Ok(Vec::new()),
                    other => Err(other),
                },
            }
        })
        .await
    }

    async fn is_displayed(&self, handle: &ChromeElement) -> Result<bool> {
        let node_id = handle.node_id;
        run_blocking(Arc::clone(&self.tab), move |tab| {
            let context = format!("node {}", node_id);
            let element = Element::new(tab, node_id)
                .map_err(|e| as_stale(classify(&e.to_string(), &context)))?;
            let result = element
                .call_js_fn(IS_DISPLAYED_FN, vec![], false)
                .map_err(|e| as_stale(classify(&e.to_string(), &context)))?;

            Ok(result
                .value
                .and_then(|value| value.as_bool())
                .unwrap_or(false))
        })
        .await
    }
}

/// Run a blocking driver call on tokio's blocking pool so concurrent waits
/// sharing one tab do not queue up on the calling worker.
async fn run_blocking<R, T, F>(resource: Arc<R>, job: F) -> Result<T>
where
    R: Send + Sync + ?Sized + 'static,
    T: Send + 'static,
    F: FnOnce(&R) -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || job(resource.as_ref()))
        .await
        .map_err(BrowserError::from_any_error)?
}

/// Sort a driver failure into the recoverable and fatal variants.
fn classify(message: &str, context: &impl std::fmt::Display) -> BrowserError {
    let lowered = message.to_lowercase();
    if TRANSIENT_MESSAGES.iter().any(|m| lowered.contains(m)) {
        BrowserError::ElementNotFound(format!("{}: {}", context, message))
    } else if CLOSED_MESSAGES.iter().any(|m| lowered.contains(m)) {
        BrowserError::SessionClosed(message.to_string())
    } else {
        BrowserError::from_any_error(message)
    }
}

/// A handle that no longer resolves was found earlier, so it went stale.
fn as_stale(err: BrowserError) -> BrowserError {
    match err {
        BrowserError::ElementNotFound(detail) => BrowserError::StaleElement(detail),
        other => other,
    }
}
