use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::error::BrowserError;

mod webdriver;
pub use webdriver::WebDriverBrowser;

#[cfg(test)]
pub mod fake;

/// CSS selector for locating elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Css(pub String);

impl Css {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Css {
    fn from(selector: &str) -> Self {
        Css(selector.to_string())
    }
}

impl From<&String> for Css {
    fn from(selector: &String) -> Self {
        Css(selector.clone())
    }
}

impl fmt::Display for Css {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Capabilities the harvester needs from a browser automation engine.
#[async_trait]
pub trait Browser: Send + Sync {
    type Element: Clone + Send + Sync;

    async fn goto(&self, url: &str) -> Result<(), BrowserError>;

    /// Release the session. Nothing may be called on the browser afterwards.
    async fn close(&self) -> Result<(), BrowserError>;

    /// Poll the document until at least one element matches, up to `timeout`.
    async fn wait_for_all(
        &self,
        selector: &Css,
        timeout: Duration,
    ) -> Result<Vec<Self::Element>, BrowserError>;

    async fn find_all(
        &self,
        scope: &Self::Element,
        selector: &Css,
    ) -> Result<Vec<Self::Element>, BrowserError>;

    async fn find(&self, scope: &Self::Element, selector: &Css)
        -> Result<Self::Element, BrowserError>;

    /// Native click; `BrowserError::ClickIntercepted` when another element would receive it.
    async fn click(&self, element: &Self::Element) -> Result<(), BrowserError>;

    /// Script-dispatched click that bypasses hit testing.
    async fn force_click(&self, element: &Self::Element) -> Result<(), BrowserError>;

    async fn scroll_into_view(&self, element: &Self::Element) -> Result<(), BrowserError>;

    async fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, BrowserError>;

    async fn text(&self, element: &Self::Element) -> Result<String, BrowserError>;

    async fn current_url(&self) -> Result<String, BrowserError>;

    /// Give the page time to re-render.
    async fn settle(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationStrategy {
    Native,
    Forced,
}

const ACTIVATION_ORDER: [ActivationStrategy; 2] =
    [ActivationStrategy::Native, ActivationStrategy::Forced];

/// Activate a control, trying a native click first and a forced click when the
/// native one is intercepted. Returns the strategy that succeeded.
pub async fn activate<B: Browser + ?Sized>(
    browser: &B,
    element: &B::Element,
) -> Result<ActivationStrategy, BrowserError> {
    for strategy in ACTIVATION_ORDER {
        let attempt = match strategy {
            ActivationStrategy::Native => browser.click(element).await,
            ActivationStrategy::Forced => browser.force_click(element).await,
        };

        match attempt {
            Ok(()) => return Ok(strategy),
            Err(BrowserError::ClickIntercepted) => {
                debug!("{:?} click intercepted, trying next strategy", strategy);
            }
            Err(e) => return Err(e),
        }
    }

    Err(BrowserError::ClickIntercepted)
}
