use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Map};
use std::time::Duration;
use tracing::{debug, info};

use super::{Browser, Css};
use crate::config::HarvesterConfig;
use crate::error::BrowserError;

const SCROLL_INTO_VIEW_SCRIPT: &str = "arguments[0].scrollIntoView({block: 'center'});";
const FORCE_CLICK_SCRIPT: &str = "arguments[0].click();";

/// W3C error code for a click that would land on another element.
const CLICK_INTERCEPTED_CODE: &str = "element click intercepted";

/// Chrome session driven over the WebDriver protocol.
pub struct WebDriverBrowser {
    client: Client,
}

impl WebDriverBrowser {
    pub async fn connect(config: &HarvesterConfig) -> Result<Self, BrowserError> {
        let mut args = vec![
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--start-maximized".to_string(),
            format!("--user-agent={}", config.user_agent),
        ];
        if config.headless {
            args.push("--headless=new".to_string());
        }

        let mut caps = Map::new();
        caps.insert("browserName".to_string(), json!("chrome"));
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));

        debug!("Connecting to WebDriver at {}", config.webdriver_url);

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&config.webdriver_url)
            .await
            .map_err(|e| BrowserError::Session(e.to_string()))?;

        info!("Browser session started");
        Ok(Self { client })
    }

    async fn run_on(&self, script: &str, element: &Element) -> Result<(), BrowserError> {
        let arg = serde_json::to_value(element)
            .map_err(|e| BrowserError::Command(format!("cannot pass element to script: {}", e)))?;
        self.client
            .execute(script, vec![arg])
            .await
            .map_err(command_error)?;
        Ok(())
    }
}

fn command_error(err: CmdError) -> BrowserError {
    BrowserError::Command(err.to_string())
}

fn lookup_error(err: CmdError, selector: &Css) -> BrowserError {
    if err.is_miss() {
        BrowserError::NotFound {
            selector: selector.to_string(),
        }
    } else {
        command_error(err)
    }
}

fn is_click_intercepted(err: &CmdError) -> bool {
    matches!(err, CmdError::Standard(wd) if wd.error() == CLICK_INTERCEPTED_CODE)
}

#[async_trait]
impl Browser for WebDriverBrowser {
    type Element = Element;

    async fn wait_for_all(
        &self,
        selector: &Css,
        timeout: Duration,
    ) -> Result<Vec<Element>, BrowserError> {
        self.client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector.as_str()))
            .await
            .map_err(|e| match e {
                CmdError::WaitTimeout => BrowserError::TimedOut {
                    selector: selector.to_string(),
                    timeout,
                },
                other => command_error(other),
            })?;

        self.client
            .find_all(Locator::Css(selector.as_str()))
            .await
            .map_err(command_error)
    }

    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        self.client.goto(url).await.map_err(command_error)
    }

    /// Ends the session and shuts the browser down.
    async fn close(&self) -> Result<(), BrowserError> {
        self.client.clone().close().await.map_err(command_error)
    }

    async fn find_all(
        &self,
        scope: &Element,
        selector: &Css,
    ) -> Result<Vec<Element>, BrowserError> {
        scope
            .find_all(Locator::Css(selector.as_str()))
            .await
            .map_err(command_error)
    }

    async fn find(&self, scope: &Element, selector: &Css) -> Result<Element, BrowserError> {
        scope
            .find(Locator::Css(selector.as_str()))
            .await
            .map_err(|e| lookup_error(e, selector))
    }

    async fn click(&self, element: &Element) -> Result<(), BrowserError> {
        match element.click().await {
            Ok(()) => Ok(()),
            Err(e) if is_click_intercepted(&e) => Err(BrowserError::ClickIntercepted),
            Err(e) => Err(command_error(e)),
        }
    }

    async fn force_click(&self, element: &Element) -> Result<(), BrowserError> {
        self.run_on(FORCE_CLICK_SCRIPT, element).await
    }

    async fn scroll_into_view(&self, element: &Element) -> Result<(), BrowserError> {
        self.run_on(SCROLL_INTO_VIEW_SCRIPT, element).await
    }

    async fn attribute(
        &self,
        element: &Element,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        element.attr(name).await.map_err(command_error)
    }

    async fn text(&self, element: &Element) -> Result<String, BrowserError> {
        element.text().await.map_err(command_error)
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        self.client
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(command_error)
    }
}
