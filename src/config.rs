use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvesterConfig {
    pub catalog_url: String,
    pub webdriver_url: String,
    pub output_dir: String,
    pub max_products: usize,
    pub headless: bool,
    pub user_agent: String,
    pub download_timeout_secs: u64,
    pub selectors: SelectorConfig,
    pub timing: TimingConfig,
}

/// CSS selectors for the listing's UI components.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub product_tile: String,
    pub product_name: String,
    pub image_wrapper: String,
    pub image: String,
    pub swatch_list: String,
    pub swatch_button: String,
    pub item_detail: String,
    pub item_pricing: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub catalog_wait_secs: u64,
    pub page_settle_ms: u64,
    pub entry_settle_ms: u64,
    pub swatch_scroll_settle_ms: u64,
    pub swatch_render_settle_ms: u64,
    pub shutdown_grace_ms: u64,
}

const DEFAULT_CATALOG_URL: &str = "https://www.la-z-boy.com/b/living-room-recliners/_/N-musa9i?intpromo=header.Recliner#/b/living-room-recliners/_/N-musa9i?intpromo=header.Recliner&No=213&Nrpp=36&plpaction=loadmore";
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            webdriver_url: "http://localhost:9515".to_string(),
            output_dir: "scraped_products".to_string(),
            max_products: 224,
            headless: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            download_timeout_secs: 10,
            selectors: SelectorConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            product_tile: ".product-tile".to_string(),
            product_name: ".product-name".to_string(),
            image_wrapper: ".img-wrapper".to_string(),
            image: "img".to_string(),
            swatch_list: ".cover-swatch-list".to_string(),
            swatch_button: "button".to_string(),
            item_detail: ".item-detail".to_string(),
            item_pricing: ".item-pricing".to_string(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            catalog_wait_secs: 15,
            page_settle_ms: 3000,
            entry_settle_ms: 1000,
            swatch_scroll_settle_ms: 500,
            swatch_render_settle_ms: 1500,
            shutdown_grace_ms: 2000,
        }
    }
}

impl TimingConfig {
    /// No settle delays at all; used by tests driving the scripted DOM.
    #[cfg(test)]
    pub fn immediate() -> Self {
        Self {
            catalog_wait_secs: 1,
            page_settle_ms: 0,
            entry_settle_ms: 0,
            swatch_scroll_settle_ms: 0,
            swatch_render_settle_ms: 0,
            shutdown_grace_ms: 0,
        }
    }

    pub fn catalog_wait(&self) -> Duration {
        Duration::from_secs(self.catalog_wait_secs)
    }

    pub fn page_settle(&self) -> Duration {
        Duration::from_millis(self.page_settle_ms)
    }

    pub fn entry_settle(&self) -> Duration {
        Duration::from_millis(self.entry_settle_ms)
    }

    pub fn swatch_scroll_settle(&self) -> Duration {
        Duration::from_millis(self.swatch_scroll_settle_ms)
    }

    pub fn swatch_render_settle(&self) -> Duration {
        Duration::from_millis(self.swatch_render_settle_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

impl HarvesterConfig {
    /// Built-in defaults overlaid with `HARVESTER_*` environment variables.
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("HARVESTER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("Failed to read HARVESTER_* environment")?;

        let config: Self = settings
            .try_deserialize()
            .context("Invalid harvester configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.catalog_url)
            .with_context(|| format!("catalog_url is not a valid URL: {}", self.catalog_url))?;
        Url::parse(&self.webdriver_url)
            .with_context(|| format!("webdriver_url is not a valid URL: {}", self.webdriver_url))?;

        if self.download_timeout_secs == 0 {
            bail!("download_timeout_secs must be greater than 0");
        }
        if self.output_dir.trim().is_empty() {
            bail!("output_dir must not be empty");
        }

        Ok(())
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}
