pub mod catalog;
pub mod downloader;
pub mod product;
pub mod swatch;

pub use catalog::{CatalogEnumerator, CatalogReport};
pub use downloader::AssetDownloader;
pub use product::{ProductExtractor, ProductOutcome};
pub use swatch::SwatchLoop;

use url::Url;

use crate::browser::{Browser, Css};
use crate::config::SelectorConfig;
use crate::error::BrowserError;

/// Locate the entry's primary image and read its source, preferring the live
/// `src` over the deferred-load `data-src`. The result is resolved against the
/// page URL.
pub(crate) async fn read_image_url<B: Browser>(
    browser: &B,
    entry: &B::Element,
    selectors: &SelectorConfig,
) -> Result<Option<String>, BrowserError> {
    let wrapper = browser.find(entry, &Css::from(&selectors.image_wrapper)).await?;
    let image = browser.find(&wrapper, &Css::from(&selectors.image)).await?;

    let raw = match non_blank(browser.attribute(&image, "src").await?) {
        Some(src) => Some(src),
        None => non_blank(browser.attribute(&image, "data-src").await?),
    };

    match raw {
        Some(raw) => {
            let page_url = browser.current_url().await.ok();
            Ok(Some(resolve_image_url(page_url.as_deref(), &raw)))
        }
        None => Ok(None),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Absolute URLs pass through; relative and protocol-relative ones are joined onto the page.
pub(crate) fn resolve_image_url(page_url: Option<&str>, raw: &str) -> String {
    if let Ok(absolute) = Url::parse(raw) {
        return absolute.to_string();
    }

    page_url
        .and_then(|base| Url::parse(base).ok())
        .and_then(|base| base.join(raw).ok())
        .map(|url| url.to_string())
        .unwrap_or_else(|| raw.to_string())
}
