use thiserror::Error;
use tracing::{debug, info, warn};

use super::{read_image_url, AssetDownloader};
use crate::browser::{activate, Browser, Css};
use crate::config::{SelectorConfig, TimingConfig};
use crate::error::{BrowserError, DownloadError};
use crate::models::{Asset, ProductFolder, MARK_FAIL};

/// Why a single swatch produced no image.
#[derive(Debug, Error)]
enum SwatchFailure {
    #[error("could not scroll into view: {0}")]
    Scroll(#[source] BrowserError),

    #[error("activation failed: {0}")]
    Activation(#[source] BrowserError),

    #[error("image lookup after activation failed: {0}")]
    Image(#[source] BrowserError),

    #[error("no image URL after activation")]
    NoImage,

    #[error("download failed: {0}")]
    Download(#[source] DownloadError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwatchSummary {
    pub controls: usize,
    pub captured: usize,
}

/// Activates each color-variant control of a product and captures the image it shows.
pub struct SwatchLoop<'a, B: Browser> {
    browser: &'a B,
    downloader: &'a AssetDownloader<'a>,
    selectors: &'a SelectorConfig,
    timing: &'a TimingConfig,
}

impl<'a, B: Browser> SwatchLoop<'a, B> {
    pub fn new(
        browser: &'a B,
        downloader: &'a AssetDownloader<'a>,
        selectors: &'a SelectorConfig,
        timing: &'a TimingConfig,
    ) -> Self {
        Self {
            browser,
            downloader,
            selectors,
            timing,
        }
    }

    /// All controls across every swatch group, in discovery order.
    pub async fn controls(&self, entry: &B::Element) -> Result<Vec<B::Element>, BrowserError> {
        let lists = self
            .browser
            .find_all(entry, &Css::from(&self.selectors.swatch_list))
            .await?;

        let mut controls = Vec::new();
        for list in &lists {
            let buttons = self
                .browser
                .find_all(list, &Css::from(&self.selectors.swatch_button))
                .await?;
            controls.extend(buttons);
        }
        Ok(controls)
    }

    /// Try every control in isolation. A failed control keeps its ordinal, so
    /// `swatch_<n>.jpg` always names the n-th control discovered.
    pub async fn run(
        &self,
        entry: &B::Element,
        folder: &ProductFolder,
    ) -> Result<SwatchSummary, BrowserError> {
        let controls = self.controls(entry).await?;
        if controls.is_empty() {
            info!("No color swatches found for this product");
            return Ok(SwatchSummary::default());
        }

        info!("Found {} color swatches", controls.len());

        let mut summary = SwatchSummary {
            controls: controls.len(),
            captured: 0,
        };
        for (index, control) in controls.iter().enumerate() {
            let ordinal = index + 1;
            match self.capture(entry, control, ordinal, folder).await {
                Ok(()) => summary.captured += 1,
                Err(e) => {
                    warn!("  {} Error processing swatch #{}: {}", MARK_FAIL, ordinal, e);
                }
            }
        }

        Ok(summary)
    }

    async fn capture(
        &self,
        entry: &B::Element,
        control: &B::Element,
        ordinal: usize,
        folder: &ProductFolder,
    ) -> Result<(), SwatchFailure> {
        self.browser
            .scroll_into_view(control)
            .await
            .map_err(SwatchFailure::Scroll)?;
        self.browser.settle(self.timing.swatch_scroll_settle()).await;

        info!("  Clicking swatch #{}...", ordinal);
        let strategy = activate(self.browser, control)
            .await
            .map_err(SwatchFailure::Activation)?;
        debug!("Swatch #{} activated via {:?} click", ordinal, strategy);

        self.browser.settle(self.timing.swatch_render_settle()).await;

        // The tile may have re-rendered its image, so look it up again
        let image_url = read_image_url(self.browser, entry, self.selectors)
            .await
            .map_err(SwatchFailure::Image)?
            .ok_or(SwatchFailure::NoImage)?;

        let asset = Asset::new(image_url, folder.swatch_file(ordinal));
        self.downloader
            .download(&asset)
            .await
            .map_err(SwatchFailure::Download)?;

        Ok(())
    }
}
