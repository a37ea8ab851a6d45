use tracing::{debug, error, info, warn};

use super::{read_image_url, AssetDownloader, SwatchLoop};
use crate::browser::{Browser, Css};
use crate::config::{SelectorConfig, TimingConfig};
use crate::error::{BrowserError, Skipped, Step, StepResult};
use crate::models::{
    Asset, ProductFolder, ProductRecord, MAIN_IMAGE_FILE, MARK_FAIL, MARK_OK, MARK_WARN,
};
use crate::parsers::{fallback_product_name, parse_record_block, sanitize_folder_name, LinePrefix};
use crate::storage::Storage;

const PREVIEW_CHARS: usize = 150;

/// What one product produced, including the steps it had to skip.
#[derive(Debug, Clone)]
pub struct ProductOutcome {
    pub record: ProductRecord,
    pub skipped: Vec<Skipped>,
    pub images: usize,
    pub record_saved: bool,
}

impl ProductOutcome {
    pub fn failed_steps(&self) -> usize {
        self.skipped.len()
    }
}

/// Runs the fixed step sequence for a single product entry.
pub struct ProductExtractor<'a, B: Browser> {
    browser: &'a B,
    downloader: &'a AssetDownloader<'a>,
    storage: &'a dyn Storage,
    selectors: &'a SelectorConfig,
    timing: &'a TimingConfig,
}

impl<'a, B: Browser> ProductExtractor<'a, B> {
    pub fn new(
        browser: &'a B,
        downloader: &'a AssetDownloader<'a>,
        storage: &'a dyn Storage,
        selectors: &'a SelectorConfig,
        timing: &'a TimingConfig,
    ) -> Self {
        Self {
            browser,
            downloader,
            storage,
            selectors,
            timing,
        }
    }

    /// Extract one product. Never fails: each step is isolated and a failed step
    /// only leaves its part out of the outcome.
    pub async fn extract(&self, entry: &B::Element, ordinal: usize) -> ProductOutcome {
        let mut skipped = Vec::new();
        let mut images = 0;

        info!("[EXTRACTING PRODUCT NAME]");
        let (name, folder) = self.resolve_identity(entry, ordinal, &mut skipped).await;
        if let Err(skip) = self.allocate_folder(&folder).await {
            record_skip(&mut skipped, skip);
        }

        info!("[STEP 1] Extracting main product image...");
        match self.capture_main_image(entry, &folder).await {
            Ok(()) => images += 1,
            Err(skip) => record_skip(&mut skipped, skip),
        }

        info!("[STEP 2] Processing color swatches...");
        match self.process_swatches(entry, &folder).await {
            Ok(captured) => images += captured,
            Err(skip) => record_skip(&mut skipped, skip),
        }

        info!("[STEP 3] Extracting product details...");
        let (record, record_saved) = match self.extract_details(entry, &name, &folder).await {
            Ok(record) => match self.persist(&record).await {
                Ok(()) => (record, true),
                Err(skip) => {
                    record_skip(&mut skipped, skip);
                    (record, false)
                }
            },
            Err(skip) => {
                record_skip(&mut skipped, skip);
                (ProductRecord::new(name.clone(), folder.clone()), false)
            }
        };

        for skip in &skipped {
            debug!("Product #{} {}", ordinal, skip);
        }

        ProductOutcome {
            record,
            skipped,
            images,
            record_saved,
        }
    }

    async fn read_name(&self, entry: &B::Element) -> Result<String, BrowserError> {
        let element = self
            .browser
            .find(entry, &Css::from(&self.selectors.product_name))
            .await?;
        Ok(self.browser.text(&element).await?.trim().to_string())
    }

    /// Display name plus folder. Missing or unusable names fall back to `Product_<ordinal>`.
    async fn resolve_identity(
        &self,
        entry: &B::Element,
        ordinal: usize,
        skipped: &mut Vec<Skipped>,
    ) -> (String, ProductFolder) {
        let name = match self.read_name(entry).await {
            Ok(name) if !name.is_empty() => {
                info!("{} Product Name: {}", MARK_OK, name);
                name
            }
            Ok(_) => {
                let fallback = fallback_product_name(ordinal);
                warn!("{} Product name is empty, using default: {}", MARK_WARN, fallback);
                record_skip(skipped, Skipped::new(Step::Name, "name text is empty"));
                fallback
            }
            Err(e) => {
                let fallback = fallback_product_name(ordinal);
                error!(
                    "{} Could not read product name ({}), using default: {}",
                    MARK_FAIL, e, fallback
                );
                record_skip(skipped, Skipped::new(Step::Name, e));
                fallback
            }
        };

        let mut folder_name = sanitize_folder_name(&name);
        if folder_name.is_empty() {
            folder_name = fallback_product_name(ordinal);
            warn!(
                "{} Name {:?} has no usable characters, using folder {}",
                MARK_WARN, name, folder_name
            );
        }

        (name, ProductFolder(folder_name))
    }

    async fn allocate_folder(&self, folder: &ProductFolder) -> StepResult<()> {
        self.storage
            .create_folder(folder)
            .await
            .map_err(|e| {
                error!("{} Could not create folder {}: {}", MARK_FAIL, folder, e);
                Skipped::new(Step::Name, e)
            })?;
        info!("{} Created folder: {}", MARK_OK, folder);
        Ok(())
    }

    async fn capture_main_image(
        &self,
        entry: &B::Element,
        folder: &ProductFolder,
    ) -> StepResult<()> {
        let url = match read_image_url(self.browser, entry, self.selectors).await {
            Ok(Some(url)) => url,
            Ok(None) => {
                warn!("{} Main image URL not found", MARK_FAIL);
                return Err(Skipped::new(Step::MainImage, "image has no src or data-src"));
            }
            Err(e) => {
                warn!("{} Could not find img-wrapper or image element: {}", MARK_FAIL, e);
                return Err(Skipped::new(Step::MainImage, e));
            }
        };

        let asset = Asset::new(url, folder.file(MAIN_IMAGE_FILE));
        self.downloader
            .download(&asset)
            .await
            .map(|_| ())
            .map_err(|e| Skipped::new(Step::MainImage, e))
    }

    async fn process_swatches(
        &self,
        entry: &B::Element,
        folder: &ProductFolder,
    ) -> StepResult<usize> {
        let swatches = SwatchLoop::new(self.browser, self.downloader, self.selectors, self.timing);
        match swatches.run(entry, folder).await {
            Ok(summary) => {
                if summary.controls > 0 {
                    info!(
                        "Captured {} of {} swatch images",
                        summary.captured, summary.controls
                    );
                }
                Ok(summary.captured)
            }
            Err(e) => {
                error!("{} Could not enumerate swatch controls: {}", MARK_FAIL, e);
                Err(Skipped::new(Step::Swatches, e))
            }
        }
    }

    async fn read_pricing(&self, entry: &B::Element) -> Option<String> {
        let pricing = self
            .browser
            .find(entry, &Css::from(&self.selectors.item_pricing))
            .await;

        let text = match pricing {
            Ok(element) => self.browser.text(&element).await,
            Err(e) => Err(e),
        };

        match text {
            Ok(text) => {
                info!("{} Found pricing information", MARK_OK);
                Some(text)
            }
            Err(e) => {
                warn!("{} No pricing information found for this product ({})", MARK_WARN, e);
                None
            }
        }
    }

    async fn extract_details(
        &self,
        entry: &B::Element,
        name: &str,
        folder: &ProductFolder,
    ) -> StepResult<ProductRecord> {
        let detail_text = match self
            .browser
            .find(entry, &Css::from(&self.selectors.item_detail))
            .await
        {
            Ok(element) => self.browser.text(&element).await,
            Err(e) => Err(e),
        }
        .map_err(|e| {
            error!("{} Could not find item-detail element: {}", MARK_FAIL, e);
            Skipped::new(Step::Details, e)
        })?;

        let pricing_text = self.read_pricing(entry).await;

        let pricing = pricing_text
            .as_deref()
            .map(|text| parse_record_block(text, LinePrefix::Price))
            .unwrap_or_default();
        let details = parse_record_block(&detail_text, LinePrefix::Detail);

        if let Some(pricing) = pricing_text.as_deref().filter(|p| !p.trim().is_empty()) {
            debug!("PRICING:\n{}", pricing);
        }
        debug!("DETAILS:\n{}", preview(&detail_text));

        Ok(ProductRecord::new(name, folder.clone()).with_sections(pricing, details))
    }

    async fn persist(&self, record: &ProductRecord) -> StepResult<()> {
        match self.storage.write_record(record).await {
            Ok(()) => {
                info!("{} Saved product details to: {}", MARK_OK, record.folder);
                Ok(())
            }
            Err(e) => {
                error!("{} Could not save product details: {}", MARK_FAIL, e);
                Err(Skipped::new(Step::Details, e))
            }
        }
    }
}

/// A step counts once no matter how many of its parts failed.
fn record_skip(skipped: &mut Vec<Skipped>, skip: Skipped) {
    if !skipped.iter().any(|s| s.step == skip.step) {
        skipped.push(skip);
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        format!("{}...", text.chars().take(PREVIEW_CHARS).collect::<String>())
    } else {
        text.to_string()
    }
}
