use tracing::{error, info};

use super::{ProductExtractor, ProductOutcome};
use crate::browser::{Browser, Css};
use crate::config::{SelectorConfig, TimingConfig};
use crate::error::HarvestError;
use crate::models::{ProductRecord, MARK_FAIL};

/// Result of one pass over the rendered listing.
#[derive(Debug, Clone, Default)]
pub struct CatalogReport {
    pub entries_found: usize,
    pub to_process: usize,
    pub outcomes: Vec<ProductOutcome>,
}

impl CatalogReport {
    pub fn records(&self) -> impl Iterator<Item = &ProductRecord> {
        self.outcomes.iter().map(|o| &o.record)
    }

    /// Entries dropped before extraction could produce anything.
    pub fn skipped_entries(&self) -> usize {
        self.to_process - self.outcomes.len()
    }

    pub fn images(&self) -> usize {
        self.outcomes.iter().map(|o| o.images).sum()
    }

    pub fn failed_steps(&self) -> usize {
        self.outcomes.iter().map(ProductOutcome::failed_steps).sum()
    }
}

/// Drives the product extractor over the entries rendered on the listing page.
pub struct CatalogEnumerator<'a, B: Browser> {
    browser: &'a B,
    extractor: &'a ProductExtractor<'a, B>,
    selectors: &'a SelectorConfig,
    timing: &'a TimingConfig,
}

impl<'a, B: Browser> CatalogEnumerator<'a, B> {
    pub fn new(
        browser: &'a B,
        extractor: &'a ProductExtractor<'a, B>,
        selectors: &'a SelectorConfig,
        timing: &'a TimingConfig,
    ) -> Self {
        Self {
            browser,
            extractor,
            selectors,
            timing,
        }
    }

    /// Process up to `limit` entries in discovery order. Only an empty listing
    /// ends the run; a failing entry is logged and the next one is tried.
    pub async fn run(&self, limit: usize) -> Result<CatalogReport, HarvestError> {
        info!("Searching for product tiles...");
        let timeout = self.timing.catalog_wait();
        let entries = self
            .browser
            .wait_for_all(&Css::from(&self.selectors.product_tile), timeout)
            .await
            .map_err(|source| HarvestError::NoProducts { timeout, source })?;

        let to_process = limit.min(entries.len());
        info!("Found {} product tiles on the page", entries.len());
        info!("Will scrape {} product(s) as configured", to_process);

        let mut report = CatalogReport {
            entries_found: entries.len(),
            to_process,
            outcomes: Vec::with_capacity(to_process),
        };

        for (index, entry) in entries.iter().take(to_process).enumerate() {
            let ordinal = index + 1;
            info!("{}", "=".repeat(60));
            info!("Processing Product #{}", ordinal);
            info!("{}", "=".repeat(60));

            if let Err(e) = self.browser.scroll_into_view(entry).await {
                error!("{} Error processing product #{}: {}", MARK_FAIL, ordinal, e);
                continue;
            }
            self.browser.settle(self.timing.entry_settle()).await;

            let outcome = self.extractor.extract(entry, ordinal).await;
            info!(
                "Completed Product #{}: {} ({} images, {} failed steps)",
                ordinal,
                outcome.record.name,
                outcome.images,
                outcome.failed_steps()
            );
            info!("All files saved in: {}", outcome.record.folder);
            report.outcomes.push(outcome);
        }

        Ok(report)
    }
}
