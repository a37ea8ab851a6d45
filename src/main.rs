use anyhow::Result;
use chrono::Local;
use clap::Parser;
use std::time::Instant;
use tracing::{debug, error, info, warn};

mod browser;
mod config;
mod error;
mod harvest;
mod models;
mod parsers;
mod storage;
mod utils;

use crate::browser::{Browser, WebDriverBrowser};
use crate::config::HarvesterConfig;
use crate::harvest::{AssetDownloader, CatalogEnumerator, CatalogReport, ProductExtractor};
use crate::models::{MAIN_IMAGE_FILE, MARK_FAIL, RECORD_FILE};
use crate::storage::StorageRoot;
use crate::utils::http::{create_client, AssetFetcher, HttpFetcher};

#[derive(Debug, Parser)]
#[command(name = "catalog-harvester", version, about)]
struct Cli {
    /// Maximum number of products to process
    #[arg(short = 'n', long)]
    max_products: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("catalog_harvester=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = HarvesterConfig::load()?;
    if let Some(max_products) = cli.max_products {
        config.max_products = max_products;
    }

    info!(
        "Starting Catalog Harvester at {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    let started = Instant::now();

    // Initialize storage
    let storage = StorageRoot::new(&config.output_dir);
    storage.ensure().await?;

    // Initialize HTTP client for asset downloads
    let client = create_client(&config.user_agent, config.download_timeout())?;
    let fetcher = HttpFetcher::new(client);

    let browser = WebDriverBrowser::connect(&config).await?;

    match run_session(&browser, &fetcher, &storage, &config).await {
        Ok(report) => {
            print_summary(&report, &storage);
            info!("Finished in {:.1}s", started.elapsed().as_secs_f64());
            Ok(())
        }
        Err(e) => {
            error!("{} {}", MARK_FAIL, e);
            Err(e)
        }
    }
}

/// Harvest the catalog, then release the session exactly once whatever the outcome.
async fn run_session<B: Browser>(
    browser: &B,
    fetcher: &dyn AssetFetcher,
    storage: &StorageRoot,
    config: &HarvesterConfig,
) -> Result<CatalogReport> {
    let result = harvest(browser, fetcher, storage, config).await;

    info!("Closing browser...");
    browser.settle(config.timing.shutdown_grace()).await;
    match browser.close().await {
        Ok(()) => info!("Browser closed. Exiting."),
        Err(e) => warn!("Failed to close browser session cleanly: {}", e),
    }

    result
}

async fn harvest<B: Browser>(
    browser: &B,
    fetcher: &dyn AssetFetcher,
    storage: &StorageRoot,
    config: &HarvesterConfig,
) -> Result<CatalogReport> {
    info!("Navigating to: {}", config.catalog_url);
    browser.goto(&config.catalog_url).await?;
    browser.settle(config.timing.page_settle()).await;

    let downloader = AssetDownloader::new(fetcher, storage);
    let extractor = ProductExtractor::new(
        browser,
        &downloader,
        storage,
        &config.selectors,
        &config.timing,
    );
    let catalog = CatalogEnumerator::new(browser, &extractor, &config.selectors, &config.timing);

    Ok(catalog.run(config.max_products).await?)
}

fn print_summary(report: &CatalogReport, storage: &StorageRoot) {
    info!("{}", "=".repeat(60));
    info!("Harvest completed");
    info!("{}", "=".repeat(60));
    info!(
        "Processed {} of {} product(s) found ({} skipped)",
        report.outcomes.len(),
        report.entries_found,
        report.skipped_entries()
    );
    info!(
        "Captured {} image(s); {} step(s) failed",
        report.images(),
        report.failed_steps()
    );
    for record in report.records() {
        debug!("  {} -> {}", record.name, record.folder);
    }
    info!("All products saved in: {}", storage.path().display());
    info!("  - {} - Main product image", MAIN_IMAGE_FILE);
    info!("  - swatch_X.jpg - Color variant images");
    info!("  - {} - Product information in CSV format", RECORD_FILE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{FakePage, TileSpec};
    use crate::config::TimingConfig;
    use crate::error::HarvestError;
    use crate::harvest::downloader::testing::StubFetcher;

    fn test_config(dir: &std::path::Path) -> HarvesterConfig {
        HarvesterConfig {
            output_dir: dir.to_string_lossy().into_owned(),
            timing: TimingConfig::immediate(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn empty_listing_still_closes_session_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let storage = StorageRoot::new(dir.path());
        let page = FakePage::new();

        let err = run_session(&page, &StubFetcher::default(), &storage, &config)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<HarvestError>(),
            Some(HarvestError::NoProducts { .. })
        ));
        assert_eq!(page.visited(), vec![config.catalog_url.clone()]);
        assert_eq!(page.closes(), 1);
    }

    #[tokio::test]
    async fn completed_harvest_closes_session_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let storage = StorageRoot::new(dir.path());
        let page = FakePage::new();
        page.add_tile(TileSpec {
            name: Some("Swivel Glider".into()),
            detail: Some("Style: Glider".into()),
            ..Default::default()
        });

        let report = run_session(&page, &StubFetcher::default(), &storage, &config)
            .await
            .unwrap();

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(page.closes(), 1);
    }
}
