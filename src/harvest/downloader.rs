use tracing::{error, info};

use crate::error::DownloadError;
use crate::models::{Asset, MARK_FAIL, MARK_OK};
use crate::storage::Storage;
use crate::utils::http::AssetFetcher;

/// Materializes remote images into storage, one attempt each.
pub struct AssetDownloader<'a> {
    fetcher: &'a dyn AssetFetcher,
    storage: &'a dyn Storage,
}

impl<'a> AssetDownloader<'a> {
    pub fn new(fetcher: &'a dyn AssetFetcher, storage: &'a dyn Storage) -> Self {
        Self { fetcher, storage }
    }

    /// Fetch `asset.source_url` and write the payload verbatim to its destination.
    /// Nothing is written when the fetch fails. Returns the number of bytes saved.
    pub async fn download(&self, asset: &Asset) -> Result<usize, DownloadError> {
        match self.try_download(asset).await {
            Ok(len) => {
                info!(
                    "{} Downloaded: {} ({} bytes)",
                    MARK_OK,
                    asset.destination.display(),
                    len
                );
                Ok(len)
            }
            Err(e) => {
                error!(
                    "{} Failed to download {}: {}",
                    MARK_FAIL,
                    asset.destination.display(),
                    e
                );
                Err(e)
            }
        }
    }

    async fn try_download(&self, asset: &Asset) -> Result<usize, DownloadError> {
        let bytes = self.fetcher.fetch(&asset.source_url).await?;
        self.storage.write_bytes(&asset.destination, &bytes).await?;
        Ok(bytes.len())
    }
}
