//! Thumbnail downloads.
//!
//! [`ImageDownloader`] is the seam the field extractors use; [`HttpDownloader`]
//! is the production implementation over `reqwest`.

use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, instrument};
use url::Url;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server answered with status {0}")]
    Status(u16),

    #[error("Could not save image: {0}")]
    Io(#[from] std::io::Error),
}

/// Fetches a remote file to a local path.
pub trait ImageDownloader {
    /// Download `url` and write the body to `dest`, creating parent
    /// directories as needed. An existing file at `dest` is overwritten.
    async fn download(&self, url: &Url, dest: &Path) -> Result<(), DownloadError>;
}

/// Downloads images with a shared HTTP client.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl ImageDownloader for HttpDownloader {
    #[instrument(level = "debug", skip_all, fields(%url, dest = %dest.display()))]
    async fn download(&self, url: &Url, dest: &Path) -> Result<(), DownloadError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status(status.as_u16()));
        }
        let bytes = response.bytes().await?;

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(dest, &bytes).await?;
        debug!(bytes = bytes.len(), "Saved image");
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_downloader_builds() {
        assert!(HttpDownloader::new().is_ok());
    }

    #[test]
    fn test_status_error_message() {
        assert_eq!(
            DownloadError::Status(404).to_string(),
            "Server answered with status 404"
        );
    }
}
