//! Star catalog download functionality.
//!
//! This module downloads the Hipparcos main catalog (ESA 1997, CDS I/239)
//! into a local data directory. It is only available when the `download`
//! feature is enabled.
//!
//! # Data Sources
//!
//! - **CDS (Strasbourg)**: the canonical distribution, uncompressed or `.gz`
//! - Any mirror serving `hip_main.dat`, `hip_main.dat.gz` or a ZIP archive
//!   containing it

use std::fs::{self, File};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use reqwest::blocking::Client;

use crate::catalog;
use crate::dataset::{extract_catalog_from_zip, Compression, HIP_MAIN_FILENAME};
use crate::error::{AsterismError, Result};
use crate::star::StarCatalog;

/// Default location of the Hipparcos main catalog.
pub const DEFAULT_CATALOG_URL: &str = "https://cdsarc.cds.unistra.fr/ftp/cats/I/239/hip_main.dat";

/// Default timeout for HTTP requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Configuration for downloading the star catalog.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// URL of the catalog file.
    pub url: String,
    /// Compression format of the downloaded file.
    pub compression: Compression,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Number of retry attempts on failure.
    pub max_retries: u32,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self::with_url(DEFAULT_CATALOG_URL)
    }
}

impl DownloadConfig {
    /// Create a download configuration for a custom URL.
    ///
    /// Compression is auto-detected from the URL extension:
    /// - `.gz` → Gzip
    /// - `.zip` → ZIP
    /// - otherwise → None
    ///
    /// # Example
    ///
    /// ```ignore
    /// use asterism::download::DownloadConfig;
    ///
    /// let config = DownloadConfig::with_url(
    ///     "https://cdsarc.cds.unistra.fr/ftp/cats/I/239/hip_main.dat.gz",
    /// );
    /// ```
    pub fn with_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let compression = Compression::from_url(&url);
        Self {
            url,
            compression,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: 3,
        }
    }

    /// Configuration from `ASTERISM_CATALOG_URL`, or the CDS default when unset.
    pub fn from_env() -> Self {
        match std::env::var("ASTERISM_CATALOG_URL") {
            Ok(url) if !url.trim().is_empty() => Self::with_url(url),
            _ => Self::default(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the maximum number of retry attempts.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Star catalog downloader.
pub struct Downloader {
    client: Client,
    config: DownloadConfig,
}

impl Downloader {
    /// Create a new downloader with the given configuration.
    pub fn new(config: DownloadConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AsterismError::DownloadFailed {
                filename: HIP_MAIN_FILENAME.to_string(),
                reason: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    /// Download the catalog into `dest_dir`.
    ///
    /// The file is stored decompressed as `hip_main.dat`. If that file
    /// already exists it is returned without downloading.
    ///
    /// # Returns
    ///
    /// The path to the downloaded catalog.
    pub fn download_catalog(&self, dest_dir: &Path) -> Result<PathBuf> {
        if self.config.url.is_empty() {
            return Err(AsterismError::DownloadFailed {
                filename: HIP_MAIN_FILENAME.to_string(),
                reason: "No catalog URL configured".to_string(),
            });
        }

        let dest_path = dest_dir.join(HIP_MAIN_FILENAME);
        if dest_path.exists() {
            return Ok(dest_path);
        }

        fs::create_dir_all(dest_dir)?;

        let mut last_error = None;
        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                std::thread::sleep(std::time::Duration::from_millis(500 * attempt as u64));
                tracing::warn!(attempt = attempt, url = %self.config.url, "Retrying catalog download");
            }

            match self.do_download(&dest_path) {
                Ok(()) => return Ok(dest_path),
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| AsterismError::DownloadFailed {
            filename: HIP_MAIN_FILENAME.to_string(),
            reason: "Unknown error".to_string(),
        }))
    }

    /// Perform the actual download.
    fn do_download(&self, dest_path: &Path) -> Result<()> {
        let response = self.client.get(&self.config.url).send()?;

        if !response.status().is_success() {
            return Err(AsterismError::DownloadFailed {
                filename: HIP_MAIN_FILENAME.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let bytes = response.bytes()?;
        let contents = decompress(&bytes, self.config.compression)?;

        install_catalog(&contents, dest_path)
    }
}

/// Validate downloaded catalog contents and move them into place.
///
/// The contents must parse as `hip_main.dat` and hold every marker star.
/// They are written under a `.part` name first, and that file is removed
/// if anything fails, so `dest_path` only ever holds a usable catalog.
fn install_catalog(contents: &[u8], dest_path: &Path) -> Result<()> {
    validate_catalog(contents)?;

    let partial = dest_path.with_extension("dat.part");
    let result = write_partial(&partial, contents).and_then(|()| Ok(fs::rename(&partial, dest_path)?));

    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}

fn write_partial(partial: &Path, contents: &[u8]) -> Result<()> {
    let mut file = File::create(partial)?;
    file.write_all(contents)?;
    file.sync_all()?;
    Ok(())
}

/// Check that downloaded bytes are a Hipparcos main catalog with every marker star.
fn validate_catalog(contents: &[u8]) -> Result<()> {
    StarCatalog::from_hip_main(Cursor::new(contents))
        .and_then(|stars| stars.ensure_contains(catalog::required_stars()))
        .map_err(|e| {
            tracing::warn!(error = %e, "Downloaded catalog rejected");
            AsterismError::DownloadFailed {
                filename: HIP_MAIN_FILENAME.to_string(),
                reason: format!("not a usable Hipparcos main catalog: {}", e),
            }
        })
}

/// Decompress downloaded bytes according to `compression`.
fn decompress(bytes: &[u8], compression: Compression) -> Result<Vec<u8>> {
    match compression {
        Compression::None => Ok(bytes.to_vec()),
        Compression::Gzip => {
            let mut decoder = GzDecoder::new(bytes);
            let mut data = Vec::new();
            decoder
                .read_to_end(&mut data)
                .map_err(|e| AsterismError::DownloadFailed {
                    filename: HIP_MAIN_FILENAME.to_string(),
                    reason: format!("Failed to decompress gzip: {}", e),
                })?;
            Ok(data)
        }
        Compression::Zip => extract_catalog_from_zip(bytes, HIP_MAIN_FILENAME),
    }
}
