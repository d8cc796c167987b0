pub mod batch;
pub mod list;
pub mod query;

use anyhow::{Context, Result};
use asterism::{download::DownloadConfig, SkyService, SkyServiceBuilder};
use std::path::PathBuf;

/// Where the star dataset comes from, as given on the command line.
pub struct DataSource {
    pub data_dir: Option<PathBuf>,
    pub auto_download: bool,
}

impl DataSource {
    /// Build the service, layering command-line flags over the environment.
    pub fn build_service(&self) -> Result<SkyService> {
        let mut builder = SkyServiceBuilder::from_env();

        if let Some(dir) = &self.data_dir {
            builder = builder.data_dir(dir);
        }

        if self.auto_download {
            if builder.configured_data_dir().is_none() {
                anyhow::bail!("--auto-download requires --data-dir or ASTERISM_DATA_DIR");
            }
            builder = builder.auto_download(DownloadConfig::from_env());
        }

        builder.build().context("Failed to load star dataset")
    }
}
