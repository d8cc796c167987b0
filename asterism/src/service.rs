//! Constellation position service.
//!
//! This module provides [`SkyService`], which owns the star dataset for the
//! lifetime of the process and resolves constellation names into apparent
//! horizontal positions.
//!
//! # Star Dataset Sources
//!
//! - No data directory: the compiled-in positions of the marker stars.
//! - Data directory: `hip_main.dat` (or `.gz` / `.zip`) from that directory.
//! - Data directory + auto-download (requires `download` feature): the
//!   Hipparcos main catalog is fetched into the directory when missing.
//!
//! ```ignore
//! use asterism::SkyServiceBuilder;
//!
//! let service = SkyServiceBuilder::new()
//!     .data_dir("/data/hipparcos")
//!     .build()?;
//!
//! let results = service.resolve_now(49.8876, -119.4932, &["leo", "lyra"])?;
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::catalog::{self, Constellation};
use crate::dataset::{find_catalog_file, load_catalog_file, HIP_MAIN_FILENAME};
use crate::ephemeris::{ApparentSky, CelestialPosition, HorizontalPosition, Observer};
use crate::error::{AsterismError, Result};
use crate::star::{StarCatalog, StarRecord};

#[cfg(feature = "download")]
use crate::download::{DownloadConfig, Downloader};

/// Outcome of resolving a single requested name.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The name is in the table; the marker star's apparent position.
    Resolved {
        /// Canonical constellation name.
        constellation: String,
        /// Apparent altitude/azimuth.
        position: HorizontalPosition,
    },
    /// The name is not in the constellation table.
    Unknown {
        /// Canonical form of the requested name.
        constellation: String,
    },
}

impl Resolution {
    /// Canonical name this result refers to.
    pub fn constellation(&self) -> &str {
        match self {
            Resolution::Resolved { constellation, .. } | Resolution::Unknown { constellation } => {
                constellation
            }
        }
    }

    /// The position, if the name was resolved.
    pub fn position(&self) -> Option<HorizontalPosition> {
        match self {
            Resolution::Resolved { position, .. } => Some(*position),
            Resolution::Unknown { .. } => None,
        }
    }
}

/// Where the star dataset was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    /// Compiled-in marker star positions.
    Builtin,
    /// A Hipparcos main catalog file.
    File(PathBuf),
}

/// Resolves constellation names into apparent sky positions.
///
/// The star dataset is loaded once when the service is built and is never
/// mutated afterwards, so a single instance can be shared across threads.
///
/// # Example
///
/// ```ignore
/// use asterism::SkyService;
///
/// let service = SkyService::builtin();
/// for result in service.resolve_now(51.4779, -0.0015, &["orion", "draco"])? {
///     println!("{:?}", result);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SkyService {
    stars: StarCatalog,
    source: DatasetSource,
}

impl SkyService {
    /// Create a service backed by the compiled-in star positions.
    pub fn builtin() -> Self {
        Self {
            stars: StarCatalog::builtin(),
            source: DatasetSource::Builtin,
        }
    }

    /// Create a service from an already-loaded star dataset.
    ///
    /// # Errors
    ///
    /// Returns [`AsterismError::StarNotFound`] if the dataset lacks any
    /// marker star of the constellation table.
    pub fn from_catalog(stars: StarCatalog, source: DatasetSource) -> Result<Self> {
        stars.ensure_contains(catalog::required_stars())?;
        Ok(Self { stars, source })
    }

    /// Create a builder for more configuration options.
    pub fn builder() -> SkyServiceBuilder {
        SkyServiceBuilder::new()
    }

    /// Resolve constellation names for an observer at the given instant.
    ///
    /// Names are canonicalized (trimmed, lowercased). The output has the same
    /// length and order as `names`; names absent from the table yield
    /// [`Resolution::Unknown`] without affecting the others. Every resolved
    /// star uses the same Earth orientation computed for `instant`.
    ///
    /// # Errors
    ///
    /// - [`AsterismError::OutOfBounds`] if the observer coordinates are invalid
    /// - [`AsterismError::InvalidInstant`] if the instant is outside the supported range
    /// - [`AsterismError::Computation`] if a position cannot be computed
    pub fn resolve<S: AsRef<str>>(
        &self,
        lat: f64,
        lon: f64,
        names: &[S],
        instant: DateTime<Utc>,
    ) -> Result<Vec<Resolution>> {
        let observer = Observer::new(lat, lon)?;
        let sky = ApparentSky::at(instant)?;

        names
            .iter()
            .map(|name| self.resolve_one(&sky, &observer, name.as_ref()))
            .collect()
    }

    /// Resolve constellation names for an observer at the current instant.
    ///
    /// The current time is read once for the whole call.
    pub fn resolve_now<S: AsRef<str>>(
        &self,
        lat: f64,
        lon: f64,
        names: &[S],
    ) -> Result<Vec<Resolution>> {
        self.resolve(lat, lon, names, Utc::now())
    }

    fn resolve_one(
        &self,
        sky: &ApparentSky,
        observer: &Observer,
        name: &str,
    ) -> Result<Resolution> {
        let constellation = catalog::canonicalize(name);

        let Some(entry) = catalog::lookup(&constellation) else {
            return Ok(Resolution::Unknown { constellation });
        };

        let record = self.star_for(entry)?;
        let star = CelestialPosition::new(record.ra_hours(), record.dec_degrees);
        let position = sky.observe(observer, entry.hip, &star)?;

        Ok(Resolution::Resolved {
            constellation,
            position,
        })
    }

    /// The dataset record of a constellation's marker star.
    pub fn star_for(&self, constellation: &Constellation) -> Result<&StarRecord> {
        self.stars
            .get(constellation.hip)
            .ok_or(AsterismError::StarNotFound {
                hip: constellation.hip.get(),
            })
    }

    /// Number of stars in the loaded dataset.
    pub fn star_count(&self) -> usize {
        self.stars.len()
    }

    /// Where the star dataset came from.
    pub fn source(&self) -> &DatasetSource {
        &self.source
    }
}

/// Builder for [`SkyService`] with custom configuration.
///
/// # Example
///
/// ```ignore
/// use asterism::{SkyServiceBuilder, download::DownloadConfig};
///
/// let service = SkyServiceBuilder::new()
///     .data_dir("/data/hipparcos")
///     .auto_download(DownloadConfig::default())
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct SkyServiceBuilder {
    data_dir: Option<PathBuf>,
    #[cfg(feature = "download")]
    download_config: Option<DownloadConfig>,
}

impl SkyServiceBuilder {
    /// Create a builder that uses the compiled-in star positions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder configured from environment variables.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `ASTERISM_DATA_DIR` | Directory containing `hip_main.dat` | None (built-in stars) |
    /// | `ASTERISM_AUTO_DOWNLOAD` | Download the catalog when missing* | false |
    /// | `ASTERISM_CATALOG_URL` | Catalog download URL* | CDS I/239 |
    ///
    /// *Only used when `download` feature is enabled.
    ///
    /// ```bash
    /// export ASTERISM_DATA_DIR=/data/hipparcos
    /// export ASTERISM_AUTO_DOWNLOAD=true
    /// ```
    pub fn from_env() -> Self {
        let data_dir = std::env::var("ASTERISM_DATA_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        #[cfg(feature = "download")]
        let download_config = {
            let enabled = std::env::var("ASTERISM_AUTO_DOWNLOAD")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false);

            enabled.then(DownloadConfig::from_env)
        };

        Self {
            data_dir,
            #[cfg(feature = "download")]
            download_config,
        }
    }

    /// Load the star dataset from this directory instead of the built-in table.
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Download the catalog into the data directory if it is missing.
    ///
    /// Has no effect without a data directory.
    #[cfg(feature = "download")]
    pub fn auto_download(mut self, config: DownloadConfig) -> Self {
        self.download_config = Some(config);
        self
    }

    /// The configured data directory, if any.
    pub fn configured_data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Load the star dataset and build the [`SkyService`].
    ///
    /// # Errors
    ///
    /// - [`AsterismError::FileNotFound`] if a data directory is set but holds
    ///   no catalog (and auto-download is off)
    /// - [`AsterismError::DownloadFailed`] / `Http` if the download fails
    /// - [`AsterismError::InvalidRecord`] if the catalog is malformed
    /// - [`AsterismError::StarNotFound`] if a marker star is missing
    pub fn build(self) -> Result<SkyService> {
        let Some(data_dir) = self.data_dir.as_deref() else {
            tracing::info!("Using built-in star positions");
            return Ok(SkyService::builtin());
        };

        let path = match find_catalog_file(data_dir) {
            Some(path) => path,
            None => self.fetch_catalog(data_dir)?,
        };

        let stars = load_catalog_file(&path)?;
        tracing::info!(
            path = %path.display(),
            star_count = stars.len(),
            "Star catalog loaded"
        );

        SkyService::from_catalog(stars, DatasetSource::File(path))
    }

    /// Download the catalog into `data_dir`, if auto-download is configured.
    #[cfg(feature = "download")]
    fn fetch_catalog(&self, data_dir: &Path) -> Result<PathBuf> {
        match &self.download_config {
            Some(config) => {
                tracing::info!(data_dir = %data_dir.display(), "Downloading star catalog");
                Downloader::new(config.clone())?.download_catalog(data_dir)
            }
            None => Err(missing_catalog(data_dir)),
        }
    }

    #[cfg(not(feature = "download"))]
    fn fetch_catalog(&self, data_dir: &Path) -> Result<PathBuf> {
        Err(missing_catalog(data_dir))
    }
}

fn missing_catalog(data_dir: &Path) -> AsterismError {
    AsterismError::FileNotFound {
        path: data_dir.join(HIP_MAIN_FILENAME),
    }
}
