//! Locating and opening star dataset files on disk.
//!
//! The Hipparcos main catalog may be stored uncompressed (`hip_main.dat`),
//! gzipped (`hip_main.dat.gz`) or inside a ZIP archive (`hip_main.zip`).

use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use zip::ZipArchive;

use crate::error::{AsterismError, Result};
use crate::star::StarCatalog;

/// File name of the uncompressed Hipparcos main catalog.
pub const HIP_MAIN_FILENAME: &str = "hip_main.dat";

/// Candidate file names, in lookup order.
const CANDIDATES: [&str; 3] = ["hip_main.dat", "hip_main.dat.gz", "hip_main.zip"];

/// Compression format of a dataset file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// No compression.
    #[default]
    None,
    /// Gzip compression (.gz)
    Gzip,
    /// ZIP archive (.zip)
    Zip,
}

impl Compression {
    /// Detect compression format from a URL or filename.
    ///
    /// # Examples
    ///
    /// ```
    /// use asterism::dataset::Compression;
    ///
    /// assert_eq!(Compression::from_url("hip_main.dat.gz"), Compression::Gzip);
    /// assert_eq!(Compression::from_url("hip_main.zip"), Compression::Zip);
    /// assert_eq!(Compression::from_url("hip_main.dat"), Compression::None);
    /// ```
    pub fn from_url(url: &str) -> Self {
        let lower = url.to_lowercase();
        if lower.ends_with(".gz") {
            Compression::Gzip
        } else if lower.ends_with(".zip") {
            Compression::Zip
        } else {
            Compression::None
        }
    }
}

/// Find the Hipparcos main catalog in a data directory.
///
/// Returns the first existing candidate (`hip_main.dat`, then
/// `hip_main.dat.gz`, then `hip_main.zip`), or `None`.
pub fn find_catalog_file(data_dir: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|name| data_dir.join(name))
        .find(|path| path.is_file())
}

/// Load a star catalog from a Hipparcos main catalog file.
///
/// Compression is detected from the file extension.
///
/// # Errors
///
/// Returns [`AsterismError::FileNotFound`] if the file does not exist, or a
/// parse/IO error if its contents cannot be read.
pub fn load_catalog_file(path: &Path) -> Result<StarCatalog> {
    if !path.exists() {
        return Err(AsterismError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let name = path.to_string_lossy();
    let file = File::open(path)?;

    match Compression::from_url(&name) {
        Compression::None => StarCatalog::from_hip_main(BufReader::new(file)),
        Compression::Gzip => StarCatalog::from_hip_main(BufReader::new(GzDecoder::new(file))),
        Compression::Zip => {
            let mut data = Vec::new();
            BufReader::new(file).read_to_end(&mut data)?;
            let contents = extract_catalog_from_zip(&data, &name)?;
            StarCatalog::from_hip_main(Cursor::new(contents))
        }
    }
}

/// Extract the catalog from a ZIP archive.
///
/// Searches the archive for the first entry ending in ".dat"
/// (case-insensitive) and returns its contents.
pub(crate) fn extract_catalog_from_zip(data: &[u8], filename: &str) -> Result<Vec<u8>> {
    let mut archive =
        ZipArchive::new(Cursor::new(data)).map_err(|e| AsterismError::DownloadFailed {
            filename: filename.to_string(),
            reason: format!("Failed to read ZIP archive: {}", e),
        })?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| AsterismError::DownloadFailed {
                filename: filename.to_string(),
                reason: format!("Failed to read ZIP entry: {}", e),
            })?;

        if entry.name().to_lowercase().ends_with(".dat") {
            let mut contents = Vec::new();
            entry.read_to_end(&mut contents)?;
            return Ok(contents);
        }
    }

    Err(AsterismError::DownloadFailed {
        filename: filename.to_string(),
        reason: "No .dat file found in ZIP archive".to_string(),
    })
}
