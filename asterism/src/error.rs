//! Error types for the asterism library.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading star data or computing positions.
#[derive(Error, Debug)]
pub enum AsterismError {
    /// IO error when reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A line of the Hipparcos main catalog could not be parsed.
    #[error("Invalid star catalog record at line {line}: {reason}")]
    InvalidRecord { line: usize, reason: String },

    /// The star dataset file was not found.
    #[error("Star catalog file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// A constellation references a star absent from the loaded dataset.
    #[error("Star HIP {hip} not present in the loaded star catalog")]
    StarNotFound { hip: u32 },

    /// Observer coordinates are not finite or latitude exceeds ±90°.
    #[error("Observer coordinates out of bounds: lat={lat}, lon={lon} (valid: lat ±90°, finite lon)")]
    OutOfBounds { lat: f64, lon: f64 },

    /// The instant cannot be represented in the time scale library.
    #[error("Invalid instant {instant}: {reason}")]
    InvalidInstant { instant: String, reason: String },

    /// The position computation produced a non-finite result.
    #[error("Position computation failed for HIP {hip}")]
    Computation { hip: u32 },

    /// Failed to download the star dataset.
    #[error("Failed to download {filename}: {reason}")]
    DownloadFailed { filename: String, reason: String },

    /// HTTP request error (only with download feature).
    #[cfg(feature = "download")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias using [`AsterismError`].
pub type Result<T> = std::result::Result<T, AsterismError>;
