//! Star records and the Hipparcos-backed star dataset.
//!
//! The dataset maps Hipparcos numbers to ICRS positions. It is either built
//! from the compiled-in table of marker stars or parsed from the Hipparcos
//! main catalog (`hip_main.dat`, ESA 1997, CDS I/239).
//!
//! # Record Format
//!
//! `hip_main.dat` is a pipe-separated file with one star per line. The
//! fields used here are:
//!
//! | Field | Content |
//! |-------|---------|
//! | 1 | HIP number |
//! | 5 | V magnitude |
//! | 8 | Right ascension, degrees (ICRS, epoch J1991.25) |
//! | 9 | Declination, degrees (ICRS, epoch J1991.25) |
//!
//! About 260 entries have no astrometric solution; their RA/Dec fields are
//! blank and they are skipped.

use std::collections::HashMap;
use std::io::BufRead;

use crate::catalog::HipId;
use crate::error::{AsterismError, Result};

const FIELD_HIP: usize = 1;
const FIELD_VMAG: usize = 5;
const FIELD_RA_DEG: usize = 8;
const FIELD_DEC_DEG: usize = 9;

/// Position of a single star at the catalog reference epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarRecord {
    /// Hipparcos number.
    pub hip: HipId,
    /// Right ascension in degrees (0 to 360).
    pub ra_degrees: f64,
    /// Declination in degrees (-90 to 90).
    pub dec_degrees: f64,
    /// Visual magnitude, when known.
    pub magnitude: Option<f64>,
}

impl StarRecord {
    /// Right ascension expressed in hours (degrees / 15).
    pub fn ra_hours(&self) -> f64 {
        self.ra_degrees / 15.0
    }
}

/// Hipparcos positions of the marker stars used by the constellation table.
const BUILTIN_STARS: [(u32, f64, f64, f64); 15] = [
    (8886, 28.598_857_44, 63.670_101_24, 3.38),
    (17702, 56.871_152_36, 24.105_136_05, 2.85),
    (21421, 68.980_162_79, 16.509_302_35, 0.87),
    (24436, 78.634_467_07, -8.201_638_36, 0.18),
    (32349, 101.287_155_33, -16.716_115_86, -1.44),
    (36850, 113.649_471_64, 31.888_282_22, 1.58),
    (37279, 114.825_497_91, 5.224_987_56, 0.40),
    (49669, 152.092_962_44, 11.967_208_78, 1.36),
    (54061, 165.931_964_67, 61.751_034_69, 1.81),
    (69673, 213.915_300_29, 19.182_409_16, -0.05),
    (85927, 263.402_167_18, -37.103_823_55, 1.62),
    (90185, 276.042_993_01, -34.384_616_11, 1.79),
    (91262, 279.234_734_79, 38.783_688_96, 0.03),
    (97649, 297.695_827_30, 8.868_321_20, 0.76),
    (102098, 310.357_979_75, 45.280_338_81, 1.25),
];

/// Read-only star dataset keyed by Hipparcos number.
#[derive(Debug, Clone, Default)]
pub struct StarCatalog {
    records: HashMap<HipId, StarRecord>,
}

impl StarCatalog {
    /// Dataset containing only the compiled-in marker stars.
    pub fn builtin() -> Self {
        let records = BUILTIN_STARS
            .iter()
            .map(|&(hip, ra, dec, mag)| {
                let hip = HipId(hip);
                (
                    hip,
                    StarRecord {
                        hip,
                        ra_degrees: ra,
                        dec_degrees: dec,
                        magnitude: Some(mag),
                    },
                )
            })
            .collect();
        Self { records }
    }

    /// Parse a Hipparcos main catalog from a reader.
    ///
    /// Blank lines and entries without an astrometric solution are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`AsterismError::InvalidRecord`] with the 1-based line number
    /// if the HIP number, RA or Dec field is malformed, or
    /// [`AsterismError::Io`] if reading fails.
    pub fn from_hip_main<R: BufRead>(reader: R) -> Result<Self> {
        let mut records = HashMap::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if let Some(record) = parse_hip_main_line(&line, idx + 1)? {
                records.insert(record.hip, record);
            }
        }

        Ok(Self { records })
    }

    /// Get the record for a star.
    pub fn get(&self, hip: HipId) -> Option<&StarRecord> {
        self.records.get(&hip)
    }

    /// Number of stars in the dataset.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check that every given star is present.
    ///
    /// # Errors
    ///
    /// Returns [`AsterismError::StarNotFound`] for the first missing star.
    pub fn ensure_contains(&self, required: impl IntoIterator<Item = HipId>) -> Result<()> {
        for hip in required {
            if !self.records.contains_key(&hip) {
                return Err(AsterismError::StarNotFound { hip: hip.get() });
            }
        }
        Ok(())
    }
}

/// Parse one line of `hip_main.dat`.
///
/// Returns `Ok(None)` for entries whose RA/Dec fields are blank.
fn parse_hip_main_line(line: &str, line_no: usize) -> Result<Option<StarRecord>> {
    let fields: Vec<&str> = line.split('|').map(str::trim).collect();
    if fields.len() <= FIELD_DEC_DEG {
        return Err(invalid(line_no, format!("expected at least {} fields", FIELD_DEC_DEG + 1)));
    }

    let hip: u32 = fields[FIELD_HIP]
        .parse()
        .map_err(|_| invalid(line_no, format!("bad HIP number '{}'", fields[FIELD_HIP])))?;

    let (ra, dec) = (fields[FIELD_RA_DEG], fields[FIELD_DEC_DEG]);
    if ra.is_empty() || dec.is_empty() {
        return Ok(None);
    }

    let ra_degrees: f64 = ra
        .parse()
        .map_err(|_| invalid(line_no, format!("bad RA '{}'", ra)))?;
    let dec_degrees: f64 = dec
        .parse()
        .map_err(|_| invalid(line_no, format!("bad Dec '{}'", dec)))?;

    if !(0.0..=360.0).contains(&ra_degrees) || !(-90.0..=90.0).contains(&dec_degrees) {
        return Err(invalid(
            line_no,
            format!("RA/Dec out of range ({}, {})", ra_degrees, dec_degrees),
        ));
    }

    let magnitude = fields[FIELD_VMAG].parse().ok();

    Ok(Some(StarRecord {
        hip: HipId(hip),
        ra_degrees,
        dec_degrees,
        magnitude,
    }))
}

fn invalid(line: usize, reason: String) -> AsterismError {
    AsterismError::InvalidRecord { line, reason }
}
