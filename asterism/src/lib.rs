//! # Asterism - Constellation Position Library
//!
//! Apparent altitude and azimuth of well-known constellations, as seen by an
//! observer anywhere on Earth.
//!
//! Each constellation is located through one marker star from the Hipparcos
//! catalog. Star positions come either from a compiled-in table or from the
//! Hipparcos main catalog file, and are reduced to horizon coordinates for a
//! given instant.
//!
//! ## Quick Start
//!
//! ```ignore
//! use asterism::SkyService;
//!
//! let service = SkyService::builtin();
//! let results = service.resolve_now(49.8876, -119.4932, &["leo", "lyra", "orion"])?;
//!
//! for result in &results {
//!     match result.position() {
//!         Some(pos) => println!("{}: alt {:.2}° az {:.2}°", result.constellation(),
//!                               pos.altitude_deg, pos.azimuth_deg),
//!         None => println!("{}: unknown", result.constellation()),
//!     }
//! }
//! ```
//!
//! ## Supported Constellations
//!
//! aquila, bootes, canis_major, canis_minor, cassiopeia, cygnus, gemini, leo,
//! lyra, orion, pleiades, sagittarius, scorpius, taurus, ursa_major.
//!
//! ## Data Sources
//!
//! The Hipparcos main catalog is available from CDS:
//! - <https://cdsarc.cds.unistra.fr/ftp/cats/I/239/>

pub mod catalog;
pub mod dataset;
#[cfg(feature = "download")]
pub mod download;
pub mod ephemeris;
pub mod error;
pub mod service;
pub mod star;

// Re-export main types at crate root for convenience
pub use catalog::{Constellation, HipId, CONSTELLATIONS, UNKNOWN_CONSTELLATION};
pub use ephemeris::{ApparentSky, CelestialPosition, HorizontalPosition, Observer};
pub use error::{AsterismError, Result};
pub use service::{DatasetSource, Resolution, SkyService, SkyServiceBuilder};
pub use star::{StarCatalog, StarRecord};
