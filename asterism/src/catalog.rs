//! The fixed constellation table.
//!
//! Each supported constellation is represented by a single marker star,
//! identified by its Hipparcos catalog number. Lookups are case-insensitive
//! and ignore surrounding whitespace.

use std::fmt;

/// Message used for names that are not part of the table.
pub const UNKNOWN_CONSTELLATION: &str = "Unknown constellation";

/// A Hipparcos catalog identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HipId(pub u32);

impl HipId {
    /// The raw catalog number.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for HipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HIP {}", self.0)
    }
}

/// A constellation and the star used to locate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constellation {
    /// Canonical (lowercase) constellation key.
    pub name: &'static str,
    /// Hipparcos number of the marker star.
    pub hip: HipId,
    /// Common name of the marker star.
    pub star: &'static str,
}

/// All supported constellations, sorted by name.
pub const CONSTELLATIONS: [Constellation; 15] = [
    entry("aquila", 97649, "Altair"),
    entry("bootes", 69673, "Arcturus"),
    entry("canis_major", 32349, "Sirius"),
    entry("canis_minor", 37279, "Procyon"),
    entry("cassiopeia", 8886, "Segin"),
    entry("cygnus", 102098, "Deneb"),
    entry("gemini", 36850, "Castor"),
    entry("leo", 49669, "Regulus"),
    entry("lyra", 91262, "Vega"),
    entry("orion", 24436, "Rigel"),
    entry("pleiades", 17702, "Alcyone"),
    entry("sagittarius", 90185, "Kaus Australis"),
    entry("scorpius", 85927, "Shaula"),
    entry("taurus", 21421, "Aldebaran"),
    entry("ursa_major", 54061, "Dubhe"),
];

const fn entry(name: &'static str, hip: u32, star: &'static str) -> Constellation {
    Constellation {
        name,
        hip: HipId(hip),
        star,
    }
}

/// Normalize a user-supplied constellation name (trim, lowercase).
pub fn canonicalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Look up a constellation by name.
///
/// The name is canonicalized first, so `" Leo "`, `"LEO"` and `"leo"` all
/// resolve to the same entry.
///
/// # Example
///
/// ```
/// use asterism::catalog::lookup;
///
/// let leo = lookup(" LEO ").unwrap();
/// assert_eq!(leo.hip.get(), 49669);
/// assert!(lookup("draco").is_none());
/// ```
pub fn lookup(name: &str) -> Option<&'static Constellation> {
    let key = canonicalize(name);
    CONSTELLATIONS
        .binary_search_by(|c| c.name.cmp(key.as_str()))
        .ok()
        .map(|idx| &CONSTELLATIONS[idx])
}

/// Hipparcos numbers of every marker star in the table.
pub fn required_stars() -> impl Iterator<Item = HipId> {
    CONSTELLATIONS.iter().map(|c| c.hip)
}
