//! Apparent horizontal coordinates of stars.
//!
//! [`ApparentSky`] captures the orientation of the Earth at one instant and
//! converts catalog (ICRS) star positions into altitude/azimuth for any
//! observer on the Earth's surface. The reduction chain is:
//!
//! 1. ICRS direction from right ascension / declination
//! 2. Annual aberration from the Earth's orbital velocity
//! 3. Precession (IAU 2006 angles ζA, zA, θA) and nutation (dominant terms)
//! 4. Rotation by Greenwich apparent sidereal time
//! 5. Rotation into the observer's east/north/up frame
//!
//! Time scales come from `hifitime`, which carries the leap second table
//! used for UTC → TT. UT1 is taken equal to UTC. Frame rotations are
//! `nalgebra` [`Rotation3`]s.
//!
//! Refraction, polar motion, diurnal aberration and gravitational light
//! deflection are not applied.

use chrono::{DateTime, Datelike, Timelike, Utc};
use hifitime::Epoch;
use nalgebra::{Rotation3, Unit, Vector3};

use crate::catalog::HipId;
use crate::error::{AsterismError, Result};

/// Julian date of the J2000.0 epoch.
pub const J2000_JD: f64 = 2_451_545.0;

const SECONDS_PER_DAY: f64 = 86_400.0;
const DAYS_PER_CENTURY: f64 = 36_525.0;
const ARCSEC_TO_RAD: f64 = std::f64::consts::PI / (180.0 * 3600.0);
const TWO_PI: f64 = std::f64::consts::TAU;

/// Constant of aberration (Earth's mean orbital speed over c), radians.
const ABERRATION_CONSTANT: f64 = 20.495_52 * ARCSEC_TO_RAD;

/// A position on the Earth's surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    latitude_deg: f64,
    longitude_deg: f64,
    /// Earth-fixed → east/north/up.
    horizon: Rotation3<f64>,
}

impl Observer {
    /// Create an observer at the given geodetic coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`AsterismError::OutOfBounds`] if either coordinate is not
    /// finite or the latitude is outside ±90°. Longitude is not range
    /// checked; any finite value wraps around the globe.
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Result<Self> {
        if !latitude_deg.is_finite()
            || !longitude_deg.is_finite()
            || !(-90.0..=90.0).contains(&latitude_deg)
        {
            return Err(AsterismError::OutOfBounds {
                lat: latitude_deg,
                lon: longitude_deg,
            });
        }

        let horizon = frame_rotation(Vector3::x_axis(), (90.0 - latitude_deg).to_radians())
            * frame_rotation(Vector3::z_axis(), (90.0 + longitude_deg).to_radians());

        Ok(Self {
            latitude_deg,
            longitude_deg,
            horizon,
        })
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude_deg
    }

    /// Longitude in degrees, east positive.
    pub fn longitude(&self) -> f64 {
        self.longitude_deg
    }
}

/// A star position on the celestial sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CelestialPosition {
    /// Right ascension in hours.
    pub ra_hours: f64,
    /// Declination in degrees.
    pub dec_degrees: f64,
}

impl CelestialPosition {
    /// Create a position from right ascension in hours and declination in degrees.
    pub fn new(ra_hours: f64, dec_degrees: f64) -> Self {
        Self {
            ra_hours,
            dec_degrees,
        }
    }

    fn unit_vector(&self) -> Vector3<f64> {
        let ra = (self.ra_hours * 15.0).to_radians();
        let dec = self.dec_degrees.to_radians();
        let (sin_ra, cos_ra) = ra.sin_cos();
        let (sin_dec, cos_dec) = dec.sin_cos();
        Vector3::new(cos_dec * cos_ra, cos_dec * sin_ra, sin_dec)
    }

    fn from_vector(v: &Vector3<f64>) -> Self {
        let ra_deg = v.y.atan2(v.x).to_degrees().rem_euclid(360.0);
        let dec_deg = v.z.atan2(v.x.hypot(v.y)).to_degrees();
        Self::new(ra_deg / 15.0, dec_deg)
    }
}

/// Local horizon coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalPosition {
    /// Angle above the horizon, degrees in [-90, 90].
    pub altitude_deg: f64,
    /// Bearing from north through east, degrees in [0, 360).
    pub azimuth_deg: f64,
}

/// Earth orientation and velocity at a single instant.
///
/// Build one per request so every star in a response shares the same time.
#[derive(Debug, Clone)]
pub struct ApparentSky {
    instant: DateTime<Utc>,
    epoch: Epoch,
    /// Nutation × precession: GCRS → true equator and equinox of date.
    npb: Rotation3<f64>,
    /// Rotation by Greenwich apparent sidereal time.
    earth_rotation: Rotation3<f64>,
    /// Greenwich apparent sidereal time, radians.
    gast: f64,
    /// Earth velocity over c, GCRS axes.
    beta: Vector3<f64>,
}

impl ApparentSky {
    /// Compute the Earth orientation for the given instant.
    ///
    /// # Errors
    ///
    /// Returns [`AsterismError::InvalidInstant`] if the instant is outside
    /// the range of the time scale library.
    pub fn at(instant: DateTime<Utc>) -> Result<Self> {
        let epoch = utc_epoch(&instant)?;
        let jd_utc = epoch.to_jde_utc_days();
        let d_ut1 = jd_utc - J2000_JD;
        let t = (epoch.to_jde_tt_days() - J2000_JD) / DAYS_PER_CENTURY;

        let eps_a = mean_obliquity(t);
        let (dpsi, deps) = nutation(t);

        let npb = nutation_matrix(eps_a, dpsi, deps) * precession_matrix(t);
        let gast = wrap_two_pi(gmst(d_ut1, t) + dpsi * eps_a.cos());
        let earth_rotation = frame_rotation(Vector3::z_axis(), gast);
        let beta = earth_velocity(t, eps_a);

        Ok(Self {
            instant,
            epoch,
            npb,
            earth_rotation,
            gast,
            beta,
        })
    }

    /// Compute the Earth orientation for the current instant.
    pub fn now() -> Result<Self> {
        Self::at(Utc::now())
    }

    /// The instant this sky was computed for.
    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    /// Julian date of the instant in the UTC scale.
    pub fn julian_date_utc(&self) -> f64 {
        self.epoch.to_jde_utc_days()
    }

    /// TT − UTC at the instant, in seconds (leap seconds + 32.184 s).
    pub fn tt_minus_utc_seconds(&self) -> f64 {
        (self.epoch.to_jde_tt_days() - self.epoch.to_jde_utc_days()) * SECONDS_PER_DAY
    }

    /// Greenwich apparent sidereal time in degrees [0, 360).
    pub fn sidereal_time_deg(&self) -> f64 {
        self.gast.to_degrees()
    }

    /// Apparent place: right ascension and declination referred to the true
    /// equator and equinox of date, including annual aberration.
    pub fn apparent_equatorial(&self, star: &CelestialPosition) -> CelestialPosition {
        CelestialPosition::from_vector(&self.apparent_vector(star))
    }

    /// Altitude and azimuth of an apparent place (true equator of date).
    pub fn horizontal(
        &self,
        observer: &Observer,
        apparent: &CelestialPosition,
    ) -> HorizontalPosition {
        self.to_horizontal(observer, &apparent.unit_vector())
    }

    /// Apparent altitude and azimuth of a catalog star for an observer.
    ///
    /// # Errors
    ///
    /// Returns [`AsterismError::Computation`] if the position is not finite.
    pub fn observe(
        &self,
        observer: &Observer,
        hip: HipId,
        star: &CelestialPosition,
    ) -> Result<HorizontalPosition> {
        let position = self.to_horizontal(observer, &self.apparent_vector(star));

        if !position.altitude_deg.is_finite() || !position.azimuth_deg.is_finite() {
            return Err(AsterismError::Computation { hip: hip.get() });
        }

        Ok(position)
    }

    fn apparent_vector(&self, star: &CelestialPosition) -> Vector3<f64> {
        // Annual aberration (first order, renormalized)
        let aberrated = (star.unit_vector() + self.beta).normalize();
        self.npb * aberrated
    }

    fn to_horizontal(&self, observer: &Observer, apparent: &Vector3<f64>) -> HorizontalPosition {
        let enu = observer.horizon * (self.earth_rotation * apparent);
        let (east, north, up) = (enu.x, enu.y, enu.z);

        let altitude_deg = up.atan2(east.hypot(north)).to_degrees();
        let mut azimuth_deg = east.atan2(north).to_degrees().rem_euclid(360.0);
        if azimuth_deg >= 360.0 {
            azimuth_deg = 0.0;
        }

        HorizontalPosition {
            altitude_deg,
            azimuth_deg,
        }
    }
}

/// The instant as a `hifitime` epoch in the UTC scale.
fn utc_epoch(instant: &DateTime<Utc>) -> Result<Epoch> {
    // chrono encodes a leap second as nanos >= 1e9
    let nanos = instant.nanosecond().min(999_999_999);

    Epoch::maybe_from_gregorian_utc(
        instant.year(),
        instant.month() as u8,
        instant.day() as u8,
        instant.hour() as u8,
        instant.minute() as u8,
        instant.second() as u8,
        nanos,
    )
    .map_err(|e| AsterismError::InvalidInstant {
        instant: instant.to_rfc3339(),
        reason: e.to_string(),
    })
}

/// Rotation of the reference frame by `angle` about `axis`.
///
/// This is the R1/R2/R3 convention of the IAU matrices, i.e. the inverse of
/// nalgebra's active rotation.
fn frame_rotation(axis: Unit<Vector3<f64>>, angle: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&axis, -angle)
}

/// Greenwich mean sidereal time (IAU 2006), radians.
///
/// `d_ut1` is days of UT1 since J2000.0, `t` Julian centuries of TT.
fn gmst(d_ut1: f64, t: f64) -> f64 {
    let era = TWO_PI * (0.779_057_273_264 + 1.002_737_811_911_354_5 * d_ut1);
    let poly = 0.014_506
        + t * (4_612.156_534
            + t * (1.391_581_7 + t * (-0.000_000_44 + t * (-0.000_029_956 + t * -0.000_000_036_8))));
    wrap_two_pi(era + poly * ARCSEC_TO_RAD)
}

/// Mean obliquity of the ecliptic (IAU 2006), radians.
fn mean_obliquity(t: f64) -> f64 {
    let arcsec = 84_381.406
        + t * (-46.836_769
            + t * (-0.000_183_1 + t * (0.002_003_40 + t * (-0.000_000_576 + t * -0.000_000_043_4))));
    arcsec * ARCSEC_TO_RAD
}

/// Nutation in longitude and obliquity (dominant terms), radians.
fn nutation(t: f64) -> (f64, f64) {
    let omega = (125.044_52 - 1_934.136_261 * t + 0.002_070_8 * t * t).to_radians();
    let sun = (280.466_5 + 36_000.769_8 * t).to_radians();
    let moon = (218.316_5 + 481_267.881_3 * t).to_radians();

    let dpsi = -17.20 * omega.sin() - 1.32 * (2.0 * sun).sin() - 0.23 * (2.0 * moon).sin()
        + 0.21 * (2.0 * omega).sin();
    let deps = 9.20 * omega.cos() + 0.57 * (2.0 * sun).cos() + 0.10 * (2.0 * moon).cos()
        - 0.09 * (2.0 * omega).cos();

    (dpsi * ARCSEC_TO_RAD, deps * ARCSEC_TO_RAD)
}

/// Precession matrix from J2000.0 to date (IAU 2006 equatorial angles).
fn precession_matrix(t: f64) -> Rotation3<f64> {
    let zeta = 2.650_545
        + t * (2_306.083_227
            + t * (0.298_849_9 + t * (0.018_018_28 + t * (-0.000_005_971 + t * -0.000_000_317_3))));
    let z = -2.650_545
        + t * (2_306.077_181
            + t * (1.092_734_8 + t * (0.018_268_37 + t * (-0.000_028_596 + t * -0.000_000_290_4))));
    let theta = t
        * (2_004.191_903
            + t * (-0.429_493_4 + t * (-0.041_822_64 + t * (-0.000_007_089 + t * -0.000_000_127_4))));

    frame_rotation(Vector3::z_axis(), -z * ARCSEC_TO_RAD)
        * frame_rotation(Vector3::y_axis(), theta * ARCSEC_TO_RAD)
        * frame_rotation(Vector3::z_axis(), -zeta * ARCSEC_TO_RAD)
}

/// Nutation matrix: mean equator of date → true equator of date.
fn nutation_matrix(eps_a: f64, dpsi: f64, deps: f64) -> Rotation3<f64> {
    frame_rotation(Vector3::x_axis(), -(eps_a + deps))
        * frame_rotation(Vector3::z_axis(), -dpsi)
        * frame_rotation(Vector3::x_axis(), eps_a)
}

/// Earth's orbital velocity over c in equatorial axes.
fn earth_velocity(t: f64, eps: f64) -> Vector3<f64> {
    let mean_anomaly = (357.529_11 + 35_999.050_29 * t).to_radians();
    let center = (1.914_602 - 0.004_817 * t) * mean_anomaly.sin()
        + (0.019_993 - 0.000_101 * t) * (2.0 * mean_anomaly).sin()
        + 0.000_289 * (3.0 * mean_anomaly).sin();
    let sun_longitude = (280.466_46 + 36_000.769_83 * t + center).to_radians();

    let e = 0.016_708_634 - 0.000_042_037 * t;
    let perihelion = (102.937_35 + 1.719_46 * t).to_radians();

    let vx = sun_longitude.sin() - e * perihelion.sin();
    let vy = -(sun_longitude.cos() - e * perihelion.cos());

    ABERRATION_CONSTANT * Vector3::new(vx, vy * eps.cos(), vy * eps.sin())
}

fn wrap_two_pi(angle: f64) -> f64 {
    angle.rem_euclid(TWO_PI)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use nalgebra::Matrix3;

    fn j2000() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap()
    }

    fn hip() -> HipId {
        HipId(0)
    }

    fn hms(h: f64, m: f64, s: f64) -> f64 {
        h + m / 60.0 + s / 3600.0
    }

    fn arcsec(deg: f64) -> f64 {
        deg * 3600.0
    }

    #[test]
    fn test_julian_date() {
        let sky = ApparentSky::at(j2000()).unwrap();
        assert!((sky.julian_date_utc() - J2000_JD).abs() < 1e-8);
    }

    #[test]
    fn test_tt_minus_utc_follows_leap_seconds() {
        let at = |y, m, d| ApparentSky::at(Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()).unwrap();

        assert!((at(1987, 4, 10).tt_minus_utc_seconds() - 55.184).abs() < 1e-3);
        assert!((at(2000, 1, 1).tt_minus_utc_seconds() - 64.184).abs() < 1e-3);
        assert!((at(2026, 10, 15).tt_minus_utc_seconds() - 69.184).abs() < 1e-3);
    }

    #[test]
    fn test_sidereal_time_at_j2000() {
        // GMST at J2000.0 is 18h 41m 50.5s = 280.4606°
        let sky = ApparentSky::at(j2000()).unwrap();
        assert!((sky.sidereal_time_deg() - 280.4606).abs() < 0.01);
    }

    #[test]
    fn test_apparent_sidereal_time_reference() {
        // Meeus, Astronomical Algorithms, example 12.a:
        // 1987 April 10, 0h UT, apparent sidereal time 13h 10m 46.1351s
        let sky = ApparentSky::at(Utc.with_ymd_and_hms(1987, 4, 10, 0, 0, 0).unwrap()).unwrap();
        let expected = hms(13.0, 10.0, 46.1351) * 15.0;
        let diff = arcsec(sky.sidereal_time_deg() - expected);
        assert!(diff.abs() < 0.1, "GAST off by {}\"", diff);
    }

    #[test]
    fn test_apparent_place_reference() {
        // Meeus example 23.a: θ Persei on 2028 November 13.19 TD.
        // Catalog place propagated with the star's proper motion to the date.
        let instant = Utc.with_ymd_and_hms(2028, 11, 13, 4, 32, 26).unwrap()
            + chrono::Duration::milliseconds(816);
        let sky = ApparentSky::at(instant).unwrap();
        let years = 28.867_05;
        let star = CelestialPosition::new(
            hms(2.0, 44.0, 11.986 + 0.034_06 * years),
            hms(49.0, 13.0, 42.48 - 0.0895 * years),
        );

        let apparent = sky.apparent_equatorial(&star);

        // Apparent: 2h 46m 14.390s, +49° 21' 07.45"
        let dec = apparent.dec_degrees;
        let d_ra = arcsec((apparent.ra_hours - hms(2.0, 46.0, 14.390)) * 15.0) * dec.to_radians().cos();
        let d_dec = arcsec(dec - hms(49.0, 21.0, 7.45));
        assert!(d_ra.abs() < 0.5, "RA off by {}\"", d_ra);
        assert!(d_dec.abs() < 0.5, "Dec off by {}\"", d_dec);
    }

    #[test]
    fn test_horizontal_reference() {
        // Meeus example 13.b: Venus from the U.S. Naval Observatory,
        // 1987 April 10 19h 21m UT. Meeus measures azimuth from the south.
        let sky = ApparentSky::at(Utc.with_ymd_and_hms(1987, 4, 10, 19, 21, 0).unwrap()).unwrap();
        let observer = Observer::new(hms(38.0, 55.0, 17.0), -hms(77.0, 3.0, 56.0)).unwrap();
        let venus = CelestialPosition::new(hms(23.0, 9.0, 16.641), -hms(6.0, 43.0, 11.61));

        let pos = sky.horizontal(&observer, &venus);
        assert!((pos.altitude_deg - 15.1249).abs() < 5e-4, "altitude = {}", pos.altitude_deg);
        assert!((pos.azimuth_deg - 248.0337).abs() < 5e-4, "azimuth = {}", pos.azimuth_deg);
    }

    #[test]
    fn test_sidereal_day() {
        // One sidereal day later GAST returns to (almost) the same value
        let start = j2000();
        let later = start + chrono::Duration::milliseconds(86_164_091);
        let a = ApparentSky::at(start).unwrap().sidereal_time_deg();
        let b = ApparentSky::at(later).unwrap().sidereal_time_deg();
        let diff = (a - b).abs();
        assert!(diff < 0.001 || (360.0 - diff) < 0.001, "diff = {}", diff);
    }

    #[test]
    fn test_star_at_zenith() {
        let sky = ApparentSky::at(j2000()).unwrap();
        let observer = Observer::new(0.0, 0.0).unwrap();
        let star = CelestialPosition::new(sky.sidereal_time_deg() / 15.0, 0.0);

        let pos = sky.observe(&observer, hip(), &star).unwrap();
        assert!(pos.altitude_deg > 89.9, "altitude = {}", pos.altitude_deg);
    }

    #[test]
    fn test_star_on_meridian() {
        // Equatorial star crossing the meridian culminates due south at 90° - lat
        let sky = ApparentSky::at(j2000()).unwrap();
        let observer = Observer::new(45.0, 0.0).unwrap();
        let star = CelestialPosition::new(sky.sidereal_time_deg() / 15.0, 0.0);

        let pos = sky.observe(&observer, hip(), &star).unwrap();
        assert!((pos.altitude_deg - 45.0).abs() < 0.05, "altitude = {}", pos.altitude_deg);
        assert!((pos.azimuth_deg - 180.0).abs() < 0.05, "azimuth = {}", pos.azimuth_deg);
    }

    #[test]
    fn test_longitude_shifts_meridian() {
        // Star on the local meridian of an observer at 90°E
        let sky = ApparentSky::at(j2000()).unwrap();
        let observer = Observer::new(30.0, 90.0).unwrap();
        let star = CelestialPosition::new((sky.sidereal_time_deg() + 90.0) / 15.0, 0.0);

        let pos = sky.observe(&observer, hip(), &star).unwrap();
        assert!((pos.altitude_deg - 60.0).abs() < 0.05, "altitude = {}", pos.altitude_deg);
        assert!((pos.azimuth_deg - 180.0).abs() < 0.05, "azimuth = {}", pos.azimuth_deg);
    }

    #[test]
    fn test_celestial_pole_altitude_matches_latitude() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 1, 3, 0, 0).unwrap();
        let sky = ApparentSky::at(instant).unwrap();
        let pole = CelestialPosition::new(0.0, 90.0);

        for lat in [-60.0, -10.0, 0.0, 25.0, 49.8876, 80.0] {
            let observer = Observer::new(lat, -119.4932).unwrap();
            let pos = sky.observe(&observer, hip(), &pole).unwrap();
            // ICRS pole drifts ~0.15° from the true pole by 2024
            assert!((pos.altitude_deg - lat).abs() < 0.3, "lat {} -> {}", lat, pos.altitude_deg);
        }
    }

    #[test]
    fn test_output_ranges() {
        let sky = ApparentSky::at(Utc.with_ymd_and_hms(2026, 10, 15, 22, 30, 0).unwrap()).unwrap();
        for lat in [-90.0, -45.0, 0.0, 45.0, 90.0] {
            for lon in [-180.0, -90.0, 0.0, 90.0, 179.9, 540.0] {
                let observer = Observer::new(lat, lon).unwrap();
                for ra in [0.0, 3.5, 12.0, 23.99] {
                    for dec in [-89.0, -30.0, 0.0, 30.0, 89.0] {
                        let star = CelestialPosition::new(ra, dec);
                        let pos = sky.observe(&observer, hip(), &star).unwrap();
                        assert!((-90.0..=90.0).contains(&pos.altitude_deg));
                        assert!((0.0..360.0).contains(&pos.azimuth_deg));
                    }
                }
            }
        }
    }

    #[test]
    fn test_aberration_magnitude() {
        let sky = ApparentSky::at(j2000()).unwrap();
        // 20.5" ± eccentricity
        assert!((sky.beta.norm() / ARCSEC_TO_RAD - 20.5).abs() < 0.5);
    }

    #[test]
    fn test_observer_validation() {
        assert!(Observer::new(91.0, 0.0).is_err());
        assert!(Observer::new(-90.5, 0.0).is_err());
        assert!(Observer::new(f64::NAN, 0.0).is_err());
        assert!(Observer::new(0.0, f64::INFINITY).is_err());
        assert!(Observer::new(90.0, 720.0).is_ok());

        let observer = Observer::new(49.8876, -119.4932).unwrap();
        assert_eq!(observer.latitude(), 49.8876);
        assert_eq!(observer.longitude(), -119.4932);
    }

    #[test]
    fn test_bias_precession_nutation_is_orthonormal() {
        let sky = ApparentSky::at(Utc.with_ymd_and_hms(2030, 3, 20, 0, 0, 0).unwrap()).unwrap();
        let m = sky.npb.matrix();
        assert!((m * m.transpose() - Matrix3::identity()).norm() < 1e-12);
    }
}
