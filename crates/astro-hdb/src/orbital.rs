//! Orbital-mechanics numerics.
//!
//! Kepler's equation for elliptic orbits, anomaly conversions, Julian-date
//! calendar conversion, and the mean obliquity of the ecliptic. All float
//! math goes through `libm` so the module works without `std`.
//!
//! The obliquity polynomial is cheap but shows up in per-observation loops,
//! so callers hold an explicit [`ObliquityCache`]; there is no hidden global
//! state and the cache is safe to drop at any time.

use libm::{atan2, cos, fabs, floor, sin, sqrt};

use crate::error::{Error, Result};

/// Convergence tolerance for the Kepler solver, in radians.
const KEPLER_TOLERANCE: f64 = 1e-12;
const KEPLER_MAX_NEWTON: usize = 50;
const KEPLER_MAX_BISECT: usize = 200;

/// Solve Kepler's equation `E - e sin E = M` for the eccentric anomaly `E`.
///
/// Valid for elliptic orbits only, `0 <= e < 1`. Newton's method converges
/// in a handful of steps for moderate eccentricity; near-parabolic orbits
/// can cycle, so a bisection fallback guarantees an answer.
pub fn solve_kepler(mean_anomaly: f64, eccentricity: f64) -> Result<f64> {
    if !(0.0..1.0).contains(&eccentricity) {
        return Err(Error::InvalidValue);
    }
    if eccentricity == 0.0 {
        return Ok(mean_anomaly);
    }

    // High-eccentricity orbits need a better start than E0 = M.
    let mut e_anom = if eccentricity > 0.8 {
        core::f64::consts::PI
    } else {
        mean_anomaly
    };

    for _ in 0..KEPLER_MAX_NEWTON {
        let f = e_anom - eccentricity * sin(e_anom) - mean_anomaly;
        if fabs(f) < KEPLER_TOLERANCE {
            return Ok(e_anom);
        }
        let f_prime = 1.0 - eccentricity * cos(e_anom);
        e_anom -= f / f_prime;
    }

    // Newton failed to settle; bisect. f is monotonic in E, and the root
    // lies within eccentricity of M.
    let mut lo = mean_anomaly - eccentricity;
    let mut hi = mean_anomaly + eccentricity;
    for _ in 0..KEPLER_MAX_BISECT {
        let mid = 0.5 * (lo + hi);
        let f = mid - eccentricity * sin(mid) - mean_anomaly;
        if fabs(f) < KEPLER_TOLERANCE {
            return Ok(mid);
        }
        if f < 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    Err(Error::InvalidValue)
}

/// Convert eccentric anomaly to true anomaly.
pub fn eccentric_to_true_anomaly(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    let half = 0.5 * eccentric_anomaly;
    2.0 * atan2(
        sqrt(1.0 + eccentricity) * sin(half),
        sqrt(1.0 - eccentricity) * cos(half),
    )
}

/// Convert true anomaly to eccentric anomaly.
pub fn true_to_eccentric_anomaly(true_anomaly: f64, eccentricity: f64) -> f64 {
    let half = 0.5 * true_anomaly;
    2.0 * atan2(
        sqrt(1.0 - eccentricity) * sin(half),
        sqrt(1.0 + eccentricity) * cos(half),
    )
}

/// Convert mean anomaly directly to true anomaly via the Kepler solver.
pub fn mean_to_true_anomaly(mean_anomaly: f64, eccentricity: f64) -> Result<f64> {
    let e_anom = solve_kepler(mean_anomaly, eccentricity)?;
    Ok(eccentric_to_true_anomaly(e_anom, eccentricity))
}

/// The Julian date of a Gregorian calendar moment. `day` carries the time
/// of day as a fraction, e.g. `4.81` for Oct 4, 19:26 UT.
pub fn julian_date(year: i32, month: u32, day: f64) -> f64 {
    let (y, m) = if month <= 2 {
        (year as f64 - 1.0, month as f64 + 12.0)
    } else {
        (year as f64, month as f64)
    };

    let a = floor(y / 100.0);
    let b = 2.0 - a + floor(a / 4.0);
    floor(365.25 * (y + 4716.0)) + floor(30.6001 * (m + 1.0)) + day + b - 1524.5
}

/// The Gregorian calendar moment of a Julian date, as
/// `(year, month, day_fraction)`.
pub fn calendar_date(jd: f64) -> (i32, u32, f64) {
    let z = floor(jd + 0.5);
    let f = jd + 0.5 - z;

    let a = if z >= 2_299_161.0 {
        let alpha = floor((z - 1_867_216.25) / 36_524.25);
        z + 1.0 + alpha - floor(alpha / 4.0)
    } else {
        z
    };

    let b = a + 1524.0;
    let c = floor((b - 122.1) / 365.25);
    let d = floor(365.25 * c);
    let e = floor((b - d) / 30.6001);

    let day = b - d - floor(30.6001 * e) + f;
    let month = if e < 14.0 { e - 1.0 } else { e - 13.0 };
    let year = if month > 2.0 { c - 4716.0 } else { c - 4715.0 };

    (year as i32, month as u32, day)
}

/// Memo cache for [`mean_obliquity`]. One entry: ephemeris loops evaluate
/// many observations at the same instant before moving on.
#[derive(Debug, Clone, Default)]
pub struct ObliquityCache {
    entry: Option<(f64, f64)>,
    hits: u64,
    misses: u64,
}

impl ObliquityCache {
    pub fn new() -> Self {
        ObliquityCache::default()
    }

    /// Cache lookups answered without recomputing.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Mean obliquity of the ecliptic in degrees at Julian date `jd`,
    /// IAU 1980 polynomial.
    pub fn mean_obliquity(&mut self, jd: f64) -> f64 {
        if let Some((cached_jd, cached_eps)) = self.entry {
            if cached_jd == jd {
                self.hits += 1;
                return cached_eps;
            }
        }

        let t = (jd - 2_451_545.0) / 36_525.0;
        let seconds = 21.448 - t * (46.8150 + t * (0.00059 - t * 0.001813));
        let eps = 23.0 + (26.0 + seconds / 60.0) / 60.0;

        self.misses += 1;
        self.entry = Some((jd, eps));
        eps
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::PI;

    fn kepler_residual(e_anom: f64, ecc: f64, mean: f64) -> f64 {
        fabs(e_anom - ecc * sin(e_anom) - mean)
    }

    #[test]
    fn kepler_circular_orbit() {
        assert_eq!(solve_kepler(1.234, 0.0).unwrap(), 1.234);
    }

    #[test]
    fn kepler_moderate_eccentricity() {
        let e_anom = solve_kepler(0.75, 0.3).unwrap();
        assert!(kepler_residual(e_anom, 0.3, 0.75) < 1e-10);
    }

    #[test]
    fn kepler_high_eccentricity() {
        for &mean in &[0.01, 0.5, 1.0, 2.0, 3.0] {
            let e_anom = solve_kepler(mean, 0.99).unwrap();
            assert!(
                kepler_residual(e_anom, 0.99, mean) < 1e-10,
                "diverged at M = {mean}"
            );
        }
    }

    #[test]
    fn kepler_rejects_hyperbolic() {
        assert!(solve_kepler(1.0, 1.0).is_err());
        assert!(solve_kepler(1.0, 1.5).is_err());
        assert!(solve_kepler(1.0, -0.1).is_err());
    }

    #[test]
    fn anomaly_conversion_roundtrip() {
        let ecc = 0.4;
        for &e_anom in &[0.0, 0.5, 1.5, PI - 0.1] {
            let true_anom = eccentric_to_true_anomaly(e_anom, ecc);
            let back = true_to_eccentric_anomaly(true_anom, ecc);
            assert!(fabs(back - e_anom) < 1e-12);
        }
    }

    #[test]
    fn true_anomaly_leads_eccentric_before_apoapsis() {
        // On the outbound leg the true anomaly runs ahead of the eccentric.
        let true_anom = eccentric_to_true_anomaly(1.0, 0.3);
        assert!(true_anom > 1.0);
    }

    #[test]
    fn mean_to_true_at_periapsis() {
        assert_eq!(mean_to_true_anomaly(0.0, 0.6).unwrap(), 0.0);
    }

    #[test]
    fn julian_date_j2000() {
        assert_eq!(julian_date(2000, 1, 1.5), 2_451_545.0);
    }

    #[test]
    fn julian_date_meeus_examples() {
        assert_eq!(julian_date(1987, 4, 10.0), 2_446_895.5);
        assert_eq!(julian_date(1957, 10, 4.81), 2_436_116.31);
    }

    #[test]
    fn calendar_date_inverse() {
        let (y, m, d) = calendar_date(2_451_545.0);
        assert_eq!((y, m), (2000, 1));
        assert!(fabs(d - 1.5) < 1e-9);

        let (y, m, d) = calendar_date(2_436_116.31);
        assert_eq!((y, m), (1957, 10));
        assert!(fabs(d - 4.81) < 1e-6);
    }

    #[test]
    fn obliquity_at_j2000() {
        let mut cache = ObliquityCache::new();
        let eps = cache.mean_obliquity(2_451_545.0);
        assert!(fabs(eps - 23.439_291) < 1e-5);
    }

    #[test]
    fn obliquity_decreases_over_the_century() {
        let mut cache = ObliquityCache::new();
        let e2000 = cache.mean_obliquity(2_451_545.0);
        let e2100 = cache.mean_obliquity(2_488_070.0);
        assert!(e2100 < e2000);
    }

    #[test]
    fn obliquity_cache_counts_hits() {
        let mut cache = ObliquityCache::new();
        let first = cache.mean_obliquity(2_460_000.5);
        let second = cache.mean_obliquity(2_460_000.5);
        assert_eq!(first, second);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);

        cache.mean_obliquity(2_460_001.5);
        assert_eq!(cache.misses(), 2);

        // Going back to an evicted instant recomputes.
        cache.mean_obliquity(2_460_000.5);
        assert_eq!(cache.misses(), 3);
        assert_eq!(cache.hits(), 1);
    }
}
