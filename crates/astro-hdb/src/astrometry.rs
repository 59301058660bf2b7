//! Astrometry reference/target payload for astrometry table HDBs.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// One measured sky position.
#[derive(Debug, Clone, PartialEq)]
pub struct AstrometryObservation {
    pub object: String,
    /// Right ascension in degrees.
    pub ra: f64,
    /// Declination in degrees.
    pub dec: f64,
    /// Coordinate epoch as a Julian year, e.g. 2000.0.
    pub epoch: f64,
}

/// The reference-star and target lists an astrometry HDB layers on top of
/// its binary table. Reference stars anchor the plate solution; targets are
/// the objects being measured against them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AstrometryData {
    references: Vec<AstrometryObservation>,
    targets: Vec<AstrometryObservation>,
}

impl AstrometryData {
    pub fn new() -> Self {
        AstrometryData::default()
    }

    pub fn references(&self) -> &[AstrometryObservation] {
        &self.references
    }

    pub fn targets(&self) -> &[AstrometryObservation] {
        &self.targets
    }

    pub fn push_reference(&mut self, obs: AstrometryObservation) {
        self.references.push(obs);
    }

    pub fn push_target(&mut self, obs: AstrometryObservation) {
        self.targets.push(obs);
    }

    /// Find a reference star by name, case-insensitive.
    pub fn find_reference(&self, object: &str) -> Option<&AstrometryObservation> {
        self.references
            .iter()
            .find(|o| o.object.eq_ignore_ascii_case(object))
    }

    /// Find a target by name, case-insensitive.
    pub fn find_target(&self, object: &str) -> Option<&AstrometryObservation> {
        self.targets
            .iter()
            .find(|o| o.object.eq_ignore_ascii_case(object))
    }
}

impl AstrometryObservation {
    pub fn new(object: &str, ra: f64, dec: f64, epoch: f64) -> Self {
        AstrometryObservation {
            object: object.to_string(),
            ra,
            dec,
            epoch,
        }
    }
}

// ── Tests ──
