//! Photometry observation payload for photometry table HDBs.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::slice;

/// One photometric measurement of an object.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotometryObservation {
    pub object: String,
    /// Time of observation as a Julian date.
    pub julian_date: f64,
    pub magnitude: f64,
    pub magnitude_error: f64,
    /// Filter band designation, e.g. `V` or `R`.
    pub filter: String,
}

/// The observation list a photometry HDB layers on top of its binary table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotometryData {
    observations: Vec<PhotometryObservation>,
}

impl PhotometryData {
    pub fn new() -> Self {
        PhotometryData::default()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Iterate observations in the order they were recorded.
    pub fn iter(&self) -> slice::Iter<'_, PhotometryObservation> {
        self.observations.iter()
    }

    pub fn push(&mut self, obs: PhotometryObservation) {
        self.observations.push(obs);
    }

    /// All observations of one object, case-insensitive, in recording order.
    pub fn for_object(&self, object: &str) -> Vec<&PhotometryObservation> {
        self.observations
            .iter()
            .filter(|o| o.object.eq_ignore_ascii_case(object))
            .collect()
    }

    /// The mean magnitude of one object, or `None` if it was never observed.
    pub fn mean_magnitude(&self, object: &str) -> Option<f64> {
        let obs = self.for_object(object);
        if obs.is_empty() {
            return None;
        }
        let sum: f64 = obs.iter().map(|o| o.magnitude).sum();
        Some(sum / obs.len() as f64)
    }
}

impl PhotometryObservation {
    pub fn new(
        object: &str,
        julian_date: f64,
        magnitude: f64,
        magnitude_error: f64,
        filter: &str,
    ) -> Self {
        PhotometryObservation {
            object: object.to_string(),
            julian_date,
            magnitude,
            magnitude_error,
            filter: filter.to_string(),
        }
    }
}

// ── Tests ──
