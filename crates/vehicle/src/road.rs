//! Road slope disturbance: sparse angle breakpoints and the dense per-tick profile.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use simcore::build_dense_profile;

/// Road angle (degrees) keyed by tick index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlopeSchedule(BTreeMap<usize, f64>);

impl SlopeSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tick: usize, angle_degrees: f64) -> Option<f64> {
        self.0.insert(tick, angle_degrees)
    }

    pub fn with_angle(mut self, tick: usize, angle_degrees: f64) -> Self {
        self.0.insert(tick, angle_degrees);
        self
    }

    pub fn breakpoints(&self) -> &BTreeMap<usize, f64> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Expands the breakpoints into one angle per tick.
    pub fn densify(&self, length: usize) -> SlopeProfile {
        if let Some((&last, _)) = self.0.last_key_value() {
            if last >= length {
                log::debug!("slope breakpoint at tick {last} lies beyond horizon of {length} ticks");
            }
        }
        SlopeProfile(build_dense_profile(&self.0, length))
    }
}

impl FromIterator<(usize, f64)> for SlopeSchedule {
    fn from_iter<I: IntoIterator<Item = (usize, f64)>>(iter: I) -> Self {
        SlopeSchedule(iter.into_iter().collect())
    }
}

impl From<BTreeMap<usize, f64>> for SlopeSchedule {
    fn from(map: BTreeMap<usize, f64>) -> Self {
        SlopeSchedule(map)
    }
}

/// One road angle (degrees) per simulation tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlopeProfile(Vec<f64>);

impl SlopeProfile {
    /// Flat road for the whole horizon.
    pub fn flat(length: usize) -> Self {
        SlopeProfile(vec![0.0; length])
    }

    /// Angle at `tick`, 0 outside the profile.
    pub fn angle_at(&self, tick: usize) -> f64 {
        self.0.get(tick).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }
}
