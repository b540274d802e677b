//! Piecewise-constant setpoint schedules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Target speed (m/s) keyed by the tick at which it takes effect.
///
/// A value persists until the next scheduled change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SetpointSchedule(BTreeMap<usize, f64>);

impl SetpointSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Speed changes used by the interactive dashboard when none are supplied.
    pub fn reference() -> Self {
        [(50, 0.0), (100, 15.0), (150, 20.0), (200, 10.0)].into_iter().collect()
    }

    pub fn insert(&mut self, tick: usize, setpoint: f64) -> Option<f64> {
        self.0.insert(tick, setpoint)
    }

    pub fn with_setpoint(mut self, tick: usize, setpoint: f64) -> Self {
        self.0.insert(tick, setpoint);
        self
    }

    /// The setpoint scheduled exactly at `tick`, if any.
    pub fn change_at(&self, tick: usize) -> Option<f64> {
        self.0.get(&tick).copied()
    }

    /// The setpoint in force at `tick`, falling back to `initial` before the first change.
    pub fn active_at(&self, tick: usize, initial: f64) -> f64 {
        self.0
            .range(..=tick)
            .next_back()
            .map(|(_, &sp)| sp)
            .unwrap_or(initial)
    }

    pub fn breakpoints(&self) -> &BTreeMap<usize, f64> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Walks the schedule tick by tick in increasing order.
    pub fn tracker(&self, initial: f64) -> SetpointTracker<'_> {
        SetpointTracker {
            schedule: self,
            current: initial,
        }
    }
}

impl FromIterator<(usize, f64)> for SetpointSchedule {
    fn from_iter<I: IntoIterator<Item = (usize, f64)>>(iter: I) -> Self {
        SetpointSchedule(iter.into_iter().collect())
    }
}

impl From<BTreeMap<usize, f64>> for SetpointSchedule {
    fn from(map: BTreeMap<usize, f64>) -> Self {
        SetpointSchedule(map)
    }
}

/// Holds the active setpoint while a loop advances through the ticks.
#[derive(Debug, Clone)]
pub struct SetpointTracker<'a> {
    schedule: &'a SetpointSchedule,
    current: f64,
}

impl SetpointTracker<'_> {
    /// Applies any change scheduled at `tick` and returns the active setpoint.
    pub fn advance(&mut self, tick: usize) -> f64 {
        if let Some(sp) = self.schedule.change_at(tick) {
            self.current = sp;
        }
        self.current
    }

    pub fn current(&self) -> f64 {
        self.current
    }
}
