//! Before/after comparison of consecutive runs.
//!
//! The history is owned by the caller (a dashboard, the CLI); [`simulate`]
//! never reads or writes it.
//!
//! [`simulate`]: crate::simulate

use serde::Serialize;

use crate::trace::SimulationTrace;

/// Difference of one series between the current and previous run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesDelta {
    /// current[last] - previous[last]
    pub final_delta: f64,
    /// max |current[i] - previous[i]|
    pub max_abs_delta: f64,
}

impl SeriesDelta {
    fn between(current: &[f64], previous: &[f64]) -> Option<Self> {
        if current.len() != previous.len() || current.is_empty() {
            return None;
        }
        let final_delta = current[current.len() - 1] - previous[previous.len() - 1];
        let max_abs_delta = current
            .iter()
            .zip(previous)
            .fold(0.0, |acc: f64, (c, p)| acc.max((c - p).abs()));
        Some(SeriesDelta {
            final_delta,
            max_abs_delta,
        })
    }
}

/// Deltas for the series a dashboard overlays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlayDeltas {
    pub v: SeriesDelta,
    pub step: SeriesDelta,
    pub error: SeriesDelta,
    pub slope: SeriesDelta,
}

/// A fresh trace together with the one it replaces.
#[derive(Debug, Clone, PartialEq)]
pub struct RunComparison {
    pub current: SimulationTrace,
    pub previous: Option<SimulationTrace>,
}

impl RunComparison {
    pub fn new(current: SimulationTrace, previous: Option<SimulationTrace>) -> Self {
        RunComparison { current, previous }
    }

    /// Deltas against the previous run, when there is one of the same length.
    pub fn deltas(&self) -> Option<OverlayDeltas> {
        let prev = self.previous.as_ref()?;
        let cur = &self.current;
        Some(OverlayDeltas {
            v: SeriesDelta::between(&cur.v, &prev.v)?,
            step: SeriesDelta::between(&cur.step, &prev.step)?,
            error: SeriesDelta::between(&cur.error, &prev.error)?,
            slope: SeriesDelta::between(&cur.slope, &prev.slope)?,
        })
    }
}

/// Remembers the most recent trace so the next one can be compared against it.
#[derive(Debug, Clone, Default)]
pub struct RunHistory {
    last: Option<SimulationTrace>,
}

impl RunHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `trace` as the latest run and pairs it with the run it replaces.
    pub fn record(&mut self, trace: SimulationTrace) -> RunComparison {
        let previous = self.last.replace(trace.clone());
        RunComparison::new(trace, previous)
    }

    pub fn last(&self) -> Option<&SimulationTrace> {
        self.last.as_ref()
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}
