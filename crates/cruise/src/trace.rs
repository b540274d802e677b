//! Time-series output of a run.

use control::is_saturated;
use serde::{Deserialize, Serialize};
use simcore::SimResult;

/// Seven index-aligned series, one sample per tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationTrace {
    /// Time (s)
    pub ts: Vec<f64>,
    /// Actuator command (%)
    pub step: Vec<f64>,
    /// Vehicle speed (m/s)
    pub v: Vec<f64>,
    /// Setpoint minus speed (m/s)
    pub error: Vec<f64>,
    /// Running integral of the error (m)
    pub integral: Vec<f64>,
    /// Active setpoint (m/s)
    pub setpoint: Vec<f64>,
    /// Road angle (degrees)
    pub slope: Vec<f64>,
}

/// One tick of a trace, for row-oriented export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TraceRow {
    pub t: f64,
    pub step: f64,
    pub v: f64,
    pub error: f64,
    pub integral: f64,
    pub setpoint: f64,
    pub slope: f64,
}

/// Headline numbers of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TraceSummary {
    pub final_speed: f64,
    pub peak_speed: f64,
    pub final_integral: f64,
    pub max_abs_error: f64,
    /// Ticks whose command sits on an actuator bound
    pub saturated_ticks: usize,
}

impl SimulationTrace {
    /// All series zero-filled to `nsteps` samples.
    pub fn zeroed(nsteps: usize) -> Self {
        SimulationTrace {
            ts: vec![0.0; nsteps],
            step: vec![0.0; nsteps],
            v: vec![0.0; nsteps],
            error: vec![0.0; nsteps],
            integral: vec![0.0; nsteps],
            setpoint: vec![0.0; nsteps],
            slope: vec![0.0; nsteps],
        }
    }

    pub fn len(&self) -> usize {
        self.ts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ts.is_empty()
    }

    /// True when every series has the same length.
    pub fn is_aligned(&self) -> bool {
        let n = self.ts.len();
        [&self.step, &self.v, &self.error, &self.integral, &self.setpoint, &self.slope]
            .iter()
            .all(|series| series.len() == n)
    }

    pub fn row(&self, i: usize) -> Option<TraceRow> {
        Some(TraceRow {
            t: *self.ts.get(i)?,
            step: *self.step.get(i)?,
            v: *self.v.get(i)?,
            error: *self.error.get(i)?,
            integral: *self.integral.get(i)?,
            setpoint: *self.setpoint.get(i)?,
            slope: *self.slope.get(i)?,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = TraceRow> + '_ {
        (0..self.len()).filter_map(move |i| self.row(i))
    }

    pub fn summary(&self) -> TraceSummary {
        TraceSummary {
            final_speed: self.v.last().copied().unwrap_or(0.0),
            peak_speed: self.v.iter().copied().fold(0.0, f64::max),
            final_integral: self.integral.last().copied().unwrap_or(0.0),
            max_abs_error: self.error.iter().fold(0.0, |acc: f64, e| acc.max(e.abs())),
            // index 0 holds the initial condition, not a command
            saturated_ticks: self.step.iter().skip(1).filter(|&&u| is_saturated(u)).count(),
        }
    }

    pub fn from_json_str(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SimulationTrace {
        SimulationTrace {
            ts: vec![0.0, 1.0, 2.0],
            step: vec![0.0, 100.0, 40.0],
            v: vec![0.0, 3.0, 2.5],
            error: vec![0.0, 5.0, -0.5],
            integral: vec![0.0, 5.0, 4.5],
            setpoint: vec![5.0, 5.0, 2.0],
            slope: vec![0.0, 1.0, 2.0],
        }
    }

    #[test]
    fn test_zeroed_is_aligned() {
        let trace = SimulationTrace::zeroed(7);
        assert_eq!(trace.len(), 7);
        assert!(trace.is_aligned());
        assert!(!trace.is_empty());
    }

    #[test]
    fn test_misaligned_trace_detected() {
        let mut trace = sample();
        trace.slope.pop();
        assert!(!trace.is_aligned());
        assert_eq!(trace.rows().count(), 2);
    }

    #[test]
    fn test_rows_follow_series() {
        let trace = sample();
        let rows: Vec<TraceRow> = trace.rows().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].step, 100.0);
        assert_eq!(rows[2].setpoint, 2.0);
        assert!(trace.row(3).is_none());
    }

    #[test]
    fn test_summary() {
        let summary = sample().summary();
        assert_eq!(summary.final_speed, 2.5);
        assert_eq!(summary.peak_speed, 3.0);
        assert_eq!(summary.final_integral, 4.5);
        assert_eq!(summary.max_abs_error, 5.0);
        assert_eq!(summary.saturated_ticks, 1);
    }

    #[test]
    fn test_trace_json_field_names() {
        let json = sample().to_json_string().unwrap();
        for key in ["\"ts\"", "\"step\"", "\"v\"", "\"error\"", "\"integral\"", "\"setpoint\"", "\"slope\""] {
            assert!(json.contains(key), "missing {key} in {json}");
        }
    }
}
