//! Cruise-control simulation Python bindings
//!
//! A whole run happens in one call and comes back as numpy arrays, so the
//! dashboard crosses the Python/Rust boundary once per simulation.

use std::collections::BTreeMap;

use numpy::ToPyArray;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use cruise::{OverlayDeltas, RunHistory, SeriesDelta, SetpointSchedule, SimError, SimulationTrace};

fn to_py_err(err: SimError) -> PyErr {
    match err {
        SimError::InvalidParameter { .. } => PyValueError::new_err(err.to_string()),
        other => PyRuntimeError::new_err(other.to_string()),
    }
}

/// Result of one run: seven aligned series
#[pyclass]
#[derive(Clone)]
pub struct CruiseResult {
    trace: SimulationTrace,
}

#[pymethods]
impl CruiseResult {
    /// Convert to dictionary of numpy arrays
    fn to_dict<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new_bound(py);
        dict.set_item("ts", self.trace.ts.to_pyarray_bound(py))?;
        dict.set_item("step", self.trace.step.to_pyarray_bound(py))?;
        dict.set_item("v", self.trace.v.to_pyarray_bound(py))?;
        dict.set_item("error", self.trace.error.to_pyarray_bound(py))?;
        dict.set_item("integral", self.trace.integral.to_pyarray_bound(py))?;
        dict.set_item("setpoint", self.trace.setpoint.to_pyarray_bound(py))?;
        dict.set_item("slope", self.trace.slope.to_pyarray_bound(py))?;
        Ok(dict)
    }

    /// The seven series in return order: ts, step, v, error, integral, setpoint, slope
    fn as_tuple(&self) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
        let t = self.trace.clone();
        (t.ts, t.step, t.v, t.error, t.integral, t.setpoint, t.slope)
    }

    /// Get final (speed, command, integral)
    fn final_state(&self) -> (f64, f64, f64) {
        (
            *self.trace.v.last().unwrap_or(&0.0),
            *self.trace.step.last().unwrap_or(&0.0),
            *self.trace.integral.last().unwrap_or(&0.0),
        )
    }

    fn summary<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let s = self.trace.summary();
        let dict = PyDict::new_bound(py);
        dict.set_item("final_speed", s.final_speed)?;
        dict.set_item("peak_speed", s.peak_speed)?;
        dict.set_item("final_integral", s.final_integral)?;
        dict.set_item("max_abs_error", s.max_abs_error)?;
        dict.set_item("saturated_ticks", s.saturated_ticks)?;
        Ok(dict)
    }

    fn to_json(&self) -> PyResult<String> {
        self.trace.to_json_string().map_err(to_py_err)
    }

    fn __len__(&self) -> usize {
        self.trace.len()
    }
}

#[allow(clippy::too_many_arguments)]
fn run_raw(
    tf: Option<f64>,
    load: Option<f64>,
    v0: Option<f64>,
    ubias: Option<f64>,
    set_points: Option<BTreeMap<usize, f64>>,
    slopes: Option<BTreeMap<usize, f64>>,
    kc: f64,
    tau_i: f64,
) -> PyResult<SimulationTrace> {
    cruise::simulate_raw(tf, load, v0, ubias, set_points.as_ref(), slopes.as_ref(), kc, tau_i)
        .map_err(to_py_err)
}

/// Run the cruise-control loop.
///
/// Args:
///     tf: Horizon in seconds, one tick per whole second (None or < 1 -> 1)
///     load: Carried load in kg (None or negative -> 0)
///     v0: Initial speed in m/s (None or negative -> 0)
///     ubias: Actuator bias in % (None -> 0, saturated to [-50, 100])
///     set_points: {tick: speed} setpoint changes
///     slopes: {tick: degrees} road angle breakpoints, interpolated between
///     kc: Proportional gain
///     tau_i: Integral time constant in seconds
#[pyfunction]
#[pyo3(signature = (
    tf=Some(300.0),
    load=Some(200.0),
    v0=Some(0.0),
    ubias=Some(0.0),
    set_points=None,
    slopes=None,
    kc=1.0 / 1.2,
    tau_i=20.0
))]
#[allow(clippy::too_many_arguments)]
fn simulate(
    tf: Option<f64>,
    load: Option<f64>,
    v0: Option<f64>,
    ubias: Option<f64>,
    set_points: Option<BTreeMap<usize, f64>>,
    slopes: Option<BTreeMap<usize, f64>>,
    kc: f64,
    tau_i: f64,
) -> PyResult<CruiseResult> {
    let trace = run_raw(tf, load, v0, ubias, set_points, slopes, kc, tau_i)?;
    Ok(CruiseResult { trace })
}

/// The dashboard's default setpoint schedule
#[pyfunction]
fn reference_set_points() -> BTreeMap<usize, f64> {
    SetpointSchedule::reference().breakpoints().clone()
}

fn delta_dict<'py>(py: Python<'py>, delta: &SeriesDelta) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("final", delta.final_delta)?;
    dict.set_item("max_abs", delta.max_abs_delta)?;
    Ok(dict)
}

fn deltas_dict<'py>(py: Python<'py>, deltas: &OverlayDeltas) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("v", delta_dict(py, &deltas.v)?)?;
    dict.set_item("step", delta_dict(py, &deltas.step)?)?;
    dict.set_item("error", delta_dict(py, &deltas.error)?)?;
    dict.set_item("slope", delta_dict(py, &deltas.slope)?)?;
    Ok(dict)
}

/// Runs that remember their predecessor for before/after overlays.
///
/// State persists between run() calls; the first run has nothing to compare with.
#[pyclass]
#[derive(Default)]
pub struct CruiseSession {
    history: RunHistory,
}

#[pymethods]
impl CruiseSession {
    #[new]
    fn new() -> Self {
        Self::default()
    }

    /// Run and return (current, previous or None, deltas or None)
    #[pyo3(signature = (
        tf=Some(300.0),
        load=Some(200.0),
        v0=Some(0.0),
        ubias=Some(0.0),
        set_points=None,
        slopes=None,
        kc=1.0 / 1.2,
        tau_i=20.0
    ))]
    #[allow(clippy::too_many_arguments, clippy::type_complexity)]
    fn run<'py>(
        &mut self,
        py: Python<'py>,
        tf: Option<f64>,
        load: Option<f64>,
        v0: Option<f64>,
        ubias: Option<f64>,
        set_points: Option<BTreeMap<usize, f64>>,
        slopes: Option<BTreeMap<usize, f64>>,
        kc: f64,
        tau_i: f64,
    ) -> PyResult<(CruiseResult, Option<CruiseResult>, Option<Bound<'py, PyDict>>)> {
        let trace = run_raw(tf, load, v0, ubias, set_points, slopes, kc, tau_i)?;
        let comparison = self.history.record(trace);
        let deltas = match comparison.deltas() {
            Some(d) => Some(deltas_dict(py, &d)?),
            None => None,
        };
        Ok((
            CruiseResult { trace: comparison.current },
            comparison.previous.map(|trace| CruiseResult { trace }),
            deltas,
        ))
    }

    fn last(&self) -> Option<CruiseResult> {
        self.history.last().cloned().map(|trace| CruiseResult { trace })
    }

    fn clear(&mut self) {
        self.history.clear();
    }
}

/// Python module for the cruise-control simulator
#[pymodule]
fn cruise_sim_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(simulate, m)?)?;
    m.add_function(wrap_pyfunction!(reference_set_points, m)?)?;
    m.add_class::<CruiseResult>()?;
    m.add_class::<CruiseSession>()?;
    Ok(())
}
