//! The cruise-control loop.
//!
//! Each tick runs, in order: setpoint update, PI evaluation with saturation,
//! slope lookup, ODE integration of the vehicle over one tick with the
//! command held, and the non-negative speed clamp.

use std::collections::BTreeMap;

use control::{PiConfig, PiController, PiStep, SetpointSchedule};
use log::{debug, trace};
use simcore::{Integrator, SimContext, SimResult};
use vehicle::{LongitudinalDynamics, SlopeProfile, SlopeSchedule};

use crate::config::SimulationConfig;
use crate::trace::SimulationTrace;

/// Runs one simulation.
///
/// `set_points = None` behaves like an empty schedule, so the setpoint stays
/// at `config.initial_setpoint`. `slopes = None` is a flat road.
///
/// Sample 0 of `step`, `error` and `integral` is zero and sample 0 of `v` is
/// the initial speed; the loop fills samples `1..nsteps`. `setpoint[i]` is the
/// setpoint in force at tick `i`, so `{0: 20}` gives `setpoint[0] == 20`, and
/// `error[i + 1] == setpoint[i] - v[i]`. Plotted on the same axis, a setpoint
/// change therefore leads the error it causes by one sample.
pub fn simulate(
    config: &SimulationConfig,
    set_points: Option<&SetpointSchedule>,
    slopes: Option<&SlopeSchedule>,
) -> SimResult<SimulationTrace> {
    let config = config.sanitized()?;
    let nsteps = config.nsteps();
    let delta_t = config.delta_t();
    debug!(
        "simulating {nsteps} samples, dt = {delta_t} s, load = {} kg, kc = {}, tau_i = {}",
        config.load, config.kc, config.tau_i
    );

    let empty = SetpointSchedule::new();
    let mut setpoints = set_points.unwrap_or(&empty).tracker(config.initial_setpoint);
    let profile = match slopes {
        Some(schedule) => schedule.densify(nsteps),
        None => SlopeProfile::flat(nsteps),
    };

    let mut controller = PiController::new(
        PiConfig::new(config.kc, config.tau_i).with_bias(config.ubias),
    );
    let plant = LongitudinalDynamics::new(config.vehicle, config.slope_resistance);

    let mut out = SimulationTrace::zeroed(nsteps);
    out.ts = time_axis(config.tf, nsteps);

    let mut v = config.v0;
    out.v[0] = v;

    for i in 0..nsteps - 1 {
        let sp = setpoints.advance(i);
        controller.set_setpoint(sp);
        out.setpoint[i] = sp;

        let PiStep {
            error,
            integral,
            output: u,
        } = controller.update(v, delta_t);
        out.error[i + 1] = error;
        out.integral[i + 1] = integral;
        out.step[i + 1] = u;

        let angle = profile.angle_at(i);
        let ctx = SimContext::new(i, 0.0, delta_t);
        let next = config
            .integrator
            .advance(&plant.hold(u, config.load, angle), v, &ctx)?;

        v = next.max(0.0);
        out.v[i + 1] = v;
        trace!("tick {i}: sp = {sp}, e = {error:.4}, u = {u:.3}, angle = {angle:.3}, v = {v:.4}");
    }
    out.setpoint[nsteps - 1] = setpoints.advance(nsteps - 1);
    out.slope = profile.into_vec();

    Ok(out)
}

/// Positional entry point taking the raw dashboard fields.
///
/// Missing or out-of-range numbers are coerced as described on
/// [`SimulationConfig::sanitized`]; the remaining settings use their defaults.
#[allow(clippy::too_many_arguments)]
pub fn simulate_raw(
    tf: Option<f64>,
    load: Option<f64>,
    v0: Option<f64>,
    ubias: Option<f64>,
    set_points: Option<&BTreeMap<usize, f64>>,
    slopes: Option<&BTreeMap<usize, f64>>,
    kc: f64,
    tau_i: f64,
) -> SimResult<SimulationTrace> {
    let config = SimulationConfig::from_raw(tf, load, v0, ubias, kc, tau_i);
    let set_points = set_points.map(|m| SetpointSchedule::from(m.clone()));
    let slopes = slopes.map(|m| SlopeSchedule::from(m.clone()));
    simulate(&config, set_points.as_ref(), slopes.as_ref())
}

/// `nsteps` evenly spaced times from 0 to `tf` inclusive.
fn time_axis(tf: f64, nsteps: usize) -> Vec<f64> {
    let last = (nsteps - 1).max(1) as f64;
    (0..nsteps).map(|i| i as f64 * tf / last).collect()
}
