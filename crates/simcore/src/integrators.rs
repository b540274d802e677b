use ode_solvers::{Dopri5, OutputType, System, Vector1};
use serde::{Deserialize, Serialize};

use crate::{Dynamics, SimContext, SimError, SimResult};

/// A generic integration strategy trait.
pub trait Integrator {
    /// Advances `y0` from `ctx.t` to `ctx.t + ctx.dt` under `dynamics`,
    /// returning the state at the end of the interval.
    fn advance<D: Dynamics>(&self, dynamics: &D, y0: f64, ctx: &SimContext) -> SimResult<f64>;
}

/// Fourth-order Runge-Kutta integrator with a fixed number of sub-steps per tick.
/// Cheap and predictable; accurate enough for the plotting resolution used by
/// the cruise loop with the default sub-step count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RungeKutta4 {
    pub substeps: usize,
}

impl Default for RungeKutta4 {
    fn default() -> Self {
        RungeKutta4 { substeps: 20 }
    }
}

impl RungeKutta4 {
    pub fn new(substeps: usize) -> Self {
        RungeKutta4 { substeps: substeps.max(1) }
    }
}

impl Integrator for RungeKutta4 {
    fn advance<D: Dynamics>(&self, dynamics: &D, y0: f64, ctx: &SimContext) -> SimResult<f64> {
        let n = self.substeps.max(1);
        let h = ctx.dt / n as f64;
        let mut t = ctx.t;
        let mut y = y0;

        for _ in 0..n {
            let k1 = dynamics.derivative(t, y);
            let k2 = dynamics.derivative(t + 0.5 * h, y + 0.5 * h * k1);
            let k3 = dynamics.derivative(t + 0.5 * h, y + 0.5 * h * k2);
            let k4 = dynamics.derivative(t + h, y + h * k3);
            y += h / 6.0 * (k1 + 2.0 * k2 + 2.0 * k3 + k4);
            t += h;
        }

        if !y.is_finite() {
            return Err(SimError::Integration {
                tick: ctx.tick,
                message: format!("non-finite state {y} after {n} RK4 sub-steps"),
            });
        }
        Ok(y)
    }
}

// sqrt(f64::EPSILON)
const DEFAULT_RTOL: f64 = 1.49012e-8;
const DEFAULT_ATOL: f64 = 1.49012e-8;

/// Adaptive Dormand-Prince 5(4) integrator backed by `ode_solvers`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveDopri5 {
    pub rtol: f64,
    pub atol: f64,
}

impl Default for AdaptiveDopri5 {
    fn default() -> Self {
        AdaptiveDopri5 {
            rtol: DEFAULT_RTOL,
            atol: DEFAULT_ATOL,
        }
    }
}

impl AdaptiveDopri5 {
    pub fn with_tolerances(rtol: f64, atol: f64) -> Self {
        AdaptiveDopri5 { rtol, atol }
    }
}

/// Adapts a scalar [`Dynamics`] to the one-element vector system `ode_solvers` expects.
struct ScalarSystem<'a, D> {
    dynamics: &'a D,
}

impl<D: Dynamics> System<f64, Vector1<f64>> for ScalarSystem<'_, D> {
    fn system(&self, t: f64, y: &Vector1<f64>, dy: &mut Vector1<f64>) {
        dy[0] = self.dynamics.derivative(t, y[0]);
    }
}

impl Integrator for AdaptiveDopri5 {
    fn advance<D: Dynamics>(&self, dynamics: &D, y0: f64, ctx: &SimContext) -> SimResult<f64> {
        if ctx.dt <= 0.0 {
            return Ok(y0);
        }

        let system = ScalarSystem { dynamics };
        let mut stepper = Dopri5::new(
            system,
            ctx.t,
            ctx.t_end(),
            0.0,
            Vector1::new(y0),
            self.rtol,
            self.atol,
        );
        // Sparse output records accepted steps only; the last one sits at t_end.
        stepper.set_output(OutputType::Sparse);

        stepper.integrate().map_err(|e| SimError::Integration {
            tick: ctx.tick,
            message: format!("{e:?}"),
        })?;

        let y = stepper
            .y_out()
            .last()
            .map(|y| y[0])
            .ok_or_else(|| SimError::Integration {
                tick: ctx.tick,
                message: "solver produced no output".to_string(),
            })?;

        if !y.is_finite() {
            return Err(SimError::Integration {
                tick: ctx.tick,
                message: format!("non-finite state {y}"),
            });
        }
        Ok(y)
    }
}

/// Integrator selection carried by run configurations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegratorKind {
    Dopri5(AdaptiveDopri5),
    Rk4(RungeKutta4),
}

impl Default for IntegratorKind {
    fn default() -> Self {
        IntegratorKind::Dopri5(AdaptiveDopri5::default())
    }
}

impl Integrator for IntegratorKind {
    fn advance<D: Dynamics>(&self, dynamics: &D, y0: f64, ctx: &SimContext) -> SimResult<f64> {
        match self {
            IntegratorKind::Dopri5(inner) => inner.advance(dynamics, y0, ctx),
            IntegratorKind::Rk4(inner) => inner.advance(dynamics, y0, ctx),
        }
    }
}
