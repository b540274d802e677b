/// Timing information handed to models and integrators for one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimContext {
    /// Length of the tick (s)
    pub dt: f64,
    /// Start time of the integration interval (s)
    pub t: f64,
    /// Zero-based index of the tick being advanced
    pub tick: usize,
}

impl SimContext {
    pub fn new(tick: usize, t: f64, dt: f64) -> Self {
        SimContext { dt, t, tick }
    }

    /// End of the integration interval.
    pub fn t_end(&self) -> f64 {
        self.t + self.dt
    }
}

pub trait Model {
    fn reset(&mut self);
}

/// A scalar first-order system `dy/dt = f(t, y)`.
///
/// Any inputs (actuator command, load, disturbances) are captured by the
/// implementor and held constant for the duration of one integration call.
pub trait Dynamics {
    fn derivative(&self, t: f64, y: f64) -> f64;
}

impl<D: Dynamics + ?Sized> Dynamics for &D {
    fn derivative(&self, t: f64, y: f64) -> f64 {
        (**self).derivative(t, y)
    }
}
