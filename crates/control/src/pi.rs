//! PI (Proportional-Integral) speed controller
//!
//! Output is `bias + Kc*e + (Kc/tauI)*∫e dt`, hard-clamped to the actuator
//! range. The integral is never clamped or back-calculated, so it keeps
//! accumulating while the output is saturated.

use serde::{Deserialize, Serialize};
use simcore::Model;

use crate::saturation::{saturate, ACTUATOR_MAX, ACTUATOR_MIN};

/// Configuration for a PI controller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PiConfig {
    /// Proportional gain
    pub kc: f64,
    /// Integral time constant (s)
    pub tau_i: f64,
    /// Command applied at zero error (%)
    pub bias: f64,
    /// Minimum output value
    pub output_min: f64,
    /// Maximum output value
    pub output_max: f64,
}

impl Default for PiConfig {
    fn default() -> Self {
        Self {
            kc: 1.0 / 1.2,
            tau_i: 20.0,
            bias: 0.0,
            output_min: ACTUATOR_MIN,
            output_max: ACTUATOR_MAX,
        }
    }
}

impl PiConfig {
    /// Create a PI controller with actuator limits
    pub fn new(kc: f64, tau_i: f64) -> Self {
        Self { kc, tau_i, ..Default::default() }
    }

    /// Set the bias
    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = bias;
        self
    }

    /// Integral gain Kc / tauI
    pub fn ki(&self) -> f64 {
        self.kc / self.tau_i
    }
}

/// One controller evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PiStep {
    pub error: f64,
    pub integral: f64,
    /// Saturated command
    pub output: f64,
}

/// PI controller with state
#[derive(Debug, Clone)]
pub struct PiController {
    config: PiConfig,
    integral: f64,
    setpoint: f64,
}

impl PiController {
    /// Create a new controller; the bias is saturated like any other command.
    pub fn new(mut config: PiConfig) -> Self {
        config.bias = saturate(config.bias, config.output_min, config.output_max);
        Self {
            config,
            integral: 0.0,
            setpoint: 0.0,
        }
    }

    /// Set the target setpoint
    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    /// Get the current setpoint
    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Update the controller with a new measurement.
    ///
    /// The error integral uses rectangular accumulation `I += e * dt`.
    pub fn update(&mut self, measurement: f64, dt: f64) -> PiStep {
        let error = self.setpoint - measurement;
        self.integral += error * dt;

        let raw = self.config.bias + self.config.kc * error + self.config.ki() * self.integral;
        let output = saturate(raw, self.config.output_min, self.config.output_max);

        PiStep {
            error,
            integral: self.integral,
            output,
        }
    }

    /// Get the current integral accumulator value
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &PiConfig {
        &self.config
    }
}

impl Model for PiController {
    fn reset(&mut self) {
        self.integral = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_proportional_and_integral_terms() {
        let mut ctrl = PiController::new(PiConfig::new(2.0, 4.0));
        ctrl.set_setpoint(10.0);

        // error = 6, integral = 6 * 0.5 = 3, u = 2*6 + 0.5*3
        let step = ctrl.update(4.0, 0.5);
        assert_relative_eq!(step.error, 6.0, epsilon = 1e-12);
        assert_relative_eq!(step.integral, 3.0, epsilon = 1e-12);
        assert_relative_eq!(step.output, 13.5, epsilon = 1e-12);
    }

    #[test]
    fn test_bias_is_added() {
        let mut ctrl = PiController::new(PiConfig::new(1.0, 1.0).with_bias(20.0));
        let step = ctrl.update(0.0, 1.0);
        assert!((step.output - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_bias_is_saturated() {
        let ctrl = PiController::new(PiConfig::new(1.0, 1.0).with_bias(400.0));
        assert_eq!(ctrl.config().bias, ACTUATOR_MAX);

        let ctrl = PiController::new(PiConfig::new(1.0, 1.0).with_bias(-80.0));
        assert_eq!(ctrl.config().bias, ACTUATOR_MIN);
    }

    #[test]
    fn test_output_saturation() {
        let mut ctrl = PiController::new(PiConfig::new(100.0, 1.0));
        ctrl.set_setpoint(10.0);
        assert_eq!(ctrl.update(0.0, 0.01).output, ACTUATOR_MAX);

        ctrl.reset();
        ctrl.set_setpoint(-10.0);
        assert_eq!(ctrl.update(0.0, 0.01).output, ACTUATOR_MIN);
    }

    #[test]
    fn test_integral_winds_up_while_saturated() {
        let mut ctrl = PiController::new(PiConfig::new(10.0, 5.0));
        ctrl.set_setpoint(100.0);

        let mut last = 0.0;
        for _ in 0..50 {
            let step = ctrl.update(0.0, 1.0);
            assert_eq!(step.output, ACTUATOR_MAX);
            assert!(step.integral > last);
            last = step.integral;
        }
        assert_relative_eq!(ctrl.integral(), 5000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_zero_error_holds_bias() {
        let mut ctrl = PiController::new(PiConfig::default().with_bias(12.0));
        ctrl.set_setpoint(15.0);
        for _ in 0..10 {
            let step = ctrl.update(15.0, 1.0);
            assert!((step.output - 12.0).abs() < 1e-12);
        }
        assert!(ctrl.integral().abs() < 1e-12);
    }

    #[test]
    fn test_reset_clears_integral_but_keeps_setpoint() {
        let mut ctrl = PiController::new(PiConfig::default());
        ctrl.set_setpoint(10.0);
        for _ in 0..10 {
            ctrl.update(0.0, 0.1);
        }
        assert!(ctrl.integral() > 0.0);

        ctrl.reset();
        assert!(ctrl.integral().abs() < 1e-12);
        assert_eq!(ctrl.setpoint(), 10.0);
    }

    #[test]
    fn test_pi_eliminates_steady_state_error() {
        // First-order lag plant: dx/dt = (u - x) / 5
        let mut ctrl = PiController::new(PiConfig::new(0.8, 4.0));
        ctrl.set_setpoint(10.0);

        let mut x = 0.0;
        let dt = 0.05;
        for _ in 0..4000 {
            let u = ctrl.update(x, dt).output;
            x += (u - x) / 5.0 * dt;
        }
        assert!((x - 10.0).abs() < 0.05, "Expected ~10.0, got {}", x);
    }
}
