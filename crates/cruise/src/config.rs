//! Run configuration and input guards.

use control::{keep_within_limits, SetpointSchedule};
use log::debug;
use serde::{Deserialize, Serialize};
use simcore::{IntegratorKind, SimError, SimResult};
use vehicle::{SlopeResistance, SlopeSchedule, VehicleConstant};

use crate::engine::simulate;
use crate::trace::SimulationTrace;

/// Longest accepted horizon (s)
pub const MAX_HORIZON: f64 = 1.0e6;

/// Parameters of one cruise-control run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Horizon (s); one tick per whole second
    pub tf: f64,
    /// Carried load (kg)
    pub load: f64,
    /// Initial speed (m/s)
    pub v0: f64,
    /// Actuator bias (%)
    pub ubias: f64,
    /// Proportional gain
    pub kc: f64,
    /// Integral time constant (s)
    pub tau_i: f64,
    /// Setpoint before the schedule's first change (m/s)
    pub initial_setpoint: f64,
    pub integrator: IntegratorKind,
    pub vehicle: VehicleConstant,
    pub slope_resistance: SlopeResistance,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            tf: 300.0,
            load: 200.0,
            v0: 0.0,
            ubias: 0.0,
            kc: 1.0 / 1.2,
            tau_i: 20.0,
            initial_setpoint: 0.0,
            integrator: IntegratorKind::default(),
            vehicle: VehicleConstant::default(),
            slope_resistance: SlopeResistance::default(),
        }
    }
}

impl SimulationConfig {
    /// Builds a config from possibly-missing boundary values.
    ///
    /// Missing values take their coerced fallback (`tf = 1`, everything else 0),
    /// not the interactive defaults.
    pub fn from_raw(
        tf: Option<f64>,
        load: Option<f64>,
        v0: Option<f64>,
        ubias: Option<f64>,
        kc: f64,
        tau_i: f64,
    ) -> Self {
        SimulationConfig {
            tf: tf.unwrap_or(1.0),
            load: load.unwrap_or(0.0),
            v0: v0.unwrap_or(0.0),
            ubias: ubias.unwrap_or(0.0),
            kc,
            tau_i,
            ..Default::default()
        }
    }

    pub fn with_horizon(mut self, tf: f64) -> Self {
        self.tf = tf;
        self
    }

    pub fn with_load(mut self, load: f64) -> Self {
        self.load = load;
        self
    }

    pub fn with_initial_speed(mut self, v0: f64) -> Self {
        self.v0 = v0;
        self
    }

    pub fn with_bias(mut self, ubias: f64) -> Self {
        self.ubias = ubias;
        self
    }

    pub fn with_gains(mut self, kc: f64, tau_i: f64) -> Self {
        self.kc = kc;
        self.tau_i = tau_i;
        self
    }

    pub fn with_initial_setpoint(mut self, setpoint: f64) -> Self {
        self.initial_setpoint = setpoint;
        self
    }

    pub fn with_integrator(mut self, integrator: IntegratorKind) -> Self {
        self.integrator = integrator;
        self
    }

    pub fn with_slope_resistance(mut self, slope_resistance: SlopeResistance) -> Self {
        self.slope_resistance = slope_resistance;
        self
    }

    /// Applies the boundary coercions and rejects values no coercion can repair.
    ///
    /// - `tf < 1` becomes 1
    /// - negative `load` and `v0` become 0
    /// - `ubias` is saturated to the actuator range
    /// - non-finite numbers, `tf > MAX_HORIZON` and `tau_i <= 0` are errors
    pub fn sanitized(&self) -> SimResult<SimulationConfig> {
        for (name, value) in [
            ("tf", self.tf),
            ("load", self.load),
            ("v0", self.v0),
            ("ubias", self.ubias),
            ("kc", self.kc),
            ("tau_i", self.tau_i),
            ("initial_setpoint", self.initial_setpoint),
        ] {
            if !value.is_finite() {
                return Err(SimError::invalid(name, value));
            }
        }
        if self.tf > MAX_HORIZON {
            return Err(SimError::invalid("tf", self.tf));
        }
        if self.tau_i <= 0.0 {
            return Err(SimError::invalid("tau_i", self.tau_i));
        }

        let mut cfg = self.clone();
        if cfg.tf < 1.0 {
            debug!("horizon {} coerced to 1", cfg.tf);
            cfg.tf = 1.0;
        }
        if cfg.load < 0.0 {
            debug!("load {} coerced to 0", cfg.load);
            cfg.load = 0.0;
        }
        if cfg.v0 < 0.0 {
            debug!("initial speed {} coerced to 0", cfg.v0);
            cfg.v0 = 0.0;
        }
        let ubias = keep_within_limits(cfg.ubias);
        if ubias != cfg.ubias {
            debug!("bias {} saturated to {}", cfg.ubias, ubias);
            cfg.ubias = ubias;
        }
        Ok(cfg)
    }

    /// Number of samples in every trace series, `floor(tf) + 1`.
    pub fn nsteps(&self) -> usize {
        self.tf.max(1.0).floor() as usize + 1
    }

    /// Length of one tick (s).
    pub fn delta_t(&self) -> f64 {
        self.tf.max(1.0) / (self.nsteps() - 1) as f64
    }
}

/// A config bundled with its two event maps, as read from a scenario file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: SimulationConfig,
    #[serde(default)]
    pub set_points: Option<SetpointSchedule>,
    #[serde(default)]
    pub slopes: Option<SlopeSchedule>,
}

impl Scenario {
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn run(&self) -> SimResult<SimulationTrace> {
        simulate(&self.config, self.set_points.as_ref(), self.slopes.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_inputs_are_coerced() {
        let cfg = SimulationConfig::default()
            .with_horizon(-5.0)
            .with_load(-1.0)
            .with_initial_speed(-3.0)
            .sanitized()
            .unwrap();
        assert_eq!(cfg.tf, 1.0);
        assert_eq!(cfg.load, 0.0);
        assert_eq!(cfg.v0, 0.0);
    }

    #[test]
    fn test_fractional_horizon_below_one_is_coerced() {
        let cfg = SimulationConfig::default().with_horizon(0.25).sanitized().unwrap();
        assert_eq!(cfg.tf, 1.0);
        assert_eq!(cfg.nsteps(), 2);
    }

    #[test]
    fn test_bias_is_saturated() {
        let high = SimulationConfig::default().with_bias(180.0).sanitized().unwrap();
        assert_eq!(high.ubias, 100.0);
        let low = SimulationConfig::default().with_bias(-75.0).sanitized().unwrap();
        assert_eq!(low.ubias, -50.0);
    }

    #[test]
    fn test_missing_raw_values_use_fallbacks() {
        let cfg = SimulationConfig::from_raw(None, None, None, None, 0.8, 50.0);
        assert_eq!(cfg.tf, 1.0);
        assert_eq!(cfg.load, 0.0);
        assert_eq!(cfg.v0, 0.0);
        assert_eq!(cfg.ubias, 0.0);
    }

    #[test]
    fn test_step_count_and_tick_length() {
        let cfg = SimulationConfig::default().with_horizon(300.0);
        assert_eq!(cfg.nsteps(), 301);
        assert!((cfg.delta_t() - 1.0).abs() < 1e-12);

        let cfg = SimulationConfig::default().with_horizon(10.5);
        assert_eq!(cfg.nsteps(), 11);
        assert!((cfg.delta_t() - 1.05).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        let err = SimulationConfig::default().with_load(f64::NAN).sanitized().unwrap_err();
        match err {
            SimError::InvalidParameter { name, .. } => assert_eq!(name, "load"),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(SimulationConfig::default().with_horizon(f64::INFINITY).sanitized().is_err());
    }

    #[test]
    fn test_horizon_beyond_limit_is_rejected() {
        let err = SimulationConfig::default().with_horizon(1e30).sanitized().unwrap_err();
        match err {
            SimError::InvalidParameter { name, .. } => assert_eq!(name, "tf"),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(SimulationConfig::default().with_horizon(MAX_HORIZON).sanitized().is_ok());
    }

    #[test]
    fn test_non_positive_integral_time_is_rejected() {
        assert!(SimulationConfig::default().with_gains(0.8, 0.0).sanitized().is_err());
        assert!(SimulationConfig::default().with_gains(0.8, -2.0).sanitized().is_err());
    }

    #[test]
    fn test_scenario_json_with_partial_config() {
        let json = r#"{
            "config": {"tf": 120, "load": 50, "kc": 0.8, "tau_i": 50},
            "set_points": {"0": 0, "50": 15},
            "slopes": {"60": 3.5}
        }"#;
        let scenario = Scenario::from_json_str(json).unwrap();
        assert_eq!(scenario.config.tf, 120.0);
        assert_eq!(scenario.config.v0, 0.0);
        assert_eq!(scenario.config.integrator, IntegratorKind::default());
        assert_eq!(scenario.set_points.as_ref().and_then(|s| s.change_at(50)), Some(15.0));
        assert_eq!(scenario.slopes.as_ref().map(|s| s.breakpoints().len()), Some(1));
    }

    #[test]
    fn test_scenario_without_schedules() {
        let scenario = Scenario::from_json_str("{}").unwrap();
        assert_eq!(scenario.config, SimulationConfig::default());
        assert!(scenario.set_points.is_none());
        assert!(scenario.slopes.is_none());
    }
}
