//! Longitudinal vehicle dynamics
//!
//! Single-state model of vehicle speed driven by a throttle command:
//! - Propulsion proportional to the actuator command (N per percent)
//! - Aerodynamic drag, scaled by the road angle
//! - Vehicle mass plus carried load

use serde::{Deserialize, Serialize};
use simcore::Dynamics;

const GRAVITY: f64 = 9.81; // m/s^2

/// Physical constants of the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleConstant {
    /// Drag coefficient
    pub drag_coefficient: f64,
    /// Air density (kg/m^3)
    pub air_density: f64,
    /// Frontal area (m^2)
    pub frontal_area: f64,
    /// Thrust per percent of actuator command (N/%)
    pub thrust_per_percent: f64,
    /// Vehicle mass without load (kg)
    pub mass: f64,
}

impl Default for VehicleConstant {
    fn default() -> Self {
        VehicleConstant {
            drag_coefficient: 0.24,
            air_density: 1.225,
            frontal_area: 5.0,
            thrust_per_percent: 30.0,
            mass: 500.0,
        }
    }
}

/// How the road angle enters the force balance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlopeResistance {
    /// Drag force multiplied by `sin(angle)`. On flat road this removes drag entirely.
    #[default]
    DragModulated,
    /// Full drag plus the gravity component `(m + load) * g * sin(angle)`.
    Gravity,
}

impl VehicleConstant {
    /// 0.5 * rho * Cd * A
    pub fn drag_factor(&self) -> f64 {
        0.5 * self.air_density * self.drag_coefficient * self.frontal_area
    }

    /// Acceleration (m/s^2) at speed `v` under command `u` (%).
    pub fn acceleration(
        &self,
        v: f64,
        u: f64,
        load: f64,
        angle_degrees: f64,
        slope: SlopeResistance,
    ) -> f64 {
        let total_mass = self.mass + load;
        let sin_angle = angle_degrees.to_radians().sin();
        let thrust = self.thrust_per_percent * u;
        let drag = self.drag_factor() * v * v;

        let resistance = match slope {
            SlopeResistance::DragModulated => drag * sin_angle,
            SlopeResistance::Gravity => drag + total_mass * GRAVITY * sin_angle,
        };

        (thrust - resistance) / total_mass
    }
}

/// Rate of change of speed for the default vehicle.
///
/// `dv/dt = (Fp*u - 0.5*rho*Cd*A*v^2*sin(angle)) / (m + load)`
pub fn dv_dt(v: f64, _t: f64, u: f64, load: f64, angle_degrees: f64) -> f64 {
    VehicleConstant::default().acceleration(v, u, load, angle_degrees, SlopeResistance::DragModulated)
}

/// Vehicle dynamics with the command, load and road angle frozen for one tick.
#[derive(Debug, Clone, Copy)]
pub struct LongitudinalDynamics {
    pub constants: VehicleConstant,
    pub slope_resistance: SlopeResistance,
    pub command: f64,
    pub load: f64,
    pub angle_degrees: f64,
}

impl LongitudinalDynamics {
    pub fn new(constants: VehicleConstant, slope_resistance: SlopeResistance) -> Self {
        LongitudinalDynamics {
            constants,
            slope_resistance,
            command: 0.0,
            load: 0.0,
            angle_degrees: 0.0,
        }
    }

    /// Freezes the inputs for the next integration interval.
    pub fn hold(mut self, command: f64, load: f64, angle_degrees: f64) -> Self {
        self.command = command;
        self.load = load;
        self.angle_degrees = angle_degrees;
        self
    }
}

impl Dynamics for LongitudinalDynamics {
    fn derivative(&self, _t: f64, v: f64) -> f64 {
        self.constants.acceleration(
            v,
            self.command,
            self.load,
            self.angle_degrees,
            self.slope_resistance,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_road_has_no_drag() {
        // sin(0) = 0 removes the drag term entirely.
        let a = dv_dt(40.0, 0.0, 10.0, 200.0, 0.0);
        assert!((a - 300.0 / 700.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_command_at_rest_is_stationary() {
        assert!(dv_dt(0.0, 0.0, 0.0, 0.0, 0.0).abs() < 1e-12);
        assert!(dv_dt(0.0, 3.0, 0.0, 150.0, 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_vertical_angle_applies_full_drag() {
        let v: f64 = 10.0;
        let expected = (30.0 * 50.0 - 0.5 * 1.225 * 0.24 * 5.0 * v * v) / 500.0;
        assert_relative_eq!(dv_dt(v, 0.0, 50.0, 0.0, 90.0), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_negative_angle_adds_thrust() {
        // A negative angle flips the sign of the drag term.
        let uphill = dv_dt(20.0, 0.0, 0.0, 0.0, 10.0);
        let downhill = dv_dt(20.0, 0.0, 0.0, 0.0, -10.0);
        assert!(uphill < 0.0);
        assert_relative_eq!(downhill, -uphill, max_relative = 1e-12);
    }

    #[test]
    fn test_load_reduces_acceleration() {
        let light = dv_dt(5.0, 0.0, 60.0, 0.0, 3.0);
        let heavy = dv_dt(5.0, 0.0, 60.0, 500.0, 3.0);
        assert!(heavy < light);
        assert!(heavy > 0.0);
    }

    #[test]
    fn test_time_does_not_matter() {
        assert_eq!(dv_dt(12.0, 0.0, 30.0, 100.0, 4.0), dv_dt(12.0, 250.0, 30.0, 100.0, 4.0));
    }

    #[test]
    fn test_gravity_resistance_on_flat_road_keeps_drag() {
        let c = VehicleConstant::default();
        let a = c.acceleration(10.0, 0.0, 0.0, 0.0, SlopeResistance::Gravity);
        assert_relative_eq!(a, -c.drag_factor() * 100.0 / 500.0, max_relative = 1e-12);
    }

    #[test]
    fn test_gravity_resistance_on_incline() {
        let c = VehicleConstant::default();
        let a = c.acceleration(0.0, 0.0, 100.0, 30.0, SlopeResistance::Gravity);
        assert_relative_eq!(a, -GRAVITY * 0.5, max_relative = 1e-9);
    }

    #[test]
    fn test_dynamics_matches_free_function() {
        let dynamics = LongitudinalDynamics::new(VehicleConstant::default(), SlopeResistance::default())
            .hold(42.0, 120.0, 7.5);
        assert_eq!(dynamics.derivative(1.0, 18.0), dv_dt(18.0, 1.0, 42.0, 120.0, 7.5));
    }

    #[test]
    fn test_slope_resistance_json_names() {
        let s: SlopeResistance = serde_json::from_str("\"gravity\"").unwrap();
        assert_eq!(s, SlopeResistance::Gravity);
        assert_eq!(serde_json::to_string(&SlopeResistance::DragModulated).unwrap(), "\"drag_modulated\"");
    }
}
