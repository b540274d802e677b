//! Hard clamping of actuator commands.

/// Lowest actuator command (%), full braking.
pub const ACTUATOR_MIN: f64 = -50.0;
/// Highest actuator command (%), full throttle.
pub const ACTUATOR_MAX: f64 = 100.0;

/// Clamps `value` into `[min, max]`, discarding the excess.
pub fn saturate(value: f64, min: f64, max: f64) -> f64 {
    if value >= max {
        max
    } else if value <= min {
        min
    } else {
        value
    }
}

/// Clamps an actuator command into `[ACTUATOR_MIN, ACTUATOR_MAX]`.
pub fn keep_within_limits(u: f64) -> f64 {
    saturate(u, ACTUATOR_MIN, ACTUATOR_MAX)
}

/// True when `u` sits on either actuator bound.
pub fn is_saturated(u: f64) -> bool {
    u <= ACTUATOR_MIN || u >= ACTUATOR_MAX
}
