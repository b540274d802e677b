//! Control systems for the cruise loop
//!
//! This crate provides:
//! - The actuator saturation guard
//! - A PI speed controller without anti-windup
//! - Piecewise-constant setpoint schedules

pub mod pi;
pub mod saturation;
pub mod schedule;

pub use pi::*;
pub use saturation::*;
pub use schedule::*;
