//! Cruise-control simulation engine
//!
//! A PI controller tracks a piecewise-constant speed schedule by commanding
//! the throttle of a longitudinal vehicle model, while a road-slope profile
//! acts as a disturbance. [`simulate`] is a pure function of its inputs and
//! returns seven index-aligned series for plotting.

pub mod comparison;
pub mod config;
pub mod engine;
pub mod trace;

pub use comparison::{OverlayDeltas, RunComparison, RunHistory, SeriesDelta};
pub use config::{Scenario, SimulationConfig, MAX_HORIZON};
pub use engine::{simulate, simulate_raw};
pub use trace::{SimulationTrace, TraceRow, TraceSummary};

pub use control::SetpointSchedule;
pub use simcore::{IntegratorKind, SimError, SimResult};
pub use vehicle::{SlopeResistance, SlopeSchedule};
