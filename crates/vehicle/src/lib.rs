pub mod dynamics;
pub mod road;

pub use dynamics::{dv_dt, LongitudinalDynamics, SlopeResistance, VehicleConstant};
pub use road::{SlopeProfile, SlopeSchedule};
