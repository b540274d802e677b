//! Shared simulation core for the cruise-control crates.
//!
//! Holds the per-step [`SimContext`], the [`Dynamics`] seam implemented by
//! physical models, the scalar ODE integrators that advance them, and the
//! breakpoint-to-dense profile builder used for time-varying disturbances.

pub mod error;
pub mod integrators;
pub mod profile;
pub mod traits;

pub use error::{SimError, SimResult};
pub use integrators::{AdaptiveDopri5, Integrator, IntegratorKind, RungeKutta4};
pub use profile::build_dense_profile;
pub use traits::{Dynamics, Model, SimContext};
