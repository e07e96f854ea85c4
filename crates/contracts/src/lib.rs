//! # Contracts
//!
//! Frozen interface contracts shared by every scenario crate: geometry,
//! weather, scenario configuration, statuses and errors.
//! All business crates depend on this crate only, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Simulation time is tracked in seconds (f64) by the tick driver
//! - `tick` counts behavior tree evaluations, starting at 1

mod error;
mod geometry;
mod runtime;
mod scenario;
mod status;
mod weather;

pub use error::*;
pub use geometry::*;
pub use runtime::*;
pub use scenario::*;
pub use status::*;
pub use weather::*;
