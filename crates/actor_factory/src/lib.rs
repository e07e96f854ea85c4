//! # Actor Factory
//!
//! Simulator world seam.
//!
//! Responsibilities:
//! - Define the `WorldHandle` / `MapService` traits the scenario core consumes
//! - Spawn the ego fleet from configuration
//! - Manage actor lifecycle, teardown and rollback
//! - Provide an in-process mock world

pub mod error;
pub mod factory;
pub mod mock_world;
pub mod world;

pub use contracts::{ActorId, ActorRoster, Waypoint};
pub use error::{ActorFactoryError, Result};
pub use factory::ActorFactory;
pub use mock_world::{MockMap, MockWorld, MockWorldConfig, WorldEvent};
pub use world::{CollisionReceiver, MapService, WorldHandle};
