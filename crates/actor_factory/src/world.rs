//! Simulator world abstraction
//!
//! Defines traits for the world state the scenario core reads and mutates:
//! weather, map queries, the actor registry and per-actor collision streams.
//! Supports any simulator host as well as the in-process mock.

use contracts::{ActorId, CollisionEvent, Location, Transform, WeatherParameters, Waypoint};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::error::Result;

/// Per-actor collision notification stream
pub type CollisionReceiver = UnboundedReceiver<CollisionEvent>;

/// Road network queries
pub trait MapService {
    /// Map name (e.g., "Town01")
    fn name(&self) -> &str;

    /// Road-aligned waypoint closest to `location`, None when off the road
    fn waypoint_at(&self, location: &Location) -> Option<Waypoint>;

    /// Waypoints `distance` meters ahead along the lane
    ///
    /// Returns one entry per branch, empty past the end of the road.
    fn next(&self, waypoint: &Waypoint, distance: f64) -> Vec<Waypoint>;

    /// Same position on the lane to the left, if such a lane exists
    fn left_lane(&self, waypoint: &Waypoint) -> Option<Waypoint>;
}

/// World handle trait
///
/// Methods take `&self`; implementations rely on interior mutability so a
/// handle can be cloned into every component that needs it.
pub trait WorldHandle {
    type Map: MapService;

    /// Current map
    ///
    /// # Errors
    /// `ResourceUnavailable` if no map is loaded
    fn map(&self) -> Result<Self::Map>;

    /// Current weather
    fn weather(&self) -> WeatherParameters;

    /// Replace the world weather
    fn set_weather(&self, weather: &WeatherParameters);

    /// Request a new actor
    ///
    /// # Returns
    /// Newly created actor ID, `SpawnRejected` when the registry refuses it
    fn spawn_actor(&self, blueprint: &str, transform: &Transform) -> Result<ActorId>;

    /// Hand the actor over to (or take it back from) the autopilot
    fn set_autopilot(&self, actor_id: ActorId, enabled: bool) -> Result<()>;

    /// Current pose, None if the actor doesn't exist
    fn actor_transform(&self, actor_id: ActorId) -> Option<Transform>;

    fn actor_exists(&self, actor_id: ActorId) -> bool {
        self.actor_transform(actor_id).is_some()
    }

    /// Destroy actor
    ///
    /// Idempotent operation: returns Ok if actor doesn't exist
    fn destroy_actor(&self, actor_id: ActorId) -> Result<()>;

    /// Subscribe to collision notifications of one actor
    fn subscribe_collisions(&self, actor_id: ActorId) -> Result<CollisionReceiver>;
}
