//! Mock simulator world
//!
//! In-process world for tests and offline runs: a straight multi-lane road,
//! an actor registry with injectable spawn failures, a naive autopilot that
//! cruises along the actor heading, and overlap-based collision events.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use contracts::{
    ActorId, CollisionEvent, Location, RoadConfig, SimulationConfig, Transform,
    WeatherParameters, Waypoint,
};
use nalgebra::{Point3, Vector3};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, instrument};

use crate::error::{ActorFactoryError, Result};
use crate::world::{CollisionReceiver, MapService, WorldHandle};

/// Mock world configuration
#[derive(Debug, Clone)]
pub struct MockWorldConfig {
    pub map_name: String,
    /// When false, `map()` reports the map as unavailable
    pub map_loaded: bool,
    pub road: RoadConfig,
    /// Driving direction of the road, degrees
    pub road_heading_deg: f64,
    /// Extra branches returned by every `next` query
    pub forks: u32,
    /// Accepted blueprints; empty accepts any
    pub blueprints: Vec<String>,
    /// Actors closer than this overlap, meters
    pub footprint_m: f64,
    /// Cruise speed given to actors put under autopilot, m/s
    pub autopilot_speed_mps: f64,
    /// Spawn attempts (0-based ordinal) that should be rejected
    pub reject_spawn_attempts: Vec<usize>,
    /// Actor IDs whose destroy should fail
    pub fail_destroy: Vec<ActorId>,
}

impl Default for MockWorldConfig {
    fn default() -> Self {
        Self {
            map_name: "Town01".to_string(),
            map_loaded: true,
            road: RoadConfig::default(),
            road_heading_deg: 0.0,
            forks: 0,
            blueprints: Vec::new(),
            footprint_m: 2.5,
            autopilot_speed_mps: 8.0,
            reject_spawn_attempts: Vec::new(),
            fail_destroy: Vec::new(),
        }
    }
}

impl MockWorldConfig {
    /// Build from the simulation section of a scenario configuration
    pub fn from_simulation(town: &str, simulation: &SimulationConfig) -> Self {
        Self {
            map_name: town.to_string(),
            road: simulation.road.clone(),
            autopilot_speed_mps: simulation.traffic_speed_mps,
            ..Self::default()
        }
    }
}

/// Straight road with `lanes` parallel lanes
///
/// Lane 1 is the rightmost lane, lane `n + 1` lies to the left of lane `n`.
#[derive(Debug, Clone)]
pub struct MockMap {
    name: String,
    road: RoadConfig,
    heading_deg: f64,
    forks: u32,
    origin: Point3<f64>,
    forward: Vector3<f64>,
    left: Vector3<f64>,
}

impl MockMap {
    pub fn new(name: impl Into<String>, road: RoadConfig, heading_deg: f64, forks: u32) -> Self {
        let yaw = heading_deg.to_radians();
        Self {
            name: name.into(),
            road,
            heading_deg,
            forks,
            origin: Point3::origin(),
            forward: Vector3::new(yaw.cos(), yaw.sin(), 0.0),
            // y grows to the right of the driving direction
            left: Vector3::new(yaw.sin(), -yaw.cos(), 0.0),
        }
    }

    fn lanes(&self) -> i32 {
        self.road.lanes as i32
    }

    fn lane_center(&self, lane_id: i32, s: f64) -> Point3<f64> {
        let lateral = f64::from(lane_id - 1) * self.road.lane_width_m;
        self.origin + self.forward * s + self.left * lateral
    }

    fn waypoint(&self, road_id: u32, lane_id: i32, s: f64) -> Waypoint {
        let p = self.lane_center(lane_id, s);
        Waypoint {
            road_id,
            lane_id,
            s,
            transform: Transform::at(Location::new(p.x, p.y, p.z), self.heading_deg),
        }
    }
}

impl MapService for MockMap {
    fn name(&self) -> &str {
        &self.name
    }

    fn waypoint_at(&self, location: &Location) -> Option<Waypoint> {
        let offset = Point3::new(location.x, location.y, location.z) - self.origin;
        let s = offset.dot(&self.forward);
        if !(0.0..=self.road.length_m).contains(&s) {
            return None;
        }

        let lane_id = (offset.dot(&self.left) / self.road.lane_width_m).round() as i32 + 1;
        if lane_id < 1 || lane_id > self.lanes() {
            return None;
        }
        Some(self.waypoint(0, lane_id, s))
    }

    fn next(&self, waypoint: &Waypoint, distance: f64) -> Vec<Waypoint> {
        let s = waypoint.s + distance;
        if distance < 0.0 || s > self.road.length_m {
            return Vec::new();
        }
        (0..=self.forks)
            .map(|branch| self.waypoint(waypoint.road_id + branch, waypoint.lane_id, s))
            .collect()
    }

    fn left_lane(&self, waypoint: &Waypoint) -> Option<Waypoint> {
        (waypoint.lane_id < self.lanes())
            .then(|| self.waypoint(waypoint.road_id, waypoint.lane_id + 1, waypoint.s))
    }
}

/// Observable world mutation, in the order it happened
#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    WeatherSet(WeatherParameters),
    SpawnAttempt {
        blueprint: String,
        transform: Transform,
        /// None when the request was rejected
        actor_id: Option<ActorId>,
    },
    AutopilotSet {
        actor_id: ActorId,
        enabled: bool,
    },
    Destroyed(ActorId),
}

#[derive(Debug, Clone)]
struct MockActor {
    blueprint: String,
    transform: Transform,
    autopilot: bool,
    speed_mps: f64,
}

struct MockState {
    weather: WeatherParameters,
    next_actor_id: ActorId,
    spawn_attempts: usize,
    actors: BTreeMap<ActorId, MockActor>,
    subscribers: HashMap<ActorId, Vec<UnboundedSender<CollisionEvent>>>,
    contacts: HashSet<(ActorId, ActorId)>,
    elapsed: f64,
    history: Vec<WorldEvent>,
}

impl MockState {
    fn publish(&mut self, event: &CollisionEvent) {
        if let Some(senders) = self.subscribers.get_mut(&event.actor_id) {
            senders.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    fn overlapping_actor(&self, location: &Location, footprint_m: f64) -> Option<ActorId> {
        self.actors
            .iter()
            .find(|(_, actor)| actor.transform.location.distance(location) < footprint_m)
            .map(|(id, _)| *id)
    }
}

/// Mock world
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct MockWorld {
    config: Arc<MockWorldConfig>,
    map: MockMap,
    state: Arc<Mutex<MockState>>,
}

impl MockWorld {
    /// Create default mock world
    pub fn new() -> Self {
        Self::with_config(MockWorldConfig::default())
    }

    /// Create mock world with configuration
    pub fn with_config(config: MockWorldConfig) -> Self {
        let map = MockMap::new(
            config.map_name.clone(),
            config.road.clone(),
            config.road_heading_deg,
            config.forks,
        );
        let state = MockState {
            weather: WeatherParameters::default(),
            next_actor_id: 1000, // start at 1000 for easier identification
            spawn_attempts: 0,
            actors: BTreeMap::new(),
            subscribers: HashMap::new(),
            contacts: HashSet::new(),
            elapsed: 0.0,
            history: Vec::new(),
        };
        Self {
            config: Arc::new(config),
            map,
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of live actors
    pub fn actor_count(&self) -> usize {
        self.state().actors.len()
    }

    /// All live actor IDs, ascending
    pub fn actor_ids(&self) -> Vec<ActorId> {
        self.state().actors.keys().copied().collect()
    }

    pub fn blueprint_of(&self, actor_id: ActorId) -> Option<String> {
        self.state()
            .actors
            .get(&actor_id)
            .map(|a| a.blueprint.clone())
    }

    pub fn is_autopilot(&self, actor_id: ActorId) -> bool {
        self.state()
            .actors
            .get(&actor_id)
            .is_some_and(|a| a.autopilot)
    }

    /// Simulated time advanced so far, seconds
    pub fn elapsed(&self) -> f64 {
        self.state().elapsed
    }

    /// Every world mutation so far
    pub fn history(&self) -> Vec<WorldEvent> {
        self.state().history.clone()
    }

    /// Override the cruise speed of one actor
    pub fn set_speed(&self, actor_id: ActorId, speed_mps: f64) -> Result<()> {
        let mut state = self.state();
        let actor = state
            .actors
            .get_mut(&actor_id)
            .ok_or(ActorFactoryError::ActorNotFound { actor_id })?;
        actor.speed_mps = speed_mps;
        Ok(())
    }

    /// Publish a collision for `actor_id` as if the simulator reported it
    pub fn inject_collision(&self, actor_id: ActorId, other_actor_id: Option<ActorId>) {
        let mut state = self.state();
        let location = state
            .actors
            .get(&actor_id)
            .map(|a| a.transform.location)
            .unwrap_or_default();
        let event = CollisionEvent {
            actor_id,
            other_actor_id,
            location,
            timestamp: state.elapsed,
        };
        state.publish(&event);
    }

    /// Advance simulated time by `dt` seconds
    ///
    /// Autopilot actors cruise along their heading; every pair of actors that
    /// starts overlapping during this step produces one event per party.
    #[instrument(name = "mock_world_advance", skip(self))]
    pub fn advance(&self, dt: f64) -> Vec<CollisionEvent> {
        let footprint_m = self.config.footprint_m;
        let mut state = self.state();
        state.elapsed += dt;

        for actor in state.actors.values_mut().filter(|a| a.autopilot) {
            let yaw = actor.transform.rotation.yaw.to_radians();
            actor.transform.location.x += yaw.cos() * actor.speed_mps * dt;
            actor.transform.location.y += yaw.sin() * actor.speed_mps * dt;
        }

        let positions: Vec<(ActorId, Location)> = state
            .actors
            .iter()
            .map(|(id, a)| (*id, a.transform.location))
            .collect();
        let mut touching = HashSet::new();
        for (i, (a, loc_a)) in positions.iter().enumerate() {
            for (b, loc_b) in &positions[i + 1..] {
                if loc_a.distance(loc_b) < footprint_m {
                    touching.insert((*a, *b));
                }
            }
        }

        let mut new_contacts: Vec<_> = touching.difference(&state.contacts).copied().collect();
        new_contacts.sort_unstable();
        state.contacts = touching;

        let locations: HashMap<ActorId, Location> = positions.into_iter().collect();
        let mut events = Vec::with_capacity(new_contacts.len() * 2);
        for (a, b) in new_contacts {
            for (actor_id, other) in [(a, b), (b, a)] {
                events.push(CollisionEvent {
                    actor_id,
                    other_actor_id: Some(other),
                    location: locations[&actor_id],
                    timestamp: state.elapsed,
                });
            }
        }
        for event in &events {
            debug!(actor_id = event.actor_id, other = ?event.other_actor_id, "collision");
            state.publish(event);
        }
        events
    }
}

impl Default for MockWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldHandle for MockWorld {
    type Map = MockMap;

    fn map(&self) -> Result<MockMap> {
        if self.config.map_loaded {
            Ok(self.map.clone())
        } else {
            Err(ActorFactoryError::resource_unavailable("map"))
        }
    }

    fn weather(&self) -> WeatherParameters {
        self.state().weather
    }

    fn set_weather(&self, weather: &WeatherParameters) {
        let mut state = self.state();
        state.weather = *weather;
        state.history.push(WorldEvent::WeatherSet(*weather));
    }

    #[instrument(
        name = "mock_world_spawn_actor",
        skip(self, transform),
        fields(blueprint = %blueprint)
    )]
    fn spawn_actor(&self, blueprint: &str, transform: &Transform) -> Result<ActorId> {
        let mut state = self.state();
        let attempt = state.spawn_attempts;
        state.spawn_attempts += 1;

        let rejection = if self.config.reject_spawn_attempts.contains(&attempt) {
            Some("mock failure".to_string())
        } else if !self.config.blueprints.is_empty()
            && !self.config.blueprints.iter().any(|b| b == blueprint)
        {
            Some(format!("blueprint '{blueprint}' not found"))
        } else {
            state
                .overlapping_actor(&transform.location, self.config.footprint_m)
                .map(|other| format!("spawn point overlaps actor {other}"))
        };

        let actor_id = match rejection {
            Some(message) => {
                state.history.push(WorldEvent::SpawnAttempt {
                    blueprint: blueprint.to_string(),
                    transform: *transform,
                    actor_id: None,
                });
                return Err(ActorFactoryError::spawn_rejected(blueprint, message));
            }
            None => state.next_actor_id,
        };

        state.next_actor_id += 1;
        state.actors.insert(
            actor_id,
            MockActor {
                blueprint: blueprint.to_string(),
                transform: *transform,
                autopilot: false,
                speed_mps: self.config.autopilot_speed_mps,
            },
        );
        state.history.push(WorldEvent::SpawnAttempt {
            blueprint: blueprint.to_string(),
            transform: *transform,
            actor_id: Some(actor_id),
        });
        Ok(actor_id)
    }

    fn set_autopilot(&self, actor_id: ActorId, enabled: bool) -> Result<()> {
        let mut state = self.state();
        let actor = state
            .actors
            .get_mut(&actor_id)
            .ok_or(ActorFactoryError::ActorNotFound { actor_id })?;
        actor.autopilot = enabled;
        state
            .history
            .push(WorldEvent::AutopilotSet { actor_id, enabled });
        Ok(())
    }

    fn actor_transform(&self, actor_id: ActorId) -> Option<Transform> {
        self.state().actors.get(&actor_id).map(|a| a.transform)
    }

    #[instrument(name = "mock_world_destroy_actor", skip(self))]
    fn destroy_actor(&self, actor_id: ActorId) -> Result<()> {
        if self.config.fail_destroy.contains(&actor_id) {
            return Err(ActorFactoryError::DestroyFailed {
                actor_id,
                message: "mock failure".into(),
            });
        }

        // Idempotent: Ok even if the actor is already gone
        let mut state = self.state();
        if state.actors.remove(&actor_id).is_some() {
            state.subscribers.remove(&actor_id);
            state
                .contacts
                .retain(|(a, b)| *a != actor_id && *b != actor_id);
            state.history.push(WorldEvent::Destroyed(actor_id));
        }
        Ok(())
    }

    fn subscribe_collisions(&self, actor_id: ActorId) -> Result<CollisionReceiver> {
        let mut state = self.state();
        if !state.actors.contains_key(&actor_id) {
            return Err(ActorFactoryError::ActorNotFound { actor_id });
        }
        let (tx, rx) = mpsc::unbounded_channel();
        state.subscribers.entry(actor_id).or_default().push(tx);
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64, y: f64) -> Transform {
        Transform::at(Location::new(x, y, 0.0), 0.0)
    }

    #[test]
    fn test_mock_spawn_vehicle() {
        let world = MockWorld::new();
        let actor_id = world.spawn_actor("vehicle.audi.a2", &at(0.0, 0.0)).unwrap();
        assert!(actor_id >= 1000);
        assert_eq!(world.actor_count(), 1);
        assert_eq!(world.blueprint_of(actor_id).as_deref(), Some("vehicle.audi.a2"));
    }

    #[test]
    fn test_mock_destroy_idempotent() {
        let world = MockWorld::new();
        let actor_id = world.spawn_actor("vehicle.audi.a2", &at(0.0, 0.0)).unwrap();
        world.destroy_actor(actor_id).unwrap();
        // Second destroy should also succeed
        world.destroy_actor(actor_id).unwrap();
        assert_eq!(world.actor_count(), 0);
    }

    #[test]
    fn test_overlapping_spawn_rejected() {
        let world = MockWorld::new();
        world.spawn_actor("vehicle.audi.a2", &at(10.0, 0.0)).unwrap();
        let err = world
            .spawn_actor("vehicle.audi.a2", &at(11.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, ActorFactoryError::SpawnRejected { .. }));
        assert_eq!(world.actor_count(), 1);
    }

    #[test]
    fn test_injected_and_unknown_blueprint_rejections() {
        let world = MockWorld::with_config(MockWorldConfig {
            blueprints: vec!["vehicle.audi.a2".into()],
            reject_spawn_attempts: vec![0],
            ..Default::default()
        });
        assert!(world.spawn_actor("vehicle.audi.a2", &at(0.0, 0.0)).is_err());
        assert!(world.spawn_actor("vehicle.tesla.cybertruck", &at(0.0, 0.0)).is_err());
        assert!(world.spawn_actor("vehicle.audi.a2", &at(0.0, 0.0)).is_ok());

        let rejected = world
            .history()
            .iter()
            .filter(|e| matches!(e, WorldEvent::SpawnAttempt { actor_id: None, .. }))
            .count();
        assert_eq!(rejected, 2);
    }

    #[test]
    fn test_map_unavailable() {
        let world = MockWorld::with_config(MockWorldConfig {
            map_loaded: false,
            ..Default::default()
        });
        assert!(matches!(
            world.map(),
            Err(ActorFactoryError::ResourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_waypoint_queries() {
        let map = MockMap::new("Town01", RoadConfig::default(), 0.0, 0);

        let wp = map.waypoint_at(&Location::new(10.2, 0.4, 0.5)).unwrap();
        assert_eq!(wp.lane_id, 1);
        assert!((wp.s - 10.2).abs() < 1e-9);
        assert_eq!(wp.transform.location.y, 0.0);

        let ahead = map.next(&wp, 50.0);
        assert_eq!(ahead.len(), 1);
        assert!((ahead[0].s - 60.2).abs() < 1e-9);

        let left = map.left_lane(&ahead[0]).unwrap();
        assert_eq!(left.lane_id, 2);
        assert!((left.transform.location.y + 3.5).abs() < 1e-9);
        assert!(map.left_lane(&left).is_none());

        assert!(map.next(&wp, 2000.0).is_empty());
        assert!(map.waypoint_at(&Location::new(-5.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_forks_return_every_branch() {
        let map = MockMap::new("Town01", RoadConfig::default(), 0.0, 2);
        let wp = map.waypoint_at(&Location::new(0.0, 0.0, 0.0)).unwrap();
        let branches = map.next(&wp, 20.0);
        assert_eq!(
            branches.iter().map(|w| w.road_id).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_advance_reports_contact_once() {
        let world = MockWorld::new();
        let follower = world.spawn_actor("vehicle.lincoln.mkz_2017", &at(0.0, 0.0)).unwrap();
        let leader = world.spawn_actor("vehicle.audi.a2", &at(10.0, 0.0)).unwrap();
        let mut rx = world.subscribe_collisions(follower).unwrap();

        world.set_autopilot(follower, true).unwrap();
        world.set_speed(follower, 10.0).unwrap();

        let mut events = Vec::new();
        for _ in 0..20 {
            events.extend(world.advance(0.1));
        }

        // follower drives into the parked leader and stays in contact
        assert_eq!(events.len(), 2);
        let received = rx.try_recv().unwrap();
        assert_eq!(received.actor_id, follower);
        assert_eq!(received.other_actor_id, Some(leader));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_injected_collision_reaches_subscriber() {
        let world = MockWorld::new();
        let actor = world.spawn_actor("vehicle.audi.a2", &at(0.0, 0.0)).unwrap();
        let mut rx = world.subscribe_collisions(actor).unwrap();
        world.inject_collision(actor, None);
        assert_eq!(rx.try_recv().unwrap().other_actor_id, None);
    }
}
