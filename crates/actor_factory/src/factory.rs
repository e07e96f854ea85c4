//! ActorFactory core implementation
//!
//! Spawns the ego fleet from configuration and manages its lifecycle.

use contracts::{ActorConfiguration, ActorId, ActorRoster};
use tracing::{error, info, instrument, warn};

use crate::error::{ActorFactoryError, Result};
use crate::world::WorldHandle;

/// Actor Factory
///
/// Spawns ego vehicles from `ActorConfiguration`s and provides teardown and
/// rollback. The ego fleet belongs to the harness, never to a scenario.
pub struct ActorFactory<W: WorldHandle> {
    world: W,
}

impl<W: WorldHandle> ActorFactory<W> {
    pub fn new(world: W) -> Self {
        Self { world }
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    /// Spawn every ego vehicle
    ///
    /// # Atomicity
    /// If any spawn fails, all vehicles created so far are destroyed.
    #[instrument(
        name = "actor_factory_spawn_ego_vehicles",
        skip(self, configs),
        fields(vehicle_count = configs.len())
    )]
    pub fn spawn_ego_vehicles(&self, configs: &[ActorConfiguration]) -> Result<ActorRoster> {
        let mut roster = ActorRoster::new();

        for config in configs {
            match self.spawn_vehicle_actor(config) {
                Ok(actor_id) => roster.register(config.rolename.clone(), actor_id),
                Err(e) => {
                    warn!(
                        error = %e,
                        rolename = %config.rolename,
                        "spawn failed, rolling back all actors"
                    );
                    self.teardown(&roster);
                    return Err(e);
                }
            }
        }

        info!(vehicles = roster.len(), "ego vehicles spawned successfully");
        Ok(roster)
    }

    /// Destroy every actor in the roster
    ///
    /// # Idempotency
    /// Safe to call multiple times, already destroyed actors are ignored.
    #[instrument(
        name = "actor_factory_teardown",
        skip(self, roster),
        fields(vehicle_count = roster.len())
    )]
    pub fn teardown(&self, roster: &ActorRoster) {
        info!("starting teardown");

        // reverse spawn order
        for actor_id in roster.order.iter().rev() {
            let role = roster
                .actor_to_role
                .get(actor_id)
                .map(String::as_str)
                .unwrap_or("unknown");
            self.destroy_actor_safe(*actor_id, role);
        }

        info!("teardown completed");
    }

    /// Destroy actor ignoring errors, only logging them
    fn destroy_actor_safe(&self, actor_id: ActorId, rolename: &str) {
        info!(actor_id, rolename, "destroying actor");

        if let Err(e) = self.world.destroy_actor(actor_id) {
            error!(
                actor_id,
                rolename,
                error = %e,
                "failed to destroy actor"
            );
        }
    }

    #[instrument(
        name = "actor_factory_spawn_vehicle_actor",
        skip(self, config),
        fields(rolename = %config.rolename)
    )]
    fn spawn_vehicle_actor(&self, config: &ActorConfiguration) -> Result<ActorId> {
        info!(model = %config.model, "spawning vehicle");
        self.world
            .spawn_actor(&config.model, &config.spawn_point)
            .map_err(|e| ActorFactoryError::VehicleSpawnFailed {
                rolename: config.rolename.clone(),
                message: e.to_string(),
            })
            .inspect(|&actor_id| {
                info!(actor_id, "vehicle spawned successfully");
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_world::{MockWorld, MockWorldConfig};
    use contracts::{Location, Transform};

    fn ego(rolename: &str, x: f64) -> ActorConfiguration {
        ActorConfiguration {
            rolename: rolename.to_string(),
            model: "vehicle.lincoln.mkz_2017".to_string(),
            spawn_point: Transform::at(Location::new(x, 0.0, 0.5), 0.0),
        }
    }

    #[test]
    fn test_spawn_success() {
        let world = MockWorld::new();
        let factory = ActorFactory::new(world.clone());

        let roster = factory
            .spawn_ego_vehicles(&[ego("hero", 0.0), ego("wingman", 20.0)])
            .unwrap();

        assert_eq!(roster.len(), 2);
        assert!(roster.actors.contains_key("hero"));
        assert_eq!(world.actor_count(), 2);
    }

    #[test]
    fn test_spawn_failure_rolls_back() {
        let world = MockWorld::with_config(MockWorldConfig {
            reject_spawn_attempts: vec![1],
            ..Default::default()
        });
        let factory = ActorFactory::new(world.clone());

        let err = factory
            .spawn_ego_vehicles(&[ego("hero", 0.0), ego("wingman", 20.0)])
            .unwrap_err();

        assert!(err.to_string().contains("wingman"), "got: {err}");
        assert_eq!(world.actor_count(), 0);
    }

    #[test]
    fn test_teardown_idempotent() {
        let world = MockWorld::new();
        let factory = ActorFactory::new(world.clone());
        let roster = factory.spawn_ego_vehicles(&[ego("hero", 0.0)]).unwrap();

        factory.teardown(&roster);
        // Second teardown should also succeed
        factory.teardown(&roster);
        assert_eq!(world.actor_count(), 0);
    }

    #[test]
    fn test_empty_fleet() {
        let factory = ActorFactory::new(MockWorld::new());
        let roster = factory.spawn_ego_vehicles(&[]).unwrap();
        assert!(roster.is_empty());
    }
}
