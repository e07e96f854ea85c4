//! Session orchestrator - world, ego fleet, scenario and tick loop.
//!
//! Runs against the in-process mock world; the ego fleet cruises under
//! autopilot so the scenario sees a moving reference actor.

use std::time::{Duration, Instant};

use actor_factory::{ActorFactory, ActorRoster, MockWorld, MockWorldConfig, WorldHandle};
use anyhow::{Context, Result};
use contracts::ScenarioConfiguration;
use scenario_runner::{
    LowVisibilityNightDriving, Scenario, ScenarioManager, ScenarioOptions, ScenarioOutcome,
    StopReason,
};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::RunStats;
use crate::error::CliError;

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Loaded scenario configuration
    pub scenario: ScenarioConfiguration,

    /// Tick limit (None = until failure or shutdown)
    pub max_ticks: Option<u64>,

    /// Pace ticks to `fixed_delta_s` of wall-clock time
    pub realtime: bool,

    pub options: ScenarioOptions,
}

/// Runs one scenario from setup to teardown
pub struct Session {
    config: SessionConfig,
}

type NightDrivingManager = ScenarioManager<LowVisibilityNightDriving<MockWorld>>;

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Run the session to completion
    ///
    /// Auxiliary actors and the ego fleet are always released, including
    /// when the run is cancelled.
    pub async fn run(self) -> Result<RunStats> {
        let start_time = Instant::now();
        let scenario_config = &self.config.scenario;
        let period = tick_period(scenario_config.simulation.fixed_delta_s)?;

        let world = MockWorld::with_config(MockWorldConfig::from_simulation(
            &scenario_config.town,
            &scenario_config.simulation,
        ));
        info!(town = %scenario_config.town, "Mock world initialized");

        // Spawn ego fleet
        let factory = ActorFactory::new(world.clone());
        let roster = factory
            .spawn_ego_vehicles(&scenario_config.ego_vehicles)
            .context("Failed to spawn ego vehicles")?;
        info!(vehicles = roster.len(), "Ego vehicles spawned");

        let manager = match self.prepare(&world, &roster) {
            Ok(manager) => manager,
            Err(e) => {
                factory.teardown(&roster);
                return Err(e);
            }
        };

        let (mut manager, outcome) = self.drive(&world, manager, period).await;

        // Cleanup
        let population = manager.scenario().population_report().cloned();
        let auxiliary_released = manager.scenario_mut().teardown();
        factory.teardown(&roster);
        info!(auxiliary_released, "Session teardown completed");

        Ok(RunStats {
            outcome,
            ego_vehicles: roster.len(),
            population,
            auxiliary_released,
            wall_time: start_time.elapsed(),
            metrics: manager.aggregator().summary(),
        })
    }

    fn prepare(&self, world: &MockWorld, roster: &ActorRoster) -> Result<NightDrivingManager> {
        let scenario_config = &self.config.scenario;
        let simulation = &scenario_config.simulation;

        for actor_id in &roster.order {
            world
                .set_autopilot(*actor_id, true)
                .and_then(|()| world.set_speed(*actor_id, simulation.ego_speed_mps))
                .context("Failed to hand ego vehicle to autopilot")?;
        }

        let scenario = LowVisibilityNightDriving::construct(
            world.clone(),
            roster,
            scenario_config,
            self.config.options,
            scenario_config.timeout_s,
        )
        .map_err(|e| CliError::setup(e.to_string()))?;

        info!(
            scenario = scenario.name(),
            criteria = scenario.criteria().len(),
            timeout_s = scenario.timeout(),
            "Scenario constructed"
        );

        Ok(ScenarioManager::new(scenario, simulation.fixed_delta_s)
            .with_max_ticks(self.config.max_ticks))
    }

    /// Tick loop, stops on a terminal verdict, the tick limit or a signal
    async fn drive(
        &self,
        world: &MockWorld,
        mut manager: NightDrivingManager,
        period: Duration,
    ) -> (NightDrivingManager, ScenarioOutcome) {
        if self.config.max_ticks == Some(0) {
            let outcome = manager.outcome(StopReason::TickLimit);
            return (manager, outcome);
        }

        let delta = manager.clock().delta;
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        info!(realtime = self.config.realtime, delta, "Starting tick loop...");

        loop {
            if self.config.realtime {
                tokio::select! {
                    _ = interval.tick() => {}
                    _ = &mut shutdown => {
                        warn!("Received shutdown signal, stopping scenario...");
                        let outcome = manager.outcome(StopReason::Cancelled);
                        return (manager, outcome);
                    }
                }
            } else {
                tokio::select! {
                    biased;
                    _ = &mut shutdown => {
                        warn!("Received shutdown signal, stopping scenario...");
                        let outcome = manager.outcome(StopReason::Cancelled);
                        return (manager, outcome);
                    }
                    _ = tokio::task::yield_now() => {}
                }
            }

            world.advance(delta);
            let meta = manager.tick();
            if let Some(reason) = manager.stop_reason(&meta) {
                let outcome = manager.outcome(reason);
                info!(
                    verdict = %outcome.verdict,
                    reason = %reason,
                    ticks = outcome.ticks,
                    "Scenario stopped"
                );
                return (manager, outcome);
            }
        }
    }
}

/// Wall-clock length of one tick, non-zero
fn tick_period(delta: f64) -> Result<Duration, CliError> {
    Duration::try_from_secs_f64(delta)
        .ok()
        .filter(|period| !period.is_zero())
        .ok_or_else(|| {
            CliError::setup(format!(
                "simulation.fixed_delta_s must be a finite positive duration, got {delta}"
            ))
        })
}

/// Ctrl+C or SIGTERM
///
/// A handler that cannot be installed never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
