//! LowVisibilityNightDriving
//!
//! Dark, foggy, rainy night with traffic placed ahead of the first ego
//! vehicle. The behavior is a single sequence:
//!
//! ```text
//! LowVisibilityNightDriving
//!   ApplyWeather
//!   PopulateAuxiliaryActors
//!   WaitIndefinitely
//! ```
//!
//! It never completes on its own; the run ends when a criterion fails or
//! the harness stops it.

use actor_factory::{ActorId, ActorRoster, WorldHandle};
use contracts::{ContractError, NodeStatus, ScenarioConfiguration, WeatherParameters};
use observability::metrics::record_actors_released;
use tracing::{debug, error, info, instrument};

use crate::criteria::{CollisionCriterion, Criterion, TimeoutCriterion};
use crate::error::{Result, ScenarioError};
use crate::population::{PopulateAuxiliaryActors, PopulationReport};
use crate::scenario::{Scenario, ScenarioOptions};
use crate::tree::{ActionKind, BehaviorNode, ScenarioBlackboard, SimulationClock, TickContext};
use crate::weather::ApplyWeather;

pub const SCENARIO_NAME: &str = "LowVisibilityNightDriving";

pub struct LowVisibilityNightDriving<W: WorldHandle> {
    world: W,
    name: String,
    timeout: f64,
    ego_actors: Vec<ActorId>,
    weather: WeatherParameters,
    options: ScenarioOptions,
    behavior: BehaviorNode,
    criteria: Vec<Criterion>,
    blackboard: ScenarioBlackboard,
}

impl<W: WorldHandle> LowVisibilityNightDriving<W> {
    /// Build the scenario for an already spawned ego fleet
    ///
    /// # Errors
    /// - `Configuration` if `ego_actors` is empty, the weather is out of
    ///   range or the population spacing is not positive
    /// - `ResourceUnavailable` if the world has no map
    #[instrument(
        name = "night_driving_construct",
        skip_all,
        fields(egos = ego_actors.len(), timeout = timeout)
    )]
    pub fn construct(
        world: W,
        ego_actors: &ActorRoster,
        config: &ScenarioConfiguration,
        options: ScenarioOptions,
        timeout: f64,
    ) -> Result<Self> {
        if ego_actors.is_empty() {
            return Err(ScenarioError::configuration(
                "ego_vehicles",
                "at least one ego actor is required",
            ));
        }
        if !timeout.is_finite() || timeout <= 0.0 {
            return Err(ScenarioError::configuration("timeout_s", "must be positive"));
        }
        if !config.population.step_m.is_finite() || config.population.step_m <= 0.0 {
            return Err(ScenarioError::configuration(
                "population.step_m",
                "must be positive",
            ));
        }

        let weather = config
            .weather
            .as_ref()
            .map_or(WeatherParameters::LOW_VISIBILITY_NIGHT, |preset| preset.parameters())
            .validated()
            .map_err(|e| match e {
                ContractError::ConfigValidation { field, message } => {
                    ScenarioError::Configuration { field, message }
                }
                other => ScenarioError::Contract(other),
            })?;

        if let Err(e) = world.map() {
            return Err(ScenarioError::resource_unavailable(e.to_string()));
        }

        let ego_ids = ego_actors.actor_ids();
        let behavior = build_behavior(weather, ego_ids[0], config, options.randomize);
        let criteria = if options.criteria_enable {
            build_criteria(&world, ego_actors, timeout)?
        } else {
            Vec::new()
        };

        info!(
            name = SCENARIO_NAME,
            criteria = criteria.len(),
            randomize = options.randomize,
            "scenario constructed"
        );

        Ok(Self {
            world,
            name: SCENARIO_NAME.to_string(),
            timeout,
            ego_actors: ego_ids,
            weather,
            options,
            behavior,
            criteria,
            blackboard: ScenarioBlackboard::default(),
        })
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn weather(&self) -> &WeatherParameters {
        &self.weather
    }

    pub fn options(&self) -> ScenarioOptions {
        self.options
    }

    /// None until the population step ran
    pub fn population_report(&self) -> Option<&PopulationReport> {
        self.blackboard.population.as_ref()
    }
}

/// Weather, then population, then wait forever
pub fn build_behavior(
    weather: WeatherParameters,
    reference: ActorId,
    config: &ScenarioConfiguration,
    randomize: bool,
) -> BehaviorNode {
    BehaviorNode::sequence(
        SCENARIO_NAME,
        vec![
            BehaviorNode::action("ApplyWeather", ActionKind::ApplyWeather(ApplyWeather::new(weather))),
            BehaviorNode::action(
                "PopulateAuxiliaryActors",
                ActionKind::PopulateAuxiliaryActors(PopulateAuxiliaryActors::new(
                    reference,
                    &config.population,
                    randomize,
                )),
            ),
            BehaviorNode::action("WaitIndefinitely", ActionKind::WaitIndefinitely),
        ],
    )
}

/// One collision criterion per ego actor, then the timeout
pub fn build_criteria<W: WorldHandle>(
    world: &W,
    ego_actors: &ActorRoster,
    timeout: f64,
) -> Result<Vec<Criterion>> {
    let mut criteria = Vec::with_capacity(ego_actors.len() + 1);
    for actor_id in &ego_actors.order {
        let label = ego_actors
            .actor_to_role
            .get(actor_id)
            .cloned()
            .unwrap_or_else(|| actor_id.to_string());
        criteria.push(Criterion::Collision(CollisionCriterion::new(
            world, *actor_id, &label,
        )?));
    }
    criteria.push(Criterion::Timeout(TimeoutCriterion::new(timeout)));
    Ok(criteria)
}

impl<W: WorldHandle> Scenario for LowVisibilityNightDriving<W> {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> f64 {
        self.timeout
    }

    fn ego_actors(&self) -> &[ActorId] {
        &self.ego_actors
    }

    fn behavior(&self) -> &BehaviorNode {
        &self.behavior
    }

    fn tick_behavior(&mut self, clock: &SimulationClock) -> NodeStatus {
        let mut ctx = TickContext::new(&self.world, &mut self.blackboard, *clock);
        let status = self.behavior.tick(&mut ctx);
        if self.options.debug_mode {
            debug!(tick = clock.tick, tree = %self.behavior.describe(), "behavior tree");
        }
        status
    }

    fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    fn criteria_mut(&mut self) -> &mut [Criterion] {
        &mut self.criteria
    }

    fn owned_actors(&self) -> &[ActorId] {
        &self.blackboard.owned_actors
    }

    #[instrument(name = "night_driving_teardown", skip(self), fields(owned = self.blackboard.owned_actors.len()))]
    fn teardown(&mut self) -> usize {
        let mut released = 0;
        // reverse spawn order
        while let Some(actor_id) = self.blackboard.owned_actors.pop() {
            match self.world.destroy_actor(actor_id) {
                Ok(()) => released += 1,
                Err(e) => error!(actor_id, error = %e, "failed to release auxiliary actor"),
            }
        }
        if released > 0 {
            info!(released, "auxiliary actors released");
            record_actors_released(released);
        }
        released
    }
}
