//! Scenario trait
//!
//! What the harness sees of a scenario: identity, the root behavior, the
//! criteria used for pass/fail aggregation, and explicit teardown.

use actor_factory::ActorId;
use contracts::NodeStatus;

use crate::criteria::Criterion;
use crate::tree::{BehaviorNode, SimulationClock};

/// Construction flags passed by the harness
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioOptions {
    /// Draw auxiliary blueprints from the configured pool
    pub randomize: bool,
    /// Log the tree after every tick
    pub debug_mode: bool,
    /// Register termination criteria
    pub criteria_enable: bool,
}

impl Default for ScenarioOptions {
    fn default() -> Self {
        Self {
            randomize: false,
            debug_mode: false,
            criteria_enable: true,
        }
    }
}

pub trait Scenario {
    fn name(&self) -> &str;

    /// Seconds
    fn timeout(&self) -> f64;

    /// Externally owned participants, never released by the scenario
    fn ego_actors(&self) -> &[ActorId];

    /// Root behavior node
    fn behavior(&self) -> &BehaviorNode;

    /// Tick the root behavior once
    fn tick_behavior(&mut self, clock: &SimulationClock) -> NodeStatus;

    fn criteria(&self) -> &[Criterion];

    fn criteria_mut(&mut self) -> &mut [Criterion];

    /// Auxiliary actors currently owned
    fn owned_actors(&self) -> &[ActorId];

    /// Release every owned actor
    ///
    /// Idempotent, returns how many actors this call released.
    fn teardown(&mut self) -> usize;
}
