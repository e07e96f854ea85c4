//! # Scenario Runner
//!
//! Execution core of the LowVisibilityNightDriving scenario.
//!
//! Responsibilities:
//! - Behavior tree (sequence / action / condition) ticked once per step
//! - Weather and auxiliary traffic setup actions
//! - Collision and timeout criteria
//! - Scenario lifecycle and explicit teardown of owned actors
//! - Tick loop with verdict aggregation

pub mod criteria;
pub mod error;
pub mod manager;
pub mod night_driving;
pub mod population;
pub mod scenario;
pub mod tree;
pub mod weather;

pub use criteria::{CollisionCriterion, Criterion, CriterionReport, TimeoutCriterion};
pub use error::{Result, ScenarioError};
pub use manager::{aggregate_verdict, ScenarioManager, ScenarioOutcome, StopReason};
pub use night_driving::{LowVisibilityNightDriving, SCENARIO_NAME};
pub use population::{
    LaneRule, PlacementOutcome, PlacementRequest, PopulateAuxiliaryActors, PopulationReport,
    SkipReason, SlotReport,
};
pub use scenario::{Scenario, ScenarioOptions};
pub use tree::{
    ActionKind, ActionNode, BehaviorNode, ConditionKind, ConditionNode, ScenarioBlackboard,
    SequenceNode, SimulationClock, TickContext,
};
pub use weather::ApplyWeather;
