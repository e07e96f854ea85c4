//! Behavior tree
//!
//! A closed set of node variants ticked by the scenario loop:
//!
//! - **Sequence**: ticks children in order, advances on `Success`,
//!   aborts on `Failure`
//! - **Action**: performs work against the world (weather, population, wait)
//! - **Condition**: evaluates a predicate, `Success` if it holds
//!
//! Every tick returns a [`NodeStatus`]. Terminal nodes keep their status
//! until [`BehaviorNode::reset`] is called.

use std::fmt::Write as _;

use actor_factory::{ActorId, WorldHandle};
use contracts::NodeStatus;

use crate::population::{PopulateAuxiliaryActors, PopulationReport};
use crate::weather::ApplyWeather;

/// Simulation time as seen by the tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationClock {
    /// Ticks performed so far
    pub tick: u64,
    /// Simulated seconds since the scenario started
    pub elapsed: f64,
    /// Seconds per tick
    pub delta: f64,
}

impl SimulationClock {
    pub fn new(delta: f64) -> Self {
        Self {
            tick: 0,
            elapsed: 0.0,
            delta,
        }
    }

    /// Move to the next tick
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed = self.tick as f64 * self.delta;
    }
}

/// State shared between the nodes of one scenario
#[derive(Debug, Default)]
pub struct ScenarioBlackboard {
    /// Auxiliary actors the scenario spawned, in spawn order
    pub owned_actors: Vec<ActorId>,
    /// Outcome of the population step, once it ran
    pub population: Option<PopulationReport>,
}

/// Everything a node may read or mutate during one tick
pub struct TickContext<'a, W> {
    pub world: &'a W,
    pub blackboard: &'a mut ScenarioBlackboard,
    pub clock: SimulationClock,
}

impl<'a, W> TickContext<'a, W> {
    pub fn new(world: &'a W, blackboard: &'a mut ScenarioBlackboard, clock: SimulationClock) -> Self {
        Self {
            world,
            blackboard,
            clock,
        }
    }
}

/// Behavior tree node
#[derive(Debug)]
pub enum BehaviorNode {
    Sequence(SequenceNode),
    Action(ActionNode),
    Condition(ConditionNode),
}

impl BehaviorNode {
    pub fn sequence(name: impl Into<String>, children: Vec<BehaviorNode>) -> Self {
        Self::Sequence(SequenceNode::new(name, children))
    }

    pub fn action(name: impl Into<String>, kind: ActionKind) -> Self {
        Self::Action(ActionNode::new(name, kind))
    }

    pub fn condition(name: impl Into<String>, kind: ConditionKind) -> Self {
        Self::Condition(ConditionNode::new(name, kind))
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Sequence(node) => &node.name,
            Self::Action(node) => &node.name,
            Self::Condition(node) => &node.name,
        }
    }

    /// Status after the last tick
    pub fn status(&self) -> NodeStatus {
        match self {
            Self::Sequence(node) => node.status,
            Self::Action(node) => node.status,
            Self::Condition(node) => node.status,
        }
    }

    pub fn children(&self) -> &[BehaviorNode] {
        match self {
            Self::Sequence(node) => &node.children,
            _ => &[],
        }
    }

    /// Execute one tick
    pub fn tick<W: WorldHandle>(&mut self, ctx: &mut TickContext<'_, W>) -> NodeStatus {
        match self {
            Self::Sequence(node) => node.tick(ctx),
            Self::Action(node) => node.tick(ctx),
            Self::Condition(node) => node.tick(ctx),
        }
    }

    /// Back to `Invalid`, recursively
    pub fn reset(&mut self) {
        match self {
            Self::Sequence(node) => {
                node.current_child = 0;
                node.status = NodeStatus::Invalid;
                node.children.iter_mut().for_each(BehaviorNode::reset);
            }
            Self::Action(node) => node.status = NodeStatus::Invalid,
            Self::Condition(node) => node.status = NodeStatus::Invalid,
        }
    }

    /// One line per node, indented by depth
    pub fn describe(&self) -> String {
        let mut out = String::new();
        self.describe_into(&mut out, 0);
        out
    }

    fn describe_into(&self, out: &mut String, depth: usize) {
        let kind = match self {
            Self::Sequence(_) => "Sequence",
            Self::Action(_) => "Action",
            Self::Condition(_) => "Condition",
        };
        let _ = writeln!(
            out,
            "{:indent$}{kind} '{}' [{}]",
            "",
            self.name(),
            self.status(),
            indent = depth * 2
        );
        for child in self.children() {
            child.describe_into(out, depth + 1);
        }
    }
}

/// Ordered composite
///
/// Each child must report `Success` before the next one starts; successive
/// ready children run within the same tick.
#[derive(Debug)]
pub struct SequenceNode {
    name: String,
    children: Vec<BehaviorNode>,
    current_child: usize,
    status: NodeStatus,
}

impl SequenceNode {
    pub fn new(name: impl Into<String>, children: Vec<BehaviorNode>) -> Self {
        Self {
            name: name.into(),
            children,
            current_child: 0,
            status: NodeStatus::Invalid,
        }
    }

    /// Index of the child that will be ticked next
    pub fn current_child(&self) -> usize {
        self.current_child
    }

    fn tick<W: WorldHandle>(&mut self, ctx: &mut TickContext<'_, W>) -> NodeStatus {
        if self.status.is_terminal() {
            return self.status;
        }

        while let Some(child) = self.children.get_mut(self.current_child) {
            match child.tick(ctx) {
                NodeStatus::Success => self.current_child += 1,
                NodeStatus::Failure => {
                    self.status = NodeStatus::Failure;
                    return self.status;
                }
                // Invalid never comes out of a tick, treat it as still pending
                NodeStatus::Running | NodeStatus::Invalid => {
                    self.status = NodeStatus::Running;
                    return self.status;
                }
            }
        }

        // All children succeeded
        self.status = NodeStatus::Success;
        self.status
    }
}

/// Leaf that does work
#[derive(Debug)]
pub struct ActionNode {
    name: String,
    kind: ActionKind,
    status: NodeStatus,
}

#[derive(Debug)]
pub enum ActionKind {
    ApplyWeather(ApplyWeather),
    PopulateAuxiliaryActors(PopulateAuxiliaryActors),
    /// Never completes on its own
    WaitIndefinitely,
    /// Fixed status, for composing trees by hand
    Constant(NodeStatus),
}

impl ActionNode {
    pub fn new(name: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            status: NodeStatus::Invalid,
        }
    }

    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    fn tick<W: WorldHandle>(&mut self, ctx: &mut TickContext<'_, W>) -> NodeStatus {
        self.status = match &mut self.kind {
            ActionKind::ApplyWeather(action) => action.execute(ctx),
            ActionKind::PopulateAuxiliaryActors(action) => action.execute(ctx),
            ActionKind::WaitIndefinitely => NodeStatus::Running,
            ActionKind::Constant(status) => *status,
        };
        self.status
    }
}

/// Leaf that checks a predicate
#[derive(Debug)]
pub struct ConditionNode {
    name: String,
    kind: ConditionKind,
    status: NodeStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConditionKind {
    /// Simulated time reached the given seconds
    ElapsedAtLeast(f64),
    /// Actor still present in the world
    ActorAlive(ActorId),
}

impl ConditionNode {
    pub fn new(name: impl Into<String>, kind: ConditionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            status: NodeStatus::Invalid,
        }
    }

    fn tick<W: WorldHandle>(&mut self, ctx: &mut TickContext<'_, W>) -> NodeStatus {
        let holds = match &self.kind {
            ConditionKind::ElapsedAtLeast(seconds) => ctx.clock.elapsed >= *seconds,
            ConditionKind::ActorAlive(actor_id) => ctx.world.actor_exists(*actor_id),
        };
        self.status = if holds {
            NodeStatus::Success
        } else {
            NodeStatus::Failure
        };
        self.status
    }
}
