//! Tick statuses and verdicts
//!
//! `NodeStatus` is what a behavior tree node reports after a tick,
//! `Verdict` is what a criterion (or a whole scenario) currently judges.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The status returned by a behavior tree node after being ticked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeStatus {
    /// Not ticked yet, or reset
    #[default]
    Invalid,
    /// Still executing, needs more ticks
    Running,
    Success,
    Failure,
}

impl NodeStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, NodeStatus::Running)
    }

    /// Success or Failure
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeStatus::Success | NodeStatus::Failure)
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeStatus::Invalid => write!(f, "INVALID"),
            NodeStatus::Running => write!(f, "RUNNING"),
            NodeStatus::Success => write!(f, "SUCCESS"),
            NodeStatus::Failure => write!(f, "FAILURE"),
        }
    }
}

/// Pass/fail judgement of a criterion or of a whole scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    #[default]
    Running,
    Success,
    Failure,
}

impl Verdict {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Verdict::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Running => "RUNNING",
            Verdict::Success => "SUCCESS",
            Verdict::Failure => "FAILURE",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-tick metadata produced by the scenario manager
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickMeta {
    /// Tick number, starting at 1
    pub tick: u64,

    /// Simulation time at this tick, seconds
    pub elapsed: f64,

    /// Root behavior status after the tick
    pub behavior: NodeStatus,

    /// Aggregated scenario verdict after the tick
    pub verdict: Verdict,

    /// Names of criteria that reported FAILURE during this tick
    pub failed_criteria: Vec<String>,

    /// Auxiliary actors currently owned by the scenario
    pub owned_actors: usize,

    /// Wall-clock time spent in the tick, milliseconds
    pub tick_duration_ms: f64,
}
