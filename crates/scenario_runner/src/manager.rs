//! Scenario manager
//!
//! Drives a [`Scenario`] one tick at a time: the behavior is ticked once,
//! then every criterion is updated once. The aggregated verdict is
//!
//! - `Failure` if the behavior failed or any criterion failed
//! - `Success` if the behavior succeeded and no criterion failed
//! - `Running` otherwise

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use contracts::{NodeStatus, TickMeta, Verdict};
use observability::metrics::record_tick_metrics;
use observability::ScenarioMetricsAggregator;
use tracing::{info, instrument, warn};

use crate::criteria::{Criterion, CriterionReport};
use crate::scenario::Scenario;
use crate::tree::SimulationClock;

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A criterion reported FAILURE
    CriterionFailed,
    /// The root behavior reached SUCCESS or FAILURE
    BehaviorFinished,
    /// `max_ticks` reached
    TickLimit,
    /// Stopped by the harness
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CriterionFailed => "criterion failed",
            Self::BehaviorFinished => "behavior finished",
            Self::TickLimit => "tick limit reached",
            Self::Cancelled => "cancelled",
        })
    }
}

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub scenario: String,
    pub verdict: Verdict,
    pub stop_reason: StopReason,
    pub ticks: u64,
    /// Simulated seconds
    pub elapsed: f64,
    pub behavior: NodeStatus,
    pub criteria: Vec<CriterionReport>,
}

impl fmt::Display for ScenarioOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scenario: {}", self.scenario)?;
        writeln!(f, "Verdict: {} ({})", self.verdict, self.stop_reason)?;
        writeln!(f, "Ticks: {} ({:.2}s simulated)", self.ticks, self.elapsed)?;
        writeln!(f, "Behavior: {}", self.behavior)?;
        for report in &self.criteria {
            writeln!(f, "  {report}")?;
        }
        Ok(())
    }
}

/// Aggregate the behavior status and criterion verdicts
pub fn aggregate_verdict(behavior: NodeStatus, criteria: &[Criterion]) -> Verdict {
    let criterion_failed = criteria.iter().any(|c| c.verdict() == Verdict::Failure);
    match behavior {
        NodeStatus::Failure => Verdict::Failure,
        _ if criterion_failed => Verdict::Failure,
        NodeStatus::Success => Verdict::Success,
        NodeStatus::Running | NodeStatus::Invalid => Verdict::Running,
    }
}

pub struct ScenarioManager<S: Scenario> {
    scenario: S,
    clock: SimulationClock,
    max_ticks: Option<u64>,
    behavior: NodeStatus,
    verdict: Verdict,
    cancelled: Arc<AtomicBool>,
    aggregator: ScenarioMetricsAggregator,
}

impl<S: Scenario> ScenarioManager<S> {
    pub fn new(scenario: S, fixed_delta_s: f64) -> Self {
        Self {
            scenario,
            clock: SimulationClock::new(fixed_delta_s),
            max_ticks: None,
            behavior: NodeStatus::Invalid,
            verdict: Verdict::Running,
            cancelled: Arc::new(AtomicBool::new(false)),
            aggregator: ScenarioMetricsAggregator::new(),
        }
    }

    pub fn with_max_ticks(mut self, max_ticks: Option<u64>) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Flag checked between ticks by [`run`](Self::run)
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn scenario(&self) -> &S {
        &self.scenario
    }

    pub fn scenario_mut(&mut self) -> &mut S {
        &mut self.scenario
    }

    pub fn into_scenario(self) -> S {
        self.scenario
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn aggregator(&self) -> &ScenarioMetricsAggregator {
        &self.aggregator
    }

    /// One behavior tick plus one evaluation pass of every criterion
    pub fn tick(&mut self) -> TickMeta {
        let started = Instant::now();
        self.clock.advance();
        let clock = self.clock;

        self.behavior = self.scenario.tick_behavior(&clock);

        let mut failed_criteria = Vec::new();
        for criterion in self.scenario.criteria_mut() {
            let before = criterion.verdict();
            let after = criterion.update(&clock);
            if after == Verdict::Failure && before != Verdict::Failure {
                failed_criteria.push(criterion.name().to_string());
            }
        }

        self.verdict = aggregate_verdict(self.behavior, self.scenario.criteria());

        let meta = TickMeta {
            tick: clock.tick,
            elapsed: clock.elapsed,
            behavior: self.behavior,
            verdict: self.verdict,
            failed_criteria,
            owned_actors: self.scenario.owned_actors().len(),
            tick_duration_ms: started.elapsed().as_secs_f64() * 1000.0,
        };
        record_tick_metrics(&meta);
        self.aggregator.update(&meta);
        meta
    }

    /// Whether the run should stop after `meta`
    pub fn stop_reason(&self, meta: &TickMeta) -> Option<StopReason> {
        if self.verdict == Verdict::Failure && !meta.behavior.is_terminal() {
            return Some(StopReason::CriterionFailed);
        }
        if meta.behavior.is_terminal() {
            return Some(StopReason::BehaviorFinished);
        }
        if self.cancelled.load(Ordering::Relaxed) {
            return Some(StopReason::Cancelled);
        }
        match self.max_ticks {
            Some(max) if meta.tick >= max => Some(StopReason::TickLimit),
            _ => None,
        }
    }

    pub fn outcome(&self, stop_reason: StopReason) -> ScenarioOutcome {
        ScenarioOutcome {
            scenario: self.scenario.name().to_string(),
            verdict: self.verdict,
            stop_reason,
            ticks: self.clock.tick,
            elapsed: self.clock.elapsed,
            behavior: self.behavior,
            criteria: self.scenario.criteria().iter().map(Criterion::report).collect(),
        }
    }

    /// Tick until the verdict is terminal, the tick limit is hit or the run
    /// is cancelled
    ///
    /// `step` advances the simulation by the given seconds before each tick.
    #[instrument(name = "scenario_run", skip_all, fields(scenario = %self.scenario.name()))]
    pub fn run<F: FnMut(f64)>(&mut self, mut step: F) -> ScenarioOutcome {
        if self.cancelled.load(Ordering::Relaxed) {
            return self.outcome(StopReason::Cancelled);
        }
        if self.max_ticks == Some(0) {
            return self.outcome(StopReason::TickLimit);
        }

        loop {
            step(self.clock.delta);
            let meta = self.tick();
            if let Some(reason) = self.stop_reason(&meta) {
                let outcome = self.outcome(reason);
                match outcome.verdict {
                    Verdict::Failure => warn!(
                        reason = %reason,
                        ticks = outcome.ticks,
                        "scenario failed"
                    ),
                    _ => info!(
                        verdict = %outcome.verdict,
                        reason = %reason,
                        ticks = outcome.ticks,
                        "scenario stopped"
                    ),
                }
                return outcome;
            }
        }
    }
}
