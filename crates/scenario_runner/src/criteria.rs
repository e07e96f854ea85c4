//! Termination criteria
//!
//! Independently evaluated judges polled once per tick. A criterion starts
//! `Running` and may move to `Failure`, after which it never changes.

use std::fmt;

use actor_factory::{ActorId, CollisionReceiver, WorldHandle};
use contracts::{CollisionEvent, Verdict};
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{info, warn};

use crate::error::Result;
use crate::tree::SimulationClock;

#[derive(Debug)]
pub enum Criterion {
    Collision(CollisionCriterion),
    Timeout(TimeoutCriterion),
}

impl Criterion {
    pub fn name(&self) -> &str {
        match self {
            Self::Collision(c) => &c.name,
            Self::Timeout(c) => &c.name,
        }
    }

    pub fn verdict(&self) -> Verdict {
        match self {
            Self::Collision(c) => c.verdict,
            Self::Timeout(c) => c.verdict,
        }
    }

    /// Evaluate against the current tick
    pub fn update(&mut self, clock: &SimulationClock) -> Verdict {
        match self {
            Self::Collision(c) => c.update(clock),
            Self::Timeout(c) => c.update(clock),
        }
    }

    pub fn report(&self) -> CriterionReport {
        let detail = match self {
            Self::Collision(c) => match c.events.first() {
                Some(first) => format!(
                    "{} collision(s), first with {} at t={:.2}s",
                    c.events.len(),
                    first
                        .other_actor_id
                        .map_or_else(|| "static geometry".to_string(), |id| format!("actor {id}")),
                    first.timestamp
                ),
                None => "no collision".to_string(),
            },
            Self::Timeout(c) => format!("{:.2}s of {:.2}s", c.elapsed, c.timeout_s),
        };
        CriterionReport {
            name: self.name().to_string(),
            verdict: self.verdict(),
            detail,
        }
    }
}

/// Final state of one criterion
#[derive(Debug, Clone, PartialEq)]
pub struct CriterionReport {
    pub name: String,
    pub verdict: Verdict,
    pub detail: String,
}

impl fmt::Display for CriterionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.name, self.verdict, self.detail)
    }
}

/// Fails on the first collision involving the monitored actor
#[derive(Debug)]
pub struct CollisionCriterion {
    name: String,
    actor_id: ActorId,
    receiver: CollisionReceiver,
    verdict: Verdict,
    events: Vec<CollisionEvent>,
}

impl CollisionCriterion {
    /// Subscribes to the actor's collision stream
    pub fn new<W: WorldHandle>(world: &W, actor_id: ActorId, label: &str) -> Result<Self> {
        let receiver = world.subscribe_collisions(actor_id)?;
        Ok(Self {
            name: format!("CollisionTest({label})"),
            actor_id,
            receiver,
            verdict: Verdict::Running,
            events: Vec::new(),
        })
    }

    pub fn actor_id(&self) -> ActorId {
        self.actor_id
    }

    /// Collisions observed so far
    pub fn events(&self) -> &[CollisionEvent] {
        &self.events
    }

    fn update(&mut self, clock: &SimulationClock) -> Verdict {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => self.events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // actor gone, nothing more can arrive
                    break;
                }
            }
        }

        if self.verdict == Verdict::Running && !self.events.is_empty() {
            self.verdict = Verdict::Failure;
            warn!(
                criterion = %self.name,
                actor_id = self.actor_id,
                other = ?self.events[0].other_actor_id,
                tick = clock.tick,
                "collision detected"
            );
        }
        self.verdict
    }
}

/// Fails once simulated time exceeds the timeout
#[derive(Debug)]
pub struct TimeoutCriterion {
    name: String,
    timeout_s: f64,
    elapsed: f64,
    verdict: Verdict,
}

impl TimeoutCriterion {
    pub fn new(timeout_s: f64) -> Self {
        Self {
            name: "TimeoutCriterion".to_string(),
            timeout_s,
            elapsed: 0.0,
            verdict: Verdict::Running,
        }
    }

    pub fn timeout_s(&self) -> f64 {
        self.timeout_s
    }

    fn update(&mut self, clock: &SimulationClock) -> Verdict {
        self.elapsed = clock.elapsed;
        if self.verdict == Verdict::Running && clock.elapsed > self.timeout_s {
            self.verdict = Verdict::Failure;
            info!(timeout_s = self.timeout_s, elapsed = clock.elapsed, "scenario timed out");
        }
        self.verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actor_factory::MockWorld;
    use contracts::{Location, Transform};

    fn clock_at(ticks: u64, delta: f64) -> SimulationClock {
        let mut clock = SimulationClock::new(delta);
        for _ in 0..ticks {
            clock.advance();
        }
        clock
    }

    fn spawn(world: &MockWorld, x: f64) -> ActorId {
        world
            .spawn_actor("vehicle.audi.a2", &Transform::at(Location::new(x, 0.0, 0.0), 0.0))
            .unwrap()
    }

    #[test]
    fn test_collision_fails_and_stays_failed() {
        let world = MockWorld::new();
        let hero = spawn(&world, 0.0);
        let mut criterion = Criterion::Collision(CollisionCriterion::new(&world, hero, "hero").unwrap());
        assert_eq!(criterion.name(), "CollisionTest(hero)");

        assert_eq!(criterion.update(&clock_at(1, 0.05)), Verdict::Running);

        world.inject_collision(hero, None);
        assert_eq!(criterion.update(&clock_at(2, 0.05)), Verdict::Failure);

        // nothing new, still failed
        for tick in 3..10 {
            assert_eq!(criterion.update(&clock_at(tick, 0.05)), Verdict::Failure);
        }
        assert!(criterion.report().detail.contains("static geometry"));
    }

    #[test]
    fn test_collision_ignores_other_actors() {
        let world = MockWorld::new();
        let hero = spawn(&world, 0.0);
        let other = spawn(&world, 100.0);
        let mut criterion = CollisionCriterion::new(&world, hero, "hero").unwrap();

        world.inject_collision(other, None);
        assert_eq!(criterion.update(&clock_at(1, 0.05)), Verdict::Running);

        world.inject_collision(hero, Some(other));
        world.inject_collision(hero, Some(other));
        assert_eq!(criterion.update(&clock_at(2, 0.05)), Verdict::Failure);
        assert_eq!(criterion.events().len(), 2);
        assert_eq!(criterion.events()[0].other_actor_id, Some(other));
    }

    #[test]
    fn test_collision_survives_destroyed_actor() {
        let world = MockWorld::new();
        let hero = spawn(&world, 0.0);
        let mut criterion = CollisionCriterion::new(&world, hero, "hero").unwrap();

        world.destroy_actor(hero).unwrap();
        assert_eq!(criterion.update(&clock_at(1, 0.05)), Verdict::Running);
    }

    #[test]
    fn test_subscribe_unknown_actor_fails() {
        let world = MockWorld::new();
        assert!(CollisionCriterion::new(&world, 999, "ghost").is_err());
    }

    #[test]
    fn test_timeout() {
        let mut criterion = Criterion::Timeout(TimeoutCriterion::new(1.0));

        assert_eq!(criterion.update(&clock_at(4, 0.25)), Verdict::Running);
        assert_eq!(criterion.update(&clock_at(5, 0.25)), Verdict::Failure);
        assert_eq!(criterion.update(&clock_at(6, 0.25)), Verdict::Failure);
        assert_eq!(criterion.report().to_string(), "TimeoutCriterion: FAILURE (1.50s of 1.00s)");
    }
}
