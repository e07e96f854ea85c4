//! "PopulateAuxiliaryActors" action
//!
//! Places `count` auxiliary actors ahead of a reference actor:
//!
//! 1. Resolve the reference pose to a road waypoint
//! 2. Advance `step * (i + 1)` meters, taking the first branch
//! 3. Even slots move one lane to the left when that lane exists
//! 4. Spawn, hand the actor to the autopilot and record it as owned
//!
//! Every failure is local to its slot. The action reports `Success` once all
//! slots were attempted and records a [`PopulationReport`].

use std::fmt;

use actor_factory::{ActorId, MapService, WorldHandle};
use contracts::{NodeStatus, PopulationConfig, Waypoint};
use observability::metrics::record_spawn_attempt;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use tracing::{debug, info, instrument, warn};

use crate::tree::TickContext;

/// Lateral lane selection for one placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneRule {
    SameLane,
    /// Left lane if the map has one, otherwise the same lane
    LeftIfAvailable,
}

/// Where one auxiliary actor should go, relative to the reference actor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRequest {
    pub reference: ActorId,
    /// Meters ahead along the road
    pub offset_m: f64,
    pub lane_rule: LaneRule,
}

impl PlacementRequest {
    /// Request for slot `index` with spacing `step_m`
    pub fn for_slot(reference: ActorId, index: usize, step_m: f64) -> Self {
        Self {
            reference,
            offset_m: step_m * (index + 1) as f64,
            lane_rule: if index % 2 == 0 {
                LaneRule::LeftIfAvailable
            } else {
                LaneRule::SameLane
            },
        }
    }
}

/// Why a slot produced no actor
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The world has no map to query
    MapUnavailable,
    /// Reference actor missing from the world
    ReferenceUnavailable,
    /// Reference pose does not project onto a road
    OffRoad,
    /// Nothing ahead within the requested distance
    EndOfRoad,
    /// Actor registry refused the spawn
    SpawnRejected(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MapUnavailable => f.write_str("map unavailable"),
            Self::ReferenceUnavailable => f.write_str("reference actor unavailable"),
            Self::OffRoad => f.write_str("reference actor off road"),
            Self::EndOfRoad => f.write_str("end of road"),
            Self::SpawnRejected(message) => write!(f, "spawn rejected: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlacementOutcome {
    Spawned(ActorId),
    Skipped(SkipReason),
}

/// Result of one slot
#[derive(Debug, Clone, PartialEq)]
pub struct SlotReport {
    pub index: usize,
    pub offset_m: f64,
    /// Lane of the unshifted forward waypoint, None if it was never resolved
    pub forward_lane: Option<i32>,
    /// Lane actually used
    pub lane_id: Option<i32>,
    pub blueprint: String,
    pub outcome: PlacementOutcome,
}

impl SlotReport {
    pub fn lane_shifted(&self) -> bool {
        matches!((self.forward_lane, self.lane_id), (Some(a), Some(b)) if a != b)
    }
}

/// Partial-success outcome of the population step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulationReport {
    pub slots: Vec<SlotReport>,
}

impl PopulationReport {
    pub fn requested(&self) -> usize {
        self.slots.len()
    }

    pub fn spawned_ids(&self) -> Vec<ActorId> {
        self.slots
            .iter()
            .filter_map(|slot| match slot.outcome {
                PlacementOutcome::Spawned(id) => Some(id),
                PlacementOutcome::Skipped(_) => None,
            })
            .collect()
    }

    pub fn spawned(&self) -> usize {
        self.spawned_ids().len()
    }

    pub fn skipped(&self) -> usize {
        self.requested() - self.spawned()
    }
}

/// Blueprint choice per slot
#[derive(Debug)]
enum BlueprintPicker {
    Fixed(String),
    Pool {
        pool: Vec<String>,
        fallback: String,
        rng: StdRng,
    },
}

impl BlueprintPicker {
    fn next(&mut self) -> String {
        match self {
            Self::Fixed(blueprint) => blueprint.clone(),
            Self::Pool { pool, fallback, rng } => pool
                .choose(rng)
                .cloned()
                .unwrap_or_else(|| fallback.clone()),
        }
    }
}

/// Spawns the auxiliary traffic once
#[derive(Debug)]
pub struct PopulateAuxiliaryActors {
    reference: ActorId,
    count: usize,
    step_m: f64,
    picker: BlueprintPicker,
    completed: bool,
}

impl PopulateAuxiliaryActors {
    /// `randomize` draws blueprints from `config.blueprint_pool`
    pub fn new(reference: ActorId, config: &PopulationConfig, randomize: bool) -> Self {
        let picker = if randomize && !config.blueprint_pool.is_empty() {
            let rng = match config.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            BlueprintPicker::Pool {
                pool: config.blueprint_pool.clone(),
                fallback: config.blueprint.clone(),
                rng,
            }
        } else {
            BlueprintPicker::Fixed(config.blueprint.clone())
        };

        Self {
            reference,
            count: config.count,
            step_m: config.step_m,
            picker,
            completed: false,
        }
    }

    pub fn reference(&self) -> ActorId {
        self.reference
    }

    /// Whether the placements already ran
    pub fn completed(&self) -> bool {
        self.completed
    }

    #[instrument(
        name = "populate_auxiliary_actors",
        skip_all,
        fields(reference = self.reference, count = self.count)
    )]
    pub fn execute<W: WorldHandle>(&mut self, ctx: &mut TickContext<'_, W>) -> NodeStatus {
        if self.completed {
            return NodeStatus::Success;
        }
        self.completed = true;

        let map = match ctx.world.map() {
            Ok(map) => Some(map),
            Err(e) => {
                warn!(error = %e, "map unavailable, skipping population");
                None
            }
        };

        let mut report = PopulationReport::default();
        for index in 0..self.count {
            let request = PlacementRequest::for_slot(self.reference, index, self.step_m);
            let blueprint = self.picker.next();
            let slot = match &map {
                Some(map) => place(ctx, map, index, &request, blueprint),
                None => SlotReport {
                    index,
                    offset_m: request.offset_m,
                    forward_lane: None,
                    lane_id: None,
                    blueprint,
                    outcome: PlacementOutcome::Skipped(SkipReason::MapUnavailable),
                },
            };

            match &slot.outcome {
                PlacementOutcome::Spawned(actor_id) => {
                    ctx.blackboard.owned_actors.push(*actor_id);
                    record_spawn_attempt(&slot.blueprint, "spawned");
                }
                PlacementOutcome::Skipped(SkipReason::SpawnRejected(_)) => {
                    record_spawn_attempt(&slot.blueprint, "rejected");
                }
                PlacementOutcome::Skipped(_) => record_spawn_attempt(&slot.blueprint, "skipped"),
            }
            report.slots.push(slot);
        }

        info!(
            requested = report.requested(),
            spawned = report.spawned(),
            skipped = report.skipped(),
            "population finished"
        );
        ctx.blackboard.population = Some(report);
        NodeStatus::Success
    }
}

/// Forward waypoint for a request, plus the lane it started on
pub fn resolve_placement<M: MapService>(
    map: &M,
    reference: &Waypoint,
    request: &PlacementRequest,
) -> Option<(Waypoint, i32)> {
    let forward = map.next(reference, request.offset_m).into_iter().next()?;
    let forward_lane = forward.lane_id;
    let chosen = match request.lane_rule {
        LaneRule::LeftIfAvailable => map.left_lane(&forward).unwrap_or(forward),
        LaneRule::SameLane => forward,
    };
    Some((chosen, forward_lane))
}

fn place<W: WorldHandle>(
    ctx: &TickContext<'_, W>,
    map: &W::Map,
    index: usize,
    request: &PlacementRequest,
    blueprint: String,
) -> SlotReport {
    let mut slot = SlotReport {
        index,
        offset_m: request.offset_m,
        forward_lane: None,
        lane_id: None,
        blueprint,
        outcome: PlacementOutcome::Skipped(SkipReason::ReferenceUnavailable),
    };

    // one pose snapshot per slot
    let Some(reference) = ctx.world.actor_transform(request.reference) else {
        warn!(index, "reference actor unavailable");
        return slot;
    };
    let Some(start) = map.waypoint_at(&reference.location) else {
        warn!(index, "reference actor off road");
        slot.outcome = PlacementOutcome::Skipped(SkipReason::OffRoad);
        return slot;
    };
    let Some((waypoint, forward_lane)) = resolve_placement(map, &start, request) else {
        debug!(index, offset_m = request.offset_m, "no waypoint ahead, slot skipped");
        slot.outcome = PlacementOutcome::Skipped(SkipReason::EndOfRoad);
        return slot;
    };
    slot.forward_lane = Some(forward_lane);
    slot.lane_id = Some(waypoint.lane_id);

    slot.outcome = match ctx.world.spawn_actor(&slot.blueprint, &waypoint.transform) {
        Ok(actor_id) => match ctx.world.set_autopilot(actor_id, true) {
            Ok(()) => {
                debug!(index, actor_id, lane_id = waypoint.lane_id, "auxiliary actor spawned");
                PlacementOutcome::Spawned(actor_id)
            }
            Err(e) => {
                warn!(index, actor_id, error = %e, "autopilot refused, releasing actor");
                if let Err(e) = ctx.world.destroy_actor(actor_id) {
                    warn!(actor_id, error = %e, "failed to release actor");
                }
                PlacementOutcome::Skipped(SkipReason::SpawnRejected(e.to_string()))
            }
        },
        Err(e) => {
            warn!(index, blueprint = %slot.blueprint, error = %e, "spawn rejected, slot skipped");
            PlacementOutcome::Skipped(SkipReason::SpawnRejected(e.to_string()))
        }
    };
    slot
}
