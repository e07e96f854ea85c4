//! Runtime actor handles and simulator events.

use std::collections::HashMap;

use crate::Location;

/// Simulator actor handle type
pub type ActorId = u32;

/// Runtime roster of the ego actors spawned for a run
///
/// Keeps configuration order, the first entry is the reference ego.
#[derive(Debug, Clone, Default)]
pub struct ActorRoster {
    /// Role name -> Actor handle
    pub actors: HashMap<String, ActorId>,

    /// Actor handles in spawn order
    pub order: Vec<ActorId>,

    /// Actor handle -> Role name (reverse lookup)
    pub actor_to_role: HashMap<ActorId, String>,
}

impl ActorRoster {
    /// Create empty roster
    pub fn new() -> Self {
        Self::default()
    }

    /// Register actor under its role name
    pub fn register(&mut self, role: String, actor_id: ActorId) {
        self.actor_to_role.insert(actor_id, role.clone());
        self.actors.insert(role, actor_id);
        self.order.push(actor_id);
    }

    /// All actor handles in spawn order
    pub fn actor_ids(&self) -> Vec<ActorId> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Collision notification published by the simulator
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    /// Actor the notification was published for
    pub actor_id: ActorId,

    /// The other party, if it was an actor (None for static geometry)
    pub other_actor_id: Option<ActorId>,

    /// Where the contact happened
    pub location: Location,

    /// Simulation time of the contact, seconds
    pub timestamp: f64,
}
