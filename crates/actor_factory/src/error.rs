//! Actor Factory error types

use contracts::{ActorId, ContractError};
use thiserror::Error;

/// Actor Factory specific error
#[derive(Debug, Error)]
pub enum ActorFactoryError {
    /// World resource (map, world handle) not available
    #[error("world resource unavailable: {resource}")]
    ResourceUnavailable { resource: String },

    /// Spawn request rejected by the actor registry
    #[error("spawn of '{blueprint}' rejected: {message}")]
    SpawnRejected { blueprint: String, message: String },

    /// Ego vehicle spawn error
    #[error("failed to spawn vehicle '{rolename}': {message}")]
    VehicleSpawnFailed { rolename: String, message: String },

    /// Actor not registered
    #[error("actor {actor_id} not found")]
    ActorNotFound { actor_id: ActorId },

    /// Destroy error
    #[error("failed to destroy actor {actor_id}: {message}")]
    DestroyFailed { actor_id: ActorId, message: String },

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl ActorFactoryError {
    pub fn resource_unavailable(resource: impl Into<String>) -> Self {
        Self::ResourceUnavailable {
            resource: resource.into(),
        }
    }

    pub fn spawn_rejected(blueprint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SpawnRejected {
            blueprint: blueprint.into(),
            message: message.into(),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, ActorFactoryError>;
