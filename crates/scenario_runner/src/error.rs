//! Scenario error types

use actor_factory::ActorFactoryError;
use contracts::ContractError;
use thiserror::Error;

/// Errors surfaced while constructing or driving a scenario
///
/// Spawn rejections and missing lanes never show up here, population
/// degrades instead. Criterion failures are verdicts, not errors.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Invalid scenario input (empty ego set, weather out of range, ...)
    #[error("configuration error in '{field}': {message}")]
    Configuration { field: String, message: String },

    /// World or map handle missing at construction
    #[error("resource unavailable: {resource}")]
    ResourceUnavailable { resource: String },

    #[error(transparent)]
    World(#[from] ActorFactoryError),

    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl ScenarioError {
    pub fn configuration(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn resource_unavailable(resource: impl Into<String>) -> Self {
        Self::ResourceUnavailable {
            resource: resource.into(),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, ScenarioError>;
