//! Layered error definitions
//!
//! Categorized by source: config / simulator / scenario

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Simulator Errors =====
    /// A world resource (map, world handle) is not available
    #[error("simulator resource unavailable: {resource}")]
    ResourceUnavailable { resource: String },

    /// Actor spawn rejected by the simulator
    #[error("spawn of '{blueprint}' rejected: {message}")]
    SpawnRejected { blueprint: String, message: String },

    /// Actor not found in the registry
    #[error("actor not found: {actor_id}")]
    ActorNotFound { actor_id: u32 },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create resource unavailable error
    pub fn resource_unavailable(resource: impl Into<String>) -> Self {
        Self::ResourceUnavailable {
            resource: resource.into(),
        }
    }

    /// Create spawn rejected error
    pub fn spawn_rejected(blueprint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SpawnRejected {
            blueprint: blueprint.into(),
            message: message.into(),
        }
    }

    /// Convert `validator` field errors into a single validation error
    ///
    /// Reports the first offending field under `prefix`.
    pub fn from_validation(prefix: &str, errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        match fields.first() {
            Some((field, errs)) => {
                let message = errs
                    .first()
                    .map(|e| match &e.message {
                        Some(m) => m.to_string(),
                        None => format!("failed '{}' check", e.code),
                    })
                    .unwrap_or_else(|| "invalid value".to_string());
                Self::config_validation(format!("{prefix}.{field}"), message)
            }
            None => Self::config_validation(prefix, errors.to_string()),
        }
    }
}
