//! # Config Loader
//!
//! Scenario configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Produce `ScenarioConfiguration`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("scenario.toml")).unwrap();
//! println!("Town: {}", config.town);
//! ```

mod parser;
mod validator;

pub use contracts::ScenarioConfiguration;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<ScenarioConfiguration, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<ScenarioConfiguration, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Validate an already parsed configuration (e.g., after CLI overrides)
    pub fn validate(config: &ScenarioConfiguration) -> Result<(), ContractError> {
        validator::validate(config)
    }

    /// Serialize ScenarioConfiguration to TOML string
    pub fn to_toml(config: &ScenarioConfiguration) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize ScenarioConfiguration to JSON string
    pub fn to_json(config: &ScenarioConfiguration) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<ScenarioConfiguration, ContractError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_TOML: &str = r#"
name = "LowVisibilityNightDriving_1"
town = "Town01"
timeout_s = 120.0

[[ego_vehicles]]
rolename = "hero"
model = "vehicle.lincoln.mkz_2017"
[ego_vehicles.spawn_point.location]
x = 10.0
y = 0.0
z = 0.5
[ego_vehicles.spawn_point.rotation]
pitch = 0.0
yaw = 0.0
roll = 0.0

[population]
count = 5
step_m = 50.0
blueprint = "vehicle.audi.a2"

[simulation]
fixed_delta_s = 0.05
max_ticks = 400
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.town, "Town01");
        assert_eq!(config.simulation.max_ticks, Some(400));
    }

    #[test]
    fn test_round_trip_toml() {
        let config = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(config.name, config2.name);
        assert_eq!(config.ego_vehicles.len(), config2.ego_vehicles.len());
        assert_eq!(config.ego_vehicles[0].rolename, config2.ego_vehicles[0].rolename);
    }

    #[test]
    fn test_round_trip_json() {
        let config = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(config.town, config2.town);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
name = "night"
town = "Town01"
ego_vehicles = []
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("ego vehicle"));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = ConfigLoader::load_from_path(Path::new("scenario.yaml"));
        assert!(result.unwrap_err().to_string().contains("unsupported"));
    }

    #[test]
    fn test_infinite_delta_rejected() {
        let content = MINIMAL_TOML.replace("fixed_delta_s = 0.05", "fixed_delta_s = inf");
        let err = ConfigLoader::load_from_str(&content, ConfigFormat::Toml).unwrap_err();
        assert!(err.to_string().contains("fixed_delta_s"), "got: {err}");
    }
}
