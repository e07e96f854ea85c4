//! Configuration validation
//!
//! Rules:
//! - scenario name and town are non-empty
//! - at least one ego vehicle, rolenames unique
//! - timeout_s > 0
//! - weather parameters within their ranges
//! - population step_m > 0, blueprints non-empty
//! - simulation fixed_delta_s > 0, road geometry positive, speeds >= 0

use std::collections::HashSet;

use contracts::{ContractError, ScenarioConfiguration};

/// Validate a ScenarioConfiguration
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &ScenarioConfiguration) -> Result<(), ContractError> {
    validate_identity(config)?;
    validate_ego_vehicles(config)?;
    validate_weather(config)?;
    validate_population(config)?;
    validate_simulation(config)?;
    Ok(())
}

fn validate_identity(config: &ScenarioConfiguration) -> Result<(), ContractError> {
    if config.name.trim().is_empty() {
        return Err(ContractError::config_validation(
            "name",
            "scenario name cannot be empty",
        ));
    }
    if config.town.trim().is_empty() {
        return Err(ContractError::config_validation(
            "town",
            "town cannot be empty",
        ));
    }
    if !is_positive(config.timeout_s) {
        return Err(ContractError::config_validation(
            "timeout_s",
            format!("timeout_s must be > 0, got {}", config.timeout_s),
        ));
    }
    Ok(())
}

/// Ego vehicles: at least one, rolename unique
fn validate_ego_vehicles(config: &ScenarioConfiguration) -> Result<(), ContractError> {
    if config.ego_vehicles.is_empty() {
        return Err(ContractError::config_validation(
            "ego_vehicles",
            "at least one ego vehicle is required",
        ));
    }

    let mut seen = HashSet::new();
    for (idx, ego) in config.ego_vehicles.iter().enumerate() {
        if ego.model.is_empty() {
            return Err(ContractError::config_validation(
                format!("ego_vehicles[{idx}].model"),
                "model cannot be empty",
            ));
        }
        if !seen.insert(&ego.rolename) {
            return Err(ContractError::config_validation(
                format!("ego_vehicles[rolename={}]", ego.rolename),
                "duplicate rolename",
            ));
        }
    }
    Ok(())
}

fn validate_weather(config: &ScenarioConfiguration) -> Result<(), ContractError> {
    if let Some(preset) = &config.weather {
        preset.parameters().validated()?;
    }
    Ok(())
}

fn validate_population(config: &ScenarioConfiguration) -> Result<(), ContractError> {
    let population = &config.population;

    if !is_positive(population.step_m) {
        return Err(ContractError::config_validation(
            "population.step_m",
            format!("step_m must be > 0, got {}", population.step_m),
        ));
    }
    if population.blueprint.is_empty() {
        return Err(ContractError::config_validation(
            "population.blueprint",
            "blueprint cannot be empty",
        ));
    }
    if let Some(idx) = population.blueprint_pool.iter().position(|b| b.is_empty()) {
        return Err(ContractError::config_validation(
            format!("population.blueprint_pool[{idx}]"),
            "blueprint cannot be empty",
        ));
    }
    Ok(())
}

fn validate_simulation(config: &ScenarioConfiguration) -> Result<(), ContractError> {
    let sim = &config.simulation;

    if !is_positive(sim.fixed_delta_s) {
        return Err(ContractError::config_validation(
            "simulation.fixed_delta_s",
            format!("fixed_delta_s must be > 0, got {}", sim.fixed_delta_s),
        ));
    }
    if sim.road.lanes == 0 {
        return Err(ContractError::config_validation(
            "simulation.road.lanes",
            "road needs at least one lane",
        ));
    }
    if !is_positive(sim.road.lane_width_m) || !is_positive(sim.road.length_m) {
        return Err(ContractError::config_validation(
            "simulation.road",
            "lane_width_m and length_m must be > 0",
        ));
    }
    if !is_non_negative(sim.ego_speed_mps) || !is_non_negative(sim.traffic_speed_mps) {
        return Err(ContractError::config_validation(
            "simulation",
            "speeds must be >= 0",
        ));
    }
    Ok(())
}

/// NaN and infinity are not positive
fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        ActorConfiguration, ConfigVersion, Location, PopulationConfig, SimulationConfig,
        Transform, WeatherParameters, WeatherPreset,
    };

    fn minimal_config() -> ScenarioConfiguration {
        ScenarioConfiguration {
            version: ConfigVersion::V1,
            name: "night".into(),
            town: "Town01".into(),
            timeout_s: 60.0,
            ego_vehicles: vec![ActorConfiguration {
                rolename: "hero".into(),
                model: "vehicle.lincoln.mkz_2017".into(),
                spawn_point: Transform::at(Location::new(0.0, 0.0, 0.0), 0.0),
            }],
            weather: None,
            population: PopulationConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&minimal_config()).is_ok());
    }

    #[test]
    fn test_missing_ego_vehicles() {
        let mut config = minimal_config();
        config.ego_vehicles.clear();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("at least one ego vehicle"), "got: {err}");
    }

    #[test]
    fn test_duplicate_rolename() {
        let mut config = minimal_config();
        config.ego_vehicles.push(config.ego_vehicles[0].clone());
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("duplicate rolename"), "got: {err}");
    }

    #[test]
    fn test_weather_out_of_range() {
        let mut config = minimal_config();
        config.weather = Some(WeatherPreset::Custom(WeatherParameters {
            cloudiness: 140.0,
            ..WeatherParameters::LOW_VISIBILITY_NIGHT
        }));
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("weather.cloudiness"), "got: {err}");
    }

    #[test]
    fn test_invalid_step() {
        let mut config = minimal_config();
        config.population.step_m = 0.0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("step_m must be > 0"), "got: {err}");
    }

    #[test]
    fn test_zero_lanes() {
        let mut config = minimal_config();
        config.simulation.road.lanes = 0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("at least one lane"), "got: {err}");
    }

    #[test]
    fn test_non_positive_timeout() {
        let mut config = minimal_config();
        config.timeout_s = 0.0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("timeout_s"), "got: {err}");
    }

    #[test]
    fn test_non_finite_delta() {
        for delta in [f64::INFINITY, f64::NAN] {
            let mut config = minimal_config();
            config.simulation.fixed_delta_s = delta;
            let err = validate(&config).unwrap_err().to_string();
            assert!(err.contains("simulation.fixed_delta_s"), "got: {err}");
        }
    }

    #[test]
    fn test_non_finite_speed() {
        let mut config = minimal_config();
        config.simulation.traffic_speed_mps = f64::INFINITY;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_nan_weather_override() {
        let mut config = minimal_config();
        config.weather = Some(WeatherPreset::Custom(WeatherParameters {
            fog_density: f32::NAN,
            ..WeatherParameters::LOW_VISIBILITY_NIGHT
        }));
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("weather.fog_density"), "got: {err}");
    }
}
