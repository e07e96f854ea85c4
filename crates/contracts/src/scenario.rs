//! ScenarioConfiguration - Config Loader output
//!
//! Describes one scenario run: identity, ego fleet, weather override,
//! traffic population and the settings of the simulation host.

use serde::{Deserialize, Serialize};

use crate::{Transform, WeatherPreset};

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete scenario configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfiguration {
    #[serde(default)]
    pub version: ConfigVersion,

    /// Scenario name (e.g., "LowVisibilityNightDriving_1")
    pub name: String,

    /// Town / map name (e.g., "Town01")
    pub town: String,

    /// Scenario timeout in seconds
    #[serde(default = "default_timeout_s")]
    pub timeout_s: f64,

    /// Ego vehicles, the first one is the population reference
    pub ego_vehicles: Vec<ActorConfiguration>,

    /// Weather override; the scenario preset is used when absent
    #[serde(default)]
    pub weather: Option<WeatherPreset>,

    /// Auxiliary traffic placement
    #[serde(default)]
    pub population: PopulationConfig,

    /// Simulation host settings
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Effectively unbounded: the timeout criterion stays advisory
pub const DEFAULT_TIMEOUT_S: f64 = 10_000_000.0;

fn default_timeout_s() -> f64 {
    DEFAULT_TIMEOUT_S
}

impl Default for ScenarioConfiguration {
    fn default() -> Self {
        Self {
            version: ConfigVersion::default(),
            name: "LowVisibilityNightDriving_1".to_string(),
            town: "Town01".to_string(),
            timeout_s: DEFAULT_TIMEOUT_S,
            ego_vehicles: Vec::new(),
            weather: None,
            population: PopulationConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

/// Actor configuration (ego vehicles)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorConfiguration {
    /// Role name (e.g., "hero")
    pub rolename: String,

    /// Blueprint name (e.g., "vehicle.lincoln.mkz_2017")
    pub model: String,

    /// Initial pose
    pub spawn_point: Transform,
}

/// Auxiliary traffic placement settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of auxiliary actors to place
    #[serde(default = "default_actor_count")]
    pub count: usize,

    /// Longitudinal spacing between consecutive actors, meters
    #[serde(default = "default_step_m")]
    pub step_m: f64,

    /// Blueprint spawned for every actor in deterministic runs
    #[serde(default = "default_blueprint")]
    pub blueprint: String,

    /// Blueprints drawn from when the scenario is randomized
    #[serde(default)]
    pub blueprint_pool: Vec<String>,

    /// Seed for randomized runs
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_actor_count() -> usize {
    5
}

fn default_step_m() -> f64 {
    50.0
}

fn default_blueprint() -> String {
    "vehicle.audi.a2".to_string()
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            count: default_actor_count(),
            step_m: default_step_m(),
            blueprint: default_blueprint(),
            blueprint_pool: Vec::new(),
            seed: None,
        }
    }
}

/// Simulation host settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Fixed simulation step, seconds
    #[serde(default = "default_fixed_delta_s")]
    pub fixed_delta_s: f64,

    /// Stop after this many ticks (None = until a terminal verdict)
    #[serde(default)]
    pub max_ticks: Option<u64>,

    /// Road geometry of the host
    #[serde(default)]
    pub road: RoadConfig,

    /// Ego cruise speed under autopilot, m/s
    #[serde(default = "default_ego_speed")]
    pub ego_speed_mps: f64,

    /// Auxiliary traffic cruise speed under autopilot, m/s
    #[serde(default = "default_traffic_speed")]
    pub traffic_speed_mps: f64,
}

fn default_fixed_delta_s() -> f64 {
    0.05 // 20 Hz
}

fn default_ego_speed() -> f64 {
    12.0
}

fn default_traffic_speed() -> f64 {
    8.0
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fixed_delta_s: default_fixed_delta_s(),
            max_ticks: None,
            road: RoadConfig::default(),
            ego_speed_mps: default_ego_speed(),
            traffic_speed_mps: default_traffic_speed(),
        }
    }
}

/// Straight multi-lane road
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadConfig {
    /// Number of driving lanes
    #[serde(default = "default_lanes")]
    pub lanes: u32,

    /// Lane width, meters
    #[serde(default = "default_lane_width")]
    pub lane_width_m: f64,

    /// Road length, meters
    #[serde(default = "default_road_length")]
    pub length_m: f64,
}

fn default_lanes() -> u32 {
    2
}

fn default_lane_width() -> f64 {
    3.5
}

fn default_road_length() -> f64 {
    1000.0
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            lanes: default_lanes(),
            lane_width_m: default_lane_width(),
            length_m: default_road_length(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_optional_sections() {
        let json = r#"{
            "name": "night",
            "town": "Town01",
            "ego_vehicles": [{
                "rolename": "hero",
                "model": "vehicle.lincoln.mkz_2017",
                "spawn_point": { "location": { "x": 0.0, "y": 0.0, "z": 0.0 } }
            }]
        }"#;
        let config: ScenarioConfiguration = serde_json::from_str(json).unwrap();

        assert_eq!(config.timeout_s, DEFAULT_TIMEOUT_S);
        assert!(config.weather.is_none());
        assert_eq!(config.population.count, 5);
        assert_eq!(config.population.step_m, 50.0);
        assert_eq!(config.population.blueprint, "vehicle.audi.a2");
        assert_eq!(config.simulation.fixed_delta_s, 0.05);
        assert_eq!(config.simulation.road.lanes, 2);
    }
}
