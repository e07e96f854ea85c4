//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{ScenarioConfiguration, WeatherParameters, WeatherPreset};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    name: String,
    town: String,
    timeout_s: f64,
    weather: WeatherInfo,
    ego_vehicles: Vec<VehicleInfo>,
    population: PopulationInfo,
    simulation: SimulationInfo,
}

#[derive(Serialize)]
struct WeatherInfo {
    preset: String,
    parameters: WeatherParameters,
}

#[derive(Serialize)]
struct VehicleInfo {
    rolename: String,
    model: String,
    location: [f64; 3],
    yaw: f64,
}

#[derive(Serialize)]
struct PopulationInfo {
    count: usize,
    step_m: f64,
    blueprint: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    blueprint_pool: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    /// Forward offsets of every slot, meters
    offsets_m: Vec<f64>,
}

#[derive(Serialize)]
struct SimulationInfo {
    fixed_delta_s: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_ticks: Option<u64>,
    lanes: u32,
    lane_width_m: f64,
    length_m: f64,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(CliError::config_not_found(&args.config).into());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config);
    }

    Ok(())
}

fn weather_label(preset: Option<&WeatherPreset>) -> String {
    match preset {
        None => "low_visibility_night (scenario default)".to_string(),
        Some(WeatherPreset::Custom(_)) => "custom".to_string(),
        Some(preset) => format!("{:?}", preset),
    }
}

fn build_config_info(config: &ScenarioConfiguration) -> ConfigInfo {
    let parameters = config
        .weather
        .as_ref()
        .map_or(WeatherParameters::LOW_VISIBILITY_NIGHT, WeatherPreset::parameters);

    let population = &config.population;
    let road = &config.simulation.road;

    ConfigInfo {
        version: format!("{:?}", config.version),
        name: config.name.clone(),
        town: config.town.clone(),
        timeout_s: config.timeout_s,
        weather: WeatherInfo {
            preset: weather_label(config.weather.as_ref()),
            parameters,
        },
        ego_vehicles: config
            .ego_vehicles
            .iter()
            .map(|v| VehicleInfo {
                rolename: v.rolename.clone(),
                model: v.model.clone(),
                location: [
                    v.spawn_point.location.x,
                    v.spawn_point.location.y,
                    v.spawn_point.location.z,
                ],
                yaw: v.spawn_point.rotation.yaw,
            })
            .collect(),
        population: PopulationInfo {
            count: population.count,
            step_m: population.step_m,
            blueprint: population.blueprint.clone(),
            blueprint_pool: population.blueprint_pool.clone(),
            seed: population.seed,
            offsets_m: (1..=population.count)
                .map(|i| population.step_m * i as f64)
                .collect(),
        },
        simulation: SimulationInfo {
            fixed_delta_s: config.simulation.fixed_delta_s,
            max_ticks: config.simulation.max_ticks,
            lanes: road.lanes,
            lane_width_m: road.lane_width_m,
            length_m: road.length_m,
        },
    }
}

fn print_config_info(config: &ScenarioConfiguration) {
    let info = build_config_info(config);

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Scenario Configuration                         ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📍 Scenario");
    println!("   ├─ Version: {}", info.version);
    println!("   ├─ Name: {}", info.name);
    println!("   ├─ Town: {}", info.town);
    println!("   └─ Timeout: {}s", info.timeout_s);

    let w = &info.weather.parameters;
    println!("\n🌧  Weather: {}", info.weather.preset);
    println!(
        "   ├─ Clouds {:.0}%, rain {:.0}%, deposits {:.0}%, wetness {:.0}%",
        w.cloudiness, w.precipitation, w.precipitation_deposits, w.wetness
    );
    println!(
        "   ├─ Fog density {:.0}%, fog distance {:.0}m, wind {:.0}%",
        w.fog_density, w.fog_distance, w.wind_intensity
    );
    println!(
        "   └─ Sun azimuth {:.0}°, altitude {:.0}°",
        w.sun_azimuth_angle, w.sun_altitude_angle
    );

    println!("\n🚗 Ego Vehicles ({})", info.ego_vehicles.len());
    for (i, vehicle) in info.ego_vehicles.iter().enumerate() {
        let prefix = if i + 1 == info.ego_vehicles.len() {
            "└─"
        } else {
            "├─"
        };
        let [x, y, z] = vehicle.location;
        println!(
            "   {} {} ({}) at ({:.1}, {:.1}, {:.1}) yaw {:.0}°",
            prefix, vehicle.rolename, vehicle.model, x, y, z, vehicle.yaw
        );
    }

    let population = &info.population;
    println!("\n🚙 Traffic ({})", population.count);
    println!("   ├─ Blueprint: {}", population.blueprint);
    if !population.blueprint_pool.is_empty() {
        println!("   ├─ Randomized pool: {:?}", population.blueprint_pool);
    }
    println!("   └─ Offsets (m): {:?}", population.offsets_m);

    let simulation = &info.simulation;
    println!("\n⚙️  Simulation");
    println!("   ├─ Fixed delta: {}s", simulation.fixed_delta_s);
    match simulation.max_ticks {
        Some(max) => println!("   ├─ Max ticks: {}", max),
        None => println!("   ├─ Max ticks: (unlimited)"),
    }
    println!(
        "   └─ Road: {} lane(s) x {}m, {}m long",
        simulation.lanes, simulation.lane_width_m, simulation.length_m
    );

    println!();
}
