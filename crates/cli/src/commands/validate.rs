//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{ScenarioConfiguration, DEFAULT_TIMEOUT_S};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    name: String,
    town: String,
    ego_count: usize,
    traffic_count: usize,
    timeout_s: f64,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    version: format!("{:?}", config.version),
                    name: config.name.clone(),
                    town: config.town.clone(),
                    ego_count: config.ego_vehicles.len(),
                    traffic_count: config.population.count,
                    timeout_s: config.timeout_s,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &ScenarioConfiguration) -> Vec<String> {
    let mut warnings = Vec::new();
    let population = &config.population;
    let simulation = &config.simulation;

    if population.count == 0 {
        warnings.push("population.count is 0 - no traffic will be placed".to_string());
    }

    let farthest = population.step_m * population.count as f64;
    if farthest > simulation.road.length_m {
        warnings.push(format!(
            "farthest slot ({farthest:.0}m ahead) exceeds the road length ({:.0}m) - slots past the end will be skipped",
            simulation.road.length_m
        ));
    }

    if config.timeout_s >= DEFAULT_TIMEOUT_S {
        warnings.push("timeout_s is effectively unbounded - the timeout criterion is advisory".to_string());
    }

    if simulation.max_ticks.is_none() {
        warnings.push(
            "simulation.max_ticks is not set - the run stops only on failure or shutdown".to_string(),
        );
    }

    if population.blueprint_pool.is_empty() {
        warnings.push(format!(
            "population.blueprint_pool is empty - randomized runs use '{}'",
            population.blueprint
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Scenario: {}", summary.name);
            println!("  Town: {}", summary.town);
            println!("  Ego vehicles: {}", summary.ego_count);
            println!("  Traffic: {}", summary.traffic_count);
            println!("  Timeout: {}s", summary.timeout_s);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
