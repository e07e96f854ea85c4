//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::Verdict;
use scenario_runner::ScenarioOptions;
use tracing::info;

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::session::{Session, SessionConfig};

/// Execute the `run` command
///
/// Fails with `ScenarioFailed` when the verdict is FAILURE.
pub async fn run_scenario(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(&args.config).into());
    }

    let scenario = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // CLI overrides the configured tick limit
    let max_ticks = args.max_ticks.or(scenario.simulation.max_ticks);

    info!(
        name = %scenario.name,
        town = %scenario.town,
        vehicles = scenario.ego_vehicles.len(),
        traffic = scenario.population.count,
        max_ticks = ?max_ticks,
        "Configuration loaded"
    );

    let session_config = SessionConfig {
        scenario,
        max_ticks,
        realtime: args.realtime,
        options: options_from_args(args),
    };

    let stats = Session::new(session_config)
        .run()
        .await
        .context("Scenario session failed")?;

    info!(
        verdict = %stats.outcome.verdict,
        ticks = stats.outcome.ticks,
        simulated_secs = stats.outcome.elapsed,
        wall_secs = stats.wall_time.as_secs_f64(),
        "Scenario finished"
    );
    stats.print_summary();

    if stats.outcome.verdict == Verdict::Failure {
        return Err(CliError::ScenarioFailed {
            scenario: stats.outcome.scenario.clone(),
            verdict: stats.outcome.verdict,
        }
        .into());
    }
    Ok(())
}

fn options_from_args(args: &RunArgs) -> ScenarioOptions {
    ScenarioOptions {
        randomize: args.randomize,
        debug_mode: args.debug,
        criteria_enable: !args.no_criteria,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn args(config: PathBuf) -> RunArgs {
        RunArgs {
            config,
            max_ticks: Some(20),
            realtime: false,
            no_criteria: false,
            randomize: false,
            debug: false,
            metrics_port: None,
        }
    }

    const CONFIG: &str = r#"
name = "LowVisibilityNightDriving_1"
town = "Town01"

[[ego_vehicles]]
rolename = "hero"
model = "vehicle.lincoln.mkz_2017"
spawn_point = { location = { x = 10.0, y = 0.0, z = 0.5 } }
"#;

    #[test]
    fn test_options_from_flags() {
        let mut run = args(PathBuf::from("x.toml"));
        assert_eq!(options_from_args(&run), ScenarioOptions::default());

        run.no_criteria = true;
        run.debug = true;
        let options = options_from_args(&run);
        assert!(!options.criteria_enable);
        assert!(options.debug_mode);
    }

    #[tokio::test]
    async fn test_missing_config_file() {
        let err = run_scenario(&args(PathBuf::from("/nonexistent/scenario.toml")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_short_run_succeeds() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        run_scenario(&args(file.path().to_path_buf())).await.unwrap();
    }

    #[tokio::test]
    async fn test_collision_exits_with_failure() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let mut run = args(file.path().to_path_buf());
        run.max_ticks = Some(2_000);
        let err = run_scenario(&run).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::ScenarioFailed { verdict: Verdict::Failure, .. })
        ));
    }
}
