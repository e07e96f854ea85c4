//! Session statistics.

use std::time::Duration;

use observability::MetricsSummary;
use scenario_runner::{PlacementOutcome, PopulationReport, ScenarioOutcome};

/// Statistics from a session run
#[derive(Debug, Clone)]
pub struct RunStats {
    pub outcome: ScenarioOutcome,

    /// Ego vehicles spawned by the harness
    pub ego_vehicles: usize,

    /// Population step result, None if it never ran
    pub population: Option<PopulationReport>,

    /// Auxiliary actors released at teardown
    pub auxiliary_released: usize,

    /// Wall-clock duration of the session
    pub wall_time: Duration,

    pub metrics: MetricsSummary,
}

impl RunStats {
    /// Simulated seconds per wall-clock second
    pub fn speedup(&self) -> f64 {
        let wall = self.wall_time.as_secs_f64();
        if wall > 0.0 {
            self.outcome.elapsed / wall
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Scenario Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Scenario: {}", self.outcome.scenario);
        println!(
            "   ├─ Verdict: {} ({})",
            self.outcome.verdict, self.outcome.stop_reason
        );
        println!(
            "   ├─ Ticks: {} ({:.2}s simulated)",
            self.outcome.ticks, self.outcome.elapsed
        );
        println!("   ├─ Wall time: {:.2}s", self.wall_time.as_secs_f64());
        println!("   ├─ Speedup: {:.1}x", self.speedup());
        println!("   └─ Ego vehicles: {}", self.ego_vehicles);

        println!("\n🚗 Traffic");
        match &self.population {
            Some(report) => {
                println!(
                    "   ├─ Placed: {} of {}",
                    report.spawned(),
                    report.requested()
                );
                for slot in &report.slots {
                    let lane = slot
                        .lane_id
                        .map_or_else(|| "-".to_string(), |lane| lane.to_string());
                    match &slot.outcome {
                        PlacementOutcome::Spawned(actor_id) => println!(
                            "   ├─ #{} +{:.0}m lane {}: actor {} ({})",
                            slot.index, slot.offset_m, lane, actor_id, slot.blueprint
                        ),
                        PlacementOutcome::Skipped(reason) => println!(
                            "   ├─ #{} +{:.0}m lane {}: skipped, {}",
                            slot.index, slot.offset_m, lane, reason
                        ),
                    }
                }
            }
            None => println!("   ├─ Population did not run"),
        }
        println!("   └─ Released at teardown: {}", self.auxiliary_released);

        println!("\n⚖️  Criteria");
        if self.outcome.criteria.is_empty() {
            println!("   └─ (disabled)");
        }
        for (i, report) in self.outcome.criteria.iter().enumerate() {
            let prefix = if i + 1 == self.outcome.criteria.len() {
                "└─"
            } else {
                "├─"
            };
            println!("   {} {}", prefix, report);
        }

        println!("\n📈 Tick Metrics");
        println!("   ├─ Peak owned actors: {}", self.metrics.peak_owned_actors);
        println!("   └─ Tick duration (ms): {}", self.metrics.tick_duration_ms);

        println!();
    }
}
