//! Scenario 指标收集模块
//!
//! 基于 TickMeta 收集和统计场景运行指标。

use std::collections::BTreeMap;

use contracts::{TickMeta, Verdict};
use metrics::{counter, gauge, histogram};

/// 从 TickMeta 记录指标
///
/// 每个 tick 结束后调用。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_tick_metrics;
///
/// let meta = manager.tick();
/// record_tick_metrics(&meta);
/// ```
pub fn record_tick_metrics(meta: &TickMeta) {
    counter!("scenario_runner_ticks_total").increment(1);
    gauge!("scenario_runner_last_tick").set(meta.tick as f64);
    gauge!("scenario_runner_elapsed_seconds").set(meta.elapsed);
    gauge!("scenario_runner_owned_actors").set(meta.owned_actors as f64);
    histogram!("scenario_runner_tick_duration_ms").record(meta.tick_duration_ms);

    for criterion in &meta.failed_criteria {
        record_criterion_failure(criterion);
    }

    if meta.verdict.is_terminal() {
        counter!(
            "scenario_runner_verdicts_total",
            "verdict" => meta.verdict.as_str()
        )
        .increment(1);
    }
}

/// 记录一次 spawn 尝试
///
/// `outcome`: "spawned" / "rejected" / "skipped"
pub fn record_spawn_attempt(blueprint: &str, outcome: &'static str) {
    counter!(
        "scenario_runner_spawn_attempts_total",
        "blueprint" => blueprint.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// 记录判据失败
pub fn record_criterion_failure(criterion: &str) {
    counter!(
        "scenario_runner_criterion_failures_total",
        "criterion" => criterion.to_string()
    )
    .increment(1);
}

/// 记录 teardown 释放的 actor 数量
pub fn record_actors_released(count: usize) {
    counter!("scenario_runner_actors_released_total").increment(count as u64);
}

/// 场景指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct ScenarioMetricsAggregator {
    /// 总 tick 数
    pub total_ticks: u64,

    /// 最近一次 tick 的仿真时间 (秒)
    pub last_elapsed: f64,

    /// 同时持有 actor 的峰值
    pub peak_owned_actors: usize,

    /// 最近一次 tick 的场景判定
    pub last_verdict: Verdict,

    /// tick 耗时统计 (毫秒)
    pub tick_duration_stats: RunningStats,

    /// 各判据失败次数
    pub criterion_failures: BTreeMap<String, u64>,
}

impl ScenarioMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, meta: &TickMeta) {
        self.total_ticks += 1;
        self.last_elapsed = meta.elapsed;
        self.last_verdict = meta.verdict;
        self.peak_owned_actors = self.peak_owned_actors.max(meta.owned_actors);
        self.tick_duration_stats.push(meta.tick_duration_ms);

        for criterion in &meta.failed_criteria {
            *self
                .criterion_failures
                .entry(criterion.clone())
                .or_insert(0) += 1;
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_ticks: self.total_ticks,
            simulated_seconds: self.last_elapsed,
            peak_owned_actors: self.peak_owned_actors,
            verdict: self.last_verdict,
            tick_duration_ms: StatsSummary::from(&self.tick_duration_stats),
            criterion_failures: self.criterion_failures.clone(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_ticks: u64,
    pub simulated_seconds: f64,
    pub peak_owned_actors: usize,
    pub verdict: Verdict,
    pub tick_duration_ms: StatsSummary,
    pub criterion_failures: BTreeMap<String, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Scenario Metrics Summary ===")?;
        writeln!(f, "Verdict: {}", self.verdict)?;
        writeln!(f, "Total ticks: {}", self.total_ticks)?;
        writeln!(f, "Simulated time: {:.2}s", self.simulated_seconds)?;
        writeln!(f, "Peak owned actors: {}", self.peak_owned_actors)?;
        writeln!(f, "Tick duration (ms): {}", self.tick_duration_ms)?;

        if !self.criterion_failures.is_empty() {
            writeln!(f, "Criterion failures:")?;
            for (criterion, count) in &self.criterion_failures {
                writeln!(f, "  {}: {}", criterion, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::NodeStatus;

    fn meta(tick: u64, owned_actors: usize, failed: &[&str], verdict: Verdict) -> TickMeta {
        TickMeta {
            tick,
            elapsed: tick as f64 * 0.05,
            behavior: NodeStatus::Running,
            verdict,
            failed_criteria: failed.iter().map(|s| s.to_string()).collect(),
            owned_actors,
            tick_duration_ms: 0.2 * tick as f64,
        }
    }

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = ScenarioMetricsAggregator::new();

        aggregator.update(&meta(1, 0, &[], Verdict::Running));
        aggregator.update(&meta(2, 5, &[], Verdict::Running));
        aggregator.update(&meta(3, 5, &["CollisionTest(hero)"], Verdict::Failure));

        assert_eq!(aggregator.total_ticks, 3);
        assert_eq!(aggregator.peak_owned_actors, 5);
        assert_eq!(aggregator.last_verdict, Verdict::Failure);
        assert_eq!(
            aggregator.criterion_failures.get("CollisionTest(hero)"),
            Some(&1)
        );
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = ScenarioMetricsAggregator::new();
        aggregator.update(&meta(1, 3, &["CollisionTest(hero)"], Verdict::Failure));

        let output = format!("{}", aggregator.summary());
        assert!(output.contains("Verdict: FAILURE"));
        assert!(output.contains("Total ticks: 1"));
        assert!(output.contains("CollisionTest(hero): 1"));
    }
}
