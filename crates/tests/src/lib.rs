//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 示例配置快照测试
//! - 模拟 e2e 测试（配置 -> ego 车队 -> 场景 -> teardown）

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::ConfigVersion;

    const SAMPLE: &str = include_str!("../../../configs/low_visibility_night.toml");

    #[test]
    fn test_sample_config_loads() {
        let config = ConfigLoader::load_from_str(SAMPLE, ConfigFormat::Toml).unwrap();

        assert_eq!(config.version, ConfigVersion::V1);
        assert_eq!(config.name, "LowVisibilityNightDriving_1");
        assert_eq!(config.ego_vehicles.len(), 1);
        assert_eq!(config.ego_vehicles[0].rolename, "hero");
        assert!(config.weather.is_none());
        assert_eq!(config.population.count, 5);
        assert_eq!(config.population.blueprint_pool.len(), 3);
        assert_eq!(config.simulation.max_ticks, Some(2000));
    }

    #[test]
    fn test_sample_config_survives_json() {
        let config = ConfigLoader::load_from_str(SAMPLE, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&config).unwrap();
        let back = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();

        assert_eq!(back.ego_vehicles[0].spawn_point, config.ego_vehicles[0].spawn_point);
        assert_eq!(back.population.seed, config.population.seed);
    }
}

#[cfg(test)]
mod e2e_tests {
    use actor_factory::{ActorFactory, ActorRoster, MockWorld, MockWorldConfig, WorldEvent, WorldHandle};
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{NodeStatus, ScenarioConfiguration, Verdict, WeatherParameters};
    use observability::ScenarioMetricsAggregator;
    use scenario_runner::{
        LowVisibilityNightDriving, Scenario, ScenarioManager, ScenarioOptions, StopReason,
    };

    const SAMPLE: &str = include_str!("../../../configs/low_visibility_night.toml");

    struct Harness {
        world: MockWorld,
        factory: ActorFactory<MockWorld>,
        roster: ActorRoster,
        config: ScenarioConfiguration,
    }

    impl Harness {
        fn new(config: ScenarioConfiguration, drive_egos: bool) -> Self {
            let world = MockWorld::with_config(MockWorldConfig::from_simulation(
                &config.town,
                &config.simulation,
            ));
            let factory = ActorFactory::new(world.clone());
            let roster = factory.spawn_ego_vehicles(&config.ego_vehicles).unwrap();
            if drive_egos {
                for id in &roster.order {
                    world.set_autopilot(*id, true).unwrap();
                    world.set_speed(*id, config.simulation.ego_speed_mps).unwrap();
                }
            }
            Self {
                world,
                factory,
                roster,
                config,
            }
        }

        fn manager(
            &self,
            options: ScenarioOptions,
        ) -> ScenarioManager<LowVisibilityNightDriving<MockWorld>> {
            let scenario = LowVisibilityNightDriving::construct(
                self.world.clone(),
                &self.roster,
                &self.config,
                options,
                self.config.timeout_s,
            )
            .unwrap();
            ScenarioManager::new(scenario, self.config.simulation.fixed_delta_s)
                .with_max_ticks(self.config.simulation.max_ticks)
        }
    }

    fn sample() -> ScenarioConfiguration {
        ConfigLoader::load_from_str(SAMPLE, ConfigFormat::Toml).unwrap()
    }

    /// End-to-end test: config -> ego fleet -> scenario -> teardown
    ///
    /// 验证完整的数据流：
    /// 1. 加载示例配置并生成 ego 车队
    /// 2. hero 以 12 m/s 追上同车道 8 m/s 的车辆
    /// 3. CollisionTest(hero) 失败，场景判定 FAILURE
    /// 4. teardown 只释放场景自己生成的车辆
    #[test]
    fn test_e2e_night_drive_ends_in_collision() {
        let harness = Harness::new(sample(), true);
        let mut manager = harness.manager(ScenarioOptions::default());

        let world = harness.world.clone();
        let outcome = manager.run(|dt| {
            world.advance(dt);
        });

        assert_eq!(outcome.verdict, Verdict::Failure);
        assert_eq!(outcome.stop_reason, StopReason::CriterionFailed);
        assert_eq!(outcome.behavior, NodeStatus::Running);
        assert!(outcome.ticks < 2000);
        assert_eq!(outcome.criteria[0].name, "CollisionTest(hero)");
        assert_eq!(outcome.criteria[0].verdict, Verdict::Failure);
        assert_eq!(outcome.criteria[1].verdict, Verdict::Running);

        // slot 1 is the car in the hero's lane
        let report = manager.scenario().population_report().unwrap().clone();
        let hit = report.slots[1].outcome.clone();
        assert!(matches!(hit, scenario_runner::PlacementOutcome::Spawned(_)));
        assert!(outcome.criteria[0].detail.contains("actor"));

        assert_eq!(manager.scenario_mut().teardown(), report.spawned());
        assert_eq!(harness.world.actor_ids(), harness.roster.actor_ids());

        harness.factory.teardown(&harness.roster);
        assert_eq!(harness.world.actor_count(), 0);
    }

    #[test]
    fn test_e2e_parked_ego_stays_running() {
        let harness = Harness::new(sample(), false);
        let mut manager = harness.manager(ScenarioOptions::default());

        let world = harness.world.clone();
        let outcome = manager.run(|dt| {
            world.advance(dt);
        });

        // traffic drives away from the parked hero
        assert_eq!(outcome.verdict, Verdict::Running);
        assert_eq!(outcome.stop_reason, StopReason::TickLimit);
        assert_eq!(outcome.ticks, 2000);
        assert!(outcome.criteria.iter().all(|c| c.verdict == Verdict::Running));

        manager.scenario_mut().teardown();
        assert_eq!(harness.world.actor_count(), 1);
    }

    #[test]
    fn test_e2e_trace_ordering() {
        let harness = Harness::new(sample(), true);
        let mut manager = harness.manager(ScenarioOptions::default());
        for _ in 0..5 {
            harness.world.advance(0.05);
            manager.tick();
        }

        let history = harness.world.history();
        let egos = harness.roster.len();
        let spawn_attempts: Vec<usize> = history
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, WorldEvent::SpawnAttempt { .. }))
            .map(|(i, _)| i)
            .collect();
        let weather_sets: Vec<usize> = history
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, WorldEvent::WeatherSet(_)))
            .map(|(i, _)| i)
            .collect();

        assert_eq!(weather_sets.len(), 1);
        assert_eq!(spawn_attempts.len(), egos + 5);
        assert!(weather_sets[0] < spawn_attempts[egos]);

        // every auxiliary actor is under autopilot right after its spawn
        for window in history[spawn_attempts[egos]..].windows(2) {
            if let WorldEvent::SpawnAttempt { actor_id: Some(id), .. } = &window[0] {
                assert_eq!(
                    window[1],
                    WorldEvent::AutopilotSet {
                        actor_id: *id,
                        enabled: true
                    }
                );
            }
        }
        assert_eq!(harness.world.weather(), WeatherParameters::LOW_VISIBILITY_NIGHT);
    }

    #[test]
    fn test_e2e_randomized_blueprints_from_pool() {
        let config = sample();
        let pool = config.population.blueprint_pool.clone();
        let harness = Harness::new(config, false);
        let mut manager = harness.manager(ScenarioOptions {
            randomize: true,
            ..Default::default()
        });
        manager.tick();

        let owned = manager.scenario().owned_actors().to_vec();
        assert_eq!(owned.len(), 5);
        for id in owned {
            let blueprint = harness.world.blueprint_of(id).unwrap();
            assert!(pool.contains(&blueprint), "{blueprint}");
        }
    }

    #[test]
    fn test_e2e_criteria_disabled_never_fails() {
        let harness = Harness::new(sample(), true);
        let mut manager = harness.manager(ScenarioOptions {
            criteria_enable: false,
            debug_mode: true,
            ..Default::default()
        });

        let world = harness.world.clone();
        let outcome = manager.run(|dt| {
            world.advance(dt);
        });
        assert_eq!(outcome.verdict, Verdict::Running);
        assert_eq!(outcome.stop_reason, StopReason::TickLimit);
    }

    #[test]
    fn test_e2e_metrics_aggregation() {
        let harness = Harness::new(sample(), true);
        let mut manager = harness.manager(ScenarioOptions::default());
        let mut aggregator = ScenarioMetricsAggregator::new();

        let mut failed_at = None;
        for _ in 0..2000 {
            harness.world.advance(0.05);
            let meta = manager.tick();
            aggregator.update(&meta);
            if !meta.failed_criteria.is_empty() {
                failed_at = Some(meta.tick);
                break;
            }
        }

        let summary = aggregator.summary();
        assert_eq!(summary.verdict, Verdict::Failure);
        assert_eq!(Some(summary.total_ticks), failed_at);
        assert_eq!(summary.peak_owned_actors, 5);
        assert_eq!(summary.criterion_failures.get("CollisionTest(hero)"), Some(&1));
    }

    #[tokio::test]
    async fn test_e2e_async_tick_loop_with_cancel() {
        use std::sync::atomic::Ordering;

        let harness = Harness::new(sample(), false);
        let mut manager = harness.manager(ScenarioOptions::default());
        let cancel = manager.cancel_handle();

        let canceller = tokio::spawn(async move {
            tokio::task::yield_now().await;
            cancel.store(true, Ordering::Relaxed);
        });

        let outcome = loop {
            harness.world.advance(0.05);
            let meta = manager.tick();
            if let Some(reason) = manager.stop_reason(&meta) {
                break manager.outcome(reason);
            }
            tokio::task::yield_now().await;
        };
        canceller.await.unwrap();

        assert!(matches!(
            outcome.stop_reason,
            StopReason::Cancelled | StopReason::TickLimit
        ));
        assert_eq!(outcome.verdict, Verdict::Running);
        assert_eq!(manager.scenario_mut().teardown(), 5);
    }
}
