#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use inventory::{Application, ShutdownManager};
    use inventory_core::AppConfig;
    use inventory_testing_utils::{InstanceBuilder, MockCollector, SegmentBuilder, TestEnv};
    use tower::ServiceExt;

    fn test_config(instances_enabled: bool) -> AppConfig {
        AppConfig::from_toml(&format!(
            r#"
            [database]
            url = "sqlite::memory:"

            [collector]
            account_id = "A1"

            [sync]
            poll_interval_seconds = 1
            instances_enabled = {instances_enabled}

            [colors]
            palette = ["red", "blue", "green"]
            rng_seed = 7

            [api]
            enabled = false
            "#
        ))
        .unwrap()
    }

    fn collector() -> Arc<MockCollector> {
        Arc::new(
            MockCollector::new("A1")
                .with_segments(vec![SegmentBuilder::new()
                    .with_subnet_id("subnet-1")
                    .with_account_id("A1")
                    .build()])
                .with_instances(vec![InstanceBuilder::new()
                    .with_instance_id("i-1")
                    .with_account_id("A1")
                    .with_subnet_id("subnet-1")
                    .with_color("red")
                    .build()]),
        )
    }

    #[test]
    fn test_bundled_config_is_valid() {
        let config = std::fs::read_to_string("config/inventory.toml").unwrap();
        let config = AppConfig::from_toml(&config).unwrap();
        assert_eq!(config.colors.tag_key, "color");
        assert!(config.observability.metrics_enabled);
    }

    #[tokio::test]
    async fn test_application_seeds_palette_and_builds_jobs() {
        let app = Application::with_collector(test_config(false), collector(), None)
            .await
            .unwrap();

        let colors = app.store().colors.find_all().await.unwrap();
        assert_eq!(colors.len(), 3);
        assert!(colors.iter().all(|c| !c.in_use));

        let jobs = app.build_jobs().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].1.name(), "populate_subnets");
    }

    #[tokio::test]
    async fn test_router_health_and_disabled_metrics() {
        let app = Application::with_collector(test_config(true), collector(), None)
            .await
            .unwrap();
        let router = app.build_router();

        let response = router
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_run_syncs_until_shutdown() {
        let collector = collector();
        let app = Arc::new(
            Application::with_collector(test_config(true), collector.clone(), None)
                .await
                .unwrap(),
        );
        let shutdown = ShutdownManager::new();

        let handle = {
            let app = app.clone();
            let shutdown_rx = shutdown.subscribe();
            tokio::spawn(async move { app.run(shutdown_rx).await })
        };

        let store = app.store().clone();
        let synced = TestEnv::wait_for(
            || {
                let store = store.clone();
                async move {
                    let subnets = store.segments.find_all().await.unwrap_or_default();
                    let red = store.colors.find_by_name("red").await.ok().flatten();
                    subnets.len() == 1 && red.map(|c| c.in_use).unwrap_or(false)
                }
            },
            Duration::from_secs(10),
        )
        .await;
        assert!(synced);
        assert_eq!(store.instances.find_all().await.unwrap().len(), 1);

        shutdown.shutdown();
        let result = tokio::time::timeout(Duration::from_secs(10), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
        assert!(collector.segment_calls() >= 1);
    }

    #[tokio::test]
    async fn test_run_until_returns_startup_error() {
        // 占用端口，让API绑定失败
        let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let mut config = test_config(true);
        config.api.enabled = true;
        config.api.bind_address = occupied.local_addr().unwrap().to_string();

        let app = Arc::new(
            Application::with_collector(config, collector(), None)
                .await
                .unwrap(),
        );

        // 关闭信号永远不会到来，run_until 必须因启动失败而返回
        let result = tokio::time::timeout(
            Duration::from_secs(10),
            app.run_until(std::future::pending(), Duration::from_secs(5)),
        )
        .await
        .unwrap();

        let error = result.unwrap_err();
        assert!(format!("{error:#}").contains("绑定地址失败"));
    }

    #[tokio::test]
    async fn test_run_until_shuts_down_on_signal() {
        let app = Arc::new(
            Application::with_collector(test_config(true), collector(), None)
                .await
                .unwrap(),
        );

        let result = app
            .run_until(
                tokio::time::sleep(Duration::from_millis(200)),
                Duration::from_secs(10),
            )
            .await;
        assert!(result.is_ok());
    }
}
