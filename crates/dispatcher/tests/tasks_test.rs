#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use inventory_core::InventoryError;
    use inventory_dispatcher::{
        JobConfig, JobContext, JobState, JobTask, PopulateInstances, PopulateSubnets,
        ScheduledJob,
    };
    use inventory_domain::{rng_from_seed, AllocatorConfig, ColorAllocator};
    use inventory_testing_utils::{
        palette, sqlite_test_store, InstanceBuilder, MockCollector, SegmentBuilder, TestEnv,
    };

    async fn setup(
        collector: Arc<MockCollector>,
    ) -> (inventory_infrastructure::DatabaseManager, Arc<JobContext>) {
        let (manager, store) = sqlite_test_store().await.unwrap();
        store
            .colors
            .seed(&palette(&["red", "blue", "green"]))
            .await
            .unwrap();

        let allocator = ColorAllocator::new(
            store.colors.clone(),
            AllocatorConfig::default(),
            rng_from_seed(Some(5)),
        );
        let context = JobContext::new(collector, store, Arc::new(allocator), "color");
        (manager, Arc::new(context))
    }

    #[tokio::test]
    async fn test_populate_subnets_replaces_table() {
        let collector = Arc::new(MockCollector::new("A1").with_segments(vec![
            SegmentBuilder::new().with_subnet_id("subnet-1").build(),
            SegmentBuilder::new().with_subnet_id("subnet-2").build(),
        ]));
        let (_manager, context) = setup(collector.clone()).await;

        PopulateSubnets.run(&context).await.unwrap();
        assert_eq!(context.store().segments.find_all().await.unwrap().len(), 2);

        collector.set_segments(vec![SegmentBuilder::new().with_subnet_id("subnet-3").build()]);
        PopulateSubnets.run(&context).await.unwrap();

        let stored = context.store().segments.find_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].subnet_id, "subnet-3");
    }

    #[tokio::test]
    async fn test_populate_subnets_rejects_foreign_account() {
        let collector = Arc::new(MockCollector::new("A1").with_segments(vec![
            SegmentBuilder::new().with_account_id("A2").build(),
        ]));
        let (_manager, context) = setup(collector).await;

        let err = PopulateSubnets.run(&context).await.unwrap_err();
        assert!(err.is_validation());
        assert!(context.store().segments.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_populate_instances_upserts_and_resyncs_colors() {
        let collector = Arc::new(MockCollector::new("A1").with_instances(vec![
            InstanceBuilder::new().with_instance_id("i-1").with_color("blue").build(),
            InstanceBuilder::new().with_instance_id("i-2").build(),
        ]));
        let (_manager, context) = setup(collector.clone()).await;
        context.allocator().mark_used("green").await.unwrap();

        PopulateInstances.run(&context).await.unwrap();

        assert_eq!(context.store().instances.find_all().await.unwrap().len(), 2);
        let in_use: Vec<String> = context
            .store()
            .colors
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .filter(|t| t.in_use)
            .map(|t| t.name)
            .collect();
        assert_eq!(in_use, vec!["blue".to_string()]);
        assert_eq!(collector.instance_calls(), 1);
    }

    #[tokio::test]
    async fn test_collector_failure_aborts_without_writes() {
        let collector = Arc::new(
            MockCollector::new("A1")
                .with_instances(vec![InstanceBuilder::new().with_color("red").build()]),
        );
        collector.set_failing(true);
        let (_manager, context) = setup(collector).await;

        assert!(matches!(
            PopulateInstances.run(&context).await,
            Err(InventoryError::ExternalSource(_))
        ));
        assert!(context.store().instances.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scheduled_sync_stops_on_collector_failure() {
        let collector = Arc::new(MockCollector::new("A1").with_segments(vec![
            SegmentBuilder::new().build(),
        ]));
        let (_manager, context) = setup(collector.clone()).await;

        let job = ScheduledJob::new(
            JobConfig::new(Duration::from_millis(200), "subnets").unwrap(),
            context.clone(),
        )
        .unwrap();
        job.start(Arc::new(PopulateSubnets)).await.unwrap();

        let synced = TestEnv::wait_for(
            || {
                let collector = collector.clone();
                async move { collector.segment_calls() >= 1 }
            },
            Duration::from_secs(5),
        )
        .await;
        assert!(synced);

        collector.set_failing(true);
        job.wait().await.unwrap();

        assert_eq!(job.state(), JobState::Stopped);
        assert_eq!(collector.segment_calls(), 2);
        assert_eq!(context.store().segments.find_all().await.unwrap().len(), 1);
    }
}
