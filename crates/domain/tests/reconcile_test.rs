#[cfg(test)]
mod tests {
    use inventory_domain::{InventoryError, ReconciliationEngine};
    use inventory_testing_utils::{mock_store, InstanceBuilder, SegmentBuilder};

    #[tokio::test]
    async fn test_replace_sync_rejects_cross_account_batch_before_writing() {
        let (store, segments, _, _) = mock_store();
        let engine = ReconciliationEngine::new(&store);

        let batch = vec![
            SegmentBuilder::new().with_subnet_id("subnet-1").build(),
            SegmentBuilder::new()
                .with_subnet_id("subnet-2")
                .with_account_id("A2")
                .build(),
        ];

        let err = engine.replace_sync("A1", &batch).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(segments.write_calls(), 0);
        assert!(segments.get_all().is_empty());
    }

    #[tokio::test]
    async fn test_replace_sync_overwrites_previous_snapshot() {
        let (store, segments, _, _) = mock_store();
        let engine = ReconciliationEngine::new(&store);

        let first = vec![
            SegmentBuilder::new().with_subnet_id("subnet-1").build(),
            SegmentBuilder::new().with_subnet_id("subnet-2").build(),
        ];
        engine.replace_sync("A1", &first).await.unwrap();

        let second = vec![SegmentBuilder::new().with_subnet_id("subnet-3").build()];
        engine.replace_sync("A1", &second).await.unwrap();

        assert_eq!(segments.get_all(), second);
    }

    #[tokio::test]
    async fn test_replace_sync_surfaces_store_failure() {
        let (store, segments, _, _) = mock_store();
        let engine = ReconciliationEngine::new(&store);
        segments.set_fail_writes(true);

        let batch = vec![SegmentBuilder::new().build()];
        assert!(matches!(
            engine.replace_sync("A1", &batch).await,
            Err(InventoryError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn test_upsert_sync_updates_tags_without_deleting() {
        let (store, _, instances, _) = mock_store();
        let engine = ReconciliationEngine::new(&store);

        let first = vec![
            InstanceBuilder::new().with_instance_id("i-1").with_color("red").build(),
            InstanceBuilder::new().with_instance_id("i-2").with_color("blue").build(),
        ];
        engine.upsert_sync(&first).await.unwrap();

        let second = vec![InstanceBuilder::new()
            .with_instance_id("i-1")
            .with_color("green")
            .build()];
        engine.upsert_sync(&second).await.unwrap();

        let stored = instances.get_all();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].tag("color"), Some("green"));
        assert_eq!(stored[1].tag("color"), Some("blue"));
    }

    #[tokio::test]
    async fn test_upsert_sync_repeated_key_in_batch_keeps_one_row() {
        let (store, _, instances, _) = mock_store();
        let engine = ReconciliationEngine::new(&store);

        let batch = vec![
            InstanceBuilder::new().with_instance_id("i-1").with_color("red").build(),
            InstanceBuilder::new().with_instance_id("i-1").with_color("blue").build(),
            InstanceBuilder::new()
                .with_instance_id("i-1")
                .with_account_id("A2")
                .build(),
        ];
        engine.upsert_sync(&batch).await.unwrap();

        let stored = instances.get_all();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].tag("color"), Some("blue"));
    }

    #[tokio::test]
    async fn test_upsert_sync_failure_applies_nothing() {
        let (store, _, instances, _) = mock_store();
        let engine = ReconciliationEngine::new(&store);
        engine
            .upsert_sync(&[InstanceBuilder::new().with_instance_id("i-0").build()])
            .await
            .unwrap();

        instances.fail_on_instance("i-3");
        let batch: Vec<_> = (1..=5)
            .map(|n| {
                InstanceBuilder::new()
                    .with_instance_id(&format!("i-{n}"))
                    .build()
            })
            .collect();

        assert!(engine.upsert_sync(&batch).await.is_err());
        assert_eq!(instances.count(), 1);
    }
}
