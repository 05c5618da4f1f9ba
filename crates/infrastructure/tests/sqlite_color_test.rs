#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use inventory_domain::{
        rng_from_seed, AllocatorConfig, ColorAllocator, ColorRepository, ColorToken,
        InventoryError, InventoryResult,
    };
    use inventory_infrastructure::DatabasePool;
    use inventory_testing_utils::{palette, sqlite_test_store};
    use sqlx::SqlitePool;

    fn sqlite_pool(pool: &DatabasePool) -> SqlitePool {
        match pool {
            DatabasePool::SQLite(pool) => pool.clone(),
            DatabasePool::PostgreSQL(_) => panic!("expected SQLite pool"),
        }
    }

    /// 在分配器读取空闲快照之后，模拟另一个调用方占用 red 并随即被重新同步释放
    struct ClaimedAfterSnapshot {
        inner: Arc<dyn ColorRepository>,
        interleaved: AtomicBool,
    }

    #[async_trait]
    impl ColorRepository for ClaimedAfterSnapshot {
        async fn seed(&self, names: &[String]) -> InventoryResult<u64> {
            self.inner.seed(names).await
        }

        async fn find_all(&self) -> InventoryResult<Vec<ColorToken>> {
            self.inner.find_all().await
        }

        async fn find_by_name(&self, name: &str) -> InventoryResult<Option<ColorToken>> {
            self.inner.find_by_name(name).await
        }

        async fn find_free(&self) -> InventoryResult<Vec<ColorToken>> {
            let free = self.inner.find_free().await?;
            if !self.interleaved.swap(true, Ordering::SeqCst) {
                let now = Utc::now();
                assert!(self.inner.try_claim("red", now, now).await?);
                self.inner.resync(&[], now).await?;
            }
            Ok(free)
        }

        async fn try_claim(
            &self,
            name: &str,
            now: DateTime<Utc>,
            cutoff: DateTime<Utc>,
        ) -> InventoryResult<bool> {
            self.inner.try_claim(name, now, cutoff).await
        }

        async fn mark_used(&self, name: &str, now: DateTime<Utc>) -> InventoryResult<bool> {
            self.inner.mark_used(name, now).await
        }

        async fn release(&self, name: &str, now: DateTime<Utc>) -> InventoryResult<bool> {
            self.inner.release(name, now).await
        }

        async fn resync(&self, observed: &[String], now: DateTime<Utc>) -> InventoryResult<u64> {
            self.inner.resync(observed, now).await
        }
    }

    #[tokio::test]
    async fn test_seed_inserts_missing_colors_as_never_used() {
        let (_manager, store) = sqlite_test_store().await.unwrap();

        let inserted = store
            .colors
            .seed(&palette(&["red", "blue", "green"]))
            .await
            .unwrap();
        assert_eq!(inserted, 3);

        let again = store
            .colors
            .seed(&palette(&["red", "orange"]))
            .await
            .unwrap();
        assert_eq!(again, 1);

        let all = store.colors.find_all().await.unwrap();
        let names: Vec<_> = all.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["blue", "green", "orange", "red"]);
        assert!(all.iter().all(|t| !t.in_use));
        assert!(all
            .iter()
            .all(|t| t.last_used == chrono::DateTime::<Utc>::UNIX_EPOCH));
    }

    #[tokio::test]
    async fn test_allocate_then_resync_scenario() {
        let (_manager, store) = sqlite_test_store().await.unwrap();
        let colors = store.colors.clone();
        colors
            .seed(&palette(&["red", "blue", "green"]))
            .await
            .unwrap();
        assert!(colors.mark_used("green", Utc::now()).await.unwrap());

        let allocator = ColorAllocator::new(
            colors.clone(),
            AllocatorConfig::default(),
            rng_from_seed(Some(17)),
        );

        let token = allocator.allocate().await.unwrap();
        assert!(token.name == "red" || token.name == "blue");
        let stored = colors.find_by_name(&token.name).await.unwrap().unwrap();
        assert!(stored.in_use);

        allocator
            .resync_from_observed(&palette(&["blue"]))
            .await
            .unwrap();

        let state: Vec<(String, bool)> = colors
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|t| (t.name, t.in_use))
            .collect();
        assert_eq!(
            state,
            vec![
                ("blue".to_string(), true),
                ("green".to_string(), false),
                ("red".to_string(), false),
            ]
        );
    }

    #[tokio::test]
    async fn test_concurrent_allocations_never_share_a_color() {
        let (_manager, store) = sqlite_test_store().await.unwrap();
        let names = ["red", "blue", "green", "orange"];
        store.colors.seed(&palette(&names)).await.unwrap();

        let allocator = Arc::new(ColorAllocator::new(
            store.colors.clone(),
            AllocatorConfig::default(),
            rng_from_seed(Some(1)),
        ));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let allocator = allocator.clone();
            handles.push(tokio::spawn(async move { allocator.allocate().await }));
        }

        let mut allocated = HashSet::new();
        let mut exhausted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(token) => assert!(allocated.insert(token.name)),
                Err(InventoryError::PoolExhausted) => exhausted += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(allocated.len(), names.len());
        assert_eq!(exhausted, 2);
        assert!(store.colors.find_free().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_release_starts_staleness_window() {
        let (_manager, store) = sqlite_test_store().await.unwrap();
        store.colors.seed(&palette(&["red"])).await.unwrap();

        let allocator = ColorAllocator::new(
            store.colors.clone(),
            AllocatorConfig::default(),
            rng_from_seed(Some(2)),
        );

        allocator.allocate().await.unwrap();
        allocator.release("red").await.unwrap();

        let free = allocator.list_free().await.unwrap();
        assert_eq!(free.len(), 1);
        assert!(free[0].last_used > Utc::now() - Duration::minutes(1));
        assert!(matches!(
            allocator.allocate().await,
            Err(InventoryError::PoolExhausted)
        ));
    }

    #[tokio::test]
    async fn test_try_claim_is_compare_and_set() {
        let (_manager, store) = sqlite_test_store().await.unwrap();
        store.colors.seed(&palette(&["red"])).await.unwrap();

        let now = Utc::now();
        let cutoff = now - Duration::hours(24);
        assert!(store.colors.try_claim("red", now, cutoff).await.unwrap());
        assert!(!store.colors.try_claim("red", now, cutoff).await.unwrap());
        assert!(!store.colors.try_claim("magenta", now, cutoff).await.unwrap());
    }

    #[tokio::test]
    async fn test_try_claim_rechecks_staleness() {
        let (_manager, store) = sqlite_test_store().await.unwrap();
        store.colors.seed(&palette(&["red"])).await.unwrap();
        store.colors.release("red", Utc::now()).await.unwrap();

        let now = Utc::now();
        assert!(!store
            .colors
            .try_claim("red", now, now - Duration::hours(24))
            .await
            .unwrap());
        assert!(!store.colors.find_by_name("red").await.unwrap().unwrap().in_use);

        let later = now + Duration::hours(25);
        assert!(store
            .colors
            .try_claim("red", later, later - Duration::hours(24))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_color_reused_after_snapshot_is_not_handed_out_again() {
        let (_manager, store) = sqlite_test_store().await.unwrap();
        store.colors.seed(&palette(&["red"])).await.unwrap();

        let repo = Arc::new(ClaimedAfterSnapshot {
            inner: store.colors.clone(),
            interleaved: AtomicBool::new(false),
        });
        let allocator = ColorAllocator::new(
            repo.clone(),
            AllocatorConfig::default(),
            rng_from_seed(Some(3)),
        );

        // 快照里 red 仍是可分配的，但它刚被另一个调用方使用过
        assert!(matches!(
            allocator.allocate().await,
            Err(InventoryError::PoolExhausted)
        ));
        let red = store.colors.find_by_name("red").await.unwrap().unwrap();
        assert!(!red.in_use);
        assert!(red.last_used > Utc::now() - Duration::minutes(1));
    }

    #[tokio::test]
    async fn test_failed_resync_keeps_previous_usage() {
        let (manager, store) = sqlite_test_store().await.unwrap();
        store
            .colors
            .seed(&palette(&["red", "blue", "green"]))
            .await
            .unwrap();
        store.colors.mark_used("green", Utc::now()).await.unwrap();

        let pool = sqlite_pool(manager.pool());
        sqlx::query(
            r#"
            CREATE TRIGGER reject_blue_claim BEFORE UPDATE ON colors
            WHEN NEW.name = 'blue' AND NEW.in_use = 1
            BEGIN
                SELECT RAISE(ABORT, 'boom');
            END
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        let result = store
            .colors
            .resync(&palette(&["red", "blue"]), Utc::now())
            .await;
        assert!(result.is_err());

        let in_use: Vec<String> = store
            .colors
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .filter(|t| t.in_use)
            .map(|t| t.name)
            .collect();
        assert_eq!(in_use, vec!["green".to_string()]);
    }

    #[tokio::test]
    async fn test_resync_counts_only_known_colors() {
        let (_manager, store) = sqlite_test_store().await.unwrap();
        store
            .colors
            .seed(&palette(&["red", "blue", "green"]))
            .await
            .unwrap();
        store.colors.mark_used("green", Utc::now()).await.unwrap();

        let marked = store
            .colors
            .resync(&palette(&["red", "magenta"]), Utc::now())
            .await
            .unwrap();
        assert_eq!(marked, 1);

        let in_use: Vec<String> = store
            .colors
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .filter(|t| t.in_use)
            .map(|t| t.name)
            .collect();
        assert_eq!(in_use, vec!["red".to_string()]);
    }
}
