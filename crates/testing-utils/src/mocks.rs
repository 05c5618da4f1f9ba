//! In-memory mock implementations of the repository and collector traits
//!
//! Writes are all-or-nothing like the database-backed repositories: a batch
//! is applied to a copy and swapped in only when every row succeeds.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inventory_domain::{
    ColorRepository, ColorToken, ComputeInstance, InstanceRepository, InventoryCollector,
    InventoryError, InventoryResult, InventoryStore, NetworkSegment, SegmentRepository,
};

/// Mock collector returning configurable snapshots
#[derive(Debug)]
pub struct MockCollector {
    account_id: String,
    instances: Mutex<Vec<ComputeInstance>>,
    segments: Mutex<Vec<NetworkSegment>>,
    failing: AtomicBool,
    instance_calls: AtomicUsize,
    segment_calls: AtomicUsize,
}

impl MockCollector {
    pub fn new(account_id: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            instances: Mutex::new(Vec::new()),
            segments: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
            instance_calls: AtomicUsize::new(0),
            segment_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_instances(self, instances: Vec<ComputeInstance>) -> Self {
        self.set_instances(instances);
        self
    }

    pub fn with_segments(self, segments: Vec<NetworkSegment>) -> Self {
        self.set_segments(segments);
        self
    }

    pub fn set_instances(&self, instances: Vec<ComputeInstance>) {
        *self.instances.lock().unwrap() = instances;
    }

    pub fn set_segments(&self, segments: Vec<NetworkSegment>) {
        *self.segments.lock().unwrap() = segments;
    }

    /// 之后的采集调用都以 `ExternalSource` 失败
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn instance_calls(&self) -> usize {
        self.instance_calls.load(Ordering::SeqCst)
    }

    pub fn segment_calls(&self) -> usize {
        self.segment_calls.load(Ordering::SeqCst)
    }

    fn check_failing(&self) -> InventoryResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(InventoryError::external_source("mock collector unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryCollector for MockCollector {
    fn account_id(&self) -> &str {
        &self.account_id
    }

    async fn fetch_instances(&self, _account_id: &str) -> InventoryResult<Vec<ComputeInstance>> {
        self.instance_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        Ok(self.instances.lock().unwrap().clone())
    }

    async fn fetch_segments(&self) -> InventoryResult<Vec<NetworkSegment>> {
        self.segment_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        Ok(self.segments.lock().unwrap().clone())
    }
}

/// Mock implementation of SegmentRepository
#[derive(Debug, Clone, Default)]
pub struct MockSegmentRepository {
    segments: Arc<Mutex<Vec<NetworkSegment>>>,
    fail_writes: Arc<AtomicBool>,
    write_calls: Arc<AtomicUsize>,
}

impl MockSegmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_segments(segments: Vec<NetworkSegment>) -> Self {
        let repo = Self::new();
        *repo.segments.lock().unwrap() = segments;
        repo
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    pub fn get_all(&self) -> Vec<NetworkSegment> {
        self.segments.lock().unwrap().clone()
    }
}

#[async_trait]
impl SegmentRepository for MockSegmentRepository {
    async fn replace_all(&self, segments: &[NetworkSegment]) -> InventoryResult<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(InventoryError::Internal("mock segment write failure".to_string()));
        }
        *self.segments.lock().unwrap() = segments.to_vec();
        Ok(())
    }

    async fn find_by_subnet_id(&self, subnet_id: &str) -> InventoryResult<Option<NetworkSegment>> {
        Ok(self
            .segments
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.subnet_id == subnet_id)
            .cloned())
    }

    async fn find_all(&self) -> InventoryResult<Vec<NetworkSegment>> {
        Ok(self.get_all())
    }
}

/// Mock implementation of InstanceRepository
#[derive(Debug, Clone, Default)]
pub struct MockInstanceRepository {
    instances: Arc<Mutex<Vec<ComputeInstance>>>,
    poisoned_ids: Arc<Mutex<HashSet<String>>>,
}

impl MockInstanceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入该实例时失败，用于模拟批次中途出错
    pub fn fail_on_instance(&self, instance_id: &str) {
        self.poisoned_ids
            .lock()
            .unwrap()
            .insert(instance_id.to_string());
    }

    pub fn get_all(&self) -> Vec<ComputeInstance> {
        self.instances.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.instances.lock().unwrap().len()
    }
}

#[async_trait]
impl InstanceRepository for MockInstanceRepository {
    async fn upsert_all(&self, instances: &[ComputeInstance]) -> InventoryResult<()> {
        let poisoned = self.poisoned_ids.lock().unwrap().clone();
        let mut stored = self.instances.lock().unwrap();
        let mut staged = stored.clone();

        for instance in instances {
            if poisoned.contains(&instance.instance_id) {
                return Err(InventoryError::Internal(format!(
                    "mock write failure for {}",
                    instance.instance_id
                )));
            }
            match staged.iter_mut().find(|s| s.key() == instance.key()) {
                Some(existing) => existing.tags = instance.tags.clone(),
                None => staged.push(instance.clone()),
            }
        }

        *stored = staged;
        Ok(())
    }

    async fn find_by_tag(
        &self,
        key: &str,
        value: &str,
    ) -> InventoryResult<Option<ComputeInstance>> {
        Ok(self
            .instances
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.tag(key) == Some(value))
            .cloned())
    }

    async fn find_all(&self) -> InventoryResult<Vec<ComputeInstance>> {
        Ok(self.get_all())
    }
}

/// Mock implementation of ColorRepository
#[derive(Debug, Clone, Default)]
pub struct MockColorRepository {
    colors: Arc<Mutex<BTreeMap<String, ColorToken>>>,
    contended: Arc<Mutex<HashSet<String>>>,
}

impl MockColorRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_colors(names: &[&str]) -> Self {
        let repo = Self::new();
        for name in names {
            repo.insert(ColorToken::unused(*name));
        }
        repo
    }

    pub fn insert(&self, token: ColorToken) {
        self.colors
            .lock()
            .unwrap()
            .insert(token.name.clone(), token);
    }

    pub fn get(&self, name: &str) -> Option<ColorToken> {
        self.colors.lock().unwrap().get(name).cloned()
    }

    pub fn in_use_names(&self) -> Vec<String> {
        self.colors
            .lock()
            .unwrap()
            .values()
            .filter(|t| t.in_use)
            .map(|t| t.name.clone())
            .collect()
    }

    /// 下一次占用该颜色时模拟被并发分配抢先
    pub fn contend(&self, name: &str) {
        self.contended.lock().unwrap().insert(name.to_string());
    }
}

#[async_trait]
impl ColorRepository for MockColorRepository {
    async fn seed(&self, names: &[String]) -> InventoryResult<u64> {
        let mut colors = self.colors.lock().unwrap();
        let mut inserted = 0;
        for name in names {
            if !colors.contains_key(name) {
                colors.insert(name.clone(), ColorToken::unused(name.clone()));
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn find_all(&self) -> InventoryResult<Vec<ColorToken>> {
        Ok(self.colors.lock().unwrap().values().cloned().collect())
    }

    async fn find_by_name(&self, name: &str) -> InventoryResult<Option<ColorToken>> {
        Ok(self.get(name))
    }

    async fn find_free(&self) -> InventoryResult<Vec<ColorToken>> {
        Ok(self
            .colors
            .lock()
            .unwrap()
            .values()
            .filter(|t| !t.in_use)
            .cloned()
            .collect())
    }

    async fn try_claim(
        &self,
        name: &str,
        now: DateTime<Utc>,
        cutoff: DateTime<Utc>,
    ) -> InventoryResult<bool> {
        let mut colors = self.colors.lock().unwrap();
        let Some(token) = colors.get_mut(name) else {
            return Ok(false);
        };

        if self.contended.lock().unwrap().remove(name) {
            token.in_use = true;
            token.last_used = now;
            return Ok(false);
        }

        if !token.is_eligible(cutoff) {
            return Ok(false);
        }
        token.in_use = true;
        token.last_used = now;
        Ok(true)
    }

    async fn mark_used(&self, name: &str, now: DateTime<Utc>) -> InventoryResult<bool> {
        match self.colors.lock().unwrap().get_mut(name) {
            Some(token) => {
                token.in_use = true;
                token.last_used = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn release(&self, name: &str, now: DateTime<Utc>) -> InventoryResult<bool> {
        match self.colors.lock().unwrap().get_mut(name) {
            Some(token) => {
                token.in_use = false;
                token.last_used = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn resync(&self, observed: &[String], now: DateTime<Utc>) -> InventoryResult<u64> {
        let mut colors = self.colors.lock().unwrap();
        for token in colors.values_mut() {
            token.in_use = false;
        }

        let mut marked = 0;
        for name in observed {
            if let Some(token) = colors.get_mut(name) {
                token.in_use = true;
                token.last_used = now;
                marked += 1;
            }
        }
        Ok(marked)
    }
}

/// 由三个 mock 仓储组成的存储，同时返回各仓储句柄以便断言
pub fn mock_store() -> (
    InventoryStore,
    MockSegmentRepository,
    MockInstanceRepository,
    MockColorRepository,
) {
    let segments = MockSegmentRepository::new();
    let instances = MockInstanceRepository::new();
    let colors = MockColorRepository::new();
    let store = InventoryStore::new(
        Arc::new(segments.clone()),
        Arc::new(instances.clone()),
        Arc::new(colors.clone()),
    );
    (store, segments, instances, colors)
}
