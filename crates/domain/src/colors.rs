//! 颜色池分配器
//!
//! 颜色是有限的、便于人工辨识的命名空间。空闲颜色必须闲置超过
//! `staleness_window` 才能被再次分配，避免刚释放的颜色马上被复用。

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use inventory_core::{InventoryError, InventoryResult};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info, instrument, warn};

use crate::entities::ColorToken;
use crate::repositories::ColorRepository;

/// 分配器配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatorConfig {
    pub staleness_window: Duration,
}

impl AllocatorConfig {
    pub fn new(staleness_window: Duration) -> InventoryResult<Self> {
        if staleness_window < Duration::zero() {
            return Err(InventoryError::config_error("颜色闲置时间不能为负数"));
        }
        Ok(Self { staleness_window })
    }

    pub fn from_hours(hours: i64) -> InventoryResult<Self> {
        Self::new(Duration::hours(hours))
    }
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            staleness_window: Duration::hours(24),
        }
    }
}

/// 由调用方决定随机源：给定种子时结果可复现
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

pub struct ColorAllocator {
    repo: Arc<dyn ColorRepository>,
    config: AllocatorConfig,
    rng: Mutex<StdRng>,
}

impl ColorAllocator {
    pub fn new(repo: Arc<dyn ColorRepository>, config: AllocatorConfig, rng: StdRng) -> Self {
        Self {
            repo,
            config,
            rng: Mutex::new(rng),
        }
    }

    pub fn staleness_window(&self) -> Duration {
        self.config.staleness_window
    }

    /// 从可分配颜色中均匀随机选取一个并标记为占用
    ///
    /// 占用操作是条件更新，并发分配输掉竞争时在剩余候选中重选。
    #[instrument(skip(self))]
    pub async fn allocate(&self) -> InventoryResult<ColorToken> {
        let now = Utc::now();
        let cutoff = now - self.config.staleness_window;

        let mut candidates: Vec<ColorToken> = self
            .repo
            .find_free()
            .await?
            .into_iter()
            .filter(|token| token.is_eligible(cutoff))
            .collect();

        debug!("可分配颜色 {} 个", candidates.len());

        while !candidates.is_empty() {
            let index = self.pick_index(candidates.len())?;
            let picked = candidates.swap_remove(index);

            if self.repo.try_claim(&picked.name, now, cutoff).await? {
                info!("分配颜色: {}", picked.name);
                return Ok(ColorToken {
                    in_use: true,
                    last_used: now,
                    ..picked
                });
            }

            debug!("颜色 {} 已被并发占用，重新选择", picked.name);
        }

        warn!(
            "颜色池已耗尽，没有闲置超过 {} 小时的空闲颜色",
            self.config.staleness_window.num_hours()
        );
        Err(InventoryError::PoolExhausted)
    }

    /// 幂等地标记颜色为占用，用于重新应用外部观察到的标签
    pub async fn mark_used(&self, name: &str) -> InventoryResult<()> {
        if !self.repo.mark_used(name, Utc::now()).await? {
            return Err(InventoryError::not_found("颜色", name));
        }
        debug!("颜色 {} 标记为占用", name);
        Ok(())
    }

    /// 显式释放颜色，之后需闲置满一个窗口才会再次分配
    pub async fn release(&self, name: &str) -> InventoryResult<()> {
        if !self.repo.release(name, Utc::now()).await? {
            return Err(InventoryError::not_found("颜色", name));
        }
        info!("释放颜色: {}", name);
        Ok(())
    }

    pub async fn list_free(&self) -> InventoryResult<Vec<ColorToken>> {
        self.repo.find_free().await
    }

    /// 以实例标签为准重新同步占用状态
    ///
    /// 完成后占用集合恰好等于 `observed` 中存在于颜色表的名称；空名称和重复名称被忽略。
    #[instrument(skip(self, observed), fields(observed = observed.len()))]
    pub async fn resync_from_observed(&self, observed: &[String]) -> InventoryResult<()> {
        let names: Vec<String> = observed
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        let marked = self.repo.resync(&names, Utc::now()).await?;

        if (marked as usize) < names.len() {
            warn!(
                "有 {} 个观察到的颜色不在颜色表中",
                names.len() - marked as usize
            );
        }
        info!("颜色占用状态已重新同步: {} 个占用", marked);
        Ok(())
    }

    /// 补齐颜色表
    pub async fn seed_palette(&self, names: &[String]) -> InventoryResult<u64> {
        let inserted = self.repo.seed(names).await?;
        if inserted > 0 {
            info!("颜色表新增 {} 个颜色", inserted);
        }
        Ok(inserted)
    }

    fn pick_index(&self, len: usize) -> InventoryResult<usize> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| InventoryError::Internal("随机数生成器锁已损坏".to_string()))?;
        Ok(rng.random_range(0..len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_config_validation() {
        assert!(AllocatorConfig::new(Duration::hours(-1)).is_err());
        assert!(AllocatorConfig::new(Duration::zero()).is_ok());
        assert_eq!(
            AllocatorConfig::default().staleness_window,
            Duration::hours(24)
        );
        assert_eq!(
            AllocatorConfig::from_hours(2).unwrap().staleness_window,
            Duration::hours(2)
        );
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let mut a = rng_from_seed(Some(42));
        let mut b = rng_from_seed(Some(42));
        let xs: Vec<u32> = (0..8).map(|_| a.random_range(0..100)).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.random_range(0..100)).collect();
        assert_eq!(xs, ys);
    }
}
