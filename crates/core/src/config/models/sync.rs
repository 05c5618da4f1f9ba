use serde::{Deserialize, Serialize};

/// 轮询同步配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub poll_interval_seconds: u64,
    pub subnets_enabled: bool,
    pub instances_enabled: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 60,
            subnets_enabled: true,
            instances_enabled: true,
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.poll_interval_seconds == 0 {
            return Err(anyhow::anyhow!("轮询间隔必须大于0"));
        }

        Ok(())
    }
}
