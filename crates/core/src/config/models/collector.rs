use serde::{Deserialize, Serialize};

/// 云平台数据采集配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// 采集代理的基础地址
    pub endpoint: String,
    /// 被轮询的云账户ID
    pub account_id: String,
    pub region: String,
    pub request_timeout_seconds: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9090".to_string(),
            account_id: "181657471068".to_string(),
            region: "us-east-1".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

impl CollectorConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "采集地址必须以http://或https://开头: {}",
                self.endpoint
            ));
        }

        if self.account_id.trim().is_empty() {
            return Err(anyhow::anyhow!("账户ID不能为空"));
        }

        if self.region.trim().is_empty() {
            return Err(anyhow::anyhow!("区域不能为空"));
        }

        if self.request_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("请求超时时间必须大于0"));
        }

        Ok(())
    }
}
