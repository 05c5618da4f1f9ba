use std::time::Duration;

use async_trait::async_trait;
use inventory_core::{CollectorConfig, InventoryError, InventoryResult};
use inventory_domain::{ComputeInstance, InventoryCollector, NetworkSegment};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};

use super::records::{InstanceRecord, SubnetRecord};

/// 通过 describe 代理以 JSON 形式采集账户快照
pub struct HttpCollector {
    endpoint: String,
    account_id: String,
    http_client: reqwest::Client,
}

impl HttpCollector {
    pub fn new(config: &CollectorConfig) -> InventoryResult<Self> {
        config
            .validate()
            .map_err(|e| InventoryError::config_error(e.to_string()))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| InventoryError::config_error(format!("创建HTTP客户端失败: {e}")))?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            account_id: config.account_id.clone(),
            http_client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> InventoryResult<Vec<T>> {
        let response = self.http_client.get(url).send().await.map_err(|e| {
            error!("Failed to reach collector endpoint {}: {}", url, e);
            InventoryError::external_source(format!("请求 {url} 失败: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Collector returned HTTP {} - {}", status, body);
            return Err(InventoryError::external_source(format!(
                "请求 {url} 返回 HTTP {status}: {body}"
            )));
        }

        response.json::<Vec<T>>().await.map_err(|e| {
            InventoryError::external_source(format!("解析 {url} 的响应失败: {e}"))
        })
    }
}

#[async_trait]
impl InventoryCollector for HttpCollector {
    fn account_id(&self) -> &str {
        &self.account_id
    }

    #[instrument(skip(self))]
    async fn fetch_instances(&self, account_id: &str) -> InventoryResult<Vec<ComputeInstance>> {
        let url = format!(
            "{}/v1/accounts/{}/instances?state=running",
            self.endpoint, account_id
        );
        let records: Vec<InstanceRecord> = self.fetch(&url).await?;
        debug!("采集到 {} 个运行中的实例", records.len());

        Ok(records
            .into_iter()
            .map(|record| record.into_instance(account_id))
            .collect())
    }

    #[instrument(skip(self))]
    async fn fetch_segments(&self) -> InventoryResult<Vec<NetworkSegment>> {
        let url = format!("{}/v1/accounts/{}/subnets", self.endpoint, self.account_id);
        let records: Vec<SubnetRecord> = self.fetch(&url).await?;
        debug!("采集到 {} 个子网", records.len());

        Ok(records
            .into_iter()
            .map(|record| record.into_segment(&self.account_id))
            .collect())
    }
}
