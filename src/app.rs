use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use inventory_api::{create_app, AppState};
use inventory_core::AppConfig;
use inventory_dispatcher::{
    JobConfig, JobContext, JobTask, PopulateInstances, PopulateSubnets, ScheduledJob,
};
use inventory_domain::{
    rng_from_seed, AllocatorConfig, ColorAllocator, InventoryCollector, InventoryStore,
};
use inventory_infrastructure::{init_metrics, DatabaseManager, HttpCollector, InventoryMetrics};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::{net::TcpListener, sync::broadcast};
use tracing::{error, info, warn};

use crate::shutdown::{wait_with_timeout, ShutdownManager};

/// 主应用程序
///
/// 组装数据库、颜色分配器、两个轮询任务和HTTP接口。
pub struct Application {
    config: AppConfig,
    database: Arc<DatabaseManager>,
    store: InventoryStore,
    allocator: Arc<ColorAllocator>,
    collector: Arc<dyn InventoryCollector>,
    metrics_handle: Option<PrometheusHandle>,
}

impl Application {
    /// 使用配置中的HTTP采集器创建应用
    pub async fn new(config: AppConfig) -> Result<Self> {
        let collector = HttpCollector::new(&config.collector).context("创建采集器失败")?;
        let metrics_handle = if config.observability.metrics_enabled {
            Some(init_metrics().context("安装指标记录器失败")?)
        } else {
            None
        };
        Self::with_collector(config, Arc::new(collector), metrics_handle).await
    }

    /// 使用指定的采集器创建应用
    pub async fn with_collector(
        config: AppConfig,
        collector: Arc<dyn InventoryCollector>,
        metrics_handle: Option<PrometheusHandle>,
    ) -> Result<Self> {
        info!(
            "初始化应用程序，账户: {}",
            collector.account_id()
        );

        let database = DatabaseManager::from_config(&config.database)
            .await
            .with_context(|| {
                format!("连接数据库失败: {}", mask_database_url(&config.database.url))
            })?;
        database.migrate().await.context("运行数据库迁移失败")?;
        let store = database.store();

        let allocator_config = AllocatorConfig::from_hours(config.colors.staleness_hours)
            .context("颜色池配置无效")?;
        let allocator = Arc::new(ColorAllocator::new(
            store.colors.clone(),
            allocator_config,
            rng_from_seed(config.colors.rng_seed),
        ));
        allocator
            .seed_palette(&config.colors.palette)
            .await
            .context("初始化颜色表失败")?;

        Ok(Self {
            config,
            database: Arc::new(database),
            store,
            allocator,
            collector,
            metrics_handle,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &InventoryStore {
        &self.store
    }

    pub fn allocator(&self) -> &Arc<ColorAllocator> {
        &self.allocator
    }

    /// 创建启用的轮询任务，子网任务在前
    pub fn build_jobs(&self) -> Result<Vec<(ScheduledJob, Arc<dyn JobTask>)>> {
        let context = Arc::new(JobContext::new(
            self.collector.clone(),
            self.store.clone(),
            self.allocator.clone(),
            self.config.colors.tag_key.clone(),
        ));
        let interval = Duration::from_secs(self.config.sync.poll_interval_seconds);

        let mut jobs: Vec<(ScheduledJob, Arc<dyn JobTask>)> = Vec::new();
        if self.config.sync.subnets_enabled {
            let job = ScheduledJob::new(
                JobConfig::new(interval, "subnet sync")?,
                context.clone(),
            )?;
            jobs.push((job, Arc::new(PopulateSubnets)));
        }
        if self.config.sync.instances_enabled {
            let job = ScheduledJob::new(
                JobConfig::new(interval, "instance sync")?,
                context.clone(),
            )?;
            jobs.push((job, Arc::new(PopulateInstances)));
        }
        Ok(jobs)
    }

    /// 创建HTTP路由
    pub fn build_router(&self) -> axum::Router {
        let metrics_path = if self.config.observability.metrics_enabled {
            self.config.observability.metrics_endpoint.clone()
        } else {
            "/metrics".to_string()
        };

        let state = AppState {
            database: self.database.clone(),
            store: self.store.clone(),
            allocator: self.allocator.clone(),
            tag_key: self.config.colors.tag_key.clone(),
            metrics: InventoryMetrics::new(),
            metrics_handle: self.metrics_handle.clone(),
            metrics_path,
        };
        create_app(state, &self.config.api)
    }

    /// 运行直到收到关闭信号
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        // 先绑定端口，失败时不留下已启动的任务
        let listener = if self.config.api.enabled {
            let listener = TcpListener::bind(&self.config.api.bind_address)
                .await
                .with_context(|| format!("绑定地址失败: {}", self.config.api.bind_address))?;
            Some(listener)
        } else {
            None
        };

        let jobs = self.build_jobs()?;
        for (job, task) in &jobs {
            job.start(task.clone()).await?;
        }

        let server_handle = if let Some(listener) = listener {
            info!("API服务器启动在 http://{}", self.config.api.bind_address);

            let router = self.build_router();
            let mut server_shutdown = shutdown_rx.resubscribe();
            Some(tokio::spawn(async move {
                let shutdown = async move {
                    let _ = server_shutdown.recv().await;
                };
                if let Err(e) = axum::serve(listener, router)
                    .with_graceful_shutdown(shutdown)
                    .await
                {
                    error!("API服务器运行失败: {}", e);
                }
            }))
        } else {
            None
        };

        let _ = shutdown_rx.recv().await;
        info!("应用程序收到关闭信号");

        for (job, _) in &jobs {
            job.stop();
        }
        for (job, _) in &jobs {
            if let Err(e) = job.wait().await {
                warn!("任务 {} 未正常结束: {}", job.description(), e);
            }
        }

        if let Some(handle) = server_handle {
            if let Err(e) = handle.await {
                warn!("API服务器未正常结束: {}", e);
            }
        }

        self.database.close().await;
        info!("应用程序已停止");
        Ok(())
    }

    /// 运行直到 `signal` 完成，随后优雅关闭
    ///
    /// 应用在收到信号之前退出时（例如端口绑定失败）立即返回其错误。
    pub async fn run_until<F>(
        self: Arc<Self>,
        signal: F,
        shutdown_timeout: Duration,
    ) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let shutdown = ShutdownManager::new();
        let mut app_handle = {
            let app = Arc::clone(&self);
            let shutdown_rx = shutdown.subscribe();
            tokio::spawn(async move { app.run(shutdown_rx).await })
        };

        tokio::select! {
            result = &mut app_handle => {
                return match result {
                    Ok(Ok(())) => {
                        warn!("应用在收到关闭信号之前退出");
                        Ok(())
                    }
                    Ok(Err(e)) => {
                        error!("应用运行失败: {:#}", e);
                        Err(e)
                    }
                    Err(e) => Err(anyhow!("应用任务异常结束: {e}")),
                };
            }
            _ = signal => {
                info!("收到关闭信号，开始优雅关闭...");
            }
        }

        shutdown.shutdown();
        if !wait_with_timeout("应用", app_handle, shutdown_timeout).await {
            warn!("应用关闭超时，强制退出");
        }
        Ok(())
    }
}

/// 屏蔽数据库URL中的密码
fn mask_database_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            let mut masked = url.to_string();
            masked.replace_range(colon_pos + 1..at_pos, "***");
            return masked;
        }
    }
    url.to_string()
}
