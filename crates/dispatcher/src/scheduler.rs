use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use inventory_core::{InventoryError, InventoryResult};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::context::JobContext;

/// 周期任务配置
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub interval: Duration,
    pub description: String,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            description: "inventory sync".to_string(),
        }
    }
}

impl JobConfig {
    pub fn new(interval: Duration, description: impl Into<String>) -> InventoryResult<Self> {
        let config = Self {
            interval,
            description: description.into(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> InventoryResult<()> {
        if self.interval.is_zero() {
            return Err(InventoryError::config_error("调度间隔必须大于0"));
        }
        Ok(())
    }
}

/// 每次触发时执行的任务
#[async_trait]
pub trait JobTask: Send + Sync {
    fn name(&self) -> &str;

    /// 返回错误时调度停止，不再重试
    async fn run(&self, context: &JobContext) -> InventoryResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Running,
    /// 已请求停止，正在执行的任务尚未结束
    Stopping,
    Stopped,
}

/// 按固定间隔执行任务的调度器
///
/// 同一任务的执行是串行的：执行耗时超过间隔时下一次触发顺延，
/// 错过的触发直接跳过。`stop` 只阻止之后的触发，不会中断正在执行的任务，
/// 该任务结束之前状态保持 `Stopping`。
/// 调度器被丢弃时循环也随之结束。
pub struct ScheduledJob {
    config: JobConfig,
    context: Arc<JobContext>,
    state: Arc<Mutex<JobState>>,
    shutdown_tx: Mutex<Option<oneshot::Sender<()>>>,
    handle: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl ScheduledJob {
    pub fn new(config: JobConfig, context: Arc<JobContext>) -> InventoryResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            context,
            state: Arc::new(Mutex::new(JobState::Idle)),
            shutdown_tx: Mutex::new(None),
            handle: tokio::sync::Mutex::new(None),
        })
    }

    pub fn description(&self) -> &str {
        &self.config.description
    }

    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    pub fn context(&self) -> &Arc<JobContext> {
        &self.context
    }

    pub fn state(&self) -> JobState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 启动后台循环，第一次触发在一个间隔之后
    pub async fn start(&self, task: Arc<dyn JobTask>) -> InventoryResult<()> {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        {
            // 发送端在状态锁内就位，stop 看到 Running 时一定能取到它
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if *state != JobState::Idle {
                return Err(InventoryError::Scheduler(format!(
                    "任务 {} 无法启动，当前状态: {:?}",
                    self.config.description, *state
                )));
            }
            *self
                .shutdown_tx
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(shutdown_tx);
            *state = JobState::Running;
        }

        let handle = tokio::spawn(Self::run_loop(
            self.config.clone(),
            self.context.clone(),
            self.state.clone(),
            task,
            shutdown_rx,
        ));
        *self.handle.lock().await = Some(handle);

        info!(
            "任务 {} 已启动，间隔 {:?}",
            self.config.description, self.config.interval
        );
        Ok(())
    }

    async fn run_loop(
        config: JobConfig,
        context: Arc<JobContext>,
        state: Arc<Mutex<JobState>>,
        task: Arc<dyn JobTask>,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        let mut ticker = interval_at(Instant::now() + config.interval, config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown_rx => {
                    debug!("任务 {} 收到停止信号", config.description);
                    break;
                }
                _ = ticker.tick() => {
                    debug!("执行任务 {} ({})", task.name(), config.description);
                    if let Err(e) = task.run(&context).await {
                        error!("任务 {} 执行失败，停止调度: {}", task.name(), e);
                        break;
                    }
                }
            }
        }

        *state.lock().unwrap_or_else(PoisonError::into_inner) = JobState::Stopped;
        info!("任务 {} 已停止", config.description);
    }

    /// 停止之后的触发，可重复调用
    ///
    /// 循环仍在运行时状态变为 `Stopping`，由循环退出时置为 `Stopped`。
    pub fn stop(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let shutdown_tx = self
            .shutdown_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(shutdown_tx) = shutdown_tx {
            // 循环已因任务失败退出时接收端已关闭
            let _ = shutdown_tx.send(());
        }

        match *state {
            JobState::Idle => *state = JobState::Stopped,
            JobState::Running => *state = JobState::Stopping,
            JobState::Stopping | JobState::Stopped => {}
        }
    }

    /// 等待后台循环结束
    pub async fn wait(&self) -> InventoryResult<()> {
        let handle = self.handle.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("等待任务 {} 结束时出错: {}", self.config.description, e);
                return Err(InventoryError::Scheduler(format!("调度循环异常退出: {e}")));
            }
        }
        Ok(())
    }
}
