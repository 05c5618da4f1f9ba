//! 周期同步任务的调度
//!
//! `ScheduledJob` 负责按固定间隔驱动任务，`JobContext` 汇集任务需要的
//! 采集器与存储句柄，`tasks` 中是子网和实例两个轮询任务。

pub mod context;
pub mod scheduler;
pub mod tasks;

pub use context::JobContext;
pub use scheduler::{JobConfig, JobState, JobTask, ScheduledJob};
pub use tasks::{colors_from_tags, PopulateInstances, PopulateSubnets};
