//! 配置管理
//!
//! 配置加载顺序：各段默认值 → TOML配置文件 → `INVENTORY__` 前缀的环境变量。
//! 加载完成后逐段验证，任何一段无效都会拒绝启动。

pub mod models;

pub use models::*;
