use std::collections::HashSet;

use serde::{Deserialize, Serialize};

const DEFAULT_PALETTE: &[&str] = &[
    "red", "orange", "yellow", "green", "blue", "purple", "pink", "brown", "black", "white",
    "gray", "cyan", "magenta", "teal", "navy", "maroon", "olive", "lime", "indigo", "violet",
    "amber", "coral", "crimson", "gold", "ivory", "jade", "khaki", "lavender", "mint", "ruby",
];

/// 颜色池配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    /// 启动时补齐到颜色表中的颜色名称
    pub palette: Vec<String>,
    /// 释放后的颜色需要闲置多久才能再次分配
    pub staleness_hours: i64,
    /// 随机数种子，未设置时由操作系统提供熵
    pub rng_seed: Option<u64>,
    /// 实例上承载颜色的标签键
    pub tag_key: String,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            staleness_hours: 24,
            rng_seed: None,
            tag_key: "color".to_string(),
        }
    }
}

impl ColorsConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.staleness_hours < 0 {
            return Err(anyhow::anyhow!("颜色闲置时间不能为负数"));
        }

        if self.tag_key.trim().is_empty() {
            return Err(anyhow::anyhow!("颜色标签键不能为空"));
        }
        // 标签键会拼进 JSON 路径
        if self.tag_key.contains('"') {
            return Err(anyhow::anyhow!("颜色标签键不能包含双引号"));
        }

        let mut seen = HashSet::new();
        for name in &self.palette {
            if name.trim().is_empty() {
                return Err(anyhow::anyhow!("颜色名称不能为空"));
            }
            if !seen.insert(name.as_str()) {
                return Err(anyhow::anyhow!("颜色名称重复: {}", name));
            }
        }

        Ok(())
    }
}
