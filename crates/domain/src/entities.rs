use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 云资源上的键值标签
pub type Tags = BTreeMap<String, String>;

/// 网络分段（子网）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSegment {
    pub subnet_id: String,
    pub vpc_id: String,
    pub availability_zone: String,
    pub account_id: String,
    #[serde(default)]
    pub tags: Tags,
}

impl NetworkSegment {
    /// 可用区标识的第三段，例如 `us-east-1a` 得到 `1a`
    pub fn az_suffix(&self) -> Option<&str> {
        self.availability_zone
            .splitn(3, '-')
            .nth(2)
            .filter(|suffix| !suffix.is_empty())
    }
}

/// 计算实例的复合主键
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceKey {
    pub instance_id: String,
    pub account_id: String,
}

/// 计算实例
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeInstance {
    pub instance_id: String,
    pub account_id: String,
    pub subnet_id: String,
    #[serde(default)]
    pub tags: Tags,
}

impl ComputeInstance {
    pub fn key(&self) -> InstanceKey {
        InstanceKey {
            instance_id: self.instance_id.clone(),
            account_id: self.account_id.clone(),
        }
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// 颜色令牌
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorToken {
    pub name: String,
    pub in_use: bool,
    pub last_used: DateTime<Utc>,
}

impl ColorToken {
    /// 从未使用过的空闲颜色
    pub fn unused(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            in_use: false,
            last_used: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// 空闲且最近一次使用早于截止时间
    pub fn is_eligible(&self, cutoff: DateTime<Utc>) -> bool {
        !self.in_use && self.last_used < cutoff
    }
}
