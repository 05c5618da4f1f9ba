//! 采集代理返回的原始记录
//!
//! 字段沿用云平台 describe 接口的命名，标签是键值对列表。

use inventory_domain::{ComputeInstance, NetworkSegment, Tags};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TagRecord {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceRecord {
    pub instance_id: String,
    pub subnet_id: String,
    #[serde(default)]
    pub tags: Vec<TagRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubnetRecord {
    pub subnet_id: String,
    pub vpc_id: String,
    pub availability_zone: String,
    #[serde(default)]
    pub tags: Vec<TagRecord>,
}

/// 重复的键以最后一个为准
pub fn convert_tags(tags: Vec<TagRecord>) -> Tags {
    tags.into_iter().map(|tag| (tag.key, tag.value)).collect()
}

impl InstanceRecord {
    pub fn into_instance(self, account_id: &str) -> ComputeInstance {
        ComputeInstance {
            instance_id: self.instance_id,
            account_id: account_id.to_string(),
            subnet_id: self.subnet_id,
            tags: convert_tags(self.tags),
        }
    }
}

impl SubnetRecord {
    pub fn into_segment(self, account_id: &str) -> NetworkSegment {
        NetworkSegment {
            subnet_id: self.subnet_id,
            vpc_id: self.vpc_id,
            availability_zone: self.availability_zone,
            account_id: account_id.to_string(),
            tags: convert_tags(self.tags),
        }
    }
}
