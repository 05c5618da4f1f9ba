//! Test data builders with sensible defaults

use chrono::{DateTime, Utc};
use inventory_domain::{ColorToken, ComputeInstance, NetworkSegment, Tags};

/// Builder for test NetworkSegment entities
pub struct SegmentBuilder {
    segment: NetworkSegment,
}

impl SegmentBuilder {
    pub fn new() -> Self {
        Self {
            segment: NetworkSegment {
                subnet_id: "subnet-0001".to_string(),
                vpc_id: "vpc-0001".to_string(),
                availability_zone: "us-east-1a".to_string(),
                account_id: "A1".to_string(),
                tags: Tags::new(),
            },
        }
    }

    pub fn with_subnet_id(mut self, subnet_id: &str) -> Self {
        self.segment.subnet_id = subnet_id.to_string();
        self
    }

    pub fn with_vpc_id(mut self, vpc_id: &str) -> Self {
        self.segment.vpc_id = vpc_id.to_string();
        self
    }

    pub fn with_availability_zone(mut self, az: &str) -> Self {
        self.segment.availability_zone = az.to_string();
        self
    }

    pub fn with_account_id(mut self, account_id: &str) -> Self {
        self.segment.account_id = account_id.to_string();
        self
    }

    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.segment.tags.insert(key.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> NetworkSegment {
        self.segment
    }
}

impl Default for SegmentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for test ComputeInstance entities
pub struct InstanceBuilder {
    instance: ComputeInstance,
}

impl InstanceBuilder {
    pub fn new() -> Self {
        Self {
            instance: ComputeInstance {
                instance_id: "i-0001".to_string(),
                account_id: "A1".to_string(),
                subnet_id: "subnet-0001".to_string(),
                tags: Tags::new(),
            },
        }
    }

    pub fn with_instance_id(mut self, instance_id: &str) -> Self {
        self.instance.instance_id = instance_id.to_string();
        self
    }

    pub fn with_account_id(mut self, account_id: &str) -> Self {
        self.instance.account_id = account_id.to_string();
        self
    }

    pub fn with_subnet_id(mut self, subnet_id: &str) -> Self {
        self.instance.subnet_id = subnet_id.to_string();
        self
    }

    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.instance.tags.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_color(self, color: &str) -> Self {
        self.with_tag("color", color)
    }

    pub fn build(self) -> ComputeInstance {
        self.instance
    }
}

impl Default for InstanceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for test ColorToken entities
pub struct ColorBuilder {
    token: ColorToken,
}

impl ColorBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            token: ColorToken::unused(name),
        }
    }

    pub fn in_use(mut self) -> Self {
        self.token.in_use = true;
        self
    }

    pub fn last_used(mut self, at: DateTime<Utc>) -> Self {
        self.token.last_used = at;
        self
    }

    pub fn build(self) -> ColorToken {
        self.token
    }
}
