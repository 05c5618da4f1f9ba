pub mod http_collector;
pub mod records;

pub use http_collector::HttpCollector;
pub use records::{InstanceRecord, SubnetRecord, TagRecord};
