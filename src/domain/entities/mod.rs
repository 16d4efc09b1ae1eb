pub mod record;
pub mod snapshot;
pub mod timestamp;

pub use record::{DeviceRecord, UsageRecord};
pub use snapshot::{HostSnapshot, MemoryUsage};
