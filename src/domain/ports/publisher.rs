use thiserror::Error;

use crate::domain::entities::record::DeviceRecord;
use crate::domain::entities::snapshot::HostSnapshot;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("telemetry client unavailable: {0}")]
    ClientUnavailable(String),
    #[error("failed to serialize record: {0}")]
    Serialization(String),
}

/// Ships finished records to the telemetry index. Delivery is best-effort:
/// a rejected document is logged by the implementation, not retried.
pub trait RecordPublisher: Send + Sync {
    /// Publish one device record.
    ///
    /// # Errors
    ///
    /// Returns `PublishError` if the record cannot be serialized.
    fn publish_device(&self, record: &DeviceRecord) -> Result<(), PublishError>;

    /// Publish one host snapshot.
    ///
    /// # Errors
    ///
    /// Returns `PublishError` if the snapshot cannot be serialized.
    fn publish_host(&self, snapshot: &HostSnapshot) -> Result<(), PublishError>;
}
