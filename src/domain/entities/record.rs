use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::timestamp;
use crate::domain::value_objects::disk_state::DiskState;
use crate::domain::value_objects::metric::MetricValue;

/// Capacity figures for one mounted partition, in the usage command's
/// native block unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub filesystem: String,
    pub size: u64,
    pub used: u64,
    pub available: u64,
    pub use_pct: u8,
    pub mounted_on: String,
}

/// One device's telemetry for a single collection pass.
///
/// `diagnostics` and `usage` are populated only for devices that were in an
/// active state when the pass ran; probing an inactive device would spin it
/// up. Wire keys follow the telemetry index convention: the timestamp is
/// `@timestamp` and the diagnostic map is `smart_attributes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(rename = "@timestamp", with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    pub serial: String,
    pub device: String,
    pub state: DiskState,
    pub hostname: String,
    #[serde(
        rename = "smart_attributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub diagnostics: Option<BTreeMap<String, MetricValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Vec<UsageRecord>>,
}
