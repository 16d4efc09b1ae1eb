use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::timestamp;

/// Memory utilization in bytes plus a derived percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub total: u64,
    pub used: u64,
    pub percent: f64,
}

/// Point-in-time host CPU/memory snapshot, published alongside the drive
/// records but to its own index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSnapshot {
    #[serde(rename = "@timestamp", with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    pub hostname: String,
    pub cpu_usage_pct: Vec<f32>,
    pub memory: MemoryUsage,
}
