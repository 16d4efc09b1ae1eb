use serde::{Deserialize, Serialize};

/// Power/activity state of a block device as reported by the table-listing
/// command.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DiskState {
    Running,
    Idle,
    Active,
    Sleeping,
    Standby,
    Live,
    Unknown,
}

impl DiskState {
    /// Total mapping from a raw state token. Anything unrecognized becomes
    /// `Unknown` rather than an error.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token {
            "running" => Self::Running,
            "idle" => Self::Idle,
            "active" => Self::Active,
            "sleeping" => Self::Sleeping,
            "standby" => Self::Standby,
            "live" => Self::Live,
            _ => Self::Unknown,
        }
    }

    /// True when it is safe to query diagnostics without forcing a power
    /// transition (spun-up states only).
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Active | Self::Live)
    }
}

impl std::fmt::Display for DiskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Idle => write!(f, "idle"),
            Self::Active => write!(f, "active"),
            Self::Sleeping => write!(f, "sleeping"),
            Self::Standby => write!(f, "standby"),
            Self::Live => write!(f, "live"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}
