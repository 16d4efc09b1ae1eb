pub mod df;
pub mod host;
pub mod lsblk;
pub mod smartctl;

pub use df::UsageProbe;
pub use host::HostProbe;
pub use lsblk::{DeviceEnumerator, StateProbe};
pub use smartctl::SmartProbe;

use thiserror::Error;

use crate::domain::ports::command::CommandError;

/// Failure of one probe step: the command itself, the shape of its output,
/// or (for host metrics) the snapshot backend.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("unexpected `{command}` output: {reason}")]
    Parse { command: String, reason: String },
    #[error("host metrics unavailable: {0}")]
    Unavailable(String),
}

impl ProbeError {
    /// True when the underlying command merely outlived its time bound, in
    /// which case the device degrades to an unknown state instead of
    /// failing the pass.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Command(CommandError::TimedOut { .. }))
    }
}
