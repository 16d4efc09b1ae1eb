pub mod disk_state;
pub mod metric;

pub use disk_state::DiskState;
pub use metric::{decode, MetricValue};
