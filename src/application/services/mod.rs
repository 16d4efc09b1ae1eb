pub mod collection;

pub use collection::{CollectionReport, CollectionService, DeviceFailure};
