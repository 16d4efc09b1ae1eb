//! Drive health and capacity telemetry collector.
//!
//! Enumerates block devices, gates diagnostic probing on each device's
//! power state, decodes the vendor diagnostic reports into typed values,
//! and ships the assembled records to a telemetry index.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
