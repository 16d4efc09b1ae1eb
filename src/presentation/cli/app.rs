use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// drivewatch — drive health telemetry collector
///
/// Enumerates block devices, reads SMART diagnostics and partition usage
/// from the spun-up ones, and ships the records to a telemetry index.
#[derive(Parser, Debug)]
#[command(name = "drivewatch")]
#[command(version, about, long_about)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to custom config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect one pass of drive telemetry records
    #[command(alias = "d")]
    Disks {
        /// Publish the records to the telemetry index instead of printing
        #[arg(long)]
        publish: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Collect a host CPU/memory snapshot
    #[command(alias = "s")]
    System {
        /// Publish the snapshot to the telemetry index instead of printing
        #[arg(long)]
        publish: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
