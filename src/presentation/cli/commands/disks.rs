use anyhow::Context;
use colored::Colorize;

use crate::application::services::collection::{CollectionReport, CollectionService};
use crate::domain::entities::record::DeviceRecord;
use crate::domain::ports::publisher::RecordPublisher;
use crate::domain::value_objects::disk_state::DiskState;

/// Runs one collection pass and either publishes or prints the records.
///
/// Per-device failures do not fail the command; they are reported and the
/// surviving records are still emitted.
///
/// # Errors
///
/// Returns an error if enumeration, publishing, or JSON serialization fails.
pub fn run_disks(
    service: &CollectionService<'_>,
    publisher: Option<&dyn RecordPublisher>,
    json: bool,
) -> anyhow::Result<()> {
    let report = service
        .collect()
        .context("drive telemetry collection failed")?;

    if let Some(publisher) = publisher {
        for record in report.records.values() {
            publisher.publish_device(record)?;
        }
        println!(
            "submitted {} record(s), {} device(s) failed",
            report.records.len(),
            report.failures.len()
        );
    } else if json {
        println!("{}", serde_json::to_string_pretty(&report.records)?);
    } else {
        print_report(&report);
    }

    for failure in &report.failures {
        eprintln!(
            "{} {} ({}): {}",
            "✗".red(),
            failure.device,
            failure.serial,
            failure.error
        );
    }

    Ok(())
}

fn print_report(report: &CollectionReport) {
    println!("{}", "drivewatch — drive telemetry".bold().cyan());
    println!("{}", "━".repeat(50));
    for record in report.records.values() {
        print_record(record);
    }
}

fn print_record(record: &DeviceRecord) {
    let attr_count = record.diagnostics.as_ref().map_or(0, |d| d.len());
    println!(
        "{} {} [{}] {} attribute(s)",
        record.device.bold(),
        record.serial,
        colorize_state(record.state),
        attr_count
    );
    if let Some(usage) = &record.usage {
        for entry in usage {
            println!(
                "  {} {}% used on {}",
                entry.filesystem, entry.use_pct, entry.mounted_on
            );
        }
    }
}

fn colorize_state(state: DiskState) -> colored::ColoredString {
    let token = state.to_string();
    if state.is_active() {
        token.green()
    } else if state == DiskState::Unknown {
        token.red()
    } else {
        token.yellow()
    }
}
