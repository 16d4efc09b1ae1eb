use anyhow::Context;
use colored::Colorize;

use crate::domain::entities::snapshot::HostSnapshot;
use crate::domain::ports::publisher::RecordPublisher;
use crate::infrastructure::probes::host::HostProbe;

/// Takes one host CPU/memory snapshot and either publishes or prints it.
///
/// # Errors
///
/// Returns an error if the snapshot, publishing, or JSON serialization
/// fails.
pub fn run_system(
    probe: &HostProbe,
    hostname: &str,
    publisher: Option<&dyn RecordPublisher>,
    json: bool,
) -> anyhow::Result<()> {
    let snapshot = probe
        .snapshot(hostname)
        .context("host snapshot collection failed")?;

    if let Some(publisher) = publisher {
        publisher.publish_host(&snapshot)?;
        println!("submitted host snapshot for {hostname}");
    } else if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_snapshot(&snapshot);
    }

    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn print_snapshot(snapshot: &HostSnapshot) {
    println!("{}", "drivewatch — host snapshot".bold().cyan());
    println!("{}", "━".repeat(50));
    let cores = snapshot.cpu_usage_pct.len();
    let avg: f32 = if cores > 0 {
        snapshot.cpu_usage_pct.iter().sum::<f32>() / cores as f32
    } else {
        0.0
    };
    println!("cpu: {avg:.1}% average over {cores} core(s)");
    println!(
        "memory: {} / {} bytes ({:.1}%)",
        snapshot.memory.used, snapshot.memory.total, snapshot.memory.percent
    );
}
