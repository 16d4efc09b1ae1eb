use std::collections::BTreeSet;

use tracing::debug;

use crate::domain::entities::record::UsageRecord;
use crate::domain::ports::command::{command_line, CommandRunner};
use crate::infrastructure::probes::ProbeError;

const LSBLK: &str = "lsblk";
const DF: &str = "df";

/// Capacity/usage probe for a device's mounted partitions.
pub struct UsageProbe<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> UsageProbe<'a> {
    #[must_use]
    pub const fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Usage records for every partition of the device, in listing order.
    /// Partitions that are not mounted make `df` exit non-zero, which
    /// surfaces as a command error.
    ///
    /// # Errors
    ///
    /// Returns `ProbeError` when partition listing or any usage query
    /// fails, or when a usage row does not have the mandatory shape.
    pub fn usage_for_device(&self, device: &str) -> Result<Vec<UsageRecord>, ProbeError> {
        let mut usage = Vec::new();
        for partition in self.partitions(device)? {
            usage.push(self.usage(&partition)?);
        }
        Ok(usage)
    }

    /// Partition paths belonging to the device, deduplicated. The listing
    /// is scoped to the device's children; rows that do not carry the
    /// device's name as a prefix (the device itself aside, this is how
    /// device-mapper children render) are dropped.
    ///
    /// # Errors
    ///
    /// Returns `ProbeError::Command` when the listing command fails.
    pub fn partitions(&self, device: &str) -> Result<Vec<String>, ProbeError> {
        let args = ["-o", "NAME", "-nr", device];
        let output = self
            .runner
            .run(LSBLK, &args)?
            .require_success(&command_line(LSBLK, &args))?;
        let partitions = parse_partition_list(&output.stdout, device);
        debug!("device {device} has {} partition(s)", partitions.len());
        Ok(partitions)
    }

    /// Usage for one partition, parsed from the single data row under the
    /// usage command's header.
    ///
    /// # Errors
    ///
    /// Returns `ProbeError::Command` when the usage command fails and
    /// `ProbeError::Parse` when its output is missing the six-field row.
    pub fn usage(&self, partition: &str) -> Result<UsageRecord, ProbeError> {
        let args = [partition];
        let rendered = command_line(DF, &args);
        let output = self.runner.run(DF, &args)?.require_success(&rendered)?;
        parse_usage_row(&output.stdout).ok_or_else(|| ProbeError::Parse {
            command: rendered,
            reason: "expected a six-field usage row".to_owned(),
        })
    }
}

fn parse_partition_list(stdout: &str, device: &str) -> Vec<String> {
    let base = device.rsplit('/').next().unwrap_or(device);
    let mut seen = BTreeSet::new();
    let mut partitions = Vec::new();
    for name in stdout.lines().map(str::trim) {
        if name.is_empty() || name == base || !name.starts_with(base) {
            continue;
        }
        if seen.insert(name.to_owned()) {
            partitions.push(format!("/dev/{name}"));
        }
    }
    partitions
}

/// Parses the second output line of the usage command into its six fields:
///
/// ```text
/// Filesystem      1K-blocks      Used Available Use% Mounted on
/// /dev/sdb1      1441026652 439533320 928220092  33% /mnt/black1p5
/// ```
fn parse_usage_row(stdout: &str) -> Option<UsageRecord> {
    let line = stdout.lines().nth(1)?;
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [filesystem, size, used, available, use_pct, mounted_on] = fields[..] else {
        return None;
    };
    Some(UsageRecord {
        filesystem: filesystem.to_owned(),
        size: size.parse().ok()?,
        used: used.parse().ok()?,
        available: available.parse().ok()?,
        use_pct: use_pct.strip_suffix('%')?.parse().ok()?,
        mounted_on: mounted_on.to_owned(),
    })
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::ports::command::CommandOutput;
    use crate::infrastructure::os::scripted_runner::ScriptedRunner;

    const DF_OUTPUT: &str = "\
Filesystem      1K-blocks      Used Available Use% Mounted on
/dev/sdb1      1441026652 439533320 928220092  33% /mnt/black1p5
";

    #[test]
    fn parses_the_usage_row() {
        let usage = parse_usage_row(DF_OUTPUT).expect("usage row");
        assert_eq!(usage.filesystem, "/dev/sdb1");
        assert_eq!(usage.size, 1_441_026_652);
        assert_eq!(usage.used, 439_533_320);
        assert_eq!(usage.available, 928_220_092);
        assert_eq!(usage.use_pct, 33);
        assert_eq!(usage.mounted_on, "/mnt/black1p5");
    }

    #[test]
    fn rejects_output_without_a_data_row() {
        assert!(parse_usage_row("Filesystem 1K-blocks Used Available Use% Mounted on\n").is_none());
        assert!(parse_usage_row("").is_none());
    }

    #[test]
    fn rejects_rows_with_the_wrong_field_count() {
        // Long device names make df wrap the row; that shape is malformed here.
        let wrapped = "Filesystem 1K-blocks Used Available Use% Mounted on\n/dev/very-long-name\n";
        assert!(parse_usage_row(wrapped).is_none());
    }

    #[test]
    fn rejects_non_numeric_fields() {
        let bad = "header\n/dev/sdb1 total used avail 33% /mnt\n";
        assert!(parse_usage_row(bad).is_none());
    }

    #[test]
    fn partition_list_drops_the_device_row_and_foreign_children() {
        let stdout = "sda\nsda1\nsda2\nvg0-root\nsda1\n";
        assert_eq!(
            parse_partition_list(stdout, "/dev/sda"),
            vec!["/dev/sda1".to_owned(), "/dev/sda2".to_owned()]
        );
    }

    #[test]
    fn partition_list_handles_nvme_namespaces() {
        let stdout = "nvme0n1\nnvme0n1p1\nnvme0n1p2\n";
        assert_eq!(
            parse_partition_list(stdout, "/dev/nvme0n1"),
            vec!["/dev/nvme0n1p1".to_owned(), "/dev/nvme0n1p2".to_owned()]
        );
    }

    #[test]
    fn usage_for_device_walks_every_partition() {
        let runner = ScriptedRunner::new()
            .with_output(
                "lsblk -o NAME -nr /dev/sdb",
                CommandOutput::ok("sdb\nsdb1\n"),
            )
            .with_output("df /dev/sdb1", CommandOutput::ok(DF_OUTPUT));

        let usage = UsageProbe::new(&runner)
            .usage_for_device("/dev/sdb")
            .expect("usage");
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].mounted_on, "/mnt/black1p5");
        assert_eq!(
            runner.calls(),
            vec![
                "lsblk -o NAME -nr /dev/sdb".to_owned(),
                "df /dev/sdb1".to_owned(),
            ]
        );
    }

    #[test]
    fn device_without_partitions_yields_empty_usage() {
        let runner = ScriptedRunner::new()
            .with_output("lsblk -o NAME -nr /dev/sdc", CommandOutput::ok("sdc\n"));
        let usage = UsageProbe::new(&runner)
            .usage_for_device("/dev/sdc")
            .expect("usage");
        assert!(usage.is_empty());
    }

    #[test]
    fn malformed_usage_output_is_a_parse_error() {
        let runner = ScriptedRunner::new()
            .with_output(
                "lsblk -o NAME -nr /dev/sdb",
                CommandOutput::ok("sdb\nsdb1\n"),
            )
            .with_output("df /dev/sdb1", CommandOutput::ok("Filesystem only-header\n"));

        let err = UsageProbe::new(&runner)
            .usage_for_device("/dev/sdb")
            .expect_err("must fail");
        assert!(matches!(err, ProbeError::Parse { .. }));
    }

    #[test]
    fn failing_usage_command_is_a_command_error() {
        let runner = ScriptedRunner::new()
            .with_output(
                "lsblk -o NAME -nr /dev/sdb",
                CommandOutput::ok("sdb\nsdb1\n"),
            )
            .with_output(
                "df /dev/sdb1",
                CommandOutput::failed(1, "df: /dev/sdb1: No such file or directory\n"),
            );

        let err = UsageProbe::new(&runner)
            .usage_for_device("/dev/sdb")
            .expect_err("must fail");
        assert!(matches!(err, ProbeError::Command(_)));
    }
}
