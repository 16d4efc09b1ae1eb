use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::domain::ports::command::{command_line, CommandRunner};
use crate::domain::value_objects::metric::{decode, MetricValue};
use crate::infrastructure::probes::ProbeError;

const SMARTCTL: &str = "smartctl";

/// Literal substring that marks the memory-mapped drive protocol; its
/// presence selects the colon-delimited report dialect.
const NVME_MARKER: &str = "NVMe";

/// Column count of a traditional attribute-table data row.
const ATA_ROW_TOKENS: usize = 10;
/// Position of the hexadecimal flag column within such a row.
const ATA_FLAG_COLUMN: usize = 2;

/// Reads a device's diagnostic attributes via the vendor diagnostic tool,
/// dispatching between the two report dialects it emits.
pub struct SmartProbe<'a> {
    runner: &'a dyn CommandRunner,
    sudo_command: String,
}

impl<'a> SmartProbe<'a> {
    /// `sudo_command` is the privilege-escalation prefix; an empty string
    /// runs the diagnostic tool directly.
    #[must_use]
    pub const fn new(runner: &'a dyn CommandRunner, sudo_command: String) -> Self {
        Self {
            runner,
            sudo_command,
        }
    }

    /// Decoded attribute map for one device.
    ///
    /// # Errors
    ///
    /// Returns `ProbeError::Command` when the diagnostic command cannot run
    /// or exits non-zero.
    pub fn attributes(&self, device: &str) -> Result<BTreeMap<String, MetricValue>, ProbeError> {
        info!("collecting diagnostic attributes for {device}");
        let output = if self.sudo_command.is_empty() {
            let args = ["-A", "--device=auto", device];
            self.runner
                .run(SMARTCTL, &args)?
                .require_success(&command_line(SMARTCTL, &args))?
        } else {
            let args = [SMARTCTL, "-A", "--device=auto", device];
            self.runner
                .run(&self.sudo_command, &args)?
                .require_success(&command_line(&self.sudo_command, &args))?
        };

        if output.stdout.contains(NVME_MARKER) {
            debug!("{device}: parsing colon-delimited report");
            Ok(parse_nvme_report(&output.stdout))
        } else {
            debug!("{device}: parsing attribute table");
            Ok(parse_ata_table(&output.stdout))
        }
    }
}

/// Dialect A: colon-delimited `key: value` lines. Example:
///
/// ```text
/// === START OF SMART DATA SECTION ===
/// SMART/Health Information (NVMe Log 0x02)
/// Critical Warning:                   0x00
/// Temperature:                        55 Celsius
/// Available Spare:                    100%
/// ```
fn parse_nvme_report(stdout: &str) -> BTreeMap<String, MetricValue> {
    let mut attributes = BTreeMap::new();
    for line in stdout.lines() {
        if let Some((key, value)) = line.split_once(':') {
            let (key, value) = (key.trim(), value.trim());
            if !key.is_empty() && !value.is_empty() {
                attributes.insert(key.to_owned(), decode(value));
            }
        }
    }
    attributes
}

/// Dialect B: fixed-column attribute table. A data row has exactly ten
/// tokens with a hex flag in the flag column; everything else (headers,
/// banners, separators) is skipped. Example row:
///
/// ```text
/// ID# ATTRIBUTE_NAME          FLAG     VALUE WORST THRESH TYPE      UPDATED  WHEN_FAILED RAW_VALUE
///  10 Spin_Retry_Count        0x0032   100   253   000    Old_age   Always       -       0
/// ```
fn parse_ata_table(stdout: &str) -> BTreeMap<String, MetricValue> {
    let mut attributes = BTreeMap::new();
    for line in stdout.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() == ATA_ROW_TOKENS && tokens[ATA_FLAG_COLUMN].starts_with("0x") {
            attributes.insert(tokens[1].to_owned(), decode(tokens[ATA_ROW_TOKENS - 1]));
        }
    }
    attributes
}
