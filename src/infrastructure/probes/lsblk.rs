use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::domain::ports::command::{command_line, CommandRunner};
use crate::domain::value_objects::disk_state::DiskState;
use crate::infrastructure::probes::ProbeError;

const LSBLK: &str = "lsblk";

/// Lists attached block devices and their serial numbers through the
/// table-listing command.
pub struct DeviceEnumerator<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> DeviceEnumerator<'a> {
    #[must_use]
    pub const fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Maps each physical device path to its serial number.
    ///
    /// Sub-partition rows carry a tree-glyph prefix and no serial, so they
    /// never split into exactly two fields and are skipped.
    ///
    /// # Errors
    ///
    /// Returns `ProbeError::Command` when the listing command cannot run or
    /// exits non-zero; enumeration has no partial result.
    pub fn list(&self) -> Result<BTreeMap<String, String>, ProbeError> {
        info!("probing system for attached block devices");
        let args = ["-o", "NAME,SERIAL"];
        let output = self
            .runner
            .run(LSBLK, &args)?
            .require_success(&command_line(LSBLK, &args))?;
        Ok(parse_serial_table(&output.stdout))
    }
}

/// Reports the power/activity state of a single device.
pub struct StateProbe<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> StateProbe<'a> {
    #[must_use]
    pub const fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Returns the device's state, `Unknown` when the listing shows no
    /// state token for it.
    ///
    /// # Errors
    ///
    /// Returns `ProbeError::Command` when the listing command cannot run or
    /// exits non-zero.
    pub fn probe(&self, device: &str) -> Result<DiskState, ProbeError> {
        let args = ["-o", "NAME,STATE", device];
        let output = self
            .runner
            .run(LSBLK, &args)?
            .require_success(&command_line(LSBLK, &args))?;
        let state = parse_state_table(&output.stdout);
        debug!("device {device} is {state}");
        Ok(state)
    }
}

/// Parses `NAME SERIAL` rows. Example output:
///
/// ```text
/// NAME   SERIAL
/// sda    S598NJ0MC32609P
/// ├─sda1
/// └─sda2
/// sdb    WD-WMAY03561084
/// ```
fn parse_serial_table(stdout: &str) -> BTreeMap<String, String> {
    let mut devices = BTreeMap::new();
    for line in stdout.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if let [name, serial] = fields[..] {
            devices.insert(format!("/dev/{name}"), serial.to_owned());
        }
    }
    devices
}

/// Returns the state token of the first two-field data row, mapped totally
/// through `DiskState`; unrecognized tokens degrade to `Unknown`.
fn parse_state_table(stdout: &str) -> DiskState {
    for line in stdout.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if let [_, state] = fields[..] {
            return DiskState::from_token(state);
        }
    }
    DiskState::Unknown
}
