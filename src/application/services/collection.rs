use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::domain::entities::record::{DeviceRecord, UsageRecord};
use crate::domain::ports::command::CommandRunner;
use crate::domain::value_objects::disk_state::DiskState;
use crate::domain::value_objects::metric::MetricValue;
use crate::infrastructure::probes::{
    DeviceEnumerator, ProbeError, SmartProbe, StateProbe, UsageProbe,
};

/// One device whose probe sequence failed; the rest of the pass continues
/// without it.
#[derive(Debug)]
pub struct DeviceFailure {
    pub device: String,
    pub serial: String,
    pub error: ProbeError,
}

/// Composite result of a collection pass: every enumerated device lands
/// either in `records` or in `failures`, exactly once.
#[derive(Debug, Default)]
pub struct CollectionReport {
    pub records: BTreeMap<String, DeviceRecord>,
    pub failures: Vec<DeviceFailure>,
}

impl CollectionReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives one collection pass: enumerate devices, probe each one's state,
/// and collect diagnostics and usage for the active ones only. Probing an
/// inactive device would force it awake, so the state check gates
/// everything else.
pub struct CollectionService<'a> {
    devices: DeviceEnumerator<'a>,
    states: StateProbe<'a>,
    smart: SmartProbe<'a>,
    usage: UsageProbe<'a>,
    hostname: String,
}

impl<'a> CollectionService<'a> {
    #[must_use]
    pub fn new(runner: &'a dyn CommandRunner, sudo_command: String, hostname: String) -> Self {
        Self {
            devices: DeviceEnumerator::new(runner),
            states: StateProbe::new(runner),
            smart: SmartProbe::new(runner, sudo_command),
            usage: UsageProbe::new(runner),
            hostname,
        }
    }

    /// Runs one pass over all attached devices.
    ///
    /// Devices are processed strictly one at a time. A failure inside one
    /// device's probe sequence is recorded and the remaining devices are
    /// still probed; a timed-out probe degrades that device to `Unknown`
    /// with no diagnostics instead.
    ///
    /// # Errors
    ///
    /// Returns `ProbeError` only when enumeration itself fails — there is
    /// no partial enumeration.
    pub fn collect(&self) -> Result<CollectionReport, ProbeError> {
        let devices = self.devices.list()?;
        let timestamp = Utc::now();

        let mut report = CollectionReport::default();
        for (device, serial) in devices {
            match self.collect_device(timestamp, &device, &serial) {
                Ok(record) => {
                    report.records.insert(device, record);
                }
                Err(error) => {
                    warn!("skipping {device}: {error}");
                    report.failures.push(DeviceFailure {
                        device,
                        serial,
                        error,
                    });
                }
            }
        }
        Ok(report)
    }

    fn collect_device(
        &self,
        timestamp: DateTime<Utc>,
        device: &str,
        serial: &str,
    ) -> Result<DeviceRecord, ProbeError> {
        let state = match self.states.probe(device) {
            Ok(state) => state,
            Err(error) if error.is_timeout() => {
                warn!("state probe for {device} timed out: {error}");
                return Ok(self.assemble(timestamp, device, serial, DiskState::Unknown, None, None));
            }
            Err(error) => return Err(error),
        };

        if !state.is_active() {
            debug!("device {device} is {state}; skipping diagnostics and usage");
            return Ok(self.assemble(timestamp, device, serial, state, None, None));
        }

        let diagnostics = match self.smart.attributes(device) {
            Ok(attributes) => attributes,
            Err(error) if error.is_timeout() => {
                warn!("diagnostic probe for {device} timed out: {error}");
                return Ok(self.assemble(timestamp, device, serial, DiskState::Unknown, None, None));
            }
            Err(error) => return Err(error),
        };

        let usage = match self.usage.usage_for_device(device) {
            Ok(usage) => usage,
            Err(error) if error.is_timeout() => {
                warn!("usage probe for {device} timed out: {error}");
                return Ok(self.assemble(timestamp, device, serial, DiskState::Unknown, None, None));
            }
            Err(error) => return Err(error),
        };

        Ok(self.assemble(
            timestamp,
            device,
            serial,
            state,
            (!diagnostics.is_empty()).then_some(diagnostics),
            (!usage.is_empty()).then_some(usage),
        ))
    }

    fn assemble(
        &self,
        timestamp: DateTime<Utc>,
        device: &str,
        serial: &str,
        state: DiskState,
        diagnostics: Option<BTreeMap<String, MetricValue>>,
        usage: Option<Vec<UsageRecord>>,
    ) -> DeviceRecord {
        DeviceRecord {
            timestamp,
            serial: serial.to_owned(),
            device: device.to_owned(),
            state,
            hostname: self.hostname.clone(),
            diagnostics,
            usage,
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::ports::command::CommandOutput;
    use crate::infrastructure::os::scripted_runner::ScriptedRunner;

    const NVME_REPORT: &str = "\
=== START OF SMART DATA SECTION ===
SMART/Health Information (NVMe Log 0x02)
Critical Warning:                   0x00
Temperature:                        55 Celsius
Available Spare:                    100%
";

    const DF_OUTPUT: &str = "\
Filesystem      1K-blocks      Used Available Use% Mounted on
/dev/sda1      1441026652 439533320 928220092  33% /mnt/data
";

    fn make_service(runner: &ScriptedRunner) -> CollectionService<'_> {
        CollectionService::new(runner, "sudo".to_owned(), "storage01".to_owned())
    }

    fn running_device_runner() -> ScriptedRunner {
        ScriptedRunner::new()
            .with_output(
                "lsblk -o NAME,SERIAL",
                CommandOutput::ok("NAME SERIAL\nsda S12345\n├─sda1\n"),
            )
            .with_output(
                "lsblk -o NAME,STATE /dev/sda",
                CommandOutput::ok("NAME STATE\nsda running\n├─sda1\n"),
            )
            .with_output(
                "sudo smartctl -A --device=auto /dev/sda",
                CommandOutput::ok(NVME_REPORT),
            )
            .with_output("lsblk -o NAME -nr /dev/sda", CommandOutput::ok("sda\nsda1\n"))
            .with_output("df /dev/sda1", CommandOutput::ok(DF_OUTPUT))
    }

    #[test]
    fn running_device_gets_diagnostics_and_usage() {
        let runner = running_device_runner();
        let report = make_service(&runner).collect().expect("collect");

        assert!(report.is_complete());
        let record = &report.records["/dev/sda"];
        assert_eq!(record.serial, "S12345");
        assert_eq!(record.state, DiskState::Running);
        assert_eq!(record.hostname, "storage01");

        let diagnostics = record.diagnostics.as_ref().expect("diagnostics");
        assert_eq!(diagnostics["Temperature"], MetricValue::Integer(55));

        let usage = record.usage.as_ref().expect("usage");
        assert_eq!(usage[0].use_pct, 33);
        assert_eq!(usage[0].mounted_on, "/mnt/data");
    }

    #[test]
    fn standby_device_is_never_probed_further() {
        let runner = ScriptedRunner::new()
            .with_output(
                "lsblk -o NAME,SERIAL",
                CommandOutput::ok("NAME SERIAL\nsdb WD-123\n"),
            )
            .with_output(
                "lsblk -o NAME,STATE /dev/sdb",
                CommandOutput::ok("NAME STATE\nsdb standby\n"),
            );

        let report = make_service(&runner).collect().expect("collect");
        let record = &report.records["/dev/sdb"];
        assert_eq!(record.state, DiskState::Standby);
        assert!(record.diagnostics.is_none());
        assert!(record.usage.is_none());

        // The gate must hold at the command level too: no diagnostic or
        // usage command may run against a spun-down drive.
        assert!(!runner.invoked("sudo smartctl"));
        assert!(!runner.invoked("df"));
        assert!(!runner.invoked("lsblk -o NAME -nr"));
    }

    #[test]
    fn serial_and_device_are_populated_regardless_of_state() {
        let runner = ScriptedRunner::new()
            .with_output(
                "lsblk -o NAME,SERIAL",
                CommandOutput::ok("NAME SERIAL\nsdb WD-123\n"),
            )
            .with_output(
                "lsblk -o NAME,STATE /dev/sdb",
                CommandOutput::ok("NAME STATE\nsdb sleeping\n"),
            );

        let report = make_service(&runner).collect().expect("collect");
        let record = &report.records["/dev/sdb"];
        assert_eq!(record.device, "/dev/sdb");
        assert_eq!(record.serial, "WD-123");
    }

    #[test]
    fn empty_diagnostics_and_usage_are_omitted() {
        let runner = ScriptedRunner::new()
            .with_output(
                "lsblk -o NAME,SERIAL",
                CommandOutput::ok("NAME SERIAL\nsda S12345\n"),
            )
            .with_output(
                "lsblk -o NAME,STATE /dev/sda",
                CommandOutput::ok("NAME STATE\nsda running\n"),
            )
            // No recognizable attribute rows at all.
            .with_output(
                "sudo smartctl -A --device=auto /dev/sda",
                CommandOutput::ok("=== START OF READ SMART DATA SECTION ===\n"),
            )
            .with_output("lsblk -o NAME -nr /dev/sda", CommandOutput::ok("sda\n"));

        let report = make_service(&runner).collect().expect("collect");
        let record = &report.records["/dev/sda"];
        assert_eq!(record.state, DiskState::Running);
        assert!(record.diagnostics.is_none());
        assert!(record.usage.is_none());
    }

    #[test]
    fn enumeration_failure_aborts_the_pass() {
        let runner = ScriptedRunner::new().with_output(
            "lsblk -o NAME,SERIAL",
            CommandOutput::failed(1, "lsblk: /sys: permission denied\n"),
        );
        let err = make_service(&runner).collect().expect_err("must abort");
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn one_failing_device_does_not_sink_the_others() {
        let runner = ScriptedRunner::new()
            .with_output(
                "lsblk -o NAME,SERIAL",
                CommandOutput::ok("NAME SERIAL\nsda S12345\nsdb WD-123\n"),
            )
            .with_output(
                "lsblk -o NAME,STATE /dev/sda",
                CommandOutput::ok("NAME STATE\nsda running\n"),
            )
            .with_output(
                "sudo smartctl -A --device=auto /dev/sda",
                CommandOutput::failed(2, "Smartctl open device failed\n"),
            )
            .with_output(
                "lsblk -o NAME,STATE /dev/sdb",
                CommandOutput::ok("NAME STATE\nsdb standby\n"),
            );

        let report = make_service(&runner).collect().expect("collect");
        assert!(!report.is_complete());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].device, "/dev/sda");
        assert_eq!(report.failures[0].serial, "S12345");

        // The healthy device still produced its record.
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records["/dev/sdb"].state, DiskState::Standby);
    }

    #[test]
    fn state_probe_timeout_degrades_to_unknown() {
        let runner = ScriptedRunner::new()
            .with_output(
                "lsblk -o NAME,SERIAL",
                CommandOutput::ok("NAME SERIAL\nsda S12345\n"),
            )
            .with_timeout("lsblk -o NAME,STATE /dev/sda", 30);

        let report = make_service(&runner).collect().expect("collect");
        assert!(report.is_complete());
        let record = &report.records["/dev/sda"];
        assert_eq!(record.state, DiskState::Unknown);
        assert!(record.diagnostics.is_none());
        assert!(record.usage.is_none());
    }

    #[test]
    fn diagnostic_timeout_degrades_to_unknown() {
        let runner = ScriptedRunner::new()
            .with_output(
                "lsblk -o NAME,SERIAL",
                CommandOutput::ok("NAME SERIAL\nsda S12345\n"),
            )
            .with_output(
                "lsblk -o NAME,STATE /dev/sda",
                CommandOutput::ok("NAME STATE\nsda running\n"),
            )
            .with_timeout("sudo smartctl -A --device=auto /dev/sda", 30);

        let report = make_service(&runner).collect().expect("collect");
        assert!(report.is_complete());
        let record = &report.records["/dev/sda"];
        assert_eq!(record.state, DiskState::Unknown);
        assert!(record.diagnostics.is_none());
    }

    #[test]
    fn records_share_one_pass_timestamp() {
        let runner = ScriptedRunner::new()
            .with_output(
                "lsblk -o NAME,SERIAL",
                CommandOutput::ok("NAME SERIAL\nsda S1\nsdb S2\n"),
            )
            .with_output(
                "lsblk -o NAME,STATE /dev/sda",
                CommandOutput::ok("NAME STATE\nsda standby\n"),
            )
            .with_output(
                "lsblk -o NAME,STATE /dev/sdb",
                CommandOutput::ok("NAME STATE\nsdb standby\n"),
            );

        let report = make_service(&runner).collect().expect("collect");
        assert_eq!(
            report.records["/dev/sda"].timestamp,
            report.records["/dev/sdb"].timestamp
        );
    }
}
