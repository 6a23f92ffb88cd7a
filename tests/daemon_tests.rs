//! Integration tests for the control daemon poll cycle against a fixture
//! region. The termination flag is process-global (it mirrors the signal
//! handler contract), so the scenarios run sequentially in one test body.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use mmcbox::{
    layout::{
        constants::{
            FORMAT_VERSION, MAGIC, MAILBOX_SIZE, OFFSET_FPGA_CTRL, OFFSET_FPGA_STATUS,
            OFFSET_NETWORK_IDENTITY, OFFSET_VERSION,
        },
        records::{FpgaStatus, NetworkIdentity, CTRL_REQ_SHUTDOWN, STATUS_APP_STARTUP_FINISHED},
    },
    netinfo, ControlDaemon, DaemonConfig, DaemonState, MailboxConfig, PollOutcome,
};

fn write_fixture(dir: &TempDir) -> PathBuf {
    let mut region = vec![0u8; MAILBOX_SIZE];
    region[..MAGIC.len()].copy_from_slice(MAGIC);
    region[OFFSET_VERSION] = FORMAT_VERSION;
    // Recognizable prefill so an overwrite of the identity record shows
    for byte in &mut region[OFFSET_NETWORK_IDENTITY..OFFSET_NETWORK_IDENTITY + 26] {
        *byte = 0xaa;
    }
    let path = dir.path().join("eeprom");
    fs::write(&path, &region).unwrap();
    path
}

fn daemon_config(path: &PathBuf) -> DaemonConfig {
    DaemonConfig {
        mailbox: MailboxConfig::with_fixed_path(path.clone()),
        interface: "lo".to_string(),
        poll_interval_ms: 1,
        detach: false,
        // Guaranteed to fail to start, keeping the test process alive
        shutdown_command: vec!["/nonexistent/shutdown-command".to_string()],
    }
}

#[test]
fn test_poll_cycle_scenarios() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir);
    let config = daemon_config(&path);
    let mut daemon = ControlDaemon::new(config);

    assert_eq!(daemon.state(), DaemonState::Init);
    daemon.mailbox().verify_region().unwrap();

    // Scenario A: shutdown bit clear. One poll performs no shutdown attempt
    // and republishes the identity record.
    assert!(!ControlDaemon::termination_requested());
    assert_eq!(daemon.poll_once(), PollOutcome::Continue);
    assert!(!ControlDaemon::termination_requested());

    let raw = daemon
        .mailbox()
        .read_at(OFFSET_NETWORK_IDENTITY, NetworkIdentity::SIZE)
        .unwrap();
    assert_ne!(raw, vec![0xaa; NetworkIdentity::SIZE]);
    assert_eq!(
        NetworkIdentity::decode(&raw),
        netinfo::probe("lo"),
        "published record must match a fresh probe of the same interface"
    );

    // Scenario B: shutdown bit set. One notice, one failed invocation, and
    // the daemon marks itself for termination instead of polling again.
    daemon
        .mailbox()
        .write_at(OFFSET_FPGA_CTRL, &[CTRL_REQ_SHUTDOWN])
        .unwrap();
    assert_eq!(daemon.poll_once(), PollOutcome::ShutdownFailed);
    assert!(ControlDaemon::termination_requested());

    // Scenario D: with the flag raised the loop exits without another
    // iteration and reaches the terminating state.
    daemon.run_poll_loop();
    assert_eq!(daemon.state(), DaemonState::Terminating);
}

#[test]
fn test_device_loss_is_run_fatal() {
    let dir = TempDir::new().unwrap();
    // 32 bytes: the control register offset lies beyond the backing file,
    // so the control read comes back short
    let path = dir.path().join("eeprom");
    fs::write(&path, [0u8; 32]).unwrap();

    let daemon = ControlDaemon::new(daemon_config(&path));
    assert_eq!(daemon.poll_once(), PollOutcome::DeviceLost);
}

#[test]
fn test_startup_status_record() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir);
    let mailbox = mmcbox::Mailbox::new(MailboxConfig::with_fixed_path(&path));

    let status = FpgaStatus {
        app_startup_finished: true,
        ..Default::default()
    };
    mailbox.set_fpga_status(&status).unwrap();
    let raw = mailbox.read_at(OFFSET_FPGA_STATUS, 1).unwrap();
    assert_eq!(raw, vec![STATUS_APP_STARTUP_FINISHED]);
}
