//! Control daemon: lifecycle, privilege enforcement and the poll loop
//!
//! One process, one loop. The daemon verifies the layout and the region,
//! reports application startup to the FPGA, then polls the control register
//! four times per second, honoring shutdown requests and republishing the
//! backplane network identity on every cycle. The only asynchronous event
//! is the termination signal, whose handler does nothing but store a flag.

use std::{
    os::unix::process::CommandExt,
    process::Command,
    sync::atomic::{AtomicBool, Ordering},
    thread,
};

use log::{error, info};
use nix::{
    sys::{
        signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal},
        stat::{umask, Mode},
    },
    unistd::{chdir, close, fork, setsid, ForkResult, Uid},
};

use crate::{
    config::DaemonConfig,
    error::{MailboxError, Result},
    layout::{
        self,
        records::{FpgaControl, FpgaStatus},
    },
    mailbox::Mailbox,
    netinfo,
};

/// Termination flag; set by the signal path, polled by the main loop.
/// No other state crosses the handler boundary.
static TERMINATE: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_termination(_signum: libc::c_int) {
    TERMINATE.store(true, Ordering::SeqCst);
}

/// Daemon lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    Init,
    Running,
    Terminating,
    Stopped,
}

/// Outcome of one poll iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing pending, keep polling
    Continue,
    /// Control register unreadable; treated as device loss, run-fatal
    DeviceLost,
    /// Shutdown was requested but the invocation failed to start
    ShutdownFailed,
}

/// The control daemon
pub struct ControlDaemon {
    config: DaemonConfig,
    mailbox: Mailbox,
    state: DaemonState,
}

impl ControlDaemon {
    pub fn new(config: DaemonConfig) -> Self {
        let mailbox = Mailbox::new(config.mailbox.clone());
        Self {
            config,
            mailbox,
            state: DaemonState::Init,
        }
    }

    pub fn state(&self) -> DaemonState {
        self.state
    }

    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    /// Request graceful termination, as the signal handler does
    pub fn request_termination() {
        TERMINATE.store(true, Ordering::SeqCst);
    }

    pub fn termination_requested() -> bool {
        TERMINATE.load(Ordering::SeqCst)
    }

    /// The daemon issues the system shutdown and opens a privileged device
    /// node, so effective root is required up front.
    pub fn check_privileges() -> Result<()> {
        if !Uid::effective().is_root() {
            return Err(MailboxError::privilege(
                "must be launched with root privileges",
            ));
        }
        Ok(())
    }

    fn install_signal_handler() -> Result<()> {
        let action = SigAction::new(
            SigHandler::Handler(handle_termination),
            SaFlags::empty(),
            SigSet::empty(),
        );
        for sig in [Signal::SIGTERM, Signal::SIGINT] {
            unsafe {
                signal::sigaction(sig, &action)
                    .map_err(|e| MailboxError::platform(format!("sigaction({}): {}", sig, e)))?;
            }
        }
        Ok(())
    }

    /// Startup phase: layout check, device location, magic check, startup
    /// status report, signal handler. Any failure here is startup-fatal.
    fn init(&mut self) -> Result<()> {
        layout::verify()?;
        self.mailbox.verify_region()?;
        info!(
            "opened mailbox at {}",
            self.mailbox.backing_path()?.display()
        );

        let status = FpgaStatus {
            app_startup_finished: true,
            ..Default::default()
        };
        self.mailbox.set_fpga_status(&status)?;

        Self::install_signal_handler()?;
        self.state = DaemonState::Running;
        Ok(())
    }

    /// React to the polled control record.
    ///
    /// A set shutdown bit execs the configured command, which replaces this
    /// process on success. A failed invocation is logged and terminates the
    /// loop instead, so the attempt happens at most once per process.
    fn handle_fpga_ctrl(&self, ctrl: &FpgaControl) -> PollOutcome {
        if !ctrl.req_shutdown {
            return PollOutcome::Continue;
        }
        info!("shutdown requested by MMC");
        let err = Self::invoke_shutdown(&self.config.shutdown_command);
        error!("{}", err);
        Self::request_termination();
        PollOutcome::ShutdownFailed
    }

    /// Exec the shutdown command; only ever returns the failure
    fn invoke_shutdown(argv: &[String]) -> MailboxError {
        if argv.is_empty() {
            return MailboxError::config("empty shutdown command");
        }
        MailboxError::ShutdownFailed {
            source: Command::new(&argv[0]).args(&argv[1..]).exec(),
        }
    }

    /// One poll iteration, pacing excluded
    pub fn poll_once(&self) -> PollOutcome {
        let ctrl = match self.mailbox.fpga_ctrl() {
            Ok(ctrl) => ctrl,
            Err(e) => {
                error!("could not read FPGA control record: {}", e);
                return PollOutcome::DeviceLost;
            }
        };

        let outcome = self.handle_fpga_ctrl(&ctrl);
        if outcome != PollOutcome::Continue {
            return outcome;
        }

        // Best-effort telemetry: a failed publication is not a reason to stop
        let identity = netinfo::probe(&self.config.interface);
        if let Err(e) = self.mailbox.set_network_identity(&identity) {
            error!(
                "could not publish network identity of {}: {}",
                self.config.interface, e
            );
        }
        PollOutcome::Continue
    }

    /// The RUNNING loop: poll until the termination flag or a run-fatal
    /// outcome, sleeping the configured interval between iterations
    pub fn run_poll_loop(&mut self) {
        while !Self::termination_requested() {
            match self.poll_once() {
                PollOutcome::Continue => thread::sleep(self.config.poll_interval()),
                PollOutcome::DeviceLost | PollOutcome::ShutdownFailed => break,
            }
        }
        self.state = DaemonState::Terminating;
    }

    /// Full lifecycle: INIT, RUNNING, TERMINATING, STOPPED
    pub fn run(&mut self) -> Result<()> {
        Self::check_privileges()?;

        let startup = self.init();
        match &startup {
            Ok(()) => {
                info!("started");
                self.run_poll_loop();
            }
            Err(e) => {
                error!("startup failed: {}", e);
                self.state = DaemonState::Terminating;
            }
        }

        self.state = DaemonState::Stopped;
        info!("terminated");
        startup
    }
}

/// Detach from the controlling session using the double-fork convention.
///
/// Skip this when a supervisor already manages detachment. Both parents exit
/// the process; the surviving grandchild resets its umask, moves to the
/// filesystem root and closes every inherited descriptor.
pub fn daemonize() -> Result<()> {
    match unsafe { fork() }.map_err(|e| MailboxError::platform(format!("fork: {}", e)))? {
        ForkResult::Parent { .. } => std::process::exit(0),
        ForkResult::Child => {}
    }

    setsid().map_err(|e| MailboxError::platform(format!("setsid: {}", e)))?;

    for sig in [Signal::SIGCHLD, Signal::SIGHUP] {
        unsafe {
            signal::signal(sig, SigHandler::SigIgn)
                .map_err(|e| MailboxError::platform(format!("signal({}): {}", sig, e)))?;
        }
    }

    match unsafe { fork() }.map_err(|e| MailboxError::platform(format!("fork: {}", e)))? {
        ForkResult::Parent { .. } => std::process::exit(0),
        ForkResult::Child => {}
    }

    umask(Mode::empty());
    chdir("/").map_err(|e| MailboxError::platform(format!("chdir: {}", e)))?;

    let max_fd = unsafe { libc::sysconf(libc::_SC_OPEN_MAX) };
    for fd in 0..max_fd as i32 {
        let _ = close(fd);
    }

    Ok(())
}
