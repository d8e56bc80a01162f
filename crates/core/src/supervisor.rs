use std::process::{Command, ExitStatus, Stdio};

use log::info;

use crate::error::{Error, Result};
use crate::selection::{RunResult, RunSpec};

/// Runs an assembled command.
pub trait Supervisor {
    /// Executes `run_spec` and waits for it to finish.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Launch`] if the process could not be started and
    /// [`Error::SubProcess`] if waiting for it failed.
    fn run(&mut self, run_spec: &RunSpec) -> Result<RunResult>;
}

/// Spawns a real child process attached to the operator's terminal.
#[derive(Default)]
pub struct ProcessSupervisor;

impl Supervisor for ProcessSupervisor {
    fn run(&mut self, run_spec: &RunSpec) -> Result<RunResult> {
        let mut command = Command::new(&run_spec.executable);
        command
            .args(&run_spec.args)
            .current_dir(&run_spec.working_directory)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        info!(
            "Executing `{}` in `{}`",
            run_spec,
            run_spec.working_directory.display()
        );

        // Must be in place before the child exists
        let interrupts = interrupt::Deferred::install();

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                interrupts.restore();
                return Err(Error::launch(run_spec.executable.clone(), e));
            }
        };

        let status = child.wait();
        let interrupted = interrupts.restore();

        let status = status.map_err(Error::SubProcess)?;
        Ok(result_from_status(status, interrupted))
    }
}

fn result_from_status(status: ExitStatus, interrupt_seen: bool) -> RunResult {
    if let Some(code) = status.code() {
        return RunResult {
            exit_code: code,
            interrupted: interrupt_seen,
        };
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;

        if let Some(signal) = status.signal() {
            return RunResult {
                exit_code: 128 + signal,
                interrupted: interrupt_seen || signal == nix::libc::SIGINT,
            };
        }
    }

    RunResult {
        exit_code: 1,
        interrupted: interrupt_seen,
    }
}

/// Converts a child exit code into a process exit code.
#[must_use]
pub fn exit_code_of(result: &RunResult) -> u8 {
    u8::try_from(result.exit_code).unwrap_or(1)
}

/// Keeps the supervisor alive through a terminal interrupt while a child runs.
///
/// The terminal delivers SIGINT to the whole foreground process group, so the
/// child receives it directly and decides how to shut down. The supervisor
/// only records that it happened.
#[cfg(unix)]
mod interrupt {
    use std::sync::atomic::{AtomicBool, Ordering};

    use log::{debug, warn};
    use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

    static INTERRUPTED: AtomicBool = AtomicBool::new(false);

    extern "C" fn record_interrupt(_: nix::libc::c_int) {
        INTERRUPTED.store(true, Ordering::SeqCst);
    }

    pub struct Deferred {
        previous: Option<SigAction>,
    }

    impl Deferred {
        pub fn install() -> Self {
            INTERRUPTED.store(false, Ordering::SeqCst);
            let action = SigAction::new(
                SigHandler::Handler(record_interrupt),
                SaFlags::SA_RESTART,
                SigSet::empty(),
            );

            // SAFETY: the handler only touches an atomic.
            let previous = match unsafe { sigaction(Signal::SIGINT, &action) } {
                Ok(previous) => Some(previous),
                Err(e) => {
                    warn!("Could not install interrupt handler: {e}");
                    None
                }
            };

            Self { previous }
        }

        /// Restores the previous disposition and reports whether an
        /// interrupt arrived in between.
        pub fn restore(self) -> bool {
            if let Some(previous) = self.previous {
                // SAFETY: re-installs the disposition that was active before.
                if let Err(e) = unsafe { sigaction(Signal::SIGINT, &previous) } {
                    warn!("Could not restore interrupt handler: {e}");
                }
            }

            let interrupted = INTERRUPTED.swap(false, Ordering::SeqCst);
            if interrupted {
                debug!("Interrupt was forwarded to the child");
            }
            interrupted
        }
    }
}

#[cfg(not(unix))]
mod interrupt {
    pub struct Deferred;

    impl Deferred {
        pub fn install() -> Self {
            Self
        }

        pub fn restore(self) -> bool {
            false
        }
    }
}
