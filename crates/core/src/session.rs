//! One complete invocation: scan, menus, assembly and execution.

use std::path::PathBuf;

use indexmap::IndexMap;
use log::info;

use crate::catalog::Catalog;
use crate::error::{Result, ABORTED_EXIT_CODE};
use crate::locator::PlaybookLocator;
use crate::menu::{MenuMachine, MenuOutcome, Presenter};
use crate::selection::{RunResult, RunSpec};
use crate::supervisor::{exit_code_of, Supervisor};

/// Inputs of a session that do not come from the operator's menu choices.
#[derive(Clone, Debug)]
pub struct SessionOptions {
    /// Directory scanned for playbooks; runs execute inside it.
    pub root: PathBuf,
    pub executable: String,
    /// Values pre-filled on the option screens, keyed by option name.
    pub proposals: IndexMap<String, String>,
    /// Stop after assembling instead of launching.
    pub dry_run: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed(RunResult),
    Aborted,
    DryRun(RunSpec),
}

impl SessionOutcome {
    /// Exit code for the playpick process itself.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            SessionOutcome::Completed(result) => exit_code_of(result),
            SessionOutcome::Aborted => ABORTED_EXIT_CODE,
            SessionOutcome::DryRun(_) => 0,
        }
    }
}

/// Runs one session.
///
/// # Errors
///
/// Returns [`crate::error::Error::NotFound`] for a bad root,
/// [`crate::error::Error::NoPlaybooks`] when nothing can be offered,
/// [`crate::error::Error::Launch`] when the executable can not be started, and
/// any presenter failure.
pub fn run_session(
    options: &SessionOptions,
    catalog: &Catalog,
    presenter: &mut dyn Presenter,
    supervisor: &mut dyn Supervisor,
) -> Result<SessionOutcome> {
    let locator = PlaybookLocator::new(&options.root)?;
    let playbooks: Vec<_> = locator.scan().collect();
    info!(
        "Found {} playbook(s) under `{}`",
        playbooks.len(),
        locator.root().display()
    );

    let machine = MenuMachine::new(
        &playbooks,
        catalog,
        &options.proposals,
        &options.executable,
        locator.root(),
    )?;

    let run_spec = match machine.run(presenter)? {
        MenuOutcome::Ready { run_spec, .. } => run_spec,
        MenuOutcome::Aborted => {
            info!("Selection aborted by the operator");
            return Ok(SessionOutcome::Aborted);
        }
    };

    if options.dry_run {
        return Ok(SessionOutcome::DryRun(run_spec));
    }

    Ok(SessionOutcome::Completed(supervisor.run(&run_spec)?))
}
