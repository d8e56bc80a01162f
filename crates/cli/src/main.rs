use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use itertools::Itertools;
use log::{debug, info};
use playpick_core::catalog::Catalog;
use playpick_core::config::{get_config_path, load_config};
use playpick_core::error::Result;
use playpick_core::inventory::SYSTEM_INVENTORY;
use playpick_core::selection::{RunResult, RunSpec};
use playpick_core::session::{run_session, SessionOptions, SessionOutcome};
use playpick_core::supervisor::{ProcessSupervisor, Supervisor};

use playpick_cli::cli_args::Args;
use playpick_cli::terminal::TerminalPresenter;

/// Shows the command line before handing it to the wrapped supervisor.
struct AnnouncingSupervisor<S> {
    inner: S,
}

impl<S: Supervisor> Supervisor for AnnouncingSupervisor<S> {
    fn run(&mut self, run_spec: &RunSpec) -> Result<RunResult> {
        print_run_spec(run_spec);
        self.inner.run(run_spec)
    }
}

fn print_run_spec(run_spec: &RunSpec) {
    println!("Executing command:\n{run_spec}");
    println!("In directory: {}", run_spec.working_directory.display());
}

fn execute() -> Result<SessionOutcome> {
    let args = Args::parse();
    let catalog = Catalog::default();

    let config_path = get_config_path(&args.config_path);
    let mut config = load_config(&config_path)?;
    config.retain_known_proposals(&catalog);
    config.propose_system_inventory(Path::new(SYSTEM_INVENTORY));

    if !config.proposals.is_empty() {
        debug!(
            "Proposals configured for: {}",
            config.proposals.keys().join(", ")
        );
    }

    let options = SessionOptions {
        root: args.playbooks_directory()?,
        executable: config.executable(args.executable.as_deref()),
        proposals: config.proposals,
        dry_run: args.dry_run,
    };

    let mut presenter = TerminalPresenter::new();
    let mut supervisor = AnnouncingSupervisor {
        inner: ProcessSupervisor,
    };

    let outcome = run_session(&options, &catalog, &mut presenter, &mut supervisor)?;

    match &outcome {
        SessionOutcome::Completed(result) => {
            info!(
                "Run finished with exit code {} (interrupted: {})",
                result.exit_code, result.interrupted
            );
        }
        SessionOutcome::Aborted => println!("Aborted, nothing was run."),
        SessionOutcome::DryRun(run_spec) => {
            print_run_spec(run_spec);
            println!("Dry run is specified, exiting without executing.");
        }
    }

    Ok(outcome)
}

fn main() -> ExitCode {
    env_logger::init();

    match execute() {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}
