//! Command-line argument parsing.
//!
//! This module defines the command-line interface structure using the `clap`
//! crate.

use std::env;
use std::path::PathBuf;

use clap::Parser;
use playpick_core::error::Result;

/// Command-line arguments for the playpick CLI tool.
///
/// # Examples
///
/// ```rust
/// use clap::Parser;
/// use playpick_cli::cli_args::Args;
///
/// let args = Args::parse_from(["playpick", "playbooks", "--dry-run"]);
/// assert!(args.dry_run);
/// ```
#[derive(Parser, Debug)] // requires `derive` feature
#[command(term_width = 0)] // Just to make testing across clap features easier
#[command(version, about = "Pick an Ansible playbook and its options, then run it.")]
pub struct Args {
    /// Directory that is scanned for playbooks.
    ///
    /// If not provided, the current directory is scanned.
    pub playbooks_directory: Option<PathBuf>,

    /// Path to the configuration file YAML.
    ///
    /// If not provided, defaults to `~/.playpick/config.yml`.
    #[arg(long, short = 'c')]
    pub config_path: Option<String>,

    /// Executable to launch instead of `ansible-playbook`.
    #[arg(long, short = 'e')]
    pub executable: Option<String>,

    /// Print the assembled command instead of running it.
    #[arg(long, short = 'd', action)]
    pub dry_run: bool,
}

impl Args {
    /// The directory to scan, falling back to the current directory.
    ///
    /// # Errors
    ///
    /// Returns an error if no directory was given and the current directory
    /// can not be determined.
    pub fn playbooks_directory(&self) -> Result<PathBuf> {
        match &self.playbooks_directory {
            Some(directory) => Ok(directory.clone()),
            None => Ok(env::current_dir()?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_args_default_values() {
        let args = Args::parse_from(["playpick"]);

        assert!(args.playbooks_directory.is_none());
        assert!(args.config_path.is_none());
        assert!(args.executable.is_none());
        assert!(!args.dry_run);
    }

    #[test]
    fn test_args_with_directory() {
        let args = Args::parse_from(["playpick", "/srv/playbooks"]);
        assert_eq!(
            args.playbooks_directory().unwrap(),
            PathBuf::from("/srv/playbooks")
        );
    }

    #[test]
    fn test_args_directory_defaults_to_current() {
        let args = Args::parse_from(["playpick"]);
        assert_eq!(
            args.playbooks_directory().unwrap(),
            env::current_dir().unwrap()
        );
    }

    #[test]
    fn test_args_short_flags() {
        let args = Args::parse_from([
            "playpick",
            "-c",
            "/etc/playpick.yml",
            "-e",
            "/opt/bin/ansible-playbook",
            "-d",
            "site",
        ]);

        assert_eq!(args.config_path, Some("/etc/playpick.yml".to_string()));
        assert_eq!(
            args.executable,
            Some("/opt/bin/ansible-playbook".to_string())
        );
        assert!(args.dry_run);
        assert_eq!(args.playbooks_directory, Some(PathBuf::from("site")));
    }

    #[test]
    fn test_args_long_flags() {
        let args = Args::parse_from([
            "playpick",
            "--config-path",
            "config.yml",
            "--executable",
            "ansible-playbook-3",
            "--dry-run",
        ]);

        assert_eq!(args.config_path, Some("config.yml".to_string()));
        assert_eq!(args.executable, Some("ansible-playbook-3".to_string()));
        assert!(args.dry_run);
    }

    #[test]
    fn test_args_rejects_two_directories() {
        assert!(Args::try_parse_from(["playpick", "one", "two"]).is_err());
    }
}
