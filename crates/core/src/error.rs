use leon::{ParseError, RenderError};
use thiserror::Error;

/// Exit code for argument and environment problems (bad playbooks directory,
/// missing executable, unreadable configuration). Kept clear of the codes
/// `ansible-playbook` itself returns.
pub const ENVIRONMENT_ERROR_EXIT_CODE: u8 = 127;

/// Exit code for a session the operator cancelled in the menus. Differs from
/// 130, which a child killed by an interrupt reports.
pub const ABORTED_EXIT_CODE: u8 = 125;

/// Exit codes documented for `ansible-playbook`.
pub const ANSIBLE_EXIT_CODES: [u8; 10] = [0, 1, 2, 3, 4, 5, 6, 8, 99, 250];

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Playbooks directory `{}` does not exist or is not a directory.", .path)]
    NotFound { path: String },

    #[error("No playbooks (*.yml, *.yaml) were found under `{}`.", .path)]
    NoPlaybooks { path: String },

    #[error("Invalid value for `{}`: {}", .option, .reason)]
    Validation { option: String, reason: String },

    #[error("Unknown option `{}`", .0)]
    UnknownOption(String),

    #[error("Could not launch `{}`: {}", .executable, .original)]
    Launch {
        executable: String,
        original: std::io::Error,
    },

    #[error("Error with sub process: {}", .0)]
    SubProcess(std::io::Error),

    #[error("Error {} {} file at `{}`: {}", .action, .file_description, .path, .original)]
    Yaml {
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    },

    #[error("IO error with {} file at path `{}`: {}", .file_description, .path, .original)]
    Io {
        file_description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("STDIO error: {}", .0)]
    Stdio(#[from] std::io::Error),

    #[error("Error parsing flag template: {}", .0)]
    Parse(#[from] ParseError),

    #[error("Error rendering flag template: {}", .0)]
    Render(#[from] RenderError),
}

impl Error {
    pub fn not_found(path: String) -> Self {
        Self::NotFound { path }
    }

    pub fn no_playbooks(path: String) -> Self {
        Self::NoPlaybooks { path }
    }

    pub fn validation(option: &str, reason: String) -> Self {
        Self::Validation {
            option: option.to_string(),
            reason,
        }
    }

    pub fn launch(executable: String, original: std::io::Error) -> Self {
        Self::Launch {
            executable,
            original,
        }
    }

    pub fn yaml_error(
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    ) -> Self {
        Self::Yaml {
            action,
            file_description,
            path,
            original,
        }
    }

    pub fn io_error(file_description: String, path: String, original: std::io::Error) -> Self {
        Self::Io {
            file_description,
            path,
            original,
        }
    }

    /// Process exit code for a session that ended with this error.
    ///
    /// Every error is an argument or environment problem from the operator's
    /// point of view, so they share one code that no successful run uses.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        ENVIRONMENT_ERROR_EXIT_CODE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_error_message_names_executable() {
        let error = Error::launch(
            "ansible-playbook".to_string(),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(error.to_string().contains("`ansible-playbook`"));
        assert_eq!(error.exit_code(), ENVIRONMENT_ERROR_EXIT_CODE);
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        assert_ne!(ENVIRONMENT_ERROR_EXIT_CODE, ABORTED_EXIT_CODE);
        // 128 + SIGINT, reported for a child stopped with Ctrl-C
        assert_ne!(ABORTED_EXIT_CODE, 130);
        assert_ne!(ENVIRONMENT_ERROR_EXIT_CODE, 130);
    }

    #[test]
    fn test_reserved_exit_codes_are_not_ansible_codes() {
        for code in 0..=8 {
            assert_ne!(ENVIRONMENT_ERROR_EXIT_CODE, code);
            assert_ne!(ABORTED_EXIT_CODE, code);
        }
        assert!(!ANSIBLE_EXIT_CODES.contains(&ENVIRONMENT_ERROR_EXIT_CODE));
        assert!(!ANSIBLE_EXIT_CODES.contains(&ABORTED_EXIT_CODE));
    }

    #[test]
    fn test_validation_error_message() {
        let error = Error::validation("tags", "tag names may not be empty".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid value for `tags`: tag names may not be empty"
        );
    }
}
