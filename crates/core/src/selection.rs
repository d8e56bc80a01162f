use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use indexmap::IndexMap;

use crate::catalog::OptionValue;

/// The operator's choices for one run, keyed by option name.
///
/// An absent entry means the option keeps its default.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    values: IndexMap<String, OptionValue>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: OptionValue) {
        self.values.insert(name.to_string(), value);
    }

    /// Removes any value for `name`, returning it to its default.
    pub fn clear(&mut self, name: &str) {
        self.values.shift_remove(name);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A fully resolved command ready to be executed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSpec {
    pub executable: String,
    pub args: Vec<String>,
    pub working_directory: PathBuf,
}

impl Display for RunSpec {
    /// Renders a copy-pasteable command line. Only used for display, the
    /// arguments are always passed to the child as a vector.
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&quote(&self.executable))?;
        for arg in &self.args {
            write!(formatter, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(arg: &str) -> String {
    let is_plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,@%+".contains(c));

    if is_plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunResult {
    /// Exit code of the child. A child killed by a signal reports
    /// 128 + the signal number.
    pub exit_code: i32,
    /// The run was interrupted by the operator.
    pub interrupted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_set_and_clear() {
        let mut selection = Selection::new();
        selection.set("tags", OptionValue::text("web"));
        selection.set("check", OptionValue::Enabled(true));
        assert_eq!(selection.get("tags"), Some(&OptionValue::text("web")));

        selection.clear("tags");
        assert!(selection.get("tags").is_none());
        assert!(!selection.is_empty());
    }

    #[test]
    fn test_selection_overwrites_value() {
        let mut selection = Selection::new();
        selection.set("limit", OptionValue::text("web"));
        selection.set("limit", OptionValue::text("db"));
        assert_eq!(selection.iter().count(), 1);
        assert_eq!(selection.get("limit"), Some(&OptionValue::text("db")));
    }

    #[test]
    fn test_run_spec_display_quotes_when_needed() {
        let run_spec = RunSpec {
            executable: "ansible-playbook".to_string(),
            args: vec![
                "--extra-vars".to_string(),
                "msg='hi there'".to_string(),
                "site.yml".to_string(),
            ],
            working_directory: PathBuf::from("/tmp"),
        };

        assert_eq!(
            run_spec.to_string(),
            r"ansible-playbook --extra-vars 'msg='\''hi there'\''' site.yml"
        );
    }
}
