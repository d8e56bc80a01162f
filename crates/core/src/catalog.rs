//! The run-time options an operator may set for an `ansible-playbook` run.
//!
//! The catalog is static data. Its order is the order in which the menu
//! presents the options and the order in which their flags are emitted.

use std::fmt::{Display, Formatter};
use std::path::Path;

/// Name of the inventory option, which has its own menu screen.
pub const INVENTORY: &str = "inventory";

/// Outcome of a validator: `Err` carries a reason shown to the operator.
pub type Verdict = std::result::Result<(), String>;

/// Validates a candidate value. Relative paths are resolved against
/// `base_dir`, the directory the run will execute in.
pub type Validator = fn(&OptionValue, &Path) -> Verdict;

/// Shape of the value an option accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// Present or absent, no value.
    Flag,
    FreeText,
    /// Free text that may also be picked from the chosen inventory's hosts
    /// and groups.
    HostPattern,
    Path,
    Choice(&'static [&'static str]),
}

/// A value supplied for one option.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionValue {
    Enabled(bool),
    Text(String),
}

impl OptionValue {
    #[must_use]
    pub fn text(value: &str) -> Self {
        Self::Text(value.to_string())
    }

    /// The textual value, if this is not a flag value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Enabled(_) => None,
        }
    }
}

impl Display for OptionValue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enabled(true) => formatter.write_str("yes"),
            Self::Enabled(false) => formatter.write_str("no"),
            Self::Text(text) => formatter.write_str(text),
        }
    }
}

/// Description of one option.
#[derive(Clone, Debug)]
pub struct OptionSpec {
    pub name: &'static str,
    /// Human readable label used by the menu.
    pub label: &'static str,
    pub kind: ValueKind,
    /// Value the option has when the operator does not set it. `None` means
    /// the flag is omitted.
    pub default: Option<OptionValue>,
    /// Argument-vector template, one element per emitted argument. `{value}`
    /// is replaced with the selected value.
    pub flag: &'static [&'static str],
    pub validator: Validator,
}

impl OptionSpec {
    /// Runs the option's validator.
    ///
    /// # Errors
    ///
    /// Returns the rejection reason when the value is not acceptable.
    pub fn validate(&self, value: &OptionValue, base_dir: &Path) -> Verdict {
        (self.validator)(value, base_dir)
    }

    /// Whether `value` equals the option's default and so emits nothing.
    #[must_use]
    pub fn is_default(&self, value: &OptionValue) -> bool {
        match &self.default {
            Some(default) => default == value,
            None => matches!(value, OptionValue::Enabled(false)),
        }
    }
}

impl Display for OptionSpec {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{} ({})", self.label, self.flag.join(" "))
    }
}

/// Ordered list of [`OptionSpec`].
#[derive(Clone, Debug)]
pub struct Catalog {
    options: Vec<OptionSpec>,
}

impl Catalog {
    #[must_use]
    pub fn new(options: Vec<OptionSpec>) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|option| option.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptionSpec> {
        self.options.iter()
    }
}

impl Default for Catalog {
    /// The options exposed for `ansible-playbook`.
    fn default() -> Self {
        Self::new(vec![
            OptionSpec {
                name: INVENTORY,
                label: "Inventory",
                kind: ValueKind::Path,
                default: None,
                flag: &["-i", "{value}"],
                validator: validate_existing_path,
            },
            OptionSpec {
                name: "limit",
                label: "Limit to hosts or groups",
                kind: ValueKind::HostPattern,
                default: None,
                flag: &["--limit", "{value}"],
                validator: validate_non_blank,
            },
            OptionSpec {
                name: "tags",
                label: "Only run tags",
                kind: ValueKind::FreeText,
                default: None,
                flag: &["--tags", "{value}"],
                validator: validate_tag_list,
            },
            OptionSpec {
                name: "skip_tags",
                label: "Skip tags",
                kind: ValueKind::FreeText,
                default: None,
                flag: &["--skip-tags", "{value}"],
                validator: validate_tag_list,
            },
            OptionSpec {
                name: "extra_vars",
                label: "Extra variables",
                kind: ValueKind::FreeText,
                default: None,
                flag: &["--extra-vars", "{value}"],
                validator: validate_non_blank,
            },
            OptionSpec {
                name: "check",
                label: "Check mode (dry run)",
                kind: ValueKind::Flag,
                default: Some(OptionValue::Enabled(false)),
                flag: &["--check"],
                validator: validate_flag,
            },
            OptionSpec {
                name: "diff",
                label: "Show differences",
                kind: ValueKind::Flag,
                default: Some(OptionValue::Enabled(false)),
                flag: &["--diff"],
                validator: validate_flag,
            },
            OptionSpec {
                name: "verbosity",
                label: "Verbosity",
                kind: ValueKind::Choice(VERBOSITY_LEVELS),
                default: None,
                flag: &["-{value}"],
                validator: validate_verbosity,
            },
            OptionSpec {
                name: "ask_pass",
                label: "Ask for SSH password",
                kind: ValueKind::Flag,
                default: Some(OptionValue::Enabled(false)),
                flag: &["--ask-pass"],
                validator: validate_flag,
            },
            OptionSpec {
                name: "ask_become_pass",
                label: "Ask for privilege escalation password",
                kind: ValueKind::Flag,
                default: Some(OptionValue::Enabled(false)),
                flag: &["--ask-become-pass"],
                validator: validate_flag,
            },
        ])
    }
}

const VERBOSITY_LEVELS: &[&str] = &["v", "vv", "vvv", "vvvv"];

fn expect_text(value: &OptionValue) -> std::result::Result<&str, String> {
    value
        .as_text()
        .ok_or_else(|| "expected a value, not a yes/no answer".to_string())
}

fn validate_flag(value: &OptionValue, _base_dir: &Path) -> Verdict {
    match value {
        OptionValue::Enabled(_) => Ok(()),
        OptionValue::Text(_) => Err("expected yes or no".to_string()),
    }
}

fn validate_non_blank(value: &OptionValue, _base_dir: &Path) -> Verdict {
    if expect_text(value)?.trim().is_empty() {
        return Err("value may not be empty".to_string());
    }

    Ok(())
}

fn validate_tag_list(value: &OptionValue, _base_dir: &Path) -> Verdict {
    let text = expect_text(value)?;

    for tag in text.split(',') {
        if tag.trim().is_empty() {
            return Err(format!("`{text}` contains an empty tag name"));
        }

        if tag.trim().contains(char::is_whitespace) {
            return Err(format!("tag `{}` contains whitespace", tag.trim()));
        }
    }

    Ok(())
}

fn validate_existing_path(value: &OptionValue, base_dir: &Path) -> Verdict {
    let text = expect_text(value)?;

    if text.trim().is_empty() {
        return Err("path may not be empty".to_string());
    }

    if !base_dir.join(text).exists() {
        return Err(format!("`{text}` does not exist"));
    }

    Ok(())
}

fn validate_verbosity(value: &OptionValue, _base_dir: &Path) -> Verdict {
    let text = expect_text(value)?;

    if !VERBOSITY_LEVELS.contains(&text) {
        return Err(format!(
            "`{text}` is not one of {}",
            VERBOSITY_LEVELS.join(", ")
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn catalog() -> Catalog {
        Catalog::default()
    }

    fn check(name: &str, value: OptionValue, base_dir: &Path) -> Verdict {
        catalog().get(name).unwrap().validate(&value, base_dir)
    }

    #[test]
    fn test_catalog_order_starts_with_inventory() {
        let names: Vec<_> = catalog().iter().map(|option| option.name).collect();
        assert_eq!(names[0], INVENTORY);
        assert_eq!(names[1], "limit");
        assert_eq!(names[2], "tags");
    }

    #[test]
    fn test_option_names_are_unique() {
        let catalog = catalog();
        let names: HashSet<_> = catalog.iter().map(|option| option.name).collect();
        assert_eq!(names.len(), catalog.options().len());
    }

    #[test]
    fn test_inventory_must_exist() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("hosts.ini"), "[web]\n").unwrap();

        assert!(check(INVENTORY, OptionValue::text("hosts.ini"), dir.path()).is_ok());
        assert!(check(INVENTORY, OptionValue::text("missing.ini"), dir.path()).is_err());
        assert!(check(INVENTORY, OptionValue::text(""), dir.path()).is_err());
    }

    #[test]
    fn test_absolute_inventory_path() {
        let dir = TempDir::new().unwrap();
        let hosts = dir.path().join("hosts");
        std::fs::write(&hosts, "localhost\n").unwrap();

        let value = OptionValue::Text(hosts.display().to_string());
        assert!(check(INVENTORY, value, Path::new("/")).is_ok());
    }

    #[test]
    fn test_tag_list_validation() {
        let base = Path::new(".");
        assert!(check("tags", OptionValue::text("web"), base).is_ok());
        assert!(check("tags", OptionValue::text("web,db"), base).is_ok());
        assert!(check("tags", OptionValue::text("web,,db"), base).is_err());
        assert!(check("tags", OptionValue::text("web server"), base).is_err());
        assert!(check("skip_tags", OptionValue::text(" "), base).is_err());
    }

    #[test]
    fn test_extra_vars_accepts_shell_metacharacters() {
        let base = Path::new(".");
        let value = OptionValue::text("msg='hello world'; rm -rf / && echo $HOME");
        assert!(check("extra_vars", value, base).is_ok());
    }

    #[test]
    fn test_flag_rejects_text() {
        let base = Path::new(".");
        assert!(check("check", OptionValue::Enabled(true), base).is_ok());
        assert!(check("check", OptionValue::text("true"), base).is_err());
        assert!(check("limit", OptionValue::Enabled(true), base).is_err());
    }

    #[test]
    fn test_verbosity_choices() {
        let base = Path::new(".");
        assert!(check("verbosity", OptionValue::text("vvv"), base).is_ok());
        let reason = check("verbosity", OptionValue::text("vvvvv"), base).unwrap_err();
        assert!(reason.contains("v, vv, vvv, vvvv"));
    }

    #[test]
    fn test_is_default() {
        let catalog = catalog();
        let check_mode = catalog.get("check").unwrap();
        assert!(check_mode.is_default(&OptionValue::Enabled(false)));
        assert!(!check_mode.is_default(&OptionValue::Enabled(true)));

        let limit = catalog.get("limit").unwrap();
        assert!(!limit.is_default(&OptionValue::text("web")));
    }

    #[test]
    fn test_limit_is_a_host_pattern() {
        let catalog = catalog();
        let limit = catalog.get("limit").unwrap();
        assert_eq!(limit.kind, ValueKind::HostPattern);
        assert!(check("limit", OptionValue::text("web:&prod"), Path::new(".")).is_ok());
    }

    #[test]
    fn test_option_display() {
        let catalog = catalog();
        assert_eq!(
            catalog.get(INVENTORY).unwrap().to_string(),
            "Inventory (-i {value})"
        );
    }
}
