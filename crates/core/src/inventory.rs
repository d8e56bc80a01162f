//! Hosts and groups named by an inventory file.
//!
//! The limit screen offers these entries as ready-made patterns. Both the INI
//! and the YAML inventory formats are read; anything else yields no entries.

use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

use indexmap::IndexSet;
use log::debug;
use serde_yaml::Value;

use crate::error::{Error, Result};

/// Inventory offered when the operator has not configured one.
pub const SYSTEM_INVENTORY: &str = "/etc/ansible/hosts";

/// Pattern that matches every host of an inventory.
pub const ALL_HOSTS: &str = "all";

/// A host or group name usable as a `--limit` pattern.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum InventoryEntry {
    Group(String),
    Host(String),
}

impl InventoryEntry {
    /// The name as written in a host pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        match self {
            Self::Group(name) | Self::Host(name) => name,
        }
    }
}

impl Display for InventoryEntry {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Group(name) => write!(formatter, "[{name}]"),
            Self::Host(name) => formatter.write_str(name),
        }
    }
}

/// Reads the groups and hosts of an inventory, in file order without
/// duplicates.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file can not be read and [`Error::Yaml`] if a
/// YAML inventory does not parse.
pub fn inventory_entries(path: &Path) -> Result<Vec<InventoryEntry>> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::io_error("inventory".to_string(), path.display().to_string(), e))?;

    let is_yaml = path
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension == "yml" || extension == "yaml");

    let entries = if is_yaml {
        let document: Value = serde_yaml::from_str(&content).map_err(|e| {
            Error::yaml_error(
                "parsing".to_string(),
                "inventory".to_string(),
                path.display().to_string(),
                e,
            )
        })?;
        let mut entries = IndexSet::new();
        collect_yaml_groups(&document, &mut entries);
        entries
    } else {
        ini_entries(&content)
    };

    debug!(
        "Read {} inventory entries from `{}`",
        entries.len(),
        path.display()
    );
    Ok(entries.into_iter().collect())
}

fn ini_entries(content: &str) -> IndexSet<InventoryEntry> {
    let mut entries = IndexSet::new();
    let mut section_kind = "";

    for line in content.lines() {
        // Indented lines continue something else and carry no name
        if line.starts_with(char::is_whitespace) {
            continue;
        }

        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(section) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            let (group, kind) = section.split_once(':').unwrap_or((section, ""));
            section_kind = kind;
            if !group.is_empty() {
                entries.insert(InventoryEntry::Group(group.to_string()));
            }
            continue;
        }

        let Some(name) = line.split_whitespace().next() else {
            continue;
        };

        match section_kind {
            "" => {
                entries.insert(InventoryEntry::Host(name.to_string()));
            }
            "children" => {
                entries.insert(InventoryEntry::Group(name.to_string()));
            }
            _ => {}
        }
    }

    entries
}

/// Walks `group: {hosts: {..}, children: {..}}` mappings.
fn collect_yaml_groups(groups: &Value, entries: &mut IndexSet<InventoryEntry>) {
    let Value::Mapping(groups) = groups else {
        return;
    };

    for (name, group) in groups {
        let Some(name) = name.as_str() else {
            continue;
        };
        entries.insert(InventoryEntry::Group(name.to_string()));

        if let Some(Value::Mapping(hosts)) = group.get("hosts") {
            for host in hosts.keys().filter_map(Value::as_str) {
                entries.insert(InventoryEntry::Host(host.to_string()));
            }
        }

        if let Some(children) = group.get("children") {
            collect_yaml_groups(children, entries);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries_of(file_name: &str, content: &str) -> Vec<InventoryEntry> {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(file_name);
        fs::write(&path, content).unwrap();
        inventory_entries(&path).unwrap()
    }

    fn group(name: &str) -> InventoryEntry {
        InventoryEntry::Group(name.to_string())
    }

    fn host(name: &str) -> InventoryEntry {
        InventoryEntry::Host(name.to_string())
    }

    #[test]
    fn test_ini_hosts_and_groups() {
        let entries = entries_of(
            "hosts.ini",
            concat!(
                "# production\n",
                "bastion ansible_host=10.0.0.1\n",
                "\n",
                "[web]\n",
                "web1\n",
                "web2 ansible_port=2222\n",
                "\n",
                "[db]\n",
                "db1\n",
                "web1\n",
            ),
        );

        assert_eq!(
            entries,
            vec![
                host("bastion"),
                group("web"),
                host("web1"),
                host("web2"),
                group("db"),
                host("db1"),
            ]
        );
    }

    #[test]
    fn test_ini_children_and_vars_sections() {
        let entries = entries_of(
            "hosts",
            concat!(
                "[web]\n",
                "web1\n",
                "\n",
                "[prod:children]\n",
                "web\n",
                "\n",
                "[prod:vars]\n",
                "ntp_server=ntp.example.com\n",
            ),
        );

        assert_eq!(entries, vec![group("web"), host("web1"), group("prod")]);
    }

    #[test]
    fn test_yaml_inventory() {
        let entries = entries_of(
            "inventory.yml",
            concat!(
                "all:\n",
                "  hosts:\n",
                "    bastion:\n",
                "  children:\n",
                "    web:\n",
                "      hosts:\n",
                "        web1:\n",
                "        web2:\n",
                "          ansible_port: 2222\n",
            ),
        );

        assert_eq!(
            entries,
            vec![
                group("all"),
                host("bastion"),
                group("web"),
                host("web1"),
                host("web2"),
            ]
        );
    }

    #[test]
    fn test_missing_inventory_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = inventory_entries(&dir.path().join("missing.ini"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn test_entry_display_and_pattern() {
        assert_eq!(group("web").to_string(), "[web]");
        assert_eq!(group("web").pattern(), "web");
        assert_eq!(host("web1").to_string(), "web1");
    }
}
