//! Configuration for playpick.
//!
//! An optional YAML file can name the executable to launch and pre-fill the
//! values offered by the option screens:
//!
//! ```yaml
//! executable: /opt/ansible/bin/ansible-playbook
//! proposals:
//!   inventory: inventories/staging.ini
//!   limit: webservers
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, warn};
use serde::Deserialize;

use crate::assembler::DEFAULT_EXECUTABLE;
use crate::catalog::Catalog;
use crate::error::{Error, Result};

/// Default path for the configuration file
const DEFAULT_CONFIG_PATH: &str = "~/.playpick/config.yml";

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub executable: Option<String>,
    #[serde(default)]
    pub proposals: IndexMap<String, String>,
}

impl Config {
    /// Executable to launch: the command line wins over the file, which wins
    /// over `ansible-playbook`.
    #[must_use]
    pub fn executable(&self, executable_arg: Option<&str>) -> String {
        executable_arg
            .or(self.executable.as_deref())
            .unwrap_or(DEFAULT_EXECUTABLE)
            .to_string()
    }

    /// Drops proposals for options the catalog does not know.
    pub fn retain_known_proposals(&mut self, catalog: &Catalog) {
        self.proposals.retain(|name, _| {
            let known = catalog.get(name).is_some();
            if !known {
                warn!("Ignoring proposal for unknown option `{name}`");
            }
            known
        });
    }

    /// Proposes `path` as the inventory when none is configured and the file
    /// exists.
    pub fn propose_system_inventory(&mut self, path: &Path) {
        if self.proposals.contains_key("inventory") || !path.is_file() {
            return;
        }

        debug!("Proposing inventory `{}`", path.display());
        self.proposals
            .insert("inventory".to_string(), path.display().to_string());
    }
}

/// Resolves the configuration file path.
///
/// If a custom path is provided, uses that path. Otherwise, uses the default
/// configuration path. Shell expansions like `~` are resolved.
///
/// # Examples
///
/// ```
/// use playpick_core::config::get_config_path;
///
/// let custom_path = get_config_path(&Some("/path/to/config.yml".to_string()));
/// assert_eq!(custom_path, std::path::PathBuf::from("/path/to/config.yml"));
/// ```
#[must_use]
pub fn get_config_path(config_path_arg: &Option<String>) -> PathBuf {
    let config_path = config_path_arg.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);

    PathBuf::from(shellexpand::tilde(config_path).to_string())
}

/// Reads the configuration file. A missing file yields the default
/// configuration.
///
/// # Errors
///
/// Returns an error if the file exists but can not be read or parsed.
pub fn load_config(config_path: &Path) -> Result<Config> {
    if !config_path.exists() {
        debug!("No config file at `{}`", config_path.display());
        return Ok(Config::default());
    }

    let content = fs::read_to_string(config_path).map_err(|e| {
        Error::io_error("config".to_string(), config_path.display().to_string(), e)
    })?;

    if content.trim().is_empty() {
        return Ok(Config::default());
    }

    serde_yaml::from_str(&content).map_err(|e| {
        Error::yaml_error(
            "reading".to_string(),
            "config".to_string(),
            config_path.display().to_string(),
            e,
        )
    })
}
