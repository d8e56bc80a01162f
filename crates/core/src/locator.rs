//! Playbook discovery.
//!
//! Walks a directory tree and yields every playbook candidate (`*.yml`,
//! `*.yaml`) in lexicographic order of its path relative to the scan root.
//! Hidden entries and a fixed set of directories that hold non-playbook YAML
//! are never descended into.

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};

/// File extensions that mark a playbook candidate.
pub const PLAYBOOK_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// Directory names that are skipped in addition to every hidden entry.
pub const EXCLUDED_DIRECTORIES: [&str; 4] = ["group_vars", "host_vars", "roles", "node_modules"];

/// A discovered playbook file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaybookRef {
    path: PathBuf,
    name: String,
}

impl PlaybookRef {
    /// Absolute path of the playbook.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path relative to the scan root, always `/`-separated.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for PlaybookRef {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.name)
    }
}

/// Scans one root directory. Every call to [`PlaybookLocator::scan`] starts a
/// fresh walk.
#[derive(Clone, Debug)]
pub struct PlaybookLocator {
    root: PathBuf,
}

impl PlaybookLocator {
    /// Creates a locator for `root`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `root` does not exist or is not a directory.
    pub fn new(root: &Path) -> Result<Self> {
        let root = root
            .canonicalize()
            .map_err(|_| Error::not_found(root.display().to_string()))?;

        if !root.is_dir() {
            return Err(Error::not_found(root.display().to_string()));
        }

        debug!("Scanning for playbooks under `{}`", root.display());
        Ok(Self { root })
    }

    /// Canonical scan root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Starts a new lazy scan.
    #[must_use]
    pub fn scan(&self) -> Playbooks {
        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(is_scanned as fn(&DirEntry) -> bool);

        Playbooks {
            root: self.root.clone(),
            walker,
        }
    }
}

/// Lazy sequence of [`PlaybookRef`] produced by [`PlaybookLocator::scan`].
pub struct Playbooks {
    root: PathBuf,
    walker: walkdir::FilterEntry<walkdir::IntoIter, fn(&DirEntry) -> bool>,
}

impl Iterator for Playbooks {
    type Item = PlaybookRef;

    fn next(&mut self) -> Option<Self::Item> {
        for entry in self.walker.by_ref() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {e}");
                    continue;
                }
            };

            if !entry.file_type().is_file() || !has_playbook_extension(entry.path()) {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };

            return Some(PlaybookRef {
                path: entry.path().to_path_buf(),
                name: display_name(relative),
            });
        }

        None
    }
}

/// Convenience wrapper: scans `root` and collects the result.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if `root` does not exist or is not a directory.
pub fn locate_playbooks(root: &Path) -> Result<Vec<PlaybookRef>> {
    Ok(PlaybookLocator::new(root)?.scan().collect())
}

fn is_scanned(entry: &DirEntry) -> bool {
    // The root itself is always scanned, even when it is e.g. `.`
    if entry.depth() == 0 {
        return true;
    }

    // Names that are not UTF-8 can not be passed on as an argument
    let Some(name) = entry.file_name().to_str() else {
        warn!("Skipping `{}`: name is not valid UTF-8", entry.path().display());
        return false;
    };

    if name.starts_with('.') {
        return false;
    }

    !(entry.file_type().is_dir() && EXCLUDED_DIRECTORIES.contains(&name))
}

fn has_playbook_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| PLAYBOOK_EXTENSIONS.contains(&extension))
}

fn display_name(relative: &Path) -> String {
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "- hosts: all\n").unwrap();
    }

    fn names(root: &Path) -> Vec<String> {
        locate_playbooks(root)
            .unwrap()
            .iter()
            .map(|playbook| playbook.name().to_string())
            .collect()
    }

    #[test]
    fn test_example_layout() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "site.yml");
        touch(dir.path(), "group/deploy.yml");

        assert_eq!(names(dir.path()), vec!["group/deploy.yml", "site.yml"]);
    }

    #[test]
    fn test_filters_extensions() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.yml");
        touch(dir.path(), "b.yaml");
        touch(dir.path(), "c.json");
        touch(dir.path(), "README.md");
        touch(dir.path(), "yml");

        assert_eq!(names(dir.path()), vec!["a.yml", "b.yaml"]);
    }

    #[test]
    fn test_skips_hidden_and_excluded_directories() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), ".git/config.yml");
        touch(dir.path(), ".hidden.yml");
        touch(dir.path(), "group_vars/all.yml");
        touch(dir.path(), "host_vars/web1.yml");
        touch(dir.path(), "roles/common/tasks/main.yml");
        touch(dir.path(), "node_modules/pkg/x.yml");
        touch(dir.path(), "deploy/roles.yml");
        touch(dir.path(), "site.yml");

        assert_eq!(names(dir.path()), vec!["deploy/roles.yml", "site.yml"]);
    }

    #[test]
    fn test_nested_ordering_is_lexicographic_by_relative_path() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b/z.yml");
        touch(dir.path(), "a/b/c.yml");
        touch(dir.path(), "a/a.yml");
        touch(dir.path(), "c.yml");

        assert_eq!(
            names(dir.path()),
            vec!["a/a.yml", "a/b/c.yml", "b/z.yml", "c.yml"]
        );
    }

    #[test]
    fn test_paths_are_absolute() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "site.yml");

        let playbooks = locate_playbooks(dir.path()).unwrap();
        assert!(playbooks[0].path().is_absolute());
        assert!(playbooks[0].path().ends_with("site.yml"));
    }

    #[test]
    fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        assert!(locate_playbooks(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let result = locate_playbooks(&dir.path().join("missing"));
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_file_as_root() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "site.yml");
        let result = locate_playbooks(&dir.path().join("site.yml"));
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_scan_is_restartable() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "one.yml");
        touch(dir.path(), "two.yml");

        let locator = PlaybookLocator::new(dir.path()).unwrap();
        let first: Vec<_> = locator.scan().collect();
        let second: Vec<_> = locator.scan().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_followed() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        touch(dir.path(), "top.yml");
        touch(dir.path(), "real/play.yml");
        symlink(dir.path().join("real"), dir.path().join("link")).unwrap();
        symlink(dir.path().join("top.yml"), dir.path().join("alias.yml")).unwrap();
        // A loop must not be walked forever
        symlink(dir.path(), dir.path().join("real/loop")).unwrap();

        assert_eq!(names(dir.path()), vec!["real/play.yml", "top.yml"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        touch(dir.path(), "site.yml");
        touch(dir.path(), "locked/inner.yml");
        touch(dir.path(), "z/last.yml");

        let locked = dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        // Privileged users can still read it
        let is_locked = fs::read_dir(&locked).is_err();

        let found = names(dir.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        if is_locked {
            assert_eq!(found, vec!["site.yml", "z/last.yml"]);
        } else {
            assert_eq!(found, vec!["locked/inner.yml", "site.yml", "z/last.yml"]);
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_names_are_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        touch(dir.path(), "site.yml");
        let bad_name = OsStr::from_bytes(b"bad\xff.yml");
        fs::write(dir.path().join(bad_name), "- hosts: all\n").unwrap();
        let bad_directory = dir.path().join(OsStr::from_bytes(b"dir\xfe"));
        fs::create_dir(&bad_directory).unwrap();
        fs::write(bad_directory.join("inner.yml"), "- hosts: all\n").unwrap();

        assert_eq!(names(dir.path()), vec!["site.yml"]);
    }
}
