//! Scoped executable search path.
//!
//! The process `PATH` is read once into a [`SearchPath`]. Later steps that need
//! extra directories (the package manager's `bin`) get a *new* value with
//! the directory prefixed. The process environment itself is never written.

use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error converting a search path back to its `PATH` form.
#[derive(Debug, Error)]
#[error("Search path entry {entry} contains the platform path separator")]
pub struct SearchPathError {
    /// Offending directory.
    pub entry: PathBuf,
}

/// Ordered list of directories searched for executables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    /// Build from an explicit directory list.
    pub fn new(dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            dirs: dirs
                .into_iter()
                .filter(|d| !d.as_os_str().is_empty())
                .collect(),
        }
    }

    /// Parse a `PATH`-style value.
    pub fn parse(value: &OsStr) -> Self {
        Self::new(env::split_paths(value))
    }

    /// Snapshot the current process `PATH`.
    pub fn from_env() -> Self {
        env::var_os("PATH").map_or_else(Self::default, |v| Self::parse(&v))
    }

    /// Return a copy with `dir` searched first.
    ///
    /// An existing occurrence of `dir` further down the list is dropped so
    /// the directory appears once.
    #[must_use]
    pub fn prefixed(&self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let mut dirs = Vec::with_capacity(self.dirs.len() + 1);
        dirs.push(dir.clone());
        dirs.extend(self.dirs.iter().filter(|d| **d != dir).cloned());
        Self { dirs }
    }

    /// Directories in search order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Join back into a `PATH` value for child processes.
    pub fn to_os_string(&self) -> Result<OsString, SearchPathError> {
        env::join_paths(&self.dirs).map_err(|_| SearchPathError {
            entry: self
                .dirs
                .iter()
                .find(|d| contains_separator(d))
                .cloned()
                .unwrap_or_default(),
        })
    }
}

fn contains_separator(dir: &Path) -> bool {
    let sep = if cfg!(windows) { ';' } else { ':' };
    dir.to_string_lossy().contains(sep)
}

impl fmt::Display for SearchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_os_string() {
            Ok(joined) => write!(f, "{}", joined.to_string_lossy()),
            Err(_) => {
                let parts: Vec<String> = self
                    .dirs
                    .iter()
                    .map(|d| d.display().to_string())
                    .collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}
