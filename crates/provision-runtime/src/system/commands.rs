//! Command lookup and version extraction.
//!
//! These functions locate tools on a [`SearchPath`] and extract their
//! version strings.

use std::path::{Path, PathBuf};
use std::process::Command;

use provision_core::SearchPath;
use tracing::warn;

/// Locate `program` on `search_path`.
///
/// Paths containing a separator are checked directly, like a shell would.
pub fn locate(program: &str, search_path: &SearchPath) -> Option<PathBuf> {
    let joined = match search_path.to_os_string() {
        Ok(joined) => joined,
        Err(e) => {
            warn!("Cannot look up {program}: {e}");
            return None;
        }
    };
    // Only relative program names need the cwd.
    let cwd = std::env::current_dir().unwrap_or_else(|e| {
        warn!("Current directory unavailable ({e}), resolving {program} from /");
        PathBuf::from("/")
    });
    which::which_in(program, Some(joined), cwd).ok()
}

/// Get the version line of a command by running it with `version_flag`.
pub fn get_command_version(cmd: &Path, version_flag: &str) -> Option<String> {
    let output = Command::new(cmd).arg(version_flag).output().ok()?;

    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    // Try stdout first, fall back to stderr (some tools output to stderr)
    let text = if stdout.trim().is_empty() {
        stderr
    } else {
        stdout
    };

    // Extract version from first line
    text.lines().next().map(|s| s.trim().to_string())
}

/// Pull a version number out of a `--version` line.
///
/// Handles the shapes of the tools a plan invokes:
/// - `git version 2.43.0` -> `2.43.0`
/// - `curl 8.5.0 (x86_64-pc-linux-gnu) libcurl/8.5.0` -> `8.5.0`
/// - `GNU bash, version 5.2.21(1)-release (x86_64-pc-linux-gnu)` -> `5.2.21(1)-release`
/// - `conda 24.1.2` -> `24.1.2`
///
/// Falls back to the whole line when nothing looks like a version.
pub fn parse_version(line: &str) -> String {
    line.split_whitespace()
        .map(|w| w.trim_end_matches(','))
        .find(|w| w.chars().next().is_some_and(|c| c.is_ascii_digit()) && w.contains('.'))
        .map_or_else(|| line.trim().to_string(), ToString::to_string)
}

/// Locate `program` and read its version.
///
/// `None` when the program is not on the search path. A program that is
/// found but does not answer `--version` reports an empty version.
pub fn probe_version(program: &str, search_path: &SearchPath) -> Option<String> {
    let path = locate(program, search_path)?;
    Some(
        get_command_version(&path, "--version")
            .map(|line| parse_version(&line))
            .unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_git() {
        assert_eq!(parse_version("git version 2.43.0"), "2.43.0");
    }

    #[test]
    fn test_parse_version_curl() {
        assert_eq!(
            parse_version("curl 8.5.0 (x86_64-pc-linux-gnu) libcurl/8.5.0 OpenSSL/3.0.13"),
            "8.5.0"
        );
    }

    #[test]
    fn test_parse_version_bash() {
        assert_eq!(
            parse_version("GNU bash, version 5.2.21(1)-release (x86_64-pc-linux-gnu)"),
            "5.2.21(1)-release"
        );
    }

    #[test]
    fn test_parse_version_conda() {
        assert_eq!(parse_version("conda 24.1.2"), "24.1.2");
    }

    #[test]
    fn test_parse_version_fallback() {
        assert_eq!(parse_version("  nonsense output "), "nonsense output");
    }

    #[test]
    fn test_locate_nonexistent() {
        assert!(locate("definitely_not_a_real_command_12345", &SearchPath::from_env()).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_locate_with_unjoinable_path() {
        let path = SearchPath::new([PathBuf::from("/usr/bin:/bin")]);
        assert!(locate("sh", &path).is_none());
    }

    #[test]
    fn test_locate_on_empty_path() {
        assert!(locate("sh", &SearchPath::default()).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_probe_version_from_fake_tool() {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        let temp = TempDir::new().unwrap();
        let tool = temp.path().join("faketool");
        fs::write(&tool, "#!/bin/sh\necho 'faketool 1.2.3 (build 7)'\n").unwrap();
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

        let path = SearchPath::new([temp.path().to_path_buf()]);
        assert_eq!(locate("faketool", &path), Some(tool));
        assert_eq!(probe_version("faketool", &path).as_deref(), Some("1.2.3"));
    }
}
