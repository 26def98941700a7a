//! External tool resolution.
//!
//! The decoder and encoder are configured as either explicit paths or bare
//! program names. [`resolve_tool`] turns both forms into a concrete path:
//! an explicit path must exist on disk, a bare name is searched on `PATH`
//! via [`which`]. [`probe_tool`] additionally asks the program for its
//! version, for the CLI's `check` subcommand.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Availability information for one external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// The configured program (path or bare name).
    pub name: String,
    /// Whether the tool was found.
    pub available: bool,
    /// Resolved path to the executable, if found.
    pub path: Option<PathBuf>,
    /// First line of `--version` output, if the tool runs and prints one.
    pub version: Option<String>,
}

/// Resolve a tool specification to an executable path.
///
/// A specification containing a path separator is treated as an explicit
/// path and must exist on disk; anything else is searched on `PATH`.
/// Returns `None` if the tool cannot be found either way.
pub fn resolve_tool(spec: &str) -> Option<PathBuf> {
    let as_path = Path::new(spec);
    if spec.contains(std::path::MAIN_SEPARATOR) || as_path.components().count() > 1 {
        if as_path.exists() {
            return Some(as_path.to_path_buf());
        }
        log::debug!("explicit tool path does not exist: {spec}");
        return None;
    }
    which::which(spec).ok()
}

/// Resolve a tool and, if found, probe its version string.
///
/// The version is the first line of `--version` output (stdout, falling
/// back to stderr: some tools print their banner there). Probe failures
/// leave `version` as `None` but do not affect availability.
pub fn probe_tool(spec: &str) -> ToolInfo {
    let path = resolve_tool(spec);
    let version = path.as_deref().and_then(probe_version);
    ToolInfo {
        name: spec.to_string(),
        available: path.is_some(),
        path,
        version,
    }
}

fn probe_version(path: &Path) -> Option<String> {
    let output = Command::new(path)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .ok()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let first = stdout.lines().next().map(str::trim).filter(|l| !l.is_empty());
    if let Some(line) = first {
        return Some(line.to_string());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    stderr
        .lines()
        .next()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name_is_searched_on_path() {
        // `sh` is present on any POSIX system this crate targets.
        let resolved = resolve_tool("sh");
        assert!(resolved.is_some());
    }

    #[test]
    fn missing_explicit_path_is_none() {
        assert!(resolve_tool("/nonexistent/dir/vgmstream-cli").is_none());
    }

    #[test]
    fn missing_bare_name_is_none() {
        assert!(resolve_tool("alacify-no-such-tool-xyz").is_none());
    }

    #[test]
    fn probe_reports_unavailable_tool() {
        let info = probe_tool("/nonexistent/dir/vgmstream-cli");
        assert!(!info.available);
        assert!(info.path.is_none());
        assert!(info.version.is_none());
    }
}
