//! External tool detection.
//!
//! trailer-technician shells out to three programs: `ffprobe` for durations,
//! `yt-dlp` for platform downloads, and `git` for the update check. Each may
//! be configured with an explicit path or looked up on `PATH`.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Result of asking an external program for its version.
#[derive(Debug, Clone)]
pub struct ToolStatus {
    /// File name of the program, for display.
    pub name: String,
    /// Resolved executable, when it answered.
    pub path: Option<PathBuf>,
    /// First line the program printed for its version flag.
    pub version: Option<String>,
}

impl ToolStatus {
    pub fn is_available(&self) -> bool {
        self.path.is_some()
    }
}

/// Run `program --version` and report what came back.
///
/// ```no_run
/// use trailer_av::check_tool;
///
/// let status = check_tool("yt-dlp");
/// if let Some(version) = &status.version {
///     println!("yt-dlp {version}");
/// }
/// ```
pub fn check_tool(program: &str) -> ToolStatus {
    check_tool_with_arg(program, "--version")
}

/// Like [`check_tool`] for programs with another version flag
/// (`ffprobe -version`, `git version`).
///
/// `program` may be a bare name or a path to an executable.
pub fn check_tool_with_arg(program: &str, version_arg: &str) -> ToolStatus {
    let name = Path::new(program)
        .file_name()
        .map_or_else(|| program.to_string(), |n| n.to_string_lossy().into_owned());

    let answered = Command::new(program)
        .arg(version_arg)
        .output()
        .ok()
        .filter(|output| output.status.success());

    let Some(output) = answered else {
        return ToolStatus {
            name,
            path: None,
            version: None,
        };
    };

    let path = which::which(program).unwrap_or_else(|_| PathBuf::from(program));
    let version = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string);

    ToolStatus {
        name,
        path: Some(path),
        version,
    }
}

/// Require that a tool is available on `PATH`, returning its path.
///
/// # Errors
///
/// Returns an error if the tool is not found.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Get the path to a tool, preferring a configured path over `PATH` lookup.
pub fn get_tool_path(name: &str, config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = config_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        tracing::warn!(
            tool = name,
            path = %path.display(),
            "Configured tool path does not exist, falling back to PATH"
        );
    }

    require_tool(name)
}
