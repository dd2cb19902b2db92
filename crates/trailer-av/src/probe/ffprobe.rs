//! FFprobe-based duration probing.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Probe the container duration of `path` using the given ffprobe binary.
pub fn probe_duration_with(ffprobe: &Path, path: &Path) -> Result<Duration> {
    if !path.exists() {
        return Err(Error::MissingFile(path.to_path_buf()));
    }

    let output = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_entries",
            "format=duration",
        ])
        .arg(path)
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::tool_not_found("ffprobe")
            } else {
                Error::Io(e)
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::tool_failed("ffprobe", stderr.trim().to_string()));
    }

    let json_str = String::from_utf8(output.stdout)
        .map_err(|e| Error::bad_output("ffprobe", format!("Invalid UTF-8: {}", e)))?;

    parse_duration_output(&json_str)
}

fn parse_duration_output(json_str: &str) -> Result<Duration> {
    let output: FfprobeOutput = serde_json::from_str(json_str)?;

    let raw = output
        .format
        .and_then(|f| f.duration)
        .ok_or_else(|| Error::bad_output("ffprobe", "missing format.duration"))?;

    let secs = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::bad_output("ffprobe", format!("non-numeric duration: {raw:?}")))?;

    if !secs.is_finite() || secs < 0.0 {
        return Err(Error::bad_output(
            "ffprobe",
            format!("invalid duration: {raw:?}"),
        ));
    }

    Ok(Duration::from_secs_f64(secs))
}
