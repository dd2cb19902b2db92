//! # trailer-av
//!
//! Media helpers for trailer-technician.
//!
//! This crate provides functionality for:
//! - Probing the playable duration of a media file with ffprobe
//! - Detecting the external tools the downloader relies on
//! - Staging downloads in a scoped temporary workspace and moving them into place
//!
//! ## Example
//!
//! ```no_run
//! use trailer_av::probe_duration;
//!
//! let duration = probe_duration("/movies/Heat (1995)/Heat (1995).mkv")?;
//! println!("{} seconds", duration.as_secs());
//! # Ok::<(), trailer_av::Error>(())
//! ```

mod error;
pub mod probe;
pub mod tools;
pub mod workspace;

// Re-exports
pub use error::{Error, Result};
pub use tools::{check_tool, check_tool_with_arg, get_tool_path, require_tool, ToolStatus};
pub use workspace::DownloadWorkspace;

/// Probe the playable duration of a media file using `ffprobe` from `PATH`.
pub fn probe_duration<P: AsRef<std::path::Path>>(path: P) -> Result<std::time::Duration> {
    probe::probe_duration_with(std::path::Path::new("ffprobe"), path.as_ref())
}
