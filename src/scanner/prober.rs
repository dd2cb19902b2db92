//! Duration probing for the scanner.
//!
//! Wraps the trailer-av ffprobe helper behind [`DurationProbe`] so folder
//! classification can be exercised without real media files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;

/// Something that can report the playable length of a media file.
pub trait DurationProbe: Send + Sync {
    fn duration(&self, path: &Path) -> Result<Duration>;
}

/// Probes files with ffprobe.
pub struct FileProber {
    ffprobe: PathBuf,
}

impl FileProber {
    /// Create a prober, preferring `configured` over the `ffprobe` on PATH.
    pub fn new(configured: Option<&Path>) -> Self {
        let ffprobe = trailer_av::get_tool_path("ffprobe", configured).unwrap_or_else(|e| {
            tracing::warn!("{e}; durations cannot be probed");
            PathBuf::from("ffprobe")
        });
        Self { ffprobe }
    }

    pub fn ffprobe_path(&self) -> &Path {
        &self.ffprobe
    }
}

impl Default for FileProber {
    fn default() -> Self {
        Self::new(None)
    }
}

impl DurationProbe for FileProber {
    fn duration(&self, path: &Path) -> Result<Duration> {
        Ok(trailer_av::probe::probe_duration_with(&self.ffprobe, path)?)
    }
}
