//! YouTube trailers listed by the movie database.
//!
//! The database's video descriptors are filtered down to YouTube trailers
//! (optionally by language and minimum size) and each link is handed to
//! `yt-dlp` until one download succeeds.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{TrailerRequest, TrailerSource};
use crate::config::{NetworkConfig, YoutubeConfig};
use crate::metadata::VideoDescriptor;

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Trailer source that downloads YouTube videos with yt-dlp.
pub struct YoutubeTrailers {
    binary: PathBuf,
    lang: Option<String>,
    min_resolution: Option<u32>,
    max_resolution: u32,
    timeout: Duration,
}

impl YoutubeTrailers {
    pub fn new(config: &YoutubeConfig, network: &NetworkConfig) -> Self {
        let binary = trailer_av::get_tool_path("yt-dlp", config.binary.as_deref()).unwrap_or_else(|e| {
            warn!("{e}; YouTube downloads will fail");
            PathBuf::from("yt-dlp")
        });

        Self {
            binary,
            lang: config.lang.as_ref().map(|l| l.trim().to_lowercase()),
            min_resolution: config.min_resolution,
            max_resolution: config.max_resolution,
            timeout: network.download_timeout(),
        }
    }

    /// Watch URLs for the descriptors that pass the configured filters.
    pub fn select_links(&self, videos: &[VideoDescriptor]) -> Vec<String> {
        videos
            .iter()
            .filter(|v| v.kind.eq_ignore_ascii_case("trailer"))
            .filter(|v| v.site.eq_ignore_ascii_case("youtube"))
            .filter(|v| match &self.lang {
                Some(lang) => v
                    .language
                    .as_deref()
                    .is_some_and(|l| l.eq_ignore_ascii_case(lang)),
                None => true,
            })
            .filter(|v| match self.min_resolution {
                Some(min) => v.size.is_some_and(|size| size >= min),
                None => true,
            })
            .map(|v| format!("{WATCH_URL}{}", v.key))
            .collect()
    }

    fn format_selector(&self) -> String {
        format!(
            "bestvideo[ext=mp4][height<={}]+bestaudio[ext=m4a]",
            self.max_resolution
        )
    }

    async fn download(&self, link: &str, dest: &Path) -> anyhow::Result<()> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--format")
            .arg(self.format_selector())
            .args([
                "--merge-output-format",
                "mp4",
                "--no-playlist",
                "--restrict-filenames",
                "--quiet",
                "--no-warnings",
                "--output",
            ])
            .arg(dest)
            .arg(link)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(command = ?cmd.as_std(), "Running yt-dlp");

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| anyhow::anyhow!("yt-dlp timed out after {}s", self.timeout.as_secs()))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp exited with {}: {}", output.status, stderr.trim());
        }
        if !dest.exists() {
            anyhow::bail!("yt-dlp reported success but {} was not written", dest.display());
        }
        Ok(())
    }
}

#[async_trait]
impl TrailerSource for YoutubeTrailers {
    fn name(&self) -> &'static str {
        "youtube"
    }

    fn requires_videos(&self) -> bool {
        true
    }

    async fn fetch(&self, request: &TrailerRequest<'_>, dest: &Path) -> bool {
        let links = self.select_links(request.videos);
        if links.is_empty() {
            info!("No YouTube trailers listed by the movie database, skipping YouTube");
            return false;
        }
        info!(count = links.len(), "Found YouTube trailers");

        for link in &links {
            info!(link = %link, "Attempting to download YouTube video");
            match self.download(link, dest).await {
                Ok(()) => {
                    info!("YouTube download complete");
                    return true;
                }
                Err(e) => warn!(link = %link, error = %e, "YouTube download failed"),
            }
        }

        false
    }
}
