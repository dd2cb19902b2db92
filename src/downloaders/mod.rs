//! Trailer sources.
//!
//! Each source makes one best-effort attempt to write a trailer to a
//! destination path and reports whether it succeeded. Sources never retry; the
//! processor moves on to the next one in priority order.

pub mod apple;
pub mod youtube;

use std::path::Path;

use async_trait::async_trait;

use crate::config::Config;
use crate::metadata::VideoDescriptor;

pub use apple::AppleTrailers;
pub use youtube::YoutubeTrailers;

/// What a source gets to work with.
#[derive(Debug, Clone, Copy)]
pub struct TrailerRequest<'a> {
    pub title: Option<&'a str>,
    pub year: Option<u16>,
    pub videos: &'a [VideoDescriptor],
}

/// A place trailers can be downloaded from.
#[async_trait]
pub trait TrailerSource: Send + Sync {
    /// Short identifier used in log output.
    fn name(&self) -> &'static str;

    /// Whether this source needs the database's video descriptors.
    ///
    /// Sources that only use title and year return `false`, which lets the
    /// processor skip the remote lookup when the identity is already known.
    fn requires_videos(&self) -> bool {
        false
    }

    /// Download a trailer to `dest`. Failures are logged and reported as `false`.
    async fn fetch(&self, request: &TrailerRequest<'_>, dest: &Path) -> bool;
}

/// Enabled sources in priority order: Apple first, then YouTube.
pub fn sources_from_config(config: &Config) -> anyhow::Result<Vec<Box<dyn TrailerSource>>> {
    let mut sources: Vec<Box<dyn TrailerSource>> = Vec::new();

    if config.apple.enabled {
        sources.push(Box::new(AppleTrailers::new(&config.apple, &config.network)?));
    }

    if config.youtube.enabled {
        sources.push(Box::new(YoutubeTrailers::new(&config.youtube, &config.network)));
    }

    Ok(sources)
}
