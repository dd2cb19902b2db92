//! Core type definitions for classifying the contents of a movie directory.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a directory entry plays after a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryRole {
    /// The main feature.
    Movie,
    /// A trailer that is already present.
    Trailer,
    /// A sidecar metadata file.
    Metadata,
    /// Anything else.
    Irrelevant,
}

impl fmt::Display for EntryRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Trailer => write!(f, "trailer"),
            Self::Metadata => write!(f, "metadata"),
            Self::Irrelevant => write!(f, "irrelevant"),
        }
    }
}

/// Disc folder structures that are classified without probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscLayout {
    /// A `BDMV` folder holding `index.bdmv`.
    BluRay,
    /// A `VIDEO_TS` folder holding `VIDEO_TS.IFO`.
    Dvd,
}

impl DiscLayout {
    /// Detect a disc layout from a subdirectory name (case-insensitive substring).
    pub fn from_dir_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        if lower.contains("bdmv") {
            Some(Self::BluRay)
        } else if lower.contains("video_ts") {
            Some(Self::Dvd)
        } else {
            None
        }
    }

    /// Index file that stands in for the movie.
    pub fn index_file_name(&self) -> &'static str {
        match self {
            Self::BluRay => "index.bdmv",
            Self::Dvd => "VIDEO_TS.IFO",
        }
    }

    /// Conventional trailer file name inside the disc folder.
    pub fn trailer_file_name(&self) -> &'static str {
        match self {
            Self::BluRay => "index-trailer.mp4",
            Self::Dvd => "VIDEO_TS-trailer.mp4",
        }
    }
}

impl fmt::Display for DiscLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BluRay => write!(f, "bluray"),
            Self::Dvd => write!(f, "dvd"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disc_layout_detection() {
        assert_eq!(DiscLayout::from_dir_name("BDMV"), Some(DiscLayout::BluRay));
        assert_eq!(DiscLayout::from_dir_name("movie_bdmv"), Some(DiscLayout::BluRay));
        assert_eq!(DiscLayout::from_dir_name("VIDEO_TS"), Some(DiscLayout::Dvd));
        assert_eq!(DiscLayout::from_dir_name("video_ts"), Some(DiscLayout::Dvd));
        assert_eq!(DiscLayout::from_dir_name("extras"), None);
    }

    #[test]
    fn test_disc_layout_names() {
        assert_eq!(DiscLayout::BluRay.index_file_name(), "index.bdmv");
        assert_eq!(DiscLayout::BluRay.trailer_file_name(), "index-trailer.mp4");
        assert_eq!(DiscLayout::Dvd.index_file_name(), "VIDEO_TS.IFO");
        assert_eq!(DiscLayout::Dvd.trailer_file_name(), "VIDEO_TS-trailer.mp4");
    }

    #[test]
    fn test_display() {
        assert_eq!(EntryRole::Movie.to_string(), "movie");
        assert_eq!(EntryRole::Metadata.to_string(), "metadata");
        assert_eq!(DiscLayout::Dvd.to_string(), "dvd");
    }
}
