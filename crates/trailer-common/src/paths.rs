//! Path utilities for classifying directory entries by name.
//!
//! The scanner only looks at direct children of a movie directory, so every
//! helper here works on a single file name and never touches the filesystem.

use std::path::Path;

/// Container extensions that may hold a movie or a trailer.
const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "iso", "wmv", "avi", "mp4", "m4v", "img", "divx", "mov", "flv", "m2ts",
];

/// Extension of the sidecar metadata file written by media managers.
const NFO_EXTENSION: &str = "nfo";

/// Marker that identifies an already downloaded trailer.
pub const TRAILER_MARKER: &str = "-trailer";

/// Container used for every trailer this tool writes.
pub const TRAILER_EXTENSION: &str = "mp4";

fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Check if a path has a recognized video container extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use trailer_common::paths::is_video_file;
///
/// assert!(is_video_file(Path::new("movie.mkv")));
/// assert!(is_video_file(Path::new("/path/to/video.M2TS")));
/// assert!(!is_video_file(Path::new("movie.nfo")));
/// ```
pub fn is_video_file(path: &Path) -> bool {
    extension_lowercase(path)
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Check if a path is a sidecar metadata (`.nfo`) file.
pub fn is_nfo_file(path: &Path) -> bool {
    extension_lowercase(path).as_deref() == Some(NFO_EXTENSION)
}

/// Check if a file name carries the trailer marker.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use trailer_common::paths::has_trailer_marker;
///
/// assert!(has_trailer_marker(Path::new("Heat (1995)-trailer.mp4")));
/// assert!(!has_trailer_marker(Path::new("Heat (1995).mkv")));
/// ```
pub fn has_trailer_marker(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().contains(TRAILER_MARKER))
        .unwrap_or(false)
}

/// File name of the trailer that belongs next to `movie`.
///
/// The trailer takes the movie's base name, the trailer marker, and an mp4
/// extension: `Heat (1995).mkv` becomes `Heat (1995)-trailer.mp4`.
pub fn trailer_file_name(movie: &Path) -> String {
    let stem = movie
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{stem}{TRAILER_MARKER}.{TRAILER_EXTENSION}")
}

/// Get the list of recognized video container extensions.
#[must_use]
pub fn video_extensions() -> &'static [&'static str] {
    VIDEO_EXTENSIONS
}
