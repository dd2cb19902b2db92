//! Movie identity sources.
//!
//! Identity (title, year, IMDb id, TMDB id) comes from two places: the sidecar
//! NFO file a media manager leaves next to the movie, and the TMDB API.
//!
//! # Module layout
//!
//! - [`nfo`] -- Sidecar metadata reader.
//! - [`provider`] -- [`MovieDatabase`] trait, normalized records, and the
//!   lookup strategy that picks which remote call to make.
//! - [`providers`] -- Concrete database clients (TMDB).

pub mod nfo;
pub mod provider;
pub mod providers;

use regex::Regex;
use std::sync::LazyLock;

pub use nfo::{NfoError, NfoRecord};
pub use provider::{
    lookup_movie, LookupError, LookupQuery, MovieDatabase, MovieRecord, SearchHit,
    VideoDescriptor,
};

static RE_IMDB_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^tt\d{7,}$").unwrap());

/// Whether `value` looks like an IMDb title id (`tt` followed by at least seven digits).
pub fn is_imdb_id(value: &str) -> bool {
    RE_IMDB_ID.is_match(value)
}

/// Year of a `YYYY-MM-DD` date, or a bare four-digit year taken as-is.
pub fn release_year(date: &str) -> Option<u16> {
    let date = date.trim();
    if date.len() == 4 && date.bytes().all(|b| b.is_ascii_digit()) {
        return date.parse().ok();
    }
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|d| u16::try_from(chrono::Datelike::year(&d)).ok())
}
