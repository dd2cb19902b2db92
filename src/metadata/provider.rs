//! Movie database abstraction and the lookup strategy built on top of it.
//!
//! [`MovieDatabase`] is the seam between identity resolution and the network.
//! [`lookup_movie`] decides which of its calls to make for a partially known
//! identity.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::release_year;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A video attached to a movie record (trailer, teaser, featurette...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDescriptor {
    /// Hosting site, e.g. `"YouTube"`.
    pub site: String,
    /// Site-specific video key.
    pub key: String,
    /// Video kind as reported by the database, e.g. `"Trailer"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// ISO-639-1 language code.
    #[serde(rename = "iso_639_1", default)]
    pub language: Option<String>,
    /// Vertical resolution in lines.
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A fully resolved movie as returned by the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieRecord {
    pub tmdb_id: u64,
    pub title: String,
    pub year: Option<u16>,
    pub imdb_id: Option<String>,
    pub videos: Vec<VideoDescriptor>,
}

/// A single hit from a title search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub tmdb_id: u64,
    pub title: String,
    pub release_date: Option<String>,
}

impl SearchHit {
    pub fn year(&self) -> Option<u16> {
        self.release_date.as_deref().and_then(release_year)
    }
}

/// What is already known about a movie before asking the database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupQuery {
    pub tmdb_id: Option<u64>,
    pub imdb_id: Option<String>,
    pub title: Option<String>,
    pub year: Option<u16>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by [`MovieDatabase`] implementations.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("the API key was rejected")]
    Unauthorized,

    #[error("the requested resource does not exist")]
    NotFound,

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response body: {0}")]
    Parse(String),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A remote movie database.
///
/// Implementations must be `Send + Sync` so they can be shared behind an `Arc`.
#[async_trait]
pub trait MovieDatabase: Send + Sync {
    /// Short identifier used in log output (e.g. `"tmdb"`).
    fn name(&self) -> &'static str;

    /// Fetch a movie by database id, including its attached videos.
    async fn movie_details(&self, tmdb_id: u64) -> Result<MovieRecord, LookupError>;

    /// Translate an IMDb id into a database id. `Ok(None)` when no movie matches.
    async fn find_by_imdb(&self, imdb_id: &str) -> Result<Option<u64>, LookupError>;

    /// Search by title restricted to a release year.
    async fn search_movie(&self, title: &str, year: u16) -> Result<Vec<SearchHit>, LookupError>;
}

// ---------------------------------------------------------------------------
// Lookup strategy
// ---------------------------------------------------------------------------

/// Resolve a movie using the most specific identifier available.
///
/// Tries, in order: the TMDB id, the IMDb id, then a title + year search.
/// Returns `None` when nothing usable is known or the database has no match.
/// Failures are logged, never propagated.
pub async fn lookup_movie(db: &dyn MovieDatabase, query: &LookupQuery) -> Option<MovieRecord> {
    let tmdb_id = if let Some(id) = query.tmdb_id {
        id
    } else if let Some(imdb_id) = query.imdb_id.as_deref() {
        match db.find_by_imdb(imdb_id).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                info!(provider = db.name(), imdb_id, "No movie matches IMDb id");
                return None;
            }
            Err(e) => {
                report_failure(db, &format!("IMDb id {imdb_id}"), &e);
                return None;
            }
        }
    } else if let (Some(title), Some(year)) = (query.title.as_deref(), query.year) {
        match db.search_movie(title, year).await {
            Ok(hits) => match best_match(&hits, title, year) {
                Some(hit) => hit.tmdb_id,
                None => {
                    info!(
                        provider = db.name(),
                        title,
                        year,
                        candidates = hits.len(),
                        "No search result matches title and year"
                    );
                    return None;
                }
            },
            Err(e) => {
                report_failure(db, &format!("\"{title}\" ({year})"), &e);
                return None;
            }
        }
    } else {
        debug!("Not enough information to look up movie");
        return None;
    };

    match db.movie_details(tmdb_id).await {
        Ok(record) => {
            debug!(
                provider = db.name(),
                tmdb_id,
                title = %record.title,
                videos = record.videos.len(),
                "Resolved movie"
            );
            Some(record)
        }
        Err(e) => {
            report_failure(db, &format!("TMDB id {tmdb_id}"), &e);
            None
        }
    }
}

/// First hit whose release year equals `year` and whose title equals `title`
/// ignoring case.
pub fn best_match<'a>(hits: &'a [SearchHit], title: &str, year: u16) -> Option<&'a SearchHit> {
    let wanted = title.trim().to_lowercase();
    hits.iter()
        .find(|hit| hit.year() == Some(year) && hit.title.trim().to_lowercase() == wanted)
}

fn report_failure(db: &dyn MovieDatabase, subject: &str, err: &LookupError) {
    match err {
        LookupError::Unauthorized => error!(
            provider = db.name(),
            "{} rejected the API key while looking up {subject}; check tmdb.api_key",
            db.name()
        ),
        LookupError::NotFound => warn!(
            provider = db.name(),
            "{} could not locate {subject}",
            db.name()
        ),
        other => warn!(
            provider = db.name(),
            error = %other,
            "Lookup of {subject} failed"
        ),
    }
}
