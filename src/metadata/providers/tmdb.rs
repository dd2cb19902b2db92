//! TMDB (The Movie Database) client.
//!
//! Implements [`MovieDatabase`] against the TMDB v3 REST API.
//!
//! Features:
//! - Per-request timeout taken from `network.timeout_secs`.
//! - One request per call; rate limiting (429) is reported like any other status.
//! - Movie details fetched with `append_to_response=videos` so a single call
//!   yields both identity and trailer descriptors.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::TmdbConfig;
use crate::metadata::provider::{
    LookupError, MovieDatabase, MovieRecord, SearchHit, VideoDescriptor,
};
use crate::metadata::release_year;

// ---------------------------------------------------------------------------
// TMDB API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse {
    #[serde(default)]
    results: Vec<TmdbMovieSearchResult>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieSearchResult {
    id: u64,
    title: Option<String>,
    release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbFindResponse {
    #[serde(default)]
    movie_results: Vec<TmdbMovieSearchResult>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieDetail {
    id: u64,
    title: Option<String>,
    original_title: Option<String>,
    release_date: Option<String>,
    imdb_id: Option<String>,
    videos: Option<TmdbVideos>,
}

#[derive(Debug, Deserialize)]
struct TmdbVideos {
    #[serde(default)]
    results: Vec<VideoDescriptor>,
}

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

/// TMDB movie database client.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use trailer_technician::config::TmdbConfig;
/// use trailer_technician::metadata::providers::TmdbProvider;
///
/// let provider = TmdbProvider::new(&TmdbConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub struct TmdbProvider {
    client: reqwest::Client,
    api_key: String,
    language: String,
    base_url: String,
}

impl TmdbProvider {
    /// Create a client from the `[tmdb]` config section.
    pub fn new(config: &TmdbConfig, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Whether an API key is configured.
    pub fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Execute a single GET request and decode the JSON body.
    ///
    /// Every failure, 429 included, is reported once and not retried.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, LookupError> {
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "TMDB request");

        let resp = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", self.language.as_str())])
            .query(params)
            .send()
            .await
            .map_err(request_error)?;

        match resp.status() {
            StatusCode::UNAUTHORIZED => Err(LookupError::Unauthorized),
            StatusCode::NOT_FOUND => Err(LookupError::NotFound),
            s if !s.is_success() => Err(LookupError::Status(s.as_u16())),
            _ => resp.json::<T>().await.map_err(|e| {
                if e.is_timeout() {
                    LookupError::Timeout
                } else {
                    LookupError::Parse(e.to_string())
                }
            }),
        }
    }
}

fn request_error(err: reqwest::Error) -> LookupError {
    if err.is_timeout() {
        LookupError::Timeout
    } else {
        LookupError::Network(err.to_string())
    }
}

fn to_search_hit(r: TmdbMovieSearchResult) -> SearchHit {
    SearchHit {
        tmdb_id: r.id,
        title: r.title.unwrap_or_default(),
        release_date: r.release_date,
    }
}

#[async_trait]
impl MovieDatabase for TmdbProvider {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    async fn movie_details(&self, tmdb_id: u64) -> Result<MovieRecord, LookupError> {
        let detail: TmdbMovieDetail = self
            .get(
                &format!("/movie/{tmdb_id}"),
                &[("append_to_response", "videos")],
            )
            .await?;

        Ok(MovieRecord {
            tmdb_id: detail.id,
            title: detail
                .title
                .filter(|t| !t.is_empty())
                .or(detail.original_title)
                .unwrap_or_default(),
            year: detail.release_date.as_deref().and_then(release_year),
            imdb_id: detail.imdb_id.filter(|id| !id.is_empty()),
            videos: detail.videos.map(|v| v.results).unwrap_or_default(),
        })
    }

    async fn find_by_imdb(&self, imdb_id: &str) -> Result<Option<u64>, LookupError> {
        let body: TmdbFindResponse = self
            .get(
                &format!("/find/{imdb_id}"),
                &[("external_source", "imdb_id")],
            )
            .await?;

        Ok(body.movie_results.first().map(|r| r.id))
    }

    async fn search_movie(&self, title: &str, year: u16) -> Result<Vec<SearchHit>, LookupError> {
        let year = year.to_string();
        let body: TmdbSearchResponse = self
            .get("/search/movie", &[("query", title), ("year", year.as_str())])
            .await?;

        Ok(body.results.into_iter().map(to_search_hit).collect())
    }
}
