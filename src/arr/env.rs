use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::metadata::is_imdb_id;
use crate::processor::IdentityOverride;

pub const EVENT_TYPE: &str = "radarr_eventtype";
pub const MOVIE_TITLE: &str = "radarr_movie_title";
pub const MOVIE_YEAR: &str = "radarr_movie_year";
pub const MOVIE_IMDB_ID: &str = "radarr_movie_imdbid";
pub const MOVIE_TMDB_ID: &str = "radarr_movie_tmdbid";
pub const MOVIE_PATH: &str = "radarr_movie_path";
pub const MOVIE_FILE_PATH: &str = "radarr_moviefile_path";

/// Why the environment does not describe a usable download event.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    #[error("no Radarr event in the environment ({EVENT_TYPE} is unset)")]
    NoEvent,

    #[error("Radarr event {0:?} is not a download")]
    NotDownload(String),

    #[error("movie directory {0:?} does not exist")]
    MissingDirectory(Option<PathBuf>),

    #[error("neither title and year nor an IMDb/TMDB id were provided")]
    MissingIdentity,
}

/// A validated download event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadarrTrigger {
    pub directory: PathBuf,
    pub identity: IdentityOverride,
}

/// Raw `radarr_*` variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RadarrEnvironment {
    pub event_type: Option<String>,
    pub title: Option<String>,
    pub year: Option<u16>,
    pub imdb_id: Option<String>,
    pub tmdb_id: Option<u64>,
    pub movie_dir: Option<PathBuf>,
    pub movie_file: Option<PathBuf>,
}

impl RadarrEnvironment {
    /// Read the variables of the current process.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Read the variables from any `(name, value)` source.
    ///
    /// Empty values count as unset. Malformed numbers and IMDb ids are dropped.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, v)| k.starts_with("radarr_") && !v.trim().is_empty())
            .collect();
        let mut take = |name: &str| vars.remove(name).map(|v| v.trim().to_string());

        Self {
            event_type: take(EVENT_TYPE),
            title: take(MOVIE_TITLE),
            year: take(MOVIE_YEAR).and_then(|y| y.parse().ok()),
            imdb_id: take(MOVIE_IMDB_ID).filter(|id| is_imdb_id(id)),
            tmdb_id: take(MOVIE_TMDB_ID)
                .and_then(|id| id.parse().ok())
                .filter(|id| *id != 0),
            movie_dir: take(MOVIE_PATH).map(PathBuf::from),
            movie_file: take(MOVIE_FILE_PATH).map(PathBuf::from),
        }
    }

    /// Whether Radarr invoked the script at all.
    pub fn is_present(&self) -> bool {
        self.event_type.is_some()
    }

    /// Radarr's "Test" button.
    pub fn is_test_event(&self) -> bool {
        self.event_type
            .as_deref()
            .is_some_and(|e| e.eq_ignore_ascii_case("test"))
    }

    pub fn is_download_event(&self) -> bool {
        self.event_type
            .as_deref()
            .is_some_and(|e| e.eq_ignore_ascii_case("download"))
    }

    /// Movie directory, falling back to the directory of the movie file.
    pub fn target_directory(&self) -> Option<PathBuf> {
        self.movie_dir.clone().or_else(|| {
            self.movie_file
                .as_deref()
                .and_then(|f| f.parent())
                .map(PathBuf::from)
        })
    }

    /// Check the event and turn it into a directory plus identity.
    pub fn trigger(&self) -> Result<RadarrTrigger, EnvError> {
        let event = self.event_type.as_deref().ok_or(EnvError::NoEvent)?;
        if !self.is_download_event() {
            return Err(EnvError::NotDownload(event.to_string()));
        }

        let directory = self
            .target_directory()
            .filter(|d| d.is_dir())
            .ok_or_else(|| EnvError::MissingDirectory(self.target_directory()))?;

        let has_title_year = self.title.is_some() && self.year.is_some();
        if !has_title_year && self.imdb_id.is_none() && self.tmdb_id.is_none() {
            return Err(EnvError::MissingIdentity);
        }

        Ok(RadarrTrigger {
            directory,
            identity: IdentityOverride {
                title: self.title.clone(),
                year: self.year,
                imdb_id: self.imdb_id.clone(),
                tmdb_id: self.tmdb_id,
            },
        })
    }
}
