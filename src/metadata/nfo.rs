//! Sidecar `.nfo` reader.
//!
//! Media managers (Kodi, Radarr, Jellyfin) write an XML document next to the
//! movie describing what it is. Only the identity fields are read here; every
//! other element in the document is ignored.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::{is_imdb_id, release_year};

/// Errors raised while reading an NFO file.
#[derive(Debug, Error)]
pub enum NfoError {
    #[error("failed to read NFO file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse NFO document: {0}")]
    Xml(#[from] quick_xml::DeError),
}

#[derive(Debug, Default, Deserialize)]
struct NfoDocument {
    title: Option<String>,
    originaltitle: Option<String>,
    year: Option<String>,
    premiered: Option<String>,
    id: Option<String>,
    imdbid: Option<String>,
    tmdbid: Option<String>,
    #[serde(rename = "uniqueid", default)]
    unique_ids: Vec<NfoUniqueId>,
}

#[derive(Debug, Deserialize)]
struct NfoUniqueId {
    #[serde(rename = "@type")]
    kind: Option<String>,
    #[serde(rename = "$text")]
    value: Option<String>,
}

/// Identity fields extracted from an NFO document.
///
/// Any field may be missing; [`NfoRecord::is_valid`] tells whether the record
/// is complete enough to be adopted as the movie's identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NfoRecord {
    pub title: Option<String>,
    pub year: Option<u16>,
    pub imdb_id: Option<String>,
    pub tmdb_id: Option<u64>,
}

impl NfoRecord {
    /// Read and parse the NFO file at `path`.
    pub fn from_path(path: &Path) -> Result<Self, NfoError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse an NFO document from its XML text.
    pub fn parse(xml: &str) -> Result<Self, NfoError> {
        let doc: NfoDocument = quick_xml::de::from_str(xml)?;
        Ok(Self::from_document(doc))
    }

    /// Whether title, year, IMDb id and TMDB id are all present.
    pub fn is_valid(&self) -> bool {
        self.title.is_some() && self.year.is_some() && self.imdb_id.is_some() && self.tmdb_id.is_some()
    }

    fn from_document(doc: NfoDocument) -> Self {
        let title = non_empty(doc.title).or_else(|| non_empty(doc.originaltitle));

        let year = non_empty(doc.year)
            .filter(|y| y.len() == 4)
            .and_then(|y| release_year(&y))
            .or_else(|| non_empty(doc.premiered).and_then(|d| release_year(&d)));

        let generic_id = non_empty(doc.id);

        // A malformed candidate must not hide a well-formed one further down.
        let imdb = |id: Option<String>| id.filter(|id| is_imdb_id(id));
        let imdb_id = imdb(unique_id(&doc.unique_ids, "imdb"))
            .or_else(|| imdb(non_empty(doc.imdbid)))
            .or_else(|| imdb(generic_id.clone()));

        let tmdb = |id: Option<String>| id.and_then(|id| id.parse::<u64>().ok());
        let tmdb_id = tmdb(unique_id(&doc.unique_ids, "tmdb"))
            .or_else(|| tmdb(non_empty(doc.tmdbid)))
            .or_else(|| tmdb(generic_id));

        Self {
            title,
            year,
            imdb_id,
            tmdb_id,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn unique_id(ids: &[NfoUniqueId], kind: &str) -> Option<String> {
    ids.iter()
        .filter(|u| {
            u.kind
                .as_deref()
                .is_some_and(|k| k.trim().eq_ignore_ascii_case(kind))
        })
        .find_map(|u| non_empty(u.value.clone()))
}
