//! Movie directory scanner.
//!
//! A [`MovieFolder`] is built from a single directory. Scanning classifies
//! every direct child (movie, existing trailer, metadata, irrelevant), adopts
//! identity from a sidecar NFO when one is complete, and falls back to the
//! folder and file names. Remote lookups happen later and only on request,
//! through [`MovieFolder::resolve_identity`] and [`MovieFolder::resolve_videos`].
//!
//! Entries are visited in file-name order so repeated scans of the same
//! directory classify it identically.

pub mod prober;

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use trailer_av::probe::is_feature_length;
use trailer_common::paths::{has_trailer_marker, is_nfo_file, is_video_file, trailer_file_name};
use trailer_common::{DiscLayout, EntryRole};

use crate::metadata::{is_imdb_id, lookup_movie, LookupQuery, MovieDatabase, MovieRecord, NfoRecord, VideoDescriptor};

pub use prober::{DurationProbe, FileProber};

/// Errors that prevent a directory from being scanned at all.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("directory not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read directory {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A classified directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScannedEntry {
    pub path: PathBuf,
    pub role: EntryRole,
}

/// What is known about the movie in a folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub title: Option<String>,
    pub year: Option<u16>,
    pub imdb_id: Option<String>,
    pub tmdb_id: Option<u64>,
}

impl Identity {
    pub fn is_complete(&self) -> bool {
        self.title.is_some() && self.year.is_some() && self.imdb_id.is_some() && self.tmdb_id.is_some()
    }

    /// Copy fields from `record` into the ones still empty.
    pub fn fill_missing(&mut self, record: &MovieRecord) {
        if self.title.is_none() && !record.title.is_empty() {
            self.title = Some(record.title.clone());
        }
        if self.year.is_none() {
            self.year = record.year;
        }
        if self.imdb_id.is_none() {
            self.imdb_id = record.imdb_id.clone();
        }
        if self.tmdb_id.is_none() {
            self.tmdb_id = Some(record.tmdb_id);
        }
    }

    fn query(&self) -> LookupQuery {
        LookupQuery {
            tmdb_id: self.tmdb_id,
            imdb_id: self.imdb_id.clone(),
            title: self.title.clone(),
            year: self.year,
        }
    }
}

impl From<NfoRecord> for Identity {
    fn from(nfo: NfoRecord) -> Self {
        Self {
            title: nfo.title,
            year: nfo.year,
            imdb_id: nfo.imdb_id,
            tmdb_id: nfo.tmdb_id,
        }
    }
}

/// The scanned contents of one movie directory.
#[derive(Debug)]
pub struct MovieFolder {
    directory: PathBuf,
    movie_path: Option<PathBuf>,
    trailer_path: Option<PathBuf>,
    disc_layout: Option<DiscLayout>,
    metadata_path: Option<PathBuf>,
    entries: Vec<ScannedEntry>,
    identity: Identity,
    videos: Option<Vec<VideoDescriptor>>,
    remote_queried: bool,
}

impl MovieFolder {
    /// Scan `directory` and classify its direct children.
    ///
    /// No network access happens here. Per-entry failures (probe errors,
    /// unparsable NFO files, unreadable subdirectories) are logged and skipped.
    pub fn scan(directory: &Path, prober: &dyn DurationProbe) -> Result<Self, ScanError> {
        if !directory.is_dir() {
            return Err(ScanError::NotFound(directory.to_path_buf()));
        }

        debug!(directory = %directory.display(), "Scanning directory");

        let mut children: Vec<PathBuf> = std::fs::read_dir(directory)
            .map_err(|source| ScanError::Unreadable {
                path: directory.to_path_buf(),
                source,
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        children.sort();

        let mut folder = Self {
            directory: directory.to_path_buf(),
            movie_path: None,
            trailer_path: None,
            disc_layout: None,
            metadata_path: None,
            entries: Vec::with_capacity(children.len()),
            identity: Identity::default(),
            videos: None,
            remote_queried: false,
        };

        for path in children {
            let role = if path.is_dir() {
                folder.classify_dir(&path)
            } else {
                folder.classify_file(&path, prober)
            };
            folder.entries.push(ScannedEntry { path, role });
        }

        folder.fill_from_names();

        debug!(
            directory = %folder.directory.display(),
            movie = ?folder.movie_path,
            trailer = ?folder.trailer_path,
            "Scan complete"
        );

        Ok(folder)
    }

    fn classify_file(&mut self, path: &Path, prober: &dyn DurationProbe) -> EntryRole {
        // A marked trailer never becomes the movie, whatever its length.
        if has_trailer_marker(path) {
            debug!(file = %path.display(), "Found marked trailer");
            self.trailer_path = Some(path.to_path_buf());
            return EntryRole::Trailer;
        }

        if is_video_file(path) {
            let duration = match prober.duration(path) {
                Ok(d) => d,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Failed to determine video duration");
                    return EntryRole::Irrelevant;
                }
            };

            if !is_feature_length(duration) {
                debug!(file = %path.display(), secs = duration.as_secs(), "Found trailer file");
                self.trailer_path = Some(path.to_path_buf());
                return EntryRole::Trailer;
            }

            if self.movie_path.is_some() {
                debug!(file = %path.display(), "Ignoring additional feature-length file");
                return EntryRole::Irrelevant;
            }

            debug!(file = %path.display(), secs = duration.as_secs(), "Found movie file");
            self.movie_path = Some(path.to_path_buf());
            return EntryRole::Movie;
        }

        if is_nfo_file(path) {
            self.adopt_nfo(path);
            return EntryRole::Metadata;
        }

        EntryRole::Irrelevant
    }

    fn adopt_nfo(&mut self, path: &Path) {
        if self.metadata_path.is_some() {
            debug!(file = %path.display(), "Metadata already adopted, ignoring");
            return;
        }

        match NfoRecord::from_path(path) {
            Ok(record) if record.is_valid() => {
                debug!(file = %path.display(), "Adopted metadata file");
                self.identity = Identity::from(record);
                self.metadata_path = Some(path.to_path_buf());
            }
            Ok(record) => {
                debug!(file = %path.display(), ?record, "Metadata file is incomplete, not adopted");
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Could not read metadata file");
            }
        }
    }

    fn classify_dir(&mut self, path: &Path) -> EntryRole {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let Some(layout) = DiscLayout::from_dir_name(&name) else {
            return EntryRole::Irrelevant;
        };

        debug!(directory = %path.display(), %layout, "Encountered disc folder structure");

        if self.movie_path.is_some() {
            return EntryRole::Irrelevant;
        }

        let Some(index) = find_case_insensitive(path, layout.index_file_name()) else {
            debug!(directory = %path.display(), "Disc folder has no index file");
            return EntryRole::Irrelevant;
        };

        self.movie_path = Some(index);
        self.disc_layout = Some(layout);

        let conventional = path.join(layout.trailer_file_name());
        if conventional.is_file() {
            self.trailer_path = Some(conventional);
        }

        EntryRole::Movie
    }

    fn fill_from_names(&mut self) {
        let dir_name = self
            .directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if self.identity.title.is_none() {
            let title = dir_name.split('(').next().unwrap_or_default().trim();
            if !title.is_empty() {
                self.identity.title = Some(title.to_string());
            }
        }

        if self.identity.year.is_none() {
            self.identity.year = first_parenthesized(&dir_name).and_then(|y| {
                if y.len() == 4 {
                    y.parse().ok()
                } else {
                    None
                }
            });
            if self.identity.year.is_none() {
                debug!(directory = %dir_name, "Could not parse year from directory name");
            }
        }

        if self.identity.imdb_id.is_none() {
            if let Some(stem) = self.movie_path.as_deref().and_then(Path::file_stem) {
                let stem = stem.to_string_lossy();
                self.identity.imdb_id = first_parenthesized(&stem)
                    .filter(|id| is_imdb_id(id))
                    .map(str::to_string);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn movie_path(&self) -> Option<&Path> {
        self.movie_path.as_deref()
    }

    pub fn has_movie(&self) -> bool {
        self.movie_path.is_some()
    }

    /// Whether a trailer already exists next to the movie.
    pub fn has_trailer(&self) -> bool {
        self.trailer_path.is_some()
    }

    /// Existing trailer found during the scan.
    pub fn existing_trailer(&self) -> Option<&Path> {
        self.trailer_path.as_deref()
    }

    /// Where a trailer for this movie lives or should be written.
    ///
    /// Disc layouts use a fixed name inside the disc folder; everything else
    /// uses `<movie-stem>-trailer.mp4` in the movie directory.
    pub fn trailer_destination(&self) -> Option<PathBuf> {
        if let Some(existing) = &self.trailer_path {
            return Some(existing.clone());
        }
        let movie = self.movie_path.as_deref()?;
        match self.disc_layout {
            Some(layout) => movie.parent().map(|p| p.join(layout.trailer_file_name())),
            None => Some(self.directory.join(trailer_file_name(movie))),
        }
    }

    pub fn disc_layout(&self) -> Option<DiscLayout> {
        self.disc_layout
    }

    /// NFO file whose identity was adopted.
    pub fn metadata_path(&self) -> Option<&Path> {
        self.metadata_path.as_deref()
    }

    pub fn entries(&self) -> &[ScannedEntry] {
        &self.entries
    }

    /// Locally known identity. Never touches the network.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Trailer descriptors from the remote lookup, if it has run and succeeded.
    pub fn videos(&self) -> Option<&[VideoDescriptor]> {
        self.videos.as_deref()
    }

    pub fn remote_queried(&self) -> bool {
        self.remote_queried
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    /// Complete the identity from `db` if any field is still unknown.
    ///
    /// The database is asked at most once per folder; only empty fields are
    /// filled from its answer.
    pub async fn resolve_identity(&mut self, db: &dyn MovieDatabase) -> &Identity {
        if !self.identity.is_complete() && !self.remote_queried {
            self.query_remote(db).await;
        }
        &self.identity
    }

    /// Fill title and year from `db` when either is still unknown.
    ///
    /// Missing ids alone never trigger a query here.
    pub async fn resolve_title_year(&mut self, db: &dyn MovieDatabase) -> (Option<&str>, Option<u16>) {
        let unresolved = self.identity.title.is_none() || self.identity.year.is_none();
        if unresolved && !self.remote_queried {
            self.query_remote(db).await;
        }
        (self.identity.title.as_deref(), self.identity.year)
    }

    /// Trailer descriptors for this movie, querying `db` if that has not happened yet.
    pub async fn resolve_videos(&mut self, db: &dyn MovieDatabase) -> &[VideoDescriptor] {
        if !self.remote_queried {
            self.query_remote(db).await;
        }
        self.videos.as_deref().unwrap_or_default()
    }

    async fn query_remote(&mut self, db: &dyn MovieDatabase) {
        let query = self.identity.query();
        self.remote_queried = true;

        match lookup_movie(db, &query).await {
            Some(record) => {
                self.identity.fill_missing(&record);
                self.videos = Some(record.videos);
            }
            None => {
                info!(directory = %self.directory.display(), "Remote lookup found nothing");
            }
        }
    }

    /// Replace title and year with caller-supplied values.
    ///
    /// Clears both ids and any fetched videos so the next resolution queries
    /// the database again with the new identity.
    pub fn override_identity(&mut self, title: impl Into<String>, year: u16) {
        self.identity = Identity {
            title: Some(title.into()),
            year: Some(year),
            imdb_id: None,
            tmdb_id: None,
        };
        self.videos = None;
        self.remote_queried = false;
    }

    /// Set caller-supplied ids, leaving any `None` argument untouched.
    pub fn override_ids(&mut self, imdb_id: Option<String>, tmdb_id: Option<u64>) {
        if imdb_id.is_none() && tmdb_id.is_none() {
            return;
        }
        if let Some(imdb) = imdb_id {
            self.identity.imdb_id = Some(imdb);
        }
        if let Some(tmdb) = tmdb_id {
            self.identity.tmdb_id = Some(tmdb);
        }
        self.videos = None;
        self.remote_queried = false;
    }
}

/// Text inside the first `( ... )` group, trimmed.
fn first_parenthesized(name: &str) -> Option<&str> {
    let (_, rest) = name.split_once('(')?;
    let (inner, _) = rest.split_once(')')?;
    let inner = inner.trim();
    (!inner.is_empty()).then_some(inner)
}

fn find_case_insensitive(dir: &Path, file_name: &str) -> Option<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(directory = %dir.display(), error = %e, "Could not read disc folder");
            return None;
        }
    };
    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .find(|p| {
            p.is_file()
                && p.file_name()
                    .is_some_and(|n| n.to_string_lossy().eq_ignore_ascii_case(file_name))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::provider::tests::{inception, StubDatabase};
    use std::collections::HashMap;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    /// Reports durations by file name; unknown names fail to probe.
    #[derive(Default)]
    struct FakeProber {
        durations: HashMap<String, u64>,
    }

    impl FakeProber {
        fn with(entries: &[(&str, u64)]) -> Self {
            Self {
                durations: entries
                    .iter()
                    .map(|(name, secs)| (name.to_string(), *secs))
                    .collect(),
            }
        }
    }

    impl DurationProbe for FakeProber {
        fn duration(&self, path: &Path) -> anyhow::Result<Duration> {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            self.durations
                .get(&name)
                .map(|secs| Duration::from_secs(*secs))
                .ok_or_else(|| anyhow::anyhow!("ffprobe failed for {name}"))
        }
    }

    fn movie_dir(name: &str, files: &[&str]) -> (tempfile::TempDir, PathBuf) {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join(name);
        std::fs::create_dir(&dir).unwrap();
        for file in files {
            std::fs::write(dir.join(file), b"").unwrap();
        }
        (root, dir)
    }

    const INCEPTION_NFO: &str = "<movie><title>Inception</title><year>2010</year>\
        <imdbid>tt1375666</imdbid><tmdbid>27205</tmdbid></movie>";

    #[test]
    fn single_long_file_is_the_movie() {
        let (_root, dir) = movie_dir("Heat (1995)", &["Heat (1995).mkv", "poster.jpg"]);
        let prober = FakeProber::with(&[("Heat (1995).mkv", 10_200)]);

        let folder = MovieFolder::scan(&dir, &prober).unwrap();
        assert!(folder.has_movie());
        assert!(!folder.has_trailer());
        assert_eq!(folder.movie_path(), Some(dir.join("Heat (1995).mkv").as_path()));
        assert_eq!(
            folder.trailer_destination(),
            Some(dir.join("Heat (1995)-trailer.mp4"))
        );
    }

    #[test]
    fn marked_file_means_trailer_exists() {
        let (_root, dir) = movie_dir(
            "Heat (1995)",
            &["Heat (1995).mkv", "Heat (1995)-trailer.mp4"],
        );
        // The marked file is never probed.
        let prober = FakeProber::with(&[("Heat (1995).mkv", 10_200)]);

        let folder = MovieFolder::scan(&dir, &prober).unwrap();
        assert!(folder.has_trailer());
        assert_eq!(
            folder.existing_trailer(),
            Some(dir.join("Heat (1995)-trailer.mp4").as_path())
        );
    }

    #[test]
    fn marked_file_without_movie_still_counts() {
        let (_root, dir) = movie_dir("Heat (1995)", &["something-trailer.txt"]);
        let folder = MovieFolder::scan(&dir, &FakeProber::default()).unwrap();
        assert!(!folder.has_movie());
        assert!(folder.has_trailer());
    }

    #[test]
    fn first_feature_length_file_wins_and_last_short_file_is_trailer() {
        let (_root, dir) = movie_dir("Alien (1979)", &["a.mkv", "b.mkv", "c.mp4", "d.mp4"]);
        let prober = FakeProber::with(&[("a.mkv", 7000), ("b.mkv", 7100), ("c.mp4", 120), ("d.mp4", 90)]);

        let folder = MovieFolder::scan(&dir, &prober).unwrap();
        assert_eq!(folder.movie_path(), Some(dir.join("a.mkv").as_path()));
        assert_eq!(folder.existing_trailer(), Some(dir.join("d.mp4").as_path()));

        let roles: Vec<EntryRole> = folder.entries().iter().map(|e| e.role).collect();
        assert_eq!(
            roles,
            vec![EntryRole::Movie, EntryRole::Irrelevant, EntryRole::Trailer, EntryRole::Trailer]
        );
    }

    #[test]
    fn threshold_is_inclusive() {
        let (_root, dir) = movie_dir("Short (2020)", &["short.mkv"]);
        let prober = FakeProber::with(&[("short.mkv", 600)]);
        let folder = MovieFolder::scan(&dir, &prober).unwrap();
        assert!(folder.has_movie());

        let prober = FakeProber::with(&[("short.mkv", 599)]);
        let folder = MovieFolder::scan(&dir, &prober).unwrap();
        assert!(!folder.has_movie());
        assert!(folder.has_trailer());
    }

    #[test]
    fn probe_failure_skips_file() {
        let (_root, dir) = movie_dir("Broken (2001)", &["broken.avi"]);
        let folder = MovieFolder::scan(&dir, &FakeProber::default()).unwrap();
        assert!(!folder.has_movie());
        assert!(!folder.has_trailer());
        assert_eq!(folder.entries()[0].role, EntryRole::Irrelevant);
    }

    #[tokio::test]
    async fn complete_nfo_needs_no_lookup() {
        let (_root, dir) = movie_dir("whatever", &["movie.mkv"]);
        std::fs::write(dir.join("movie.nfo"), INCEPTION_NFO).unwrap();
        let prober = FakeProber::with(&[("movie.mkv", 8880)]);
        let db = StubDatabase::with_record(inception());

        let mut folder = MovieFolder::scan(&dir, &prober).unwrap();
        let identity = folder.resolve_identity(&db).await.clone();

        assert_eq!(identity.title.as_deref(), Some("Inception"));
        assert_eq!(identity.year, Some(2010));
        assert_eq!(identity.imdb_id.as_deref(), Some("tt1375666"));
        assert_eq!(identity.tmdb_id, Some(27205));
        assert_eq!(db.total_calls(), 0);
        assert!(!folder.remote_queried());
        assert_eq!(folder.metadata_path(), Some(dir.join("movie.nfo").as_path()));
    }

    #[test]
    fn incomplete_nfo_is_not_adopted() {
        let (_root, dir) = movie_dir("Heat (1995)", &[]);
        std::fs::write(dir.join("a.nfo"), "<movie><title>Wrong</title></movie>").unwrap();
        std::fs::write(dir.join("b.nfo"), "<movie><title>Broken</movie>").unwrap();

        let folder = MovieFolder::scan(&dir, &FakeProber::default()).unwrap();
        assert_eq!(folder.metadata_path(), None);
        assert_eq!(folder.identity().title.as_deref(), Some("Heat"));
        assert_eq!(folder.identity().year, Some(1995));
    }

    #[test]
    fn first_valid_nfo_wins() {
        let (_root, dir) = movie_dir("x", &[]);
        std::fs::write(dir.join("a.nfo"), INCEPTION_NFO).unwrap();
        std::fs::write(
            dir.join("b.nfo"),
            "<movie><title>Heat</title><year>1995</year><imdbid>tt0113277</imdbid><tmdbid>949</tmdbid></movie>",
        )
        .unwrap();

        let folder = MovieFolder::scan(&dir, &FakeProber::default()).unwrap();
        assert_eq!(folder.identity().tmdb_id, Some(27205));
    }

    #[test]
    fn names_fill_title_and_year_but_not_imdb() {
        let (_root, dir) = movie_dir("Inception (2010)", &["Inception (2010).mkv"]);
        let prober = FakeProber::with(&[("Inception (2010).mkv", 8880)]);

        let folder = MovieFolder::scan(&dir, &prober).unwrap();
        let identity = folder.identity();
        assert_eq!(identity.title.as_deref(), Some("Inception"));
        assert_eq!(identity.year, Some(2010));
        assert_eq!(identity.imdb_id, None);
        assert_eq!(identity.tmdb_id, None);
    }

    #[test]
    fn imdb_id_from_file_name() {
        let (_root, dir) = movie_dir("Inception (2010)", &["Inception (tt1375666).mkv"]);
        let prober = FakeProber::with(&[("Inception (tt1375666).mkv", 8880)]);

        let folder = MovieFolder::scan(&dir, &prober).unwrap();
        assert_eq!(folder.identity().imdb_id.as_deref(), Some("tt1375666"));
    }

    #[tokio::test]
    async fn remote_lookup_fills_only_missing_fields_once() {
        let (_root, dir) = movie_dir("inception (2010)", &["Inception (2010).mkv"]);
        let prober = FakeProber::with(&[("Inception (2010).mkv", 8880)]);
        let mut db = StubDatabase::with_record(inception());
        db.hits = vec![crate::metadata::SearchHit {
            tmdb_id: 27205,
            title: "Inception".into(),
            release_date: Some("2010-07-15".into()),
        }];

        let mut folder = MovieFolder::scan(&dir, &prober).unwrap();
        let identity = folder.resolve_identity(&db).await.clone();
        assert_eq!(identity.title.as_deref(), Some("inception"));
        assert_eq!(identity.imdb_id.as_deref(), Some("tt1375666"));
        assert_eq!(identity.tmdb_id, Some(27205));
        assert!(folder.remote_queried());

        folder.resolve_identity(&db).await;
        let videos = folder.resolve_videos(&db).await;
        assert_eq!(videos.len(), 1);
        assert_eq!(db.search_calls.load(Ordering::SeqCst), 1);
        assert_eq!(db.details_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_lookup_is_not_repeated() {
        let (_root, dir) = movie_dir("Unknown (1990)", &["unknown.mkv"]);
        let prober = FakeProber::with(&[("unknown.mkv", 5000)]);
        let db = StubDatabase::default();

        let mut folder = MovieFolder::scan(&dir, &prober).unwrap();
        folder.resolve_identity(&db).await;
        assert!(folder.resolve_videos(&db).await.is_empty());
        folder.resolve_identity(&db).await;
        assert_eq!(db.total_calls(), 1);
    }

    #[tokio::test]
    async fn complete_identity_still_queries_for_videos() {
        let (_root, dir) = movie_dir("x", &["movie.mkv"]);
        std::fs::write(dir.join("movie.nfo"), INCEPTION_NFO).unwrap();
        let prober = FakeProber::with(&[("movie.mkv", 8880)]);
        let db = StubDatabase::with_record(inception());

        let mut folder = MovieFolder::scan(&dir, &prober).unwrap();
        assert_eq!(folder.resolve_videos(&db).await.len(), 1);
        assert_eq!(db.details_calls.load(Ordering::SeqCst), 1);
        assert_eq!(db.search_calls.load(Ordering::SeqCst), 0);
        assert_eq!(db.find_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn override_clears_ids_and_requeries() {
        let (_root, dir) = movie_dir("x", &["movie.mkv"]);
        std::fs::write(dir.join("movie.nfo"), INCEPTION_NFO).unwrap();
        let prober = FakeProber::with(&[("movie.mkv", 8880)]);
        let db = StubDatabase::with_record(inception());

        let mut folder = MovieFolder::scan(&dir, &prober).unwrap();
        folder.resolve_videos(&db).await;
        assert!(folder.remote_queried());

        folder.override_identity("Heat", 1995);
        assert!(!folder.remote_queried());
        assert_eq!(folder.identity().imdb_id, None);
        assert_eq!(folder.identity().tmdb_id, None);
        assert!(folder.videos().is_none());

        folder.resolve_identity(&db).await;
        assert_eq!(db.search_calls.load(Ordering::SeqCst), 1);
        assert_eq!(folder.identity().title.as_deref(), Some("Heat"));
    }

    #[test]
    fn override_ids_keeps_other_fields() {
        let (_root, dir) = movie_dir("Heat (1995)", &[]);
        let mut folder = MovieFolder::scan(&dir, &FakeProber::default()).unwrap();

        folder.override_ids(None, Some(949));
        assert_eq!(folder.identity().tmdb_id, Some(949));
        assert_eq!(folder.identity().title.as_deref(), Some("Heat"));
        assert_eq!(folder.identity().imdb_id, None);
    }

    #[test]
    fn bluray_layout_without_trailer() {
        let (_root, dir) = movie_dir("Dune (2021)", &[]);
        let bdmv = dir.join("BDMV");
        std::fs::create_dir(&bdmv).unwrap();
        std::fs::write(bdmv.join("index.bdmv"), b"").unwrap();

        let folder = MovieFolder::scan(&dir, &FakeProber::default()).unwrap();
        assert!(folder.has_movie());
        assert_eq!(folder.disc_layout(), Some(DiscLayout::BluRay));
        assert!(!folder.has_trailer());
        assert_eq!(
            folder.trailer_destination(),
            Some(bdmv.join("index-trailer.mp4"))
        );
    }

    #[test]
    fn bluray_layout_with_conventional_trailer() {
        let (_root, dir) = movie_dir("Dune (2021)", &[]);
        let bdmv = dir.join("BDMV");
        std::fs::create_dir(&bdmv).unwrap();
        std::fs::write(bdmv.join("index.bdmv"), b"").unwrap();
        std::fs::write(bdmv.join("index-trailer.mp4"), b"").unwrap();

        let folder = MovieFolder::scan(&dir, &FakeProber::default()).unwrap();
        assert!(folder.has_trailer());
    }

    #[test]
    fn dvd_layout_matches_index_case_insensitively() {
        let (_root, dir) = movie_dir("Alien (1979)", &[]);
        let video_ts = dir.join("VIDEO_TS");
        std::fs::create_dir(&video_ts).unwrap();
        std::fs::write(video_ts.join("video_ts.ifo"), b"").unwrap();

        let folder = MovieFolder::scan(&dir, &FakeProber::default()).unwrap();
        assert_eq!(folder.disc_layout(), Some(DiscLayout::Dvd));
        assert_eq!(folder.movie_path(), Some(video_ts.join("video_ts.ifo").as_path()));
        assert_eq!(
            folder.trailer_destination(),
            Some(video_ts.join("VIDEO_TS-trailer.mp4"))
        );
    }

    #[test]
    fn disc_folder_without_index_is_ignored() {
        let (_root, dir) = movie_dir("Alien (1979)", &[]);
        std::fs::create_dir(dir.join("BDMV")).unwrap();
        let folder = MovieFolder::scan(&dir, &FakeProber::default()).unwrap();
        assert!(!folder.has_movie());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let result = MovieFolder::scan(Path::new("/nonexistent/movie"), &FakeProber::default());
        assert!(matches!(result, Err(ScanError::NotFound(_))));
    }

    #[test]
    fn parenthesized_text() {
        assert_eq!(first_parenthesized("Heat (1995)"), Some("1995"));
        assert_eq!(first_parenthesized("Heat (1995) (Director's Cut)"), Some("1995"));
        assert_eq!(first_parenthesized("Heat ( )"), None);
        assert_eq!(first_parenthesized("Heat (1995"), None);
        assert_eq!(first_parenthesized("Heat"), None);
    }
}
