//! Trailer processing for one directory or a whole library.
//!
//! Directories are handled one at a time. Every failure short of a missing
//! root directory is logged and reported as an [`Outcome`], so a batch run
//! always reaches the last directory.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{debug, error, info, warn};
use trailer_av::DownloadWorkspace;

use crate::config::Config;
use crate::downloaders::{sources_from_config, TrailerRequest, TrailerSource};
use crate::metadata::providers::TmdbProvider;
use crate::metadata::MovieDatabase;
use crate::scanner::{DurationProbe, FileProber, MovieFolder};

/// Caller-supplied identity that takes precedence over anything on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityOverride {
    pub title: Option<String>,
    pub year: Option<u16>,
    pub imdb_id: Option<String>,
    pub tmdb_id: Option<u64>,
}

impl IdentityOverride {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.year.is_none() && self.imdb_id.is_none() && self.tmdb_id.is_none()
    }

    /// Apply to a scanned folder. Title and year only take effect together.
    pub fn apply(&self, folder: &mut MovieFolder) {
        if let (Some(title), Some(year)) = (&self.title, self.year) {
            folder.override_identity(title.clone(), year);
        }
        folder.override_ids(self.imdb_id.clone(), self.tmdb_id);
    }
}

/// Result of processing one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The directory could not be listed.
    Unreadable,
    /// No movie file was found.
    NoMovie,
    /// A trailer is already present.
    TrailerExists(PathBuf),
    /// A trailer was downloaded and moved into place.
    Downloaded { source: &'static str, path: PathBuf },
    /// Every source was tried without success.
    NotFound,
    /// A trailer was downloaded but could not be moved into place.
    Failed(String),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable => write!(f, "directory unreadable"),
            Self::NoMovie => write!(f, "no movie file"),
            Self::TrailerExists(path) => write!(f, "trailer exists: {}", path.display()),
            Self::Downloaded { source, path } => {
                write!(f, "downloaded from {source}: {}", path.display())
            }
            Self::NotFound => write!(f, "no trailer found"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Tally of a library run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub directories: usize,
    pub downloaded: usize,
    pub already_present: usize,
    pub no_movie: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn record(&mut self, outcome: &Outcome) {
        self.directories += 1;
        match outcome {
            Outcome::Downloaded { .. } => self.downloaded += 1,
            Outcome::TrailerExists(_) => self.already_present += 1,
            Outcome::NoMovie => self.no_movie += 1,
            Outcome::NotFound => self.not_found += 1,
            Outcome::Unreadable | Outcome::Failed(_) => self.failed += 1,
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} directories: {} downloaded, {} already had a trailer, {} without a movie, {} not found, {} failed",
            self.directories, self.downloaded, self.already_present, self.no_movie, self.not_found, self.failed
        )
    }
}

/// Finds movies, resolves their identity and fetches trailers.
pub struct TrailerProcessor {
    database: Box<dyn MovieDatabase>,
    prober: Box<dyn DurationProbe>,
    sources: Vec<Box<dyn TrailerSource>>,
    workspace_parent: Option<PathBuf>,
}

impl TrailerProcessor {
    pub fn new(
        database: Box<dyn MovieDatabase>,
        prober: Box<dyn DurationProbe>,
        sources: Vec<Box<dyn TrailerSource>>,
    ) -> Self {
        Self {
            database,
            prober,
            sources,
            workspace_parent: None,
        }
    }

    /// Build the production processor: TMDB, ffprobe, and the enabled sources.
    pub fn from_config(config: &Config) -> Result<Self> {
        let database = TmdbProvider::new(&config.tmdb, config.network.timeout())?;
        if !database.is_available() {
            warn!("TMDB API key is not set; lookups will fail");
        }
        let prober = FileProber::new(config.tools.ffprobe.as_deref());
        let sources = sources_from_config(config)?;

        Ok(Self::new(Box::new(database), Box::new(prober), sources))
    }

    /// Create download workspaces under `parent` instead of the system temp dir.
    pub fn with_workspace_parent(mut self, parent: impl Into<PathBuf>) -> Self {
        self.workspace_parent = Some(parent.into());
        self
    }

    pub fn prober(&self) -> &dyn DurationProbe {
        self.prober.as_ref()
    }

    pub fn database(&self) -> &dyn MovieDatabase {
        self.database.as_ref()
    }

    /// Process a single movie directory.
    ///
    /// Returns an error only when `directory` does not exist.
    pub async fn process_directory(
        &self,
        directory: &Path,
        identity: Option<&IdentityOverride>,
    ) -> Result<Outcome> {
        if !directory.is_dir() {
            error!(directory = %directory.display(), "Directory does not exist");
            bail!("directory does not exist: {}", directory.display());
        }

        info!(directory = %directory.display(), "Processing directory");

        let mut folder = match MovieFolder::scan(directory, self.prober.as_ref()) {
            Ok(folder) => folder,
            Err(e) => {
                warn!(error = %e, "Skipping directory");
                return Ok(Outcome::Unreadable);
            }
        };

        if !folder.has_movie() {
            info!(directory = %directory.display(), "No movie file found, skipping");
            return Ok(Outcome::NoMovie);
        }

        if let Some(existing) = folder.existing_trailer() {
            info!(trailer = %existing.display(), "Trailer already exists, skipping");
            return Ok(Outcome::TrailerExists(existing.to_path_buf()));
        }

        if let Some(identity) = identity {
            identity.apply(&mut folder);
        }

        Ok(self.fetch_trailer(&mut folder).await)
    }

    async fn fetch_trailer(&self, folder: &mut MovieFolder) -> Outcome {
        let Some(destination) = folder.trailer_destination() else {
            return Outcome::NoMovie;
        };
        let file_name = destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "trailer.mp4".to_string());

        let workspace = match self.workspace() {
            Ok(workspace) => workspace,
            Err(e) => {
                warn!(error = %e, "Could not create download workspace");
                return Outcome::Failed(e.to_string());
            }
        };

        for source in &self.sources {
            if source.requires_videos() {
                folder.resolve_videos(self.database.as_ref()).await;
            } else {
                folder.resolve_title_year(self.database.as_ref()).await;
            }

            let identity = folder.identity();
            let request = TrailerRequest {
                title: identity.title.as_deref(),
                year: identity.year,
                videos: folder.videos().unwrap_or_default(),
            };

            debug!(source = source.name(), title = ?request.title, year = ?request.year, "Trying source");

            let staged = workspace.staging_path(&file_name);
            if !source.fetch(&request, &staged).await {
                info!(source = source.name(), "No trailer from source");
                workspace.purge();
                continue;
            }

            let Some(staged) = staged
                .is_file()
                .then_some(staged)
                .or_else(|| workspace.staged_file())
            else {
                warn!(source = source.name(), "Source reported success but staged nothing");
                workspace.purge();
                continue;
            };

            return match workspace.finalize(&staged, &destination) {
                Ok(path) => {
                    info!(source = source.name(), trailer = %path.display(), "Trailer saved");
                    Outcome::Downloaded {
                        source: source.name(),
                        path,
                    }
                }
                Err(e) => {
                    warn!(destination = %destination.display(), error = %e, "Could not move trailer into place");
                    Outcome::Failed(e.to_string())
                }
            };
        }

        workspace.close();
        info!(directory = %folder.directory().display(), "No trailer found");
        Outcome::NotFound
    }

    fn workspace(&self) -> Result<DownloadWorkspace> {
        let workspace = match &self.workspace_parent {
            Some(parent) => DownloadWorkspace::new_in(parent)?,
            None => DownloadWorkspace::new()?,
        };
        Ok(workspace)
    }

    /// Process every immediate subdirectory of `root`, in name order.
    pub async fn process_library(&self, root: &Path) -> Result<BatchSummary> {
        if !root.is_dir() {
            error!(directory = %root.display(), "Library directory does not exist");
            bail!("directory does not exist: {}", root.display());
        }

        let mut directories: Vec<PathBuf> = std::fs::read_dir(root)
            .with_context(|| format!("failed to read {}", root.display()))?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.is_dir())
            .collect();
        directories.sort();

        info!(root = %root.display(), count = directories.len(), "Processing library");

        let mut summary = BatchSummary::default();
        for directory in directories {
            let outcome = match self.process_directory(&directory, None).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    // Removed while the batch was running.
                    warn!(directory = %directory.display(), error = %e, "Skipping directory");
                    Outcome::Unreadable
                }
            };
            debug!(directory = %directory.display(), %outcome, "Directory done");
            summary.record(&outcome);
        }

        info!(%summary, "Library processed");
        Ok(summary)
    }
}
