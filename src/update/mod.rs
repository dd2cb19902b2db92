//! Update check for git checkouts.
//!
//! When the tool runs from a git clone, the checkout is compared against the
//! configured remote branch and the number of commits behind and ahead is
//! reported. Nothing is ever pulled or rebuilt.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::UpdatesConfig;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("{0} is not a git checkout")]
    NotARepository(PathBuf),

    #[error("no usable git executable found; set updates.git_path")]
    GitNotFound,

    #[error("git {args} failed: {message}")]
    GitFailed { args: String, message: String },

    #[error("git {args} did not finish within {}s", .timeout.as_secs())]
    TimedOut { args: String, timeout: Duration },

    #[error("git returned {0:?}, which does not look like a commit hash")]
    BadHash(String),
}

/// Where the checkout stands relative to its remote branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatus {
    pub current: String,
    pub latest: String,
    pub behind: usize,
    pub ahead: usize,
}

impl UpdateStatus {
    pub fn is_behind(&self) -> bool {
        self.behind > 0
    }
}

/// A git checkout plus the git executable used to inspect it.
#[derive(Debug, Clone)]
pub struct GitRepo {
    git: PathBuf,
    root: PathBuf,
    timeout: Duration,
}

impl GitRepo {
    pub fn new(git: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Result<Self, UpdateError> {
        let root = root.into();
        if !root.join(".git").exists() {
            return Err(UpdateError::NotARepository(root));
        }
        Ok(Self {
            git: git.into(),
            root,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Kill any single git invocation that runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Locate git and the checkout from the `[updates]` section.
    pub fn discover(config: &UpdatesConfig) -> Result<Self, UpdateError> {
        let root = match &config.repo_dir {
            Some(dir) => dir.clone(),
            None => install_root().ok_or_else(|| {
                UpdateError::NotARepository(
                    std::env::current_exe().unwrap_or_default(),
                )
            })?,
        };
        let git = find_git(config.git_path.as_deref()).ok_or(UpdateError::GitNotFound)?;
        Self::new(git, root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn run(&self, args: &[&str]) -> Result<String, UpdateError> {
        debug!(git = %self.git.display(), ?args, "Running git");
        let mut cmd = tokio::process::Command::new(&self.git);
        cmd.args(args)
            .current_dir(&self.root)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| UpdateError::TimedOut {
                args: args.join(" "),
                timeout: self.timeout,
            })?
            .map_err(|e| UpdateError::GitFailed {
                args: args.join(" "),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(UpdateError::GitFailed {
                args: args.join(" "),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    pub async fn current_commit(&self) -> Result<String, UpdateError> {
        commit_hash(&self.run(&["rev-parse", "HEAD"]).await?)
    }

    pub async fn fetch(&self) -> Result<(), UpdateError> {
        self.run(&["fetch", "origin"]).await.map(|_| ())
    }

    pub async fn branch_commit(&self, branch: &str) -> Result<String, UpdateError> {
        commit_hash(&self.run(&["rev-parse", "--verify", "--quiet", branch]).await?)
    }

    /// Commits on `branch` missing from HEAD, and commits on HEAD missing from `branch`.
    pub async fn divergence(&self, branch: &str) -> Result<(usize, usize), UpdateError> {
        let range = format!("{branch}...HEAD");
        let output = self.run(&["rev-list", "--left-right", &range]).await?;
        Ok(count_left_right(&output))
    }

    /// Fetch from origin and compare HEAD with `branch`.
    pub async fn status(&self, branch: &str) -> Result<UpdateStatus, UpdateError> {
        let current = self.current_commit().await?;
        self.fetch().await?;
        let latest = self.branch_commit(branch).await?;
        let (behind, ahead) = self.divergence(branch).await?;

        Ok(UpdateStatus {
            current,
            latest,
            behind,
            ahead,
        })
    }
}

/// Run the update check and log the result.
///
/// Each git invocation is bounded by `timeout`.
pub async fn check_for_updates(config: &UpdatesConfig, timeout: Duration) -> Result<UpdateStatus, UpdateError> {
    let repo = GitRepo::discover(config)?.with_timeout(timeout);
    let status = repo.status(&config.git_branch).await?;

    debug!(
        current = %status.current,
        latest = %status.latest,
        behind = status.behind,
        ahead = status.ahead,
        "Update check"
    );
    if status.is_behind() {
        info!(
            behind = status.behind,
            branch = %config.git_branch,
            "A newer version is available; update the checkout with git pull"
        );
    } else {
        info!("Already up to date");
    }
    Ok(status)
}

/// Configured git if it answers `git version`, else the one on PATH.
pub fn find_git(configured: Option<&Path>) -> Option<PathBuf> {
    let candidate = match trailer_av::get_tool_path("git", configured) {
        Ok(path) => path,
        Err(e) => {
            warn!("{e}");
            return None;
        }
    };

    let works = Command::new(&candidate)
        .arg("version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    if works {
        debug!(git = %candidate.display(), "Using git");
        Some(candidate)
    } else {
        warn!(git = %candidate.display(), "git executable does not work");
        None
    }
}

/// Nearest ancestor of the running executable that holds a `.git` directory.
fn install_root() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    exe.ancestors()
        .skip(1)
        .find(|dir| dir.join(".git").is_dir())
        .map(Path::to_path_buf)
}

fn commit_hash(output: &str) -> Result<String, UpdateError> {
    let hash = output.trim();
    let looks_like_hash =
        !hash.is_empty() && hash.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
    if looks_like_hash {
        Ok(hash.to_string())
    } else {
        Err(UpdateError::BadHash(hash.to_string()))
    }
}

/// Count `<` (behind) and `>` (ahead) markers in `rev-list --left-right` output.
fn count_left_right(output: &str) -> (usize, usize) {
    output
        .lines()
        .fold((0, 0), |(behind, ahead), line| match line.trim_start().chars().next() {
            Some('<') => (behind + 1, ahead),
            Some('>') => (behind, ahead + 1),
            _ => (behind, ahead),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_validation() {
        assert_eq!(
            commit_hash("3f786850e387550fdab836ed7e6dc881de23001b\n").unwrap(),
            "3f786850e387550fdab836ed7e6dc881de23001b"
        );
        assert!(matches!(commit_hash(""), Err(UpdateError::BadHash(_))));
        assert!(matches!(commit_hash("fatal: bad revision"), Err(UpdateError::BadHash(_))));
        assert!(matches!(commit_hash("ABCDEF"), Err(UpdateError::BadHash(_))));
    }

    #[test]
    fn left_right_counts() {
        let output = "<1111111\n<2222222\n>3333333\n";
        assert_eq!(count_left_right(output), (2, 1));
        assert_eq!(count_left_right(""), (0, 0));
    }

    #[test]
    fn status_behind() {
        let status = UpdateStatus {
            current: "a".into(),
            latest: "b".into(),
            behind: 3,
            ahead: 0,
        };
        assert!(status.is_behind());
    }

    #[test]
    fn plain_directory_is_not_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        let result = GitRepo::new("git", dir.path());
        assert!(matches!(result, Err(UpdateError::NotARepository(_))));
    }

    #[tokio::test]
    async fn reads_head_of_fresh_repository() {
        let Some(git) = find_git(None) else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let run = |args: &[&str]| {
            let status = Command::new(&git)
                .args(["-c", "user.name=test", "-c", "user.email=test@example.com"])
                .args(args)
                .current_dir(dir.path())
                .output()
                .unwrap()
                .status;
            assert!(status.success(), "git {args:?} failed");
        };
        run(&["init", "--quiet"]);
        std::fs::write(dir.path().join("README"), "hello").unwrap();
        run(&["add", "README"]);
        run(&["commit", "--quiet", "-m", "initial"]);

        let repo = GitRepo::new(&git, dir.path()).unwrap();
        let head = repo.current_commit().await.unwrap();
        assert!(head.len() >= 40);
        assert_eq!(repo.branch_commit("HEAD").await.unwrap(), head);
        assert_eq!(repo.divergence("HEAD").await.unwrap(), (0, 0));
        assert!(repo.fetch().await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn hung_git_is_killed_after_timeout() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        let git = dir.path().join("git");
        std::fs::write(&git, "#!/bin/sh\nsleep 30\n").unwrap();
        std::fs::set_permissions(&git, std::fs::Permissions::from_mode(0o755)).unwrap();

        let repo = GitRepo::new(&git, dir.path())
            .unwrap()
            .with_timeout(Duration::from_millis(300));
        let started = std::time::Instant::now();
        let err = repo.fetch().await.unwrap_err();

        assert!(matches!(err, UpdateError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
