use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tmdb: TmdbConfig,

    #[serde(default)]
    pub apple: AppleConfig,

    #[serde(default)]
    pub youtube: YoutubeConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub logs: LogsConfig,

    #[serde(default)]
    pub updates: UpdatesConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    /// TMDB v3 API key (the `TMDB_API_KEY` environment variable takes precedence)
    #[serde(default)]
    pub api_key: String,

    /// Language tag sent with every request
    #[serde(default = "default_language")]
    pub language: String,

    /// Override for the API base URL
    #[serde(default = "default_tmdb_url")]
    pub base_url: String,
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_tmdb_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language: default_language(),
            base_url: default_tmdb_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppleConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub resolution: AppleResolution,

    #[serde(default = "default_apple_url")]
    pub base_url: String,
}

fn default_true() -> bool {
    true
}

fn default_apple_url() -> String {
    "https://trailers.apple.com".to_string()
}

impl Default for AppleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            resolution: AppleResolution::default(),
            base_url: default_apple_url(),
        }
    }
}

/// Trailer sizes offered by the Apple catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum AppleResolution {
    #[serde(rename = "480")]
    Sd480,
    #[serde(rename = "720")]
    Hd720,
    #[default]
    #[serde(rename = "1080")]
    Hd1080,
}

impl AppleResolution {
    /// Key used in the catalog's `sizes` map.
    pub fn size_key(&self) -> &'static str {
        match self {
            Self::Sd480 => "sd",
            Self::Hd720 => "hd720",
            Self::Hd1080 => "hd1080",
        }
    }

    /// Vertical resolution as written in file URLs.
    pub fn lines(&self) -> u32 {
        match self {
            Self::Sd480 => 480,
            Self::Hd720 => 720,
            Self::Hd1080 => 1080,
        }
    }
}

impl std::str::FromStr for AppleResolution {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().trim_end_matches('p') {
            "480" => Ok(Self::Sd480),
            "720" => Ok(Self::Hd720),
            "1080" => Ok(Self::Hd1080),
            _ => Err(format!(
                "Invalid resolution {:?}. Valid values: 480, 720, 1080",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct YoutubeConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Only accept trailers in this ISO-639-1 language
    #[serde(default)]
    pub lang: Option<String>,

    /// Only accept trailers listed at this size or larger
    #[serde(default)]
    pub min_resolution: Option<u32>,

    /// Upper bound handed to the downloader's format selector
    #[serde(default = "default_max_resolution")]
    pub max_resolution: u32,

    /// Path to the yt-dlp executable (looked up on PATH when unset)
    #[serde(default)]
    pub binary: Option<PathBuf>,
}

fn default_max_resolution() -> u32 {
    1080
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lang: None,
            min_resolution: None,
            max_resolution: default_max_resolution(),
            binary: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffprobe: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Applies to each API request
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Upper bound for a single trailer download
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

fn default_download_timeout() -> u64 {
    600
}

impl NetworkConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    pub fn download_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.download_timeout_secs)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            download_timeout_secs: default_download_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogsConfig {
    #[serde(default)]
    pub level: LogLevel,

    /// Append log lines to this file in addition to stderr
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Rotate the log file once it reaches this size
    #[serde(default = "default_log_max_bytes")]
    pub max_bytes: usize,

    /// Rotated files kept next to the log file (`.1` is the newest)
    #[serde(default = "default_log_backups")]
    pub backups: usize,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            file: None,
            max_bytes: default_log_max_bytes(),
            backups: default_log_backups(),
        }
    }
}

fn default_log_max_bytes() -> usize {
    1_000_000
}

fn default_log_backups() -> usize {
    5
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdatesConfig {
    /// Run the update check before every invocation
    #[serde(default)]
    pub auto_update: bool,

    #[serde(default)]
    pub git_path: Option<PathBuf>,

    #[serde(default = "default_git_branch")]
    pub git_branch: String,

    /// Checkout to inspect (defaults to the directory holding the executable)
    #[serde(default)]
    pub repo_dir: Option<PathBuf>,
}

fn default_git_branch() -> String {
    "origin/master".to_string()
}

impl Default for UpdatesConfig {
    fn default() -> Self {
        Self {
            auto_update: false,
            git_path: None,
            git_branch: default_git_branch(),
            repo_dir: None,
        }
    }
}
