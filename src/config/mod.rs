mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Environment variable that overrides `tmdb.api_key`.
pub const TMDB_API_KEY_ENV: &str = "TMDB_API_KEY";

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./trailer-technician.toml",
        "./config.toml",
        "~/.config/trailer-technician/config.toml",
        "/etc/trailer-technician/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    let mut config = Config::default();
    apply_env_overrides(&mut config);
    Ok(config)
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(key) = std::env::var(TMDB_API_KEY_ENV) {
        if !key.trim().is_empty() {
            config.tmdb.api_key = key.trim().to_string();
        }
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.network.timeout_secs == 0 {
        anyhow::bail!("network.timeout_secs cannot be 0");
    }

    if config.network.download_timeout_secs == 0 {
        anyhow::bail!("network.download_timeout_secs cannot be 0");
    }

    if config.logs.max_bytes == 0 {
        anyhow::bail!("logs.max_bytes cannot be 0");
    }

    if let Some(min) = config.youtube.min_resolution {
        if min > config.youtube.max_resolution {
            anyhow::bail!(
                "youtube.min_resolution ({}) is above youtube.max_resolution ({})",
                min,
                config.youtube.max_resolution
            );
        }
    }

    if let Some(lang) = &config.youtube.lang {
        if lang.trim().is_empty() {
            anyhow::bail!("youtube.lang is set but empty");
        }
    }

    Ok(())
}

/// Settings that are valid but probably not what the user wants.
pub fn config_warnings(config: &Config) -> Vec<&'static str> {
    let mut warnings = Vec::new();

    if !config.apple.enabled && !config.youtube.enabled {
        warnings.push("Both trailer sources are disabled; nothing will be downloaded");
    }

    if config.tmdb.api_key.is_empty() {
        warnings.push("No TMDB API key configured; remote lookups will be rejected");
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    #[serial]
    fn loads_full_config() {
        std::env::remove_var(TMDB_API_KEY_ENV);
        let file = write_config(
            r#"
            [tmdb]
            api_key = "abc123"

            [apple]
            enabled = false
            resolution = "720"

            [youtube]
            lang = "en"
            min_resolution = 720
            max_resolution = 1080

            [logs]
            level = "debug"

            [updates]
            auto_update = true
            git_branch = "origin/main"
            "#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.tmdb.api_key, "abc123");
        assert_eq!(config.tmdb.language, "en-US");
        assert!(!config.apple.enabled);
        assert_eq!(config.apple.resolution, AppleResolution::Hd720);
        assert!(config.youtube.enabled);
        assert_eq!(config.youtube.lang.as_deref(), Some("en"));
        assert_eq!(config.youtube.min_resolution, Some(720));
        assert_eq!(config.logs.level, LogLevel::Debug);
        assert!(config.updates.auto_update);
        assert_eq!(config.updates.git_branch, "origin/main");
        assert_eq!(config.network.timeout_secs, 30);
    }

    #[test]
    #[serial]
    fn empty_file_uses_defaults() {
        std::env::remove_var(TMDB_API_KEY_ENV);
        let file = write_config("");
        let config = load_config(file.path()).unwrap();
        assert!(config.apple.enabled);
        assert!(config.youtube.enabled);
        assert_eq!(config.apple.resolution, AppleResolution::Hd1080);
        assert_eq!(config.youtube.max_resolution, 1080);
        assert_eq!(config.logs.level, LogLevel::Info);
        assert_eq!(config.logs.max_bytes, 1_000_000);
        assert_eq!(config.logs.backups, 5);
        assert!(!config.updates.auto_update);
    }

    #[test]
    #[serial]
    fn env_overrides_api_key() {
        std::env::set_var(TMDB_API_KEY_ENV, "from-env");
        let file = write_config("[tmdb]\napi_key = \"from-file\"\n");
        let config = load_config(file.path()).unwrap();
        std::env::remove_var(TMDB_API_KEY_ENV);
        assert_eq!(config.tmdb.api_key, "from-env");
    }

    #[test]
    fn rejects_unknown_resolution() {
        let file = write_config("[apple]\nresolution = \"4k\"\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn rejects_unknown_log_level() {
        let file = write_config("[logs]\nlevel = \"loud\"\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn rejects_inverted_resolution_bounds() {
        let file = write_config("[youtube]\nmin_resolution = 2160\nmax_resolution = 1080\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("min_resolution"));
    }

    #[test]
    fn rejects_zero_timeout() {
        let file = write_config("[network]\ntimeout_secs = 0\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn log_rotation_settings() {
        let file = write_config("[logs]\nfile = \"/tmp/tt.log\"\nmax_bytes = 2048\nbackups = 2\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.logs.max_bytes, 2048);
        assert_eq!(config.logs.backups, 2);

        let file = write_config("[logs]\nmax_bytes = 0\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_config(Path::new("/nonexistent/trailer-technician.toml")).is_err());
    }

    #[test]
    fn apple_resolution_parsing() {
        assert_eq!("480".parse::<AppleResolution>().unwrap().size_key(), "sd");
        assert_eq!("720p".parse::<AppleResolution>().unwrap().size_key(), "hd720");
        assert_eq!("1080".parse::<AppleResolution>().unwrap().lines(), 1080);
        assert!("2160".parse::<AppleResolution>().is_err());
    }
}
