//! CLI end-to-end tests
//!
//! Tests for the trailer-technician command-line interface. None of them
//! reach the network: every run either fails before a lookup or works on a
//! directory without video files.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

const RADARR_VARS: &[&str] = &[
    "radarr_eventtype",
    "radarr_movie_title",
    "radarr_movie_year",
    "radarr_movie_imdbid",
    "radarr_movie_tmdbid",
    "radarr_movie_path",
    "radarr_moviefile_path",
];

/// Get a command for the trailer-technician binary with a clean environment
#[allow(deprecated)]
fn technician_cmd(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("trailer-technician").unwrap();
    for var in RADARR_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG")
        .env_remove("TMDB_API_KEY")
        .arg("--config")
        .arg(config);
    cmd
}

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("trailer-technician.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_cli_help_flag() {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path(), "");
    technician_cmd(&config)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("radarr_"));
}

#[test]
fn test_cli_version_flag() {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path(), "");
    technician_cmd(&config)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("trailer-technician"));
}

#[test]
fn test_cli_version_command() {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path(), "");
    technician_cmd(&config)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_fetch_title_requires_year() {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path(), "");
    technician_cmd(&config)
        .args(["fetch", "/movies/Heat (1995)", "--title", "Heat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--year"));
}

#[test]
fn test_cli_fetch_missing_directory_fails() {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path(), "");
    technician_cmd(&config)
        .args(["fetch", "/nonexistent/Heat (1995)"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_cli_scan_missing_library_fails() {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path(), "");
    technician_cmd(&config)
        .args(["scan", "/nonexistent/library"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_cli_scan_empty_library_reports_summary() {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path(), "");
    let library = temp.path().join("library");
    fs::create_dir_all(library.join("Heat (1995)")).unwrap();
    fs::write(library.join("Heat (1995)").join("notes.txt"), "no movie here").unwrap();

    technician_cmd(&config)
        .arg("scan")
        .arg(&library)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 director"));
}

#[test]
fn test_cli_validate_reports_sections() {
    let temp = tempdir().unwrap();
    let config = write_config(
        temp.path(),
        r#"
[tmdb]
api_key = "abc123"

[apple]
resolution = "720"

[youtube]
enabled = false
"#,
    );

    technician_cmd(&config)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("720p"))
        .stdout(predicate::str::contains("YouTube: disabled"));
}

#[test]
fn test_cli_validate_rejects_bad_config() {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path(), "[youtube]\nmin_resolution = 2160\nmax_resolution = 720\n");
    technician_cmd(&config)
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("min_resolution"));
}

#[test]
fn test_cli_invalid_config_fails_before_running() {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path(), "[network]\ntimeout_secs = 0\n");
    technician_cmd(&config)
        .args(["scan", "/nonexistent/library"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("timeout"));
}

#[test]
fn test_cli_inspect_json_without_movie() {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path(), "");
    let movie_dir = temp.path().join("Heat (1995)");
    fs::create_dir_all(&movie_dir).unwrap();
    fs::write(
        movie_dir.join("movie.nfo"),
        "<movie><title>Heat</title><year>1995</year><uniqueid type=\"imdb\">tt0113277</uniqueid></movie>",
    )
    .unwrap();

    let output = technician_cmd(&config)
        .arg("inspect")
        .arg(&movie_dir)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(report["movie"].is_null());
    assert!(report["trailer"].is_null());
    assert_eq!(report["identity"]["title"], "Heat");
    assert_eq!(report["identity"]["year"], 1995);
    assert_eq!(report["identity"]["imdb_id"], "tt0113277");
}

#[test]
fn test_cli_radarr_test_event_succeeds() {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path(), "");
    technician_cmd(&config)
        .env("radarr_eventtype", "Test")
        .assert()
        .success()
        .stdout(predicate::str::contains("test event"));
}

#[test]
fn test_cli_radarr_without_environment_is_a_no_op() {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path(), "");
    technician_cmd(&config)
        .arg("radarr")
        .assert()
        .success()
        .stderr(predicate::str::contains("Nothing to do"));
}

#[test]
fn test_cli_radarr_grab_event_is_ignored() {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path(), "");
    technician_cmd(&config)
        .env("radarr_eventtype", "Grab")
        .env("radarr_movie_tmdbid", "949")
        .env("radarr_movie_path", temp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("not a download"));
}
