mod cli;

use trailer_technician::{
    arr::RadarrEnvironment,
    config::{self, Config},
    logging::init_logging,
    processor::{IdentityOverride, Outcome, TrailerProcessor},
    scanner::{Identity, MovieFolder, ScannedEntry},
    update,
};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use serde::Serialize;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // `validate` reports on its own file instead of the one used for the run
    if let Some(Commands::Validate { config: path }) = &cli.command {
        init_logging(&Config::default(), cli.verbose)?;
        let path = path.clone().or_else(|| cli.config.clone());
        return validate_config(path.as_deref());
    }

    let config = match config::load_config_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_logging(&Config::default(), cli.verbose)?;
            return Err(e);
        }
    };
    init_logging(&config, cli.verbose)?;

    for warning in config::config_warnings(&config) {
        tracing::warn!("{}", warning);
    }

    if config.updates.auto_update && !matches!(cli.command, Some(Commands::Update)) {
        let check = async {
            update::check_for_updates(&config.updates, config.network.timeout()).await?;
            Ok(())
        };
        if let Err(e) = block_on(check) {
            tracing::warn!("Update check failed: {}", e);
        }
    }

    match cli.command {
        Some(Commands::Fetch {
            directory,
            title,
            year,
            tmdb_id,
            imdb_id,
        }) => {
            let identity = IdentityOverride {
                title,
                year,
                imdb_id,
                tmdb_id,
            };
            block_on(fetch(&config, &directory, identity))
        }
        Some(Commands::Scan { directory }) => block_on(scan(&config, &directory)),
        Some(Commands::Radarr) | None => block_on(radarr(&config)),
        Some(Commands::Inspect {
            directory,
            json,
            resolve,
        }) => block_on(inspect(&config, &directory, json, resolve)),
        Some(Commands::CheckTools) => check_tools(&config),
        Some(Commands::Validate { config: path }) => validate_config(path.or(cli.config).as_deref()),
        Some(Commands::Update) => block_on(run_update(&config)),
        Some(Commands::Version) => {
            println!("trailer-technician {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn block_on<F: std::future::Future<Output = Result<()>>>(future: F) -> Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(future)
}

async fn fetch(config: &Config, directory: &Path, identity: IdentityOverride) -> Result<()> {
    let processor = TrailerProcessor::from_config(config)?;
    let identity = (!identity.is_empty()).then_some(identity);

    let outcome = processor
        .process_directory(directory, identity.as_ref())
        .await?;
    println!("{}: {}", directory.display(), outcome);

    Ok(())
}

async fn scan(config: &Config, root: &Path) -> Result<()> {
    let processor = TrailerProcessor::from_config(config)?;
    let summary = processor.process_library(root).await?;
    println!("{}", summary);
    Ok(())
}

async fn radarr(config: &Config) -> Result<()> {
    let env = RadarrEnvironment::from_env();

    if env.is_test_event() {
        tracing::info!("Radarr test event received");
        println!("Radarr test event received, trailer-technician is reachable");
        return Ok(());
    }

    let trigger = match env.trigger() {
        Ok(trigger) => trigger,
        Err(e) => {
            tracing::warn!("Nothing to do: {}", e);
            return Ok(());
        }
    };

    tracing::info!(
        directory = %trigger.directory.display(),
        title = ?trigger.identity.title,
        year = ?trigger.identity.year,
        "Processing Radarr download"
    );

    let processor = TrailerProcessor::from_config(config)?;
    let outcome = processor
        .process_directory(&trigger.directory, Some(&trigger.identity))
        .await?;
    if let Outcome::Failed(reason) = &outcome {
        tracing::warn!(directory = %trigger.directory.display(), "Trailer fetch failed: {}", reason);
    }
    println!("{}: {}", trigger.directory.display(), outcome);

    Ok(())
}

#[derive(Serialize)]
struct InspectReport<'a> {
    directory: &'a Path,
    movie: Option<&'a Path>,
    trailer: Option<&'a Path>,
    trailer_destination: Option<PathBuf>,
    metadata: Option<&'a Path>,
    disc_layout: Option<trailer_common::DiscLayout>,
    identity: &'a Identity,
    entries: &'a [ScannedEntry],
    videos: Option<&'a [trailer_technician::metadata::VideoDescriptor]>,
}

async fn inspect(config: &Config, directory: &Path, json: bool, resolve: bool) -> Result<()> {
    if !directory.is_dir() {
        anyhow::bail!("directory does not exist: {}", directory.display());
    }

    let processor = TrailerProcessor::from_config(config)?;
    let mut folder = MovieFolder::scan(directory, processor.prober())?;

    if resolve && folder.has_movie() {
        folder.resolve_identity(processor.database()).await;
        folder.resolve_videos(processor.database()).await;
    }

    let report = InspectReport {
        directory: folder.directory(),
        movie: folder.movie_path(),
        trailer: folder.existing_trailer(),
        trailer_destination: folder.trailer_destination(),
        metadata: folder.metadata_path(),
        disc_layout: folder.disc_layout(),
        identity: folder.identity(),
        entries: folder.entries(),
        videos: folder.videos(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Directory: {}", report.directory.display());
    match report.movie {
        Some(movie) => println!("Movie: {}", movie.display()),
        None => println!("Movie: none"),
    }
    match report.trailer {
        Some(trailer) => println!("Trailer: {}", trailer.display()),
        None => println!("Trailer: none"),
    }
    if let Some(dest) = &report.trailer_destination {
        println!("Trailer destination: {}", dest.display());
    }
    if let Some(nfo) = report.metadata {
        println!("Metadata: {}", nfo.display());
    }
    if let Some(layout) = report.disc_layout {
        println!("Disc layout: {:?}", layout);
    }

    let identity = report.identity;
    println!("\nIdentity:");
    println!("  Title: {}", identity.title.as_deref().unwrap_or("-"));
    println!(
        "  Year: {}",
        identity.year.map(|y| y.to_string()).unwrap_or_else(|| "-".into())
    );
    println!("  IMDb: {}", identity.imdb_id.as_deref().unwrap_or("-"));
    println!(
        "  TMDB: {}",
        identity.tmdb_id.map(|id| id.to_string()).unwrap_or_else(|| "-".into())
    );

    println!("\nEntries: {}", report.entries.len());
    for entry in report.entries {
        println!("  {:?} {}", entry.role, entry.path.display());
    }

    if let Some(videos) = report.videos {
        println!("\nVideos: {}", videos.len());
        for video in videos {
            print!("  {} {} {}", video.kind, video.site, video.key);
            if let Some(size) = video.size {
                print!(" {}p", size);
            }
            if let Some(ref lang) = video.language {
                print!(" ({})", lang);
            }
            println!();
        }
    }

    Ok(())
}

fn check_tools(config: &Config) -> Result<()> {
    println!("Checking external tools...\n");

    let resolve = |name: &str, configured: Option<&Path>| -> String {
        trailer_av::get_tool_path(name, configured)
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|_| name.to_string())
    };

    let tools = [
        (
            trailer_av::check_tool_with_arg(&resolve("ffprobe", config.tools.ffprobe.as_deref()), "-version"),
            true,
        ),
        (
            trailer_av::check_tool(&resolve("yt-dlp", config.youtube.binary.as_deref())),
            config.youtube.enabled,
        ),
        (
            trailer_av::check_tool_with_arg(&resolve("git", config.updates.git_path.as_deref()), "version"),
            config.updates.auto_update,
        ),
    ];

    let mut all_ok = true;
    for (tool, required) in &tools {
        let status = if tool.is_available() {
            "✓"
        } else if *required {
            all_ok = false;
            "✗"
        } else {
            "-"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install them to enable all features.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    println!(
        "  TMDB API key: {}",
        if config.tmdb.api_key.is_empty() { "missing" } else { "set" }
    );
    println!("  TMDB language: {}", config.tmdb.language);
    println!(
        "  Apple: {} ({}p)",
        enabled(config.apple.enabled),
        config.apple.resolution.lines()
    );
    println!(
        "  YouTube: {} (max {}p)",
        enabled(config.youtube.enabled),
        config.youtube.max_resolution
    );
    println!("  Log level: {}", config.logs.level.as_str());
    println!("  Auto update: {}", enabled(config.updates.auto_update));

    for warning in config::config_warnings(&config) {
        println!("! {}", warning);
    }

    Ok(())
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}

async fn run_update(config: &Config) -> Result<()> {
    let status = update::check_for_updates(&config.updates, config.network.timeout()).await?;
    println!("Current: {}", status.current);
    println!("Latest:  {} ({})", status.latest, config.updates.git_branch);
    if status.is_behind() {
        println!(
            "{} commit(s) behind, {} ahead. Run `git pull` in the checkout to update.",
            status.behind, status.ahead
        );
    } else {
        println!("Already up to date.");
    }
    Ok(())
}
