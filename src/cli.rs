use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "trailer-technician")]
#[command(author, version, about = "Finds movies on disk and downloads a matching trailer")]
#[command(after_help = "Without a command, the movie described by Radarr's radarr_* \
environment variables is processed (for use as a Radarr custom script).")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a trailer for the movie in a single directory
    Fetch {
        /// Movie directory
        #[arg(required = true)]
        directory: PathBuf,

        /// Movie title (overrides anything found on disk)
        #[arg(long, requires = "year")]
        title: Option<String>,

        /// Release year (overrides anything found on disk)
        #[arg(long, requires = "title")]
        year: Option<u16>,

        /// TMDB id of the movie
        #[arg(long)]
        tmdb_id: Option<u64>,

        /// IMDb id of the movie (tt followed by digits)
        #[arg(long)]
        imdb_id: Option<String>,
    },

    /// Fetch trailers for every movie directory inside a library folder
    Scan {
        /// Library directory holding one folder per movie
        #[arg(required = true)]
        directory: PathBuf,
    },

    /// Process the movie described by Radarr's environment variables
    Radarr,

    /// Show how a directory is classified and which identity it resolves to
    Inspect {
        /// Movie directory
        #[arg(required = true)]
        directory: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Query TMDB for missing identity fields and trailer listings
        #[arg(long)]
        resolve: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Compare this checkout with the configured git branch
    Update,

    /// Display version information
    Version,
}
