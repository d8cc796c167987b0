use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

/// Constellation position CLI tool
#[derive(Parser)]
#[command(name = "asterism")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing hip_main.dat (built-in star positions if unset)
    #[arg(short, long, env = "ASTERISM_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Download the Hipparcos catalog into the data directory if missing
    #[arg(short, long, global = true)]
    auto_download: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve constellation positions for one observer
    Query {
        /// Latitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Comma-separated constellation names (e.g. leo,lyra,orion)
        names: String,

        /// Observation instant in RFC 3339 format (defaults to now)
        #[arg(long, value_parser = parse_instant)]
        at: Option<DateTime<Utc>>,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Resolve positions for every row of a CSV file
    Batch {
        /// Input CSV file
        input: PathBuf,

        /// Output file (defaults to <input>_positions.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Column name for latitude
        #[arg(long, default_value = "lat")]
        lat_col: String,

        /// Column name for longitude
        #[arg(long, default_value = "lon")]
        lon_col: String,

        /// Column name for the comma-separated constellation names
        #[arg(long, default_value = "names")]
        names_col: String,

        /// Observation instant in RFC 3339 format (defaults to now)
        #[arg(long, value_parser = parse_instant)]
        at: Option<DateTime<Utc>>,
    },

    /// List supported constellations and their marker stars
    List,
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let source = commands::DataSource {
        data_dir: cli.data_dir,
        auto_download: cli.auto_download,
    };

    match cli.command {
        Commands::Query {
            lat,
            lon,
            names,
            at,
            json,
        } => commands::query::run(&source, lat, lon, &names, at, json),
        Commands::Batch {
            input,
            output,
            lat_col,
            lon_col,
            names_col,
            at,
        } => commands::batch::run(
            &source,
            input,
            output,
            commands::batch::Columns {
                lat: lat_col,
                lon: lon_col,
                names: names_col,
            },
            at,
        ),
        Commands::List => commands::list::run(&source),
    }
}
