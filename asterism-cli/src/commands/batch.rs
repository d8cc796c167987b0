use anyhow::{Context, Result};
use asterism::{AsterismError, SkyService, UNKNOWN_CONSTELLATION};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use super::DataSource;

/// Input column names.
pub struct Columns {
    pub lat: String,
    pub lon: String,
    pub names: String,
}

/// One output row per requested name.
#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    row: usize,
    lat: f64,
    lon: f64,
    constellation: &'a str,
    altitude_deg: Option<f64>,
    azimuth_deg: Option<f64>,
    error: Option<String>,
}

pub fn run(
    source: &DataSource,
    input: PathBuf,
    output: Option<PathBuf>,
    columns: Columns,
    at: Option<DateTime<Utc>>,
) -> Result<()> {
    let service = source.build_service()?;

    let output_path = output.unwrap_or_else(|| default_output_path(&input));
    let input_file = File::open(&input).context("Failed to open input file")?;
    let output_file = File::create(&output_path).context("Failed to create output file")?;

    // One instant for the whole file
    let instant = at.unwrap_or_else(Utc::now);

    let rows = process_csv(
        &service,
        BufReader::new(input_file),
        BufWriter::new(output_file),
        &columns,
        instant,
    )?;

    println!("{} rows processed", rows);
    println!("Output written to: {}", output_path.display());
    Ok(())
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());
    input.with_file_name(format!("{}_positions.csv", stem))
}

/// Resolve every input row and write the results, returning the row count.
fn process_csv<R: Read, W: Write>(
    service: &SkyService,
    input: R,
    output: W,
    columns: &Columns,
    instant: DateTime<Utc>,
) -> Result<usize> {
    let mut reader = csv::Reader::from_reader(input);

    // Find column indices
    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("Column '{}' not found in CSV", name))
    };
    let lat_idx = column(&columns.lat)?;
    let lon_idx = column(&columns.lon)?;
    let names_idx = column(&columns.names)?;

    // Collect records for progress bar
    let records: Vec<_> = reader.records().collect::<Result<_, _>>()?;

    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )?
            .progress_chars("#>-"),
    );

    let mut writer = csv::Writer::from_writer(output);

    for (i, record) in records.iter().enumerate() {
        let row = i + 1;
        let lat: f64 = record
            .get(lat_idx)
            .map(str::trim)
            .context("Missing latitude")?
            .parse()
            .with_context(|| format!("Invalid latitude in row {}", row))?;
        let lon: f64 = record
            .get(lon_idx)
            .map(str::trim)
            .context("Missing longitude")?
            .parse()
            .with_context(|| format!("Invalid longitude in row {}", row))?;
        let names: Vec<&str> = record
            .get(names_idx)
            .filter(|n| !n.is_empty())
            .map(|n| n.split(',').collect())
            .unwrap_or_default();

        match service.resolve(lat, lon, &names, instant) {
            Ok(results) => {
                for result in &results {
                    let position = result.position();
                    writer.serialize(OutputRow {
                        row,
                        lat,
                        lon,
                        constellation: result.constellation(),
                        altitude_deg: position.map(|p| p.altitude_deg),
                        azimuth_deg: position.map(|p| p.azimuth_deg),
                        error: position
                            .is_none()
                            .then(|| UNKNOWN_CONSTELLATION.to_string()),
                    })?;
                }
            }
            Err(e @ AsterismError::OutOfBounds { .. }) => {
                // The whole row is unusable; record it and carry on
                writer.serialize(OutputRow {
                    row,
                    lat,
                    lon,
                    constellation: "",
                    altitude_deg: None,
                    azimuth_deg: None,
                    error: Some(e.to_string()),
                })?;
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to resolve row {}", row)),
        }

        pb.inc(1);
    }

    pb.finish_with_message("done");
    writer.flush()?;

    Ok(records.len())
}
