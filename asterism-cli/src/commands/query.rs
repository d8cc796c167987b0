use anyhow::{Context, Result};
use asterism::{Resolution, UNKNOWN_CONSTELLATION};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::DataSource;

/// One entry of the JSON output, shaped like the HTTP response.
#[derive(Serialize)]
#[serde(untagged)]
pub enum PositionOutput {
    Position {
        constellation: String,
        altitude_deg: f64,
        azimuth_deg: f64,
    },
    Error {
        constellation: String,
        error: &'static str,
    },
}

impl From<Resolution> for PositionOutput {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Resolved {
                constellation,
                position,
            } => PositionOutput::Position {
                constellation,
                altitude_deg: position.altitude_deg,
                azimuth_deg: position.azimuth_deg,
            },
            Resolution::Unknown { constellation } => PositionOutput::Error {
                constellation,
                error: UNKNOWN_CONSTELLATION,
            },
        }
    }
}

pub fn run(
    source: &DataSource,
    lat: f64,
    lon: f64,
    names: &str,
    at: Option<DateTime<Utc>>,
    json: bool,
) -> Result<()> {
    if names.is_empty() {
        anyhow::bail!("No constellation names given");
    }

    let service = source.build_service()?;
    let instant = at.unwrap_or_else(Utc::now);
    let names: Vec<&str> = names.split(',').collect();

    let results = service
        .resolve(lat, lon, &names, instant)
        .context("Failed to resolve constellation positions")?;

    if json {
        let output: Vec<PositionOutput> = results.into_iter().map(PositionOutput::from).collect();
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{:<14} {:>10} {:>10}", "CONSTELLATION", "ALTITUDE", "AZIMUTH");
    println!("{}", "-".repeat(36));

    for result in &results {
        match result.position() {
            Some(pos) => println!(
                "{:<14} {:>9.2}° {:>9.2}°",
                result.constellation(),
                pos.altitude_deg,
                pos.azimuth_deg
            ),
            None => println!("{:<14} {}", result.constellation(), UNKNOWN_CONSTELLATION),
        }
    }

    println!();
    println!("Observer: {:.4}, {:.4} at {}", lat, lon, instant.to_rfc3339());

    Ok(())
}
