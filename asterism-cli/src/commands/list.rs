use anyhow::Result;
use asterism::{DatasetSource, CONSTELLATIONS};

use super::DataSource;

pub fn run(source: &DataSource) -> Result<()> {
    let service = source.build_service()?;

    println!(
        "{:<14} {:>8} {:<10} {:>10} {:>10} {:>6}",
        "CONSTELLATION", "HIP", "STAR", "RA (h)", "DEC (°)", "MAG"
    );
    println!("{}", "-".repeat(63));

    for constellation in &CONSTELLATIONS {
        let star = service.star_for(constellation)?;
        let magnitude = star
            .magnitude
            .map(|m| format!("{:.2}", m))
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<14} {:>8} {:<10} {:>10.5} {:>+10.5} {:>6}",
            constellation.name,
            constellation.hip.get(),
            constellation.star,
            star.ra_hours(),
            star.dec_degrees,
            magnitude
        );
    }

    // Summary
    println!();
    println!("Summary:");
    println!("  Constellations: {}", CONSTELLATIONS.len());
    println!("  Stars loaded: {}", service.star_count());
    match service.source() {
        DatasetSource::Builtin => println!("  Dataset: built-in positions"),
        DatasetSource::File(path) => println!("  Dataset: {}", path.display()),
    }

    Ok(())
}
