//! Basic example demonstrating asterism library usage.
//!
//! Run with: cargo run --example basic -- [/path/to/hipparcos]
//!
//! Without a directory the compiled-in star positions are used.

use asterism::{AsterismError, Resolution, SkyServiceBuilder};
use std::env;

fn main() -> Result<(), AsterismError> {
    let mut builder = SkyServiceBuilder::new();
    if let Some(data_dir) = env::args().nth(1) {
        builder = builder.data_dir(data_dir);
    }

    let service = builder.build()?;
    println!("Loaded {} stars ({:?})", service.star_count(), service.source());

    let observers = [
        ("Kelowna, Canada", 49.8876, -119.4932),
        ("Santiago, Chile", -33.4489, -70.6693),
        ("Tromsø, Norway", 69.6492, 18.9553),
    ];

    for (place, lat, lon) in &observers {
        println!("\n{} ({:.4}, {:.4})", place, lat, lon);
        println!("{:-<50}", "");

        for result in service.resolve_now(*lat, *lon, &["leo", "lyra", "orion", "draco"])? {
            match result {
                Resolution::Resolved {
                    constellation,
                    position,
                } => {
                    let visibility = if position.altitude_deg > 0.0 {
                        "above horizon"
                    } else {
                        "below horizon"
                    };
                    println!(
                        "{:<12} alt {:>7.2}°  az {:>7.2}°  {}",
                        constellation, position.altitude_deg, position.azimuth_deg, visibility
                    );
                }
                Resolution::Unknown { constellation } => {
                    println!("{:<12} unknown constellation", constellation);
                }
            }
        }
    }

    Ok(())
}
