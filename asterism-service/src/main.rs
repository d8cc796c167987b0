//! Asterism Service - HTTP microservice for constellation position queries.
//!
//! Reports where well-known constellations currently sit in the sky for an
//! observer at a given latitude and longitude.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ASTERISM_DATA_DIR` | Directory containing `hip_main.dat` | built-in positions |
//! | `ASTERISM_AUTO_DOWNLOAD` | Download the catalog when missing | false |
//! | `ASTERISM_CATALOG_URL` | Catalog download URL | CDS `hip_main.dat` |
//! | `ASTERISM_PORT` | HTTP server port | 5000 |
//! | `RUST_LOG` | Log level (e.g., "info", "debug") | "info" |
//!
//! ## Endpoints
//!
//! - `GET /constellation?lat=X&lon=Y&names=a,b,c` - Apparent altitude/azimuth

use std::net::SocketAddr;
use std::sync::Arc;

use asterism::SkyServiceBuilder;
use asterism_service::{router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "asterism_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port: u16 = std::env::var("ASTERISM_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(5000);

    // Star data is loaded once; any failure here aborts startup
    let builder = SkyServiceBuilder::from_env();
    let sky = builder.build()?;

    tracing::info!(
        source = ?sky.source(),
        star_count = sky.star_count(),
        port = port,
        "Starting asterism service"
    );

    let state = Arc::new(AppState { sky });
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
