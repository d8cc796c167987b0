//! HTTP request handlers for the constellation service.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use asterism::{AsterismError, Resolution, UNKNOWN_CONSTELLATION};

use crate::AppState;

/// Body of the 400 response for missing or unusable parameters.
pub const MISSING_PARAMETERS: &str = "Missing parameters. Use lat, lon, names";

/// Query parameters for the constellation endpoint.
///
/// All fields are taken as raw strings so that a value which does not
/// parse as a number is reported the same way as an absent one.
/// A repeated parameter keeps its first value.
#[derive(Debug, Default, Deserialize)]
pub struct ConstellationQuery {
    /// Observer latitude in decimal degrees.
    pub lat: Option<String>,
    /// Observer longitude in decimal degrees.
    pub lon: Option<String>,
    /// Comma-separated constellation names.
    pub names: Option<String>,
}

impl ConstellationQuery {
    /// Build the query from raw `key=value` pairs in request order.
    ///
    /// The first occurrence of each parameter wins; later ones and unknown
    /// keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "lat" => &mut query.lat,
                "lon" => &mut query.lon,
                "names" => &mut query.names,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }

    /// Validate and split the query into `(lat, lon, names)`.
    ///
    /// Returns `None` if any parameter is absent, empty, or not a number.
    pub fn parse(&self) -> Option<(f64, f64, Vec<&str>)> {
        let lat = parse_coordinate(self.lat.as_deref())?;
        let lon = parse_coordinate(self.lon.as_deref())?;
        let names = self.names.as_deref().filter(|n| !n.is_empty())?;

        Some((lat, lon, names.split(',').collect()))
    }
}

fn parse_coordinate(value: Option<&str>) -> Option<f64> {
    value.and_then(|v| v.trim().parse::<f64>().ok())
}

/// One entry of the response array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConstellationResult {
    /// The marker star's apparent position.
    Position {
        constellation: String,
        altitude_deg: f64,
        azimuth_deg: f64,
    },
    /// The name is not in the catalog.
    Error { constellation: String, error: String },
}

impl From<Resolution> for ConstellationResult {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Resolved {
                constellation,
                position,
            } => ConstellationResult::Position {
                constellation,
                altitude_deg: position.altitude_deg,
                azimuth_deg: position.azimuth_deg,
            },
            Resolution::Unknown { constellation } => ConstellationResult::Error {
                constellation,
                error: UNKNOWN_CONSTELLATION.to_string(),
            },
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

/// Get the apparent position of each requested constellation.
///
/// # Query Parameters
///
/// - `lat`: Observer latitude in decimal degrees
/// - `lon`: Observer longitude in decimal degrees
/// - `names`: Comma-separated constellation names, e.g. `leo,lyra,orion`
///
/// # Returns
///
/// - `200 OK` with one entry per requested name, in request order
/// - `400 Bad Request` if a parameter is missing or the observer is invalid
/// - `500 Internal Server Error` if a position cannot be computed
#[axum::debug_handler]
pub async fn get_constellation(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> impl IntoResponse {
    let query = ConstellationQuery::from_pairs(pairs);
    let Some((lat, lon, names)) = query.parse() else {
        tracing::debug!(?query, "Rejected constellation query");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: MISSING_PARAMETERS.to_string(),
            }),
        )
            .into_response();
    };

    let now = chrono::Utc::now();
    tracing::debug!(lat = lat, lon = lon, names = names.len(), "Constellation query");

    match state.sky.resolve(lat, lon, &names, now) {
        Ok(resolutions) => {
            let results: Vec<ConstellationResult> =
                resolutions.into_iter().map(ConstellationResult::from).collect();
            tracing::info!(lat = lat, lon = lon, count = results.len(), "Constellations resolved");
            (StatusCode::OK, Json(results)).into_response()
        }
        Err(e) => error_response(lat, lon, e),
    }
}

/// Create an error response for constellation queries.
fn error_response(lat: f64, lon: f64, e: AsterismError) -> axum::response::Response {
    let status = match &e {
        AsterismError::OutOfBounds { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    tracing::warn!(lat = lat, lon = lon, error = %e, "Constellation query failed");

    (status, Json(ErrorResponse { error: e.to_string() })).into_response()
}
