//! Commute route search: home address -> geocode -> directions -> polyline.
//!
//! The pipeline is strictly sequential. A geocode with no candidates stops
//! before the directions service is called, and every failure surfaces as a
//! [`RouteError`] so the caller never holds a partial result.

use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use school_dash_config::KakaoConfig;
use school_dash_shared::{messages, Coord, DashError, RouteResult, UserProfile};

use crate::http::{HttpClient, HttpRequest};
use crate::identity::IdentityStore;
use crate::storage::KeyValueStore;

/// Why a route search produced no result
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouteError {
    #[error("Start address is empty")]
    EmptyAddress,

    #[error("School coordinates are not configured")]
    SchoolNotConfigured,

    #[error("Address not found: {address}")]
    AddressNotFound { address: String },

    #[error("No route between the address and the school")]
    RouteNotFound,

    #[error("Rejected credentials (status {status})")]
    Unauthorized { status: u16 },

    #[error("HTTP {status}: {message}")]
    Transport { status: u16, message: String },

    #[error("Unexpected failure: {message}")]
    Unexpected { message: String },
}

impl RouteError {
    /// Message shown under the route search box
    pub fn user_message(&self) -> String {
        match self {
            RouteError::EmptyAddress => messages::ROUTE_EMPTY_ADDRESS.to_string(),
            RouteError::SchoolNotConfigured => messages::ROUTE_SCHOOL_MISSING.to_string(),
            RouteError::AddressNotFound { .. } => messages::ROUTE_ADDRESS_NOT_FOUND.to_string(),
            RouteError::RouteNotFound => messages::ROUTE_NOT_FOUND.to_string(),
            RouteError::Unauthorized { .. } => messages::ROUTE_AUTH_FAILED.to_string(),
            RouteError::Transport { status, message } => {
                messages::request_failed(*status, message)
            }
            RouteError::Unexpected { .. } => messages::ROUTE_UNKNOWN.to_string(),
        }
    }

    /// Input problems caught before any request was made
    pub fn is_validation(&self) -> bool {
        matches!(self, RouteError::EmptyAddress | RouteError::SchoolNotConfigured)
    }
}

impl From<DashError> for RouteError {
    fn from(err: DashError) -> Self {
        let auth_failure = err.is_auth_failure();
        match err {
            DashError::Http {
                status: Some(status),
                ..
            } if auth_failure => RouteError::Unauthorized { status },
            DashError::Http {
                status: Some(status),
                message,
            } => RouteError::Transport { status, message },
            other => RouteError::Unexpected {
                message: other.to_string(),
            },
        }
    }
}

/// Non-fatal problems with an otherwise usable result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteWarning {
    /// The route had a summary but no drawable vertices
    GeometryUnavailable,
}

impl RouteWarning {
    pub fn user_message(&self) -> &'static str {
        match self {
            RouteWarning::GeometryUnavailable => messages::ROUTE_GEOMETRY_MISSING,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteOutcome {
    pub result: RouteResult,
    pub warning: Option<RouteWarning>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    documents: Vec<GeocodeDocument>,
}

#[derive(Debug, Deserialize)]
struct GeocodeDocument {
    x: String,
    y: String,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<RoutePlan>,
}

#[derive(Debug, Deserialize)]
struct RoutePlan {
    #[serde(default)]
    result_code: i64,
    #[serde(default)]
    result_msg: String,
    summary: Option<RouteSummary>,
    #[serde(default)]
    sections: Vec<RouteSection>,
}

#[derive(Debug, Deserialize)]
struct RouteSummary {
    /// Seconds
    duration: f64,
    /// Meters
    distance: f64,
}

#[derive(Debug, Deserialize)]
struct RouteSection {
    #[serde(default)]
    roads: Vec<RouteRoad>,
}

#[derive(Debug, Deserialize)]
struct RouteRoad {
    /// Interleaved `[x0, y0, x1, y1, ...]`
    #[serde(default)]
    vertexes: Vec<f64>,
}

pub fn duration_minutes(seconds: f64) -> u32 {
    (seconds / 60.0).ceil().max(0.0) as u32
}

/// Kilometres rounded to one decimal
pub fn distance_km(meters: f64) -> f64 {
    (meters / 100.0).round() / 10.0
}

/// Flatten every road's interleaved vertex array, in section then road order
fn flatten_path(sections: &[RouteSection]) -> Vec<Coord> {
    sections
        .iter()
        .flat_map(|section| &section.roads)
        .flat_map(|road| road.vertexes.chunks_exact(2))
        .map(|pair| Coord::new(pair[0], pair[1]))
        .collect()
}

fn decode<T: DeserializeOwned>(body: Value, what: &str) -> Result<T, RouteError> {
    serde_json::from_value(body.clone()).map_err(|e| {
        log::error!("Unexpected {what} response ({e}): {body}");
        RouteError::Unexpected {
            message: format!("Unexpected {what} response: {e}"),
        }
    })
}

pub struct RoutePipeline<C: HttpClient, S: KeyValueStore> {
    client: C,
    kakao: KakaoConfig,
    identity: Rc<IdentityStore<S>>,
}

impl<C: HttpClient, S: KeyValueStore> RoutePipeline<C, S> {
    pub fn new(client: C, kakao: KakaoConfig, identity: Rc<IdentityStore<S>>) -> Self {
        Self {
            client,
            kakao,
            identity,
        }
    }

    pub fn geocode_request(&self, address: &str) -> HttpRequest {
        HttpRequest::get(&self.kakao.local_search_url)
            .query("query", address)
            .header("Authorization", self.kakao.authorization())
    }

    pub fn directions_request(&self, origin: Coord, destination: Coord) -> HttpRequest {
        HttpRequest::get(&self.kakao.directions_url)
            .query("origin", origin.to_query_value())
            .query("destination", destination.to_query_value())
            .query("priority", &self.kakao.route_priority)
            .header("Authorization", self.kakao.authorization())
    }

    /// Run the whole search for `address` towards the profile's school.
    ///
    /// On a successful geocode the address is saved into the profile as the
    /// home address, whether or not a route is found afterwards.
    pub async fn search(
        &self,
        address: &str,
        profile: Option<&UserProfile>,
    ) -> Result<RouteOutcome, RouteError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(RouteError::EmptyAddress);
        }
        let (profile, school) = profile
            .and_then(|p| p.school_coord().map(|coord| (p, coord)))
            .ok_or(RouteError::SchoolNotConfigured)?;

        let start = self.geocode(address).await?;
        log::debug!("Geocoded '{address}' to {},{}", start.x, start.y);

        if let Err(e) = self.identity.set(profile.with_home_address(address)) {
            log::warn!("Home address not saved: {e}");
        }

        let plan = self.directions(start, school).await?;
        let summary = plan.summary.ok_or_else(|| RouteError::Unexpected {
            message: "Route without summary".to_string(),
        })?;

        let result = RouteResult {
            start,
            end: school,
            path: flatten_path(&plan.sections),
            duration_minutes: duration_minutes(summary.duration),
            distance_km: distance_km(summary.distance),
        };
        let warning = if result.has_geometry() {
            None
        } else {
            log::warn!("Route returned no drawable vertices");
            Some(RouteWarning::GeometryUnavailable)
        };
        log::info!(
            "Route found: {} min, {} km, {} points",
            result.duration_minutes,
            result.distance_km,
            result.path.len()
        );

        Ok(RouteOutcome { result, warning })
    }

    async fn geocode(&self, address: &str) -> Result<Coord, RouteError> {
        let body = self.client.get_json(&self.geocode_request(address)).await?;
        let response: GeocodeResponse = decode(body, "geocode")?;

        let Some(first) = response.documents.first() else {
            log::info!("No geocode candidates for '{address}'");
            return Err(RouteError::AddressNotFound {
                address: address.to_string(),
            });
        };

        match (first.x.trim().parse::<f64>(), first.y.trim().parse::<f64>()) {
            (Ok(x), Ok(y)) => Ok(Coord::new(x, y)),
            _ => Err(RouteError::Unexpected {
                message: format!("Unparsable coordinates '{}', '{}'", first.x, first.y),
            }),
        }
    }

    async fn directions(&self, origin: Coord, destination: Coord) -> Result<RoutePlan, RouteError> {
        let body = self
            .client
            .get_json(&self.directions_request(origin, destination))
            .await?;
        let response: DirectionsResponse = decode(body, "directions")?;

        let plan = response
            .routes
            .into_iter()
            .next()
            .ok_or(RouteError::RouteNotFound)?;
        if plan.result_code != 0 {
            log::info!(
                "Directions declined ({}): {}",
                plan.result_code,
                plan.result_msg
            );
            return Err(RouteError::RouteNotFound);
        }

        Ok(plan)
    }
}
