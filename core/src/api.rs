//! Stateless HTTP request builder and response parser for the statistics API.
//!
//! # Design
//! `CovidApi` holds only a `base_url` and carries no mutable state between
//! calls. Each endpoint is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Executing the round-trip is left to a [`Transport`](crate::Transport),
//! keeping this layer deterministic and free of I/O.
//!
//! Any 2xx status is success; 404 maps to `NotFound`, everything else to
//! `HttpError`.
//!
//! Every endpoint wraps its payload in a single-key envelope
//! (`{"sources": ..}`, `{"latest": ..}`, `{"locations": ..}`,
//! `{"location": ..}`); the parsers unwrap it.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{LatestTotals, Location};

/// Optional narrowing applied to `/v2/locations`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationFilter {
    /// ISO 3166-1 alpha-2 code.
    pub country_code: Option<String>,
    pub country: Option<String>,
    /// Ask the server to include per-day timelines.
    pub timelines: bool,
}

impl LocationFilter {
    pub fn all(timelines: bool) -> Self {
        Self {
            timelines,
            ..Self::default()
        }
    }

    pub fn country_code(code: &str, timelines: bool) -> Self {
        Self {
            country_code: Some(code.to_string()),
            timelines,
            ..Self::default()
        }
    }

    pub fn country(name: &str, timelines: bool) -> Self {
        Self {
            country: Some(name.to_string()),
            timelines,
            ..Self::default()
        }
    }
}

#[derive(Deserialize)]
struct SourcesBody {
    sources: Vec<String>,
}

#[derive(Deserialize)]
struct LatestBody {
    latest: LatestTotals,
}

#[derive(Deserialize)]
struct LocationsBody {
    locations: Vec<Location>,
}

#[derive(Deserialize)]
struct LocationBody {
    location: Location,
}

/// Synchronous, stateless request builder for the statistics API.
#[derive(Debug, Clone)]
pub struct CovidApi {
    base_url: String,
}

impl CovidApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `/v2/sources` is the only endpoint called without a `source`.
    pub fn build_sources(&self) -> HttpRequest {
        HttpRequest::get(format!("{}/v2/sources", self.base_url))
    }

    pub fn build_latest(&self, source: &str) -> HttpRequest {
        HttpRequest::get(format!("{}/v2/latest", self.base_url)).param("source", source)
    }

    pub fn build_locations(&self, source: &str, filter: &LocationFilter) -> HttpRequest {
        let mut req = HttpRequest::get(format!("{}/v2/locations", self.base_url));
        if let Some(code) = &filter.country_code {
            req = req.param("country_code", code.as_str());
        }
        if let Some(country) = &filter.country {
            req = req.param("country", country.as_str());
        }
        if filter.timelines {
            req = req.param("timelines", "true");
        }
        req.param("source", source)
    }

    pub fn build_location(&self, source: &str, id: u64, timelines: bool) -> HttpRequest {
        let mut req = HttpRequest::get(format!("{}/v2/locations/{id}", self.base_url));
        if timelines {
            req = req.param("timelines", "true");
        }
        req.param("source", source)
    }

    pub fn parse_sources(&self, response: HttpResponse) -> Result<Vec<String>, ApiError> {
        decode::<SourcesBody>(response).map(|b| b.sources)
    }

    pub fn parse_latest(&self, response: HttpResponse) -> Result<LatestTotals, ApiError> {
        decode::<LatestBody>(response).map(|b| b.latest)
    }

    pub fn parse_locations(&self, response: HttpResponse) -> Result<Vec<Location>, ApiError> {
        decode::<LocationsBody>(response).map(|b| b.locations)
    }

    pub fn parse_location(&self, response: HttpResponse) -> Result<Location, ApiError> {
        decode::<LocationBody>(response).map(|b| b.location)
    }
}

fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    match response.status {
        200..=299 => Ok(()),
        404 => Err(ApiError::NotFound),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}
