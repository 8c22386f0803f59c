//! Stateful client for the COVID-19 statistics API.
//!
//! # Design
//! `Covid19` pairs the stateless `CovidApi` with a `Transport` and remembers
//! the last two results of `get_all`, which is all the state
//! `get_latest_changes` needs. Calls are blocking and sequential; refreshing
//! takes `&mut self`, so a client is never refreshed concurrently.

use std::cmp::Reverse;
use std::fmt;

use tracing::{debug, info, warn};

use crate::api::{CovidApi, LocationFilter};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Changes, LatestTotals, Location, RankBy, Snapshot};

/// Client bound to one deployment and one data source.
pub struct Covid19<T = UreqTransport> {
    api: CovidApi,
    transport: T,
    data_source: String,
    previous: Option<Snapshot>,
    latest: Option<Snapshot>,
}

impl<T> fmt::Debug for Covid19<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Covid19")
            .field("api", &self.api)
            .field("data_source", &self.data_source)
            .field("previous", &self.previous)
            .field("latest", &self.latest)
            .finish_non_exhaustive()
    }
}

impl Covid19<UreqTransport> {
    /// Connects over HTTP using `config`, validating `config.data_source`
    /// against the server's source list.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::with_transport(config, UreqTransport::new(config))
    }
}

impl<T: Transport> Covid19<T> {
    pub fn with_transport(config: &ClientConfig, transport: T) -> Result<Self, ApiError> {
        let api = CovidApi::new(&config.base_url);
        let response = send(&transport, api.build_sources())?;
        let sources = api.parse_sources(response)?;

        if !sources.iter().any(|s| *s == config.data_source) {
            warn!(
                requested = %config.data_source,
                available = ?sources,
                "data source not offered by server"
            );
            return Err(ApiError::Configuration {
                setting: "data source",
                requested: config.data_source.clone(),
                available: sources,
            });
        }
        info!(base_url = api.base_url(), source = %config.data_source, "data source accepted");

        Ok(Self {
            api,
            transport,
            data_source: config.data_source.clone(),
            previous: None,
            latest: None,
        })
    }

    pub fn data_source(&self) -> &str {
        &self.data_source
    }

    pub fn base_url(&self) -> &str {
        self.api.base_url()
    }

    /// Snapshot replaced by the most recent `get_all`, if there were two.
    pub fn previous(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }

    /// Snapshot from the most recent `get_all`.
    pub fn latest(&self) -> Option<&Snapshot> {
        self.latest.as_ref()
    }

    /// Fetches totals and every location, stores them as the latest snapshot
    /// and demotes the old one to `previous`. On error nothing is stored.
    pub fn get_all(&mut self, timelines: bool) -> Result<&Snapshot, ApiError> {
        let latest = self.get_latest()?;
        let locations = self.get_locations_ranked(timelines, None)?;
        let snapshot = Snapshot { latest, locations };
        info!(
            confirmed = snapshot.latest.confirmed,
            locations = snapshot.locations.len(),
            "snapshot refreshed"
        );

        if let Some(old) = self.latest.take() {
            self.previous = Some(old);
        }
        Ok(&*self.latest.insert(snapshot))
    }

    /// Totals of the latest snapshot minus those of the previous one. All
    /// zero until `get_all` has succeeded twice.
    pub fn get_latest_changes(&self) -> Changes {
        match (&self.previous, &self.latest) {
            (Some(previous), Some(latest)) => latest.latest.changes_since(&previous.latest),
            _ => Changes::default(),
        }
    }

    /// World-wide totals for the selected source.
    pub fn get_latest(&self) -> Result<LatestTotals, ApiError> {
        let response = self.send(self.api.build_latest(&self.data_source))?;
        self.api.parse_latest(response)
    }

    /// All locations, optionally ranked by `"confirmed"`, `"deaths"` or
    /// `"recovered"`, highest first. An unknown criterion is rejected with
    /// `InvalidArgument` before any request is made.
    pub fn get_locations(
        &self,
        timelines: bool,
        rank_by: Option<&str>,
    ) -> Result<Vec<Location>, ApiError> {
        let rank_by = rank_by.map(str::parse::<RankBy>).transpose()?;
        self.get_locations_ranked(timelines, rank_by)
    }

    pub fn get_locations_ranked(
        &self,
        timelines: bool,
        rank_by: Option<RankBy>,
    ) -> Result<Vec<Location>, ApiError> {
        let mut locations = self.fetch_locations(&LocationFilter::all(timelines))?;
        if let Some(rank) = rank_by {
            // Stable, so equal counts keep server order.
            locations.sort_by_key(|l| Reverse(l.latest.get(rank)));
        }
        Ok(locations)
    }

    /// Locations whose ISO 3166-1 alpha-2 code matches. Unknown codes yield
    /// an empty list.
    pub fn get_location_by_country_code(
        &self,
        country_code: &str,
        timelines: bool,
    ) -> Result<Vec<Location>, ApiError> {
        self.fetch_locations(&LocationFilter::country_code(country_code, timelines))
    }

    /// Locations whose country name matches. Unknown names yield an empty
    /// list.
    pub fn get_location_by_country(
        &self,
        country: &str,
        timelines: bool,
    ) -> Result<Vec<Location>, ApiError> {
        self.fetch_locations(&LocationFilter::country(country, timelines))
    }

    /// A single location; `ApiError::NotFound` if the id does not exist.
    pub fn get_location_by_id(&self, id: u64, timelines: bool) -> Result<Location, ApiError> {
        let response = self.send(self.api.build_location(&self.data_source, id, timelines))?;
        self.api.parse_location(response)
    }

    fn fetch_locations(&self, filter: &LocationFilter) -> Result<Vec<Location>, ApiError> {
        let response = self.send(self.api.build_locations(&self.data_source, filter))?;
        self.api.parse_locations(response)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        send(&self.transport, request)
    }
}

fn send<T: Transport>(transport: &T, request: HttpRequest) -> Result<HttpResponse, ApiError> {
    debug!(url = %request.url, query = ?request.query, "GET");
    let response = transport.execute(&request)?;
    debug!(status = response.status, bytes = response.body.len(), "response");
    Ok(response)
}
