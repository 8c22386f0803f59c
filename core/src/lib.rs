//! Synchronous client for the COVID-19 statistics API.
//!
//! # Overview
//! A build/parse split with a pluggable transport: `CovidApi` builds
//! `HttpRequest` values and parses `HttpResponse` values without touching
//! the network, and `Covid19` performs the I/O through a `Transport`
//! (`UreqTransport` by default). `Covid19` wraps it
//! with a `Transport`, validates the data source on construction and keeps
//! the previous and latest `get_all` snapshots for change tracking.
//!
//! # Design
//! - `CovidApi` is stateless; it holds only `base_url`.
//! - Each endpoint is split into `build_*` and `parse_*`, so the I/O boundary
//!   is explicit and tests can swap in a closure as the transport.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.
//!
//! ```no_run
//! use covid_core::{ClientConfig, Covid19};
//!
//! let mut client = Covid19::new(&ClientConfig::default())?;
//! let top = client.get_locations(false, Some("deaths"))?;
//! let snapshot = client.get_all(false)?;
//! println!("{} confirmed, {} locations", snapshot.latest.confirmed, top.len());
//! # Ok::<(), covid_core::ApiError>(())
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use api::{CovidApi, LocationFilter};
pub use client::Covid19;
pub use config::{ApiVariant, ClientConfig};
pub use error::ApiError;
pub use http::{HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{Changes, LatestTotals, Location, RankBy, Snapshot};
