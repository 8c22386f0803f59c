use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Latest {
    pub confirmed: u64,
    pub deaths: u64,
    pub recovered: u64,
}

impl Latest {
    fn add(self, other: Latest) -> Latest {
        Latest {
            confirmed: self.confirmed + other.confirmed,
            deaths: self.deaths + other.deaths,
            recovered: self.recovered + other.recovered,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: String,
    pub longitude: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Timeline {
    pub latest: u64,
    pub timeline: BTreeMap<String, u64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Timelines {
    pub confirmed: Timeline,
    pub deaths: Timeline,
    pub recovered: Timeline,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub id: u64,
    pub country: String,
    pub country_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_population: Option<u64>,
    pub province: String,
    pub last_updated: String,
    pub coordinates: Coordinates,
    pub latest: Latest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timelines: Option<Timelines>,
}

/// Everything the server answers from. Tests hold the `Db` handle and edit
/// it between requests.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub sources: Vec<String>,
    pub locations: Vec<Location>,
}

impl Dataset {
    pub fn sample() -> Self {
        let place = |id, country: &str, code: &str, province: &str, latest: Latest| Location {
            id,
            country: country.to_string(),
            country_code: code.to_string(),
            country_population: None,
            province: province.to_string(),
            last_updated: "2020-04-01T00:00:00Z".to_string(),
            coordinates: Coordinates {
                latitude: "0".to_string(),
                longitude: "0".to_string(),
            },
            latest,
            timelines: Some(timelines(latest)),
        };
        let counts = |confirmed, deaths, recovered| Latest {
            confirmed,
            deaths,
            recovered,
        };

        Self {
            sources: vec!["jhu".to_string(), "csbs".to_string(), "nyt".to_string()],
            locations: vec![
                place(0, "Italy", "IT", "", counts(105_792, 12_428, 15_729)),
                place(1, "Spain", "ES", "", counts(95_923, 8_464, 19_259)),
                place(2, "Canada", "CA", "Ontario", counts(1_966, 33, 0)),
                place(3, "Canada", "CA", "Quebec", counts(4_162, 31, 0)),
                place(4, "Chad", "TD", "", counts(5, 0, 0)),
            ],
        }
    }

    pub fn totals<'a>(locations: impl IntoIterator<Item = &'a Location>) -> Latest {
        locations
            .into_iter()
            .fold(Latest::default(), |acc, l| acc.add(l.latest))
    }
}

/// A two-day timeline ending at `latest`, half of it on the first day.
fn timelines(latest: Latest) -> Timelines {
    let series = |total: u64| Timeline {
        latest: total,
        timeline: BTreeMap::from([
            ("2020-03-31T00:00:00Z".to_string(), total / 2),
            ("2020-04-01T00:00:00Z".to_string(), total),
        ]),
    };
    Timelines {
        confirmed: series(latest.confirmed),
        deaths: series(latest.deaths),
        recovered: series(latest.recovered),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DataQuery {
    pub source: Option<String>,
    pub country_code: Option<String>,
    pub country: Option<String>,
    #[serde(default)]
    pub timelines: bool,
}

pub type Db = Arc<RwLock<Dataset>>;

pub fn app() -> Router {
    app_with(Arc::new(RwLock::new(Dataset::sample())))
}

pub fn app_with(db: Db) -> Router {
    Router::new()
        .route("/v2/sources", get(list_sources))
        .route("/v2/latest", get(latest))
        .route("/v2/locations", get(list_locations))
        .route("/v2/locations/{id}", get(get_location))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(db)).await
}

/// Unknown sources are a 404, as upstream. A missing source means `jhu`.
fn check_source(dataset: &Dataset, query: &DataQuery) -> Result<(), StatusCode> {
    let source = query.source.as_deref().unwrap_or("jhu");
    if dataset.sources.iter().any(|s| s == source) {
        Ok(())
    } else {
        tracing::debug!(source, "rejecting unknown source");
        Err(StatusCode::NOT_FOUND)
    }
}

fn present(location: &Location, timelines: bool) -> Location {
    let mut location = location.clone();
    if !timelines {
        location.timelines = None;
    }
    location
}

async fn list_sources(State(db): State<Db>) -> Json<Value> {
    let dataset = db.read().await;
    Json(json!({ "sources": dataset.sources }))
}

async fn latest(
    State(db): State<Db>,
    Query(query): Query<DataQuery>,
) -> Result<Json<Value>, StatusCode> {
    let dataset = db.read().await;
    check_source(&dataset, &query)?;
    Ok(Json(json!({ "latest": Dataset::totals(&dataset.locations) })))
}

async fn list_locations(
    State(db): State<Db>,
    Query(query): Query<DataQuery>,
) -> Result<Json<Value>, StatusCode> {
    let dataset = db.read().await;
    check_source(&dataset, &query)?;
    let matches = |l: &&Location| {
        query
            .country_code
            .as_ref()
            .map_or(true, |c| l.country_code.eq_ignore_ascii_case(c))
            && query
                .country
                .as_ref()
                .map_or(true, |c| l.country.eq_ignore_ascii_case(c))
    };
    let locations: Vec<Location> = dataset
        .locations
        .iter()
        .filter(matches)
        .map(|l| present(l, query.timelines))
        .collect();
    Ok(Json(json!({
        "latest": Dataset::totals(&locations),
        "locations": locations,
    })))
}

async fn get_location(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Query(query): Query<DataQuery>,
) -> Result<Json<Value>, StatusCode> {
    let dataset = db.read().await;
    check_source(&dataset, &query)?;
    dataset
        .locations
        .iter()
        .find(|l| l.id == id)
        .map(|l| Json(json!({ "location": present(l, query.timelines) })))
        .ok_or(StatusCode::NOT_FOUND)
}
