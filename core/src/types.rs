//! Domain DTOs for the COVID-19 statistics API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! A location is opaque apart from `latest`, which ranking needs. Everything
//! else it carries (id, names, coordinates, timelines, ...) is kept in
//! `Location::extra` and serialized back unchanged, so irregular upstream
//! records (null codes, missing ids) and new fields pass through untouched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Aggregate case counts, either world-wide or for one location.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LatestTotals {
    pub confirmed: u64,
    pub deaths: u64,
    pub recovered: u64,
}

impl LatestTotals {
    pub fn get(&self, field: RankBy) -> u64 {
        match field {
            RankBy::Confirmed => self.confirmed,
            RankBy::Deaths => self.deaths,
            RankBy::Recovered => self.recovered,
        }
    }

    /// Per-field difference `self - earlier`.
    pub fn changes_since(&self, earlier: &LatestTotals) -> Changes {
        Changes {
            confirmed: delta(self.confirmed, earlier.confirmed),
            deaths: delta(self.deaths, earlier.deaths),
            recovered: delta(self.recovered, earlier.recovered),
        }
    }
}

fn delta(now: u64, before: u64) -> i64 {
    if now >= before {
        i64::try_from(now - before).unwrap_or(i64::MAX)
    } else {
        i64::try_from(before - now).map_or(i64::MIN, |d| -d)
    }
}

/// Signed change in case counts between two snapshots.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Changes {
    pub confirmed: i64,
    pub deaths: i64,
    pub recovered: i64,
}

/// A geographic entity with case statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub latest: LatestTotals,
    /// Remaining server fields, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Location {
    pub fn id(&self) -> Option<u64> {
        self.extra.get("id").and_then(Value::as_u64)
    }

    pub fn country(&self) -> Option<&str> {
        self.str_field("country")
    }

    /// ISO 3166-1 alpha-2 code; upstream leaves it null for some entries.
    pub fn country_code(&self) -> Option<&str> {
        self.str_field("country_code")
    }

    pub fn province(&self) -> Option<&str> {
        self.str_field("province")
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    /// Per-day timelines, present only when requested with `timelines`.
    pub fn timelines(&self) -> Option<&Value> {
        self.extra.get("timelines")
    }
}

/// Result of a full refresh: world totals plus every location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub latest: LatestTotals,
    pub locations: Vec<Location>,
}

/// Field a location list can be ranked by, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankBy {
    Confirmed,
    Deaths,
    Recovered,
}

impl RankBy {
    pub const ALL: [RankBy; 3] = [RankBy::Confirmed, RankBy::Deaths, RankBy::Recovered];

    pub fn as_str(&self) -> &'static str {
        match self {
            RankBy::Confirmed => "confirmed",
            RankBy::Deaths => "deaths",
            RankBy::Recovered => "recovered",
        }
    }
}

impl fmt::Display for RankBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankBy {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RankBy::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| {
                ApiError::InvalidArgument(format!(
                    "invalid ranking criteria `{s}`, expected one of: confirmed, deaths, recovered"
                ))
            })
    }
}
