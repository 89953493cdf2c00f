use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of results shown to the user per query.
pub const TOP_K: usize = 10;

/// Rows per page of the upstream venue API.
pub const PAGE_SIZE: usize = 100;

/// Placeholder the upstream dataset uses for unconfirmed cleaning dates.
pub const TBC_PLACEHOLDER: &str = "TBC";

/// Date substituted for [`TBC_PLACEHOLDER`], far enough in the past that a
/// sentinel window can never overlap a realistic query window.
pub const TBC_FALLBACK_DATE: &str = "14/1/1990";

/// Date format used by both upstream datasets.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Decorative result markers. A response shuffles the palette once and
/// assigns marker *i* to result *i*.
pub const MARKERS: [&str; 10] = [
    "\u{1F372}", // pot of food
    "\u{1F957}", // salad
    "\u{1F964}", // cup with straw
    "\u{1F35C}", // steaming bowl
    "\u{1F371}", // bento
    "\u{1F95E}", // pancakes
    "\u{1F99E}", // lobster
    "\u{2615}",  // hot beverage
    "\u{1F96E}", // mooncake
    "\u{1F35A}", // cooked rice
];

/// Inclusive date range during which a venue is closed for cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CleaningWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Inclusive intersection test against another date range.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start <= end && start <= self.end
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

/// A hawker centre record. `name` is the unique key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    pub name: String,
    pub address: String,
    pub description: String,
    pub photo_url: String,
    pub map_url: String,
    pub status: String,
    pub latitude: f64,
    pub longitude: f64,
    /// One cleaning window per calendar quarter, Q1 first.
    pub cleaning: [CleaningWindow; 4],
}

impl Venue {
    /// True when the status text lacks "existing" (case-insensitive),
    /// i.e. the venue is permanently closed.
    pub fn not_existing(&self) -> bool {
        !self.status.to_lowercase().contains("existing")
    }

    /// Cleaning window for a quarter in 1..=4.
    pub fn cleaning_window(&self, quarter: u32) -> Option<CleaningWindow> {
        match quarter {
            1..=4 => Some(self.cleaning[(quarter - 1) as usize]),
            _ => None,
        }
    }
}

/// A transit station with coordinates, as read from the stations file.
/// `(name, code)` uniquely identifies a station; interchanges appear once
/// per code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub cleaned: String,
    pub code: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Station identity as carried by distance rows: cleaned display name plus
/// station code. This is all the station picker needs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StationRef {
    pub cleaned: String,
    pub code: String,
}

/// One venue-to-station distance row. Field names follow the published
/// distance dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationDistance {
    #[serde(rename = "hawker_name")]
    pub venue: String,
    pub station_name: String,
    #[serde(rename = "station_name_cleaned")]
    pub station_cleaned: String,
    #[serde(rename = "station_num")]
    pub code: String,
    #[serde(rename = "distance")]
    pub distance_km: f64,
}

/// Immutable bundle of the loaded tables. Handlers borrow a snapshot;
/// a refresh builds a complete replacement before the old one is dropped.
#[derive(Debug, Clone)]
pub struct Snapshot {
    venues: Vec<Venue>,
    by_name: HashMap<String, usize>,
    distances: Vec<StationDistance>,
    stations: Vec<StationRef>,
}

impl Snapshot {
    /// Assemble a snapshot from validated tables. The station list is
    /// derived from the distance rows, sorted by (cleaned name, code).
    pub fn new(venues: Vec<Venue>, distances: Vec<StationDistance>) -> Self {
        let by_name = venues
            .iter()
            .enumerate()
            .map(|(idx, venue)| (venue.name.clone(), idx))
            .collect();

        let mut stations: Vec<StationRef> = distances
            .iter()
            .map(|row| StationRef {
                cleaned: row.station_cleaned.clone(),
                code: row.code.clone(),
            })
            .collect();
        stations.sort();
        stations.dedup();

        Self {
            venues,
            by_name,
            distances,
            stations,
        }
    }

    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }

    pub fn venue(&self, name: &str) -> Option<&Venue> {
        self.by_name.get(name).map(|&idx| &self.venues[idx])
    }

    pub fn distances(&self) -> &[StationDistance] {
        &self.distances
    }

    /// Unique stations present in the distance table.
    pub fn stations(&self) -> &[StationRef] {
        &self.stations
    }

    pub fn station(&self, code: &str) -> Option<&StationRef> {
        self.stations.iter().find(|station| station.code == code)
    }
}
