use crate::error::Result;
use geo::{HaversineDistance, Point};
use hawker_types::{Station, StationDistance, Venue};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Row of the station coordinates CSV.
#[derive(Debug, Deserialize)]
struct StationCsvRow {
    #[serde(rename = "STN_NAME")]
    name: String,
    #[serde(rename = "STN_NO")]
    code: String,
    lat: f64,
    long: f64,
}

/// Lower-case a station name and strip the " mrt station" suffix, matching
/// how the distance dataset labels stations.
pub fn clean_station_name(name: &str) -> String {
    name.to_lowercase().replace(" mrt station", "")
}

/// Read stations from the coordinates CSV, dropping duplicate
/// (name, code) rows. Interchanges stay, once per code.
pub fn read_stations_csv(path: &Path) -> Result<Vec<Station>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut seen = HashSet::new();
    let mut stations = Vec::new();

    for row in reader.deserialize() {
        let row: StationCsvRow = row?;
        if !seen.insert((row.name.clone(), row.code.clone())) {
            continue;
        }
        stations.push(Station {
            cleaned: clean_station_name(&row.name),
            name: row.name,
            code: row.code,
            latitude: row.lat,
            longitude: row.long,
        });
    }

    log::info!("Read {} stations from {}", stations.len(), path.display());
    Ok(stations)
}

/// Compute the full venue x station distance table: haversine distance in
/// km for every pair, sorted by (venue, station name, code).
pub fn build_distance_table(venues: &[Venue], stations: &[Station]) -> Vec<StationDistance> {
    let mut rows = Vec::with_capacity(venues.len() * stations.len());

    for venue in venues {
        let venue_point = Point::new(venue.longitude, venue.latitude);
        for station in stations {
            let station_point = Point::new(station.longitude, station.latitude);
            rows.push(StationDistance {
                venue: venue.name.clone(),
                station_name: station.name.clone(),
                station_cleaned: station.cleaned.clone(),
                code: station.code.clone(),
                distance_km: venue_point.haversine_distance(&station_point) / 1000.0,
            });
        }
    }

    rows.sort_by(|a, b| {
        a.venue
            .cmp(&b.venue)
            .then_with(|| a.station_name.cmp(&b.station_name))
            .then_with(|| a.code.cmp(&b.code))
    });

    log::info!("Number of venue/station pairs: {}", rows.len());
    rows
}

/// Enforce one row per (venue, station code): duplicates are a data-quality
/// defect, logged and resolved by keeping the first occurrence.
pub fn dedup_distance_rows(rows: Vec<StationDistance>) -> Vec<StationDistance> {
    let total = rows.len();
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(total);

    for row in rows {
        if seen.insert((row.venue.clone(), row.code.clone())) {
            unique.push(row);
        } else {
            log::warn!(
                "Duplicate distance row for ({}, {}); keeping the first occurrence",
                row.venue,
                row.code
            );
        }
    }

    if unique.len() < total {
        log::warn!(
            "Distance table is not unique: dropped {} duplicate rows",
            total - unique.len()
        );
    }
    unique
}
