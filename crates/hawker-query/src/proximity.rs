use crate::error::{QueryError, Result};
use geo::{HaversineDistance, Point};
use hawker_types::{Snapshot, TOP_K};
use std::cmp::Ordering;

/// A venue ranked by distance from a reference point or station.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityMatch {
    pub name: String,
    pub distance_km: f64,
}

impl ProximityMatch {
    /// Distance rounded to one decimal, for display. Ranking always uses
    /// the exact value.
    pub fn display_km(&self) -> f64 {
        (self.distance_km * 10.0).round() / 10.0
    }
}

/// Great-circle distance in kilometers between two (lat, long) pairs.
pub fn distance_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let origin = Point::new(from.1, from.0);
    let target = Point::new(to.1, to.0);
    origin.haversine_distance(&target) / 1000.0
}

/// Distance ranking over the venue and distance tables.
pub struct ProximityRanker {
    limit: usize,
}

impl ProximityRanker {
    pub fn new() -> Self {
        Self { limit: TOP_K }
    }

    pub fn with_limit(limit: usize) -> Self {
        Self { limit }
    }

    /// Rank every venue by distance from the reference point, ascending,
    /// venue name ascending as the tie-break.
    pub fn nearest(&self, snapshot: &Snapshot, latitude: f64, longitude: f64) -> Vec<ProximityMatch> {
        let mut matches: Vec<ProximityMatch> = snapshot
            .venues()
            .iter()
            .map(|venue| ProximityMatch {
                name: venue.name.clone(),
                distance_km: distance_km(
                    (latitude, longitude),
                    (venue.latitude, venue.longitude),
                ),
            })
            .collect();

        self.sort_and_truncate(&mut matches);

        log::debug!(
            "Proximity search from ({latitude}, {longitude}): {} matches returned",
            matches.len()
        );

        matches
    }

    /// Rank the venues linked to one station, using the precomputed distance
    /// table pre-filtered to that station's code.
    pub fn nearest_to_station(&self, snapshot: &Snapshot, code: &str) -> Result<Vec<ProximityMatch>> {
        if snapshot.station(code).is_none() {
            return Err(QueryError::UnknownStation(code.to_string()));
        }

        let mut matches: Vec<ProximityMatch> = snapshot
            .distances()
            .iter()
            .filter(|row| row.code == code)
            .map(|row| ProximityMatch {
                name: row.venue.clone(),
                distance_km: row.distance_km,
            })
            .collect();

        self.sort_and_truncate(&mut matches);

        log::debug!(
            "Station {code} proximity search: {} matches returned",
            matches.len()
        );

        Ok(matches)
    }

    fn sort_and_truncate(&self, matches: &mut Vec<ProximityMatch>) {
        matches.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });
        matches.truncate(self.limit);
    }
}

impl Default for ProximityRanker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hawker_types::{CleaningWindow, StationDistance, Venue};
    use pretty_assertions::assert_eq;

    fn venue(name: &str, latitude: f64, longitude: f64) -> Venue {
        let day = NaiveDate::from_ymd_opt(1990, 1, 14).expect("valid date");
        Venue {
            name: name.to_string(),
            address: String::new(),
            description: String::new(),
            photo_url: String::new(),
            map_url: String::new(),
            status: "Existing".to_string(),
            latitude,
            longitude,
            cleaning: [CleaningWindow::new(day, day); 4],
        }
    }

    fn row(venue: &str, code: &str, km: f64) -> StationDistance {
        StationDistance {
            venue: venue.to_string(),
            station_name: "NEWTON MRT STATION".to_string(),
            station_cleaned: "newton".to_string(),
            code: code.to_string(),
            distance_km: km,
        }
    }

    #[test]
    fn haversine_is_zero_at_same_point() {
        assert!(distance_km((1.3, 103.8), (1.3, 103.8)) < 1e-9);
    }

    #[test]
    fn closer_venue_ranks_first() {
        // Reference point with one venue ~0.5 km north and one ~2.1 km
        // north. One degree of latitude is ~111.2 km.
        let snapshot = Snapshot::new(
            vec![
                venue("Far Centre", 1.3000 + 2.1 / 111.2, 103.8000),
                venue("Near Centre", 1.3000 + 0.5 / 111.2, 103.8000),
            ],
            Vec::new(),
        );

        let matches = ProximityRanker::new().nearest(&snapshot, 1.3000, 103.8000);

        assert_eq!(matches[0].name, "Near Centre");
        assert_eq!(matches[0].display_km(), 0.5);
        assert_eq!(matches[1].name, "Far Centre");
        assert_eq!(matches[1].display_km(), 2.1);
    }

    #[test]
    fn rank_orders_exactly_by_distance() {
        let snapshot = Snapshot::new(
            (0..15)
                .map(|i| venue(&format!("Centre {i:02}"), 1.30 + f64::from(i) * 0.01, 103.8))
                .collect(),
            Vec::new(),
        );

        let matches = ProximityRanker::new().nearest(&snapshot, 1.30, 103.8);

        assert_eq!(matches.len(), TOP_K);
        for pair in matches.windows(2) {
            assert!(pair[0].distance_km <= pair[1].distance_km);
        }
        assert_eq!(matches[0].name, "Centre 00");
    }

    #[test]
    fn distance_ties_break_by_name() {
        let snapshot = Snapshot::new(
            vec![
                venue("B Centre", 1.31, 103.8),
                venue("A Centre", 1.31, 103.8),
            ],
            Vec::new(),
        );

        let matches = ProximityRanker::new().nearest(&snapshot, 1.30, 103.8);

        assert_eq!(matches[0].name, "A Centre");
        assert_eq!(matches[1].name, "B Centre");
    }

    #[test]
    fn station_search_filters_to_code() {
        let rows = vec![
            row("Adam Road", "NS21", 0.8),
            row("Zion Riverside", "NS21", 3.2),
            row("Bedok Corner", "EW5", 0.4),
        ];
        let snapshot = Snapshot::new(Vec::new(), rows);

        let matches = ProximityRanker::new()
            .nearest_to_station(&snapshot, "NS21")
            .expect("known station");

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].name, "Adam Road");
        assert_eq!(matches[1].name, "Zion Riverside");
    }

    #[test]
    fn unknown_station_is_an_error() {
        let snapshot = Snapshot::new(Vec::new(), vec![row("Adam Road", "NS21", 0.8)]);
        let result = ProximityRanker::new().nearest_to_station(&snapshot, "XX99");
        assert!(matches!(result, Err(QueryError::UnknownStation(_))));
    }

    #[test]
    fn display_rounds_to_one_decimal() {
        let near = ProximityMatch {
            name: "Adam Road".to_string(),
            distance_km: 0.449,
        };
        let far = ProximityMatch {
            name: "Zion Riverside".to_string(),
            distance_km: 2.149,
        };
        assert_eq!(near.display_km(), 0.4);
        assert_eq!(far.display_km(), 2.1);
    }
}
