use crate::cache;
use crate::distances::dedup_distance_rows;
use crate::error::{DataError, Result};
use crate::fetch::DatastoreClient;
use crate::record::{venues_from_flat, FlatVenueRecord};
use hawker_types::{Snapshot, StationDistance};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::PathBuf;

/// Where a dataset comes from: a remote URL or a local cache file.
#[derive(Debug, Clone)]
pub enum DatasetSource {
    Url(String),
    File(PathBuf),
}

impl DatasetSource {
    /// Interpret a CLI argument: anything with an http(s) scheme is a URL,
    /// the rest a local path.
    pub fn from_spec(spec: &str) -> Self {
        if spec.starts_with("http://") || spec.starts_with("https://") {
            Self::Url(spec.to_string())
        } else {
            Self::File(PathBuf::from(spec))
        }
    }

    async fn load<T: DeserializeOwned>(&self, client: &DatastoreClient) -> Result<Vec<T>> {
        match self {
            Self::Url(url) => {
                let value = client.fetch_json(url).await?;
                Ok(serde_json::from_value(value)?)
            }
            Self::File(path) => cache::read_json_file(path),
        }
    }
}

impl std::fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Load both datasets and assemble the immutable snapshot. The previous
/// snapshot (if any) stays untouched until this returns, so a failed
/// refresh never leaves readers with a half-built table.
pub async fn load_snapshot(
    client: &DatastoreClient,
    venue_source: &DatasetSource,
    distance_source: &DatasetSource,
) -> Result<Snapshot> {
    let flat_records: Vec<FlatVenueRecord> = venue_source.load(client).await?;
    let venues = venues_from_flat(flat_records);
    if venues.is_empty() {
        return Err(DataError::EmptyDataset("no valid venue records"));
    }
    log::info!("Number of entries in venue table: {}", venues.len());

    let rows: Vec<StationDistance> = distance_source.load(client).await?;
    let rows = dedup_distance_rows(rows);

    // Rows pointing at venues absent from the venue table cannot be
    // rendered; quarantine them.
    let known: HashSet<&str> = venues.iter().map(|venue| venue.name.as_str()).collect();
    let total = rows.len();
    let rows: Vec<StationDistance> = rows
        .into_iter()
        .filter(|row| {
            let keep = known.contains(row.venue.as_str());
            if !keep {
                log::warn!("Distance row references unknown venue '{}'", row.venue);
            }
            keep
        })
        .collect();
    if rows.len() < total {
        log::warn!("Dropped {} distance rows with unknown venues", total - rows.len());
    }
    if rows.is_empty() {
        return Err(DataError::EmptyDataset("no valid distance rows"));
    }
    log::info!("Number of entries in distance table: {}", rows.len());

    Ok(Snapshot::new(venues, rows))
}
