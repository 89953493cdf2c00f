use crate::error::{DataError, Result};
use chrono::NaiveDate;
use hawker_types::{CleaningWindow, Venue, DATE_FORMAT, TBC_FALLBACK_DATE, TBC_PLACEHOLDER};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const GMAPS_BASE_URL: &str = "https://www.google.com/maps/search/?api=1&query=";

/// Google Maps search URL for a venue name.
pub fn map_search_url(name: &str) -> String {
    let query = name.split_whitespace().collect::<Vec<_>>().join("+");
    format!("{GMAPS_BASE_URL}{query}")
}

/// Parse an upstream cleaning date, mapping the to-be-confirmed placeholder
/// to the fixed past sentinel first.
pub fn parse_cleaning_date(raw: &str) -> std::result::Result<NaiveDate, chrono::ParseError> {
    let substituted = raw.replace(TBC_PLACEHOLDER, TBC_FALLBACK_DATE);
    NaiveDate::parse_from_str(substituted.trim(), DATE_FORMAT)
}

/// A venue record as served by the upstream datastore API. Every field is
/// text; validation turns it into the flat record below.
#[derive(Debug, Clone, Deserialize)]
pub struct RawVenueRecord {
    pub name: String,
    #[serde(rename = "address_myenv")]
    pub address: String,
    #[serde(rename = "description_myenv")]
    pub description: String,
    #[serde(rename = "photourl")]
    pub photo_url: String,
    pub status: String,
    #[serde(rename = "latitude_hc")]
    pub latitude: String,
    #[serde(rename = "longitude_hc")]
    pub longitude: String,
    #[serde(rename = "q1_cleaningstartdate")]
    pub q1_start: String,
    #[serde(rename = "q1_cleaningenddate")]
    pub q1_end: String,
    #[serde(rename = "q2_cleaningstartdate")]
    pub q2_start: String,
    #[serde(rename = "q2_cleaningenddate")]
    pub q2_end: String,
    #[serde(rename = "q3_cleaningstartdate")]
    pub q3_start: String,
    #[serde(rename = "q3_cleaningenddate")]
    pub q3_end: String,
    #[serde(rename = "q4_cleaningstartdate")]
    pub q4_start: String,
    #[serde(rename = "q4_cleaningenddate")]
    pub q4_end: String,
}

/// A venue row of the published flat dataset. Coordinates are numeric and
/// the TBC placeholder has already been substituted; dates stay in
/// `%d/%m/%Y` text form on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatVenueRecord {
    pub hawker_name: String,
    pub address: String,
    pub description: String,
    pub hawker_photo_url: String,
    pub hawker_gmaps_url: String,
    pub hawker_status: String,
    pub latitude: f64,
    pub longitude: f64,
    pub q1_start: String,
    pub q1_end: String,
    pub q2_start: String,
    pub q2_end: String,
    pub q3_start: String,
    pub q3_end: String,
    pub q4_start: String,
    pub q4_end: String,
}

impl FlatVenueRecord {
    /// Validate one upstream record into the flat form.
    pub fn from_raw(value: &Value) -> Result<Self> {
        let raw: RawVenueRecord = serde_json::from_value(value.clone())?;

        let latitude: f64 = raw.latitude.trim().parse().map_err(|_| {
            DataError::MalformedPayload(format!("bad latitude for '{}'", raw.name))
        })?;
        let longitude: f64 = raw.longitude.trim().parse().map_err(|_| {
            DataError::MalformedPayload(format!("bad longitude for '{}'", raw.name))
        })?;

        let substitute =
            |raw_date: &str| raw_date.replace(TBC_PLACEHOLDER, TBC_FALLBACK_DATE);

        Ok(Self {
            hawker_gmaps_url: map_search_url(&raw.name),
            hawker_name: raw.name,
            address: raw.address,
            description: raw.description,
            hawker_photo_url: raw.photo_url,
            hawker_status: raw.status,
            latitude,
            longitude,
            q1_start: substitute(&raw.q1_start),
            q1_end: substitute(&raw.q1_end),
            q2_start: substitute(&raw.q2_start),
            q2_end: substitute(&raw.q2_end),
            q3_start: substitute(&raw.q3_start),
            q3_end: substitute(&raw.q3_end),
            q4_start: substitute(&raw.q4_start),
            q4_end: substitute(&raw.q4_end),
        })
    }

    /// Parse the date columns into a typed venue.
    pub fn into_venue(self) -> Result<Venue> {
        let window = |start: &str, end: &str| -> Result<CleaningWindow> {
            let start = parse_cleaning_date(start).map_err(|e| {
                DataError::MalformedPayload(format!(
                    "bad cleaning date '{start}' for '{}': {e}",
                    self.hawker_name
                ))
            })?;
            let end = parse_cleaning_date(end).map_err(|e| {
                DataError::MalformedPayload(format!(
                    "bad cleaning date '{end}' for '{}': {e}",
                    self.hawker_name
                ))
            })?;
            Ok(CleaningWindow::new(start, end))
        };

        let cleaning = [
            window(&self.q1_start, &self.q1_end)?,
            window(&self.q2_start, &self.q2_end)?,
            window(&self.q3_start, &self.q3_end)?,
            window(&self.q4_start, &self.q4_end)?,
        ];

        Ok(Venue {
            name: self.hawker_name,
            address: self.address,
            description: self.description,
            photo_url: self.hawker_photo_url,
            map_url: self.hawker_gmaps_url,
            status: self.hawker_status,
            latitude: self.latitude,
            longitude: self.longitude,
            cleaning,
        })
    }
}

/// Validate fetched upstream records, quarantining the malformed ones.
pub fn validate_raw_records(values: &[Value]) -> Vec<FlatVenueRecord> {
    let mut records = Vec::with_capacity(values.len());
    let mut dropped = 0usize;

    for value in values {
        match FlatVenueRecord::from_raw(value) {
            Ok(record) => records.push(record),
            Err(err) => {
                dropped += 1;
                log::warn!("Quarantined venue record: {err}");
            }
        }
    }

    if dropped > 0 {
        log::warn!("Quarantined {dropped} of {} venue records", values.len());
    }
    records
}

/// Parse flat venue rows into typed venues, quarantining rows whose dates
/// or coordinates do not parse.
pub fn venues_from_flat(records: Vec<FlatVenueRecord>) -> Vec<Venue> {
    let total = records.len();
    let mut venues = Vec::with_capacity(total);
    let mut dropped = 0usize;

    for record in records {
        match record.into_venue() {
            Ok(venue) => venues.push(venue),
            Err(err) => {
                dropped += 1;
                log::warn!("Quarantined venue row: {err}");
            }
        }
    }

    if dropped > 0 {
        log::warn!("Quarantined {dropped} of {total} venue rows");
    }
    venues
}
