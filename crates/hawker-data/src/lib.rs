mod cache;
mod distances;
mod error;
mod fetch;
mod loader;
mod record;

pub use cache::{read_json_file, write_json_file};
pub use distances::{
    build_distance_table, clean_station_name, dedup_distance_rows, read_stations_csv,
};
pub use error::{DataError, Result};
pub use fetch::{
    collect_records, parse_page, DatastoreClient, DatastorePage, DATASTORE_BASE_URL,
    VENUE_RESOURCE_LINK,
};
pub use loader::{load_snapshot, DatasetSource};
pub use record::{
    map_search_url, parse_cleaning_date, validate_raw_records, venues_from_flat,
    FlatVenueRecord, RawVenueRecord,
};
