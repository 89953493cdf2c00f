use hawker_data::{load_snapshot, write_json_file, DatasetSource, DatastoreClient};
use serde_json::{json, Value};
use tempfile::TempDir;

fn venue_row(name: &str) -> Value {
    json!({
        "hawker_name": name,
        "address": "1 Somewhere Road",
        "description": "A food centre",
        "hawker_photo_url": "https://example.org/photo.jpg",
        "hawker_gmaps_url": "https://www.google.com/maps/search/?api=1&query=Somewhere",
        "hawker_status": "Existing",
        "latitude": 1.3242,
        "longitude": 103.8137,
        "q1_start": "4/3/2024",
        "q1_end": "7/3/2024",
        "q2_start": "14/1/1990",
        "q2_end": "14/1/1990",
        "q3_start": "2/9/2024",
        "q3_end": "5/9/2024",
        "q4_start": "2/12/2024",
        "q4_end": "5/12/2024",
    })
}

fn distance_row(venue: &str, cleaned: &str, code: &str, km: f64) -> Value {
    json!({
        "hawker_name": venue,
        "station_name": format!("{} MRT STATION", cleaned.to_uppercase()),
        "station_name_cleaned": cleaned,
        "station_num": code,
        "distance": km,
    })
}

fn sources(dir: &TempDir, venues: Vec<Value>, distances: Vec<Value>) -> (DatasetSource, DatasetSource) {
    let venue_path = dir.path().join("hawker_data.json");
    let distance_path = dir.path().join("mrt_hawker_distances.json");
    write_json_file(&venue_path, &venues).expect("write venues");
    write_json_file(&distance_path, &distances).expect("write distances");
    (
        DatasetSource::File(venue_path),
        DatasetSource::File(distance_path),
    )
}

#[tokio::test]
async fn snapshot_loads_both_tables_from_cache_files() {
    let dir = TempDir::new().expect("tempdir");
    let (venue_source, distance_source) = sources(
        &dir,
        vec![venue_row("Adam Road Food Centre"), venue_row("Bedok Corner")],
        vec![
            distance_row("Adam Road Food Centre", "newton", "NS21", 2.9),
            distance_row("Bedok Corner", "bedok", "EW5", 0.7),
            distance_row("Bedok Corner", "newton", "NS21", 11.4),
        ],
    );

    let snapshot = load_snapshot(&DatastoreClient::default(), &venue_source, &distance_source)
        .await
        .expect("load snapshot");

    assert_eq!(snapshot.venues().len(), 2);
    assert_eq!(snapshot.distances().len(), 3);
    assert_eq!(snapshot.stations().len(), 2);
    assert!(snapshot.venue("Adam Road Food Centre").is_some());
    assert_eq!(snapshot.station("NS21").expect("station").cleaned, "newton");
}

#[tokio::test]
async fn duplicate_distance_rows_resolve_to_first_occurrence() {
    let dir = TempDir::new().expect("tempdir");
    let (venue_source, distance_source) = sources(
        &dir,
        vec![venue_row("Adam Road Food Centre")],
        vec![
            distance_row("Adam Road Food Centre", "newton", "NS21", 2.9),
            distance_row("Adam Road Food Centre", "newton", "NS21", 9.9),
        ],
    );

    let snapshot = load_snapshot(&DatastoreClient::default(), &venue_source, &distance_source)
        .await
        .expect("load snapshot");

    assert_eq!(snapshot.distances().len(), 1);
    assert_eq!(snapshot.distances()[0].distance_km, 2.9);
}

#[tokio::test]
async fn rows_for_unknown_venues_are_dropped() {
    let dir = TempDir::new().expect("tempdir");
    let (venue_source, distance_source) = sources(
        &dir,
        vec![venue_row("Adam Road Food Centre")],
        vec![
            distance_row("Adam Road Food Centre", "newton", "NS21", 2.9),
            distance_row("Demolished Centre", "newton", "NS21", 1.1),
        ],
    );

    let snapshot = load_snapshot(&DatastoreClient::default(), &venue_source, &distance_source)
        .await
        .expect("load snapshot");

    assert_eq!(snapshot.distances().len(), 1);
    assert_eq!(snapshot.distances()[0].venue, "Adam Road Food Centre");
}

#[tokio::test]
async fn empty_venue_table_is_fatal() {
    let dir = TempDir::new().expect("tempdir");
    let (venue_source, distance_source) = sources(
        &dir,
        Vec::new(),
        vec![distance_row("Adam Road Food Centre", "newton", "NS21", 2.9)],
    );

    let result =
        load_snapshot(&DatastoreClient::default(), &venue_source, &distance_source).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn malformed_venue_rows_are_quarantined_not_fatal() {
    let dir = TempDir::new().expect("tempdir");
    let mut broken = venue_row("Broken Dates");
    broken["q1_start"] = json!("sometime in March");
    let (venue_source, distance_source) = sources(
        &dir,
        vec![venue_row("Adam Road Food Centre"), broken],
        vec![distance_row("Adam Road Food Centre", "newton", "NS21", 2.9)],
    );

    let snapshot = load_snapshot(&DatastoreClient::default(), &venue_source, &distance_source)
        .await
        .expect("load snapshot");

    assert_eq!(snapshot.venues().len(), 1);
}
