use crate::error::{DataError, Result};
use hawker_types::PAGE_SIZE;
use serde_json::Value;
use std::future::Future;

/// Upstream datastore serving the venue records.
pub const DATASTORE_BASE_URL: &str = "https://data.gov.sg";

/// First page of the venue resource, relative to [`DATASTORE_BASE_URL`].
pub const VENUE_RESOURCE_LINK: &str =
    "/api/action/datastore_search?resource_id=b80cb643-a732-480d-86b5-e03957bc82aa";

/// One page of the datastore response: its records plus the cursor to the
/// next page, if the envelope carries one.
#[derive(Debug, Clone)]
pub struct DatastorePage {
    pub records: Vec<Value>,
    pub next_link: Option<String>,
}

/// Parse the datastore envelope. Missing `result` or `records` keys are a
/// malformed payload, never an empty page.
pub fn parse_page(payload: &Value) -> Result<DatastorePage> {
    let result = payload.get("result").ok_or_else(|| {
        DataError::MalformedPayload("'result' key not found in response".to_string())
    })?;

    let records = result
        .get("records")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            DataError::MalformedPayload("'records' key not found in response".to_string())
        })?
        .clone();

    let next_link = result
        .get("_links")
        .and_then(|links| links.get("next"))
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(DatastorePage { records, next_link })
}

/// Walk the cursor pagination from `first_link`: fetch pages until one
/// returns fewer rows than the page size or the next cursor is absent,
/// concatenating records in page order. A malformed page is fatal.
pub async fn collect_records<F, Fut>(
    first_link: &str,
    page_size: usize,
    mut fetch_page: F,
) -> Result<Vec<Value>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Value>>,
{
    let mut all_records = Vec::new();
    let mut link = first_link.to_string();

    loop {
        log::info!("Fetching records from {link}...");
        let payload = fetch_page(link).await?;
        let page = parse_page(&payload)?;

        let fetched = page.records.len();
        all_records.extend(page.records);

        if fetched < page_size {
            break;
        }
        match page.next_link {
            Some(next) => link = next,
            None => break,
        }
    }

    log::info!("Number of records retrieved: {}", all_records.len());
    Ok(all_records)
}

async fn get_json(http: reqwest::Client, url: String) -> Result<Value> {
    let response = http.get(&url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(DataError::FetchStatus {
            url,
            status: status.as_u16(),
        });
    }
    Ok(response.json().await?)
}

/// HTTP client for the upstream datastore and the published dataset files.
#[derive(Debug, Clone)]
pub struct DatastoreClient {
    http: reqwest::Client,
    base_url: String,
}

impl DatastoreClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// GET a URL and parse the JSON body. Non-2xx is a fatal error.
    pub async fn fetch_json(&self, url: &str) -> Result<Value> {
        get_json(self.http.clone(), url.to_string()).await
    }

    /// Fetch every page of a paginated datastore resource.
    pub async fn fetch_all_records(&self, first_link: &str) -> Result<Vec<Value>> {
        let http = self.http.clone();
        let base_url = self.base_url.clone();
        collect_records(first_link, PAGE_SIZE, move |link| {
            get_json(http.clone(), format!("{base_url}{link}"))
        })
        .await
    }
}

impl Default for DatastoreClient {
    fn default() -> Self {
        Self::new(DATASTORE_BASE_URL)
    }
}
