use thiserror::Error;

pub type Result<T> = std::result::Result<T, DataError>;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Fetch of {url} returned status {status}")]
    FetchStatus { url: String, status: u16 },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Empty dataset: {0}")]
    EmptyDataset(&'static str),
}
