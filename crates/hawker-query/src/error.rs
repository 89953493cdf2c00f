use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Empty query")]
    EmptyQuery,

    #[error("Unknown station code: {0}")]
    UnknownStation(String),
}
