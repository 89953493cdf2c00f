use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Write a dataset to its flat JSON cache file, creating parent
/// directories as needed.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    serde_json::to_writer(BufWriter::new(file), value)?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

/// Load a dataset from its flat JSON cache file.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)?;
    let value = serde_json::from_reader(BufReader::new(file))?;
    log::info!("Loaded {}", path.display());
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn round_trips_through_the_cache_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data").join("names.json");

        let names = vec!["Adam Road".to_string(), "Bedok Corner".to_string()];
        write_json_file(&path, &names).expect("write");
        let loaded: Vec<String> = read_json_file(&path).expect("read");

        assert_eq!(loaded, names);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result: Result<Vec<String>> = read_json_file(&dir.path().join("absent.json"));
        assert!(result.is_err());
    }
}
