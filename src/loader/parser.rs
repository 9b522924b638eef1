use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Parses a JSON file into a given type `T`.
///
/// Used for workflow files, host files and engine configuration alike.
///
/// Errors are converted into `crate::error::Error` variants:
/// - `Error::IoError` if the file cannot be read.
/// - `Error::DeserializationError` if the JSON is malformed or does not match `T`.
pub fn parse_json_file<T: DeserializeOwned>(file_path: impl AsRef<Path>) -> Result<T> {
    let file_path = file_path.as_ref();
    let data = fs::read_to_string(file_path)?;
    log::debug!("Read {} bytes from '{}'.", data.len(), file_path.display());

    parse_json_str(&data)
}

/// Same as `parse_json_file` for JSON already held in memory.
pub fn parse_json_str<T: DeserializeOwned>(data: &str) -> Result<T> {
    let parsed_data: T = serde_json::from_str(data)?;
    Ok(parsed_data)
}
