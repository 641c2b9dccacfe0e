use log::info;
use serde::de::DeserializeOwned;
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// The error type for reading JSON input files.
#[derive(Debug, Error)]
pub enum JsonError {
    /// The file could not be opened.
    #[error("failed to open '{}'", .0.display())]
    Open(PathBuf, #[source] std::io::Error),
    /// The file content does not describe the expected data.
    #[error("failed to parse '{}'", .0.display())]
    Parse(PathBuf, #[source] serde_json::Error),
}

/// Reads and deserializes the JSON file at `path`.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, JsonError> {
    info!(target: "json", "reading '{}'", path.display());
    let file = File::open(path).map_err(|err| JsonError::Open(path.to_path_buf(), err))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|err| JsonError::Parse(path.to_path_buf(), err))
}
