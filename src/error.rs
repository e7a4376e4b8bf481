//! Errors for the file boundary of the crate
//!
//! Only loading graph declarations and configuration can fail. The layout
//! simulation and the interaction layer never return errors; they skip,
//! default or clamp instead.

use std::path::Path;

use thiserror::Error;

/// Errors that can occur while loading a graph or a configuration file
#[derive(Error, Debug)]
pub enum GraphError {
    /// The file extension is not one of the supported formats
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The file extension could not be determined
    #[error("could not determine file format from path: {0}")]
    UnknownExtension(String),

    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file could not be parsed
    #[error("parse error: {0}")]
    Parse(String),
}

/// Result type for loading operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Serialization formats accepted for graph and config files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// Pick the format from a file's extension
    pub fn from_path(path: &Path) -> GraphResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| GraphError::UnknownExtension(path.display().to_string()))?;

        match ext.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Format::Yaml),
            "json" => Ok(Format::Json),
            other => Err(GraphError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Deserialize `content` in this format
    pub fn parse<T: serde::de::DeserializeOwned>(self, content: &str) -> GraphResult<T> {
        match self {
            Format::Yaml => {
                serde_yaml::from_str(content).map_err(|e| GraphError::Parse(e.to_string()))
            }
            Format::Json => {
                serde_json::from_str(content).map_err(|e| GraphError::Parse(e.to_string()))
            }
        }
    }
}

/// Read and deserialize a YAML or JSON file, dispatching on its extension
pub fn load_file<T: serde::de::DeserializeOwned>(path: &Path) -> GraphResult<T> {
    let format = Format::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    format.parse(&content)
}
