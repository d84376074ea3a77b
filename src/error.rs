use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("No `{stub}*.json` files found in {}", .dir.display())]
    InputNotFound { dir: PathBuf, stub: String },

    #[error("Streaming history is missing required fields: {}", .missing.join(", "))]
    Schema { missing: Vec<&'static str> },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No plays found in {year}")]
    EmptyResult { year: i32 },
}
