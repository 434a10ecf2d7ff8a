use thiserror::Error;

use crate::asset::library::LibraryError;
use crate::spawn::source::PersistError;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Persisting source {source_index} failed: {source}")]
    Persist {
        source_index: usize,
        #[source]
        source: PersistError,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Asset library error: {0}")]
    Library(#[from] LibraryError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
