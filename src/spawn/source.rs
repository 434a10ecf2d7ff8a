//! Source records and their provenance.
//!
//! A plan merges spawn groups from several authoring records (a room file,
//! a map-wide file, ...). Each record comes with a `SourceContext` saying
//! where canonicalized changes should go once planning is done.

use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by a persist callback
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Persist rejected: {0}")]
    Rejected(String),
}

/// Callback receiving a source record after the planner rewrote it
pub type PersistFn<'a> = Box<dyn FnMut(&Value) -> Result<(), PersistError> + 'a>;

/// Where the updated version of one source record is delivered
#[derive(Default)]
pub struct SourceContext<'a> {
    /// Overwritten with the final record when the planner changed it
    pub json_ref: Option<&'a mut Value>,
    /// Called with the final record when the planner changed it
    pub persist: Option<PersistFn<'a>>,
}

impl<'a> SourceContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ref(json_ref: &'a mut Value) -> Self {
        Self { json_ref: Some(json_ref), persist: None }
    }

    pub fn with_persist<F>(persist: F) -> Self
    where
        F: FnMut(&Value) -> Result<(), PersistError> + 'a,
    {
        Self { json_ref: None, persist: Some(Box::new(persist)) }
    }

    /// Persist by writing pretty-printed JSON to `path`
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::with_persist(move |record| write_record(&path, record))
    }

    pub fn is_empty(&self) -> bool {
        self.json_ref.is_none() && self.persist.is_none()
    }
}

impl std::fmt::Debug for SourceContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceContext")
            .field("json_ref", &self.json_ref.is_some())
            .field("persist", &self.persist.is_some())
            .finish()
    }
}

fn write_record(path: &Path, record: &Value) -> Result<(), PersistError> {
    let mut text = serde_json::to_string_pretty(record)?;
    text.push('\n');
    std::fs::write(path, text)?;
    Ok(())
}

/// Where a merged entry came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub source_index: usize,
    pub entry_index: usize,
    pub key: &'static str,
}
