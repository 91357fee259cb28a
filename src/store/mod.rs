pub mod record;
pub mod writer;

use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::cascade::Cascade;
use crate::profile::CreatorProfile;
use crate::rules::{RuleSet, RuleSetDefinition, RuleSetError};
pub use record::{ClassificationRecord, RECORD_FORMAT_VERSION};
pub use writer::RecordWriter;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Output file already exists: {0}")]
    OutputExists(PathBuf),
    #[error("Invalid rule set: {0}")]
    RuleSet(#[from] RuleSetError),
    #[error("Unsupported record format version: {0}")]
    UnsupportedFormat(String),
    #[error("Record summary does not match its categories: {0}")]
    SummaryMismatch(PathBuf),
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let file = fs::File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// A JSON array of profiles.
pub fn load_profiles(path: &Path) -> Result<Vec<CreatorProfile>, StoreError> {
    read_json(path)
}

/// A JSON rule set definition, validated into a [`RuleSet`].
pub fn load_rule_set(path: &Path) -> Result<RuleSet, StoreError> {
    let definition: RuleSetDefinition = read_json(path)?;
    Ok(RuleSet::new(definition)?)
}

/// A JSON array of correction steps, in application order.
pub fn load_cascade(path: &Path) -> Result<Cascade, StoreError> {
    read_json(path)
}

pub fn read_record(path: &Path) -> Result<ClassificationRecord, StoreError> {
    let record: ClassificationRecord = read_json(path)?;

    if record.format_version != RECORD_FORMAT_VERSION {
        return Err(StoreError::UnsupportedFormat(record.format_version));
    }
    if record.summary != record.categories.summary() {
        return Err(StoreError::SummaryMismatch(path.to_path_buf()));
    }
    Ok(record)
}
