use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use super::record::ClassificationRecord;
use super::StoreError;

/// Writes records through a temp file and an atomic rename.
///
/// Single-threaded and non-reentrant: two writers targeting the same path
/// share one temp file name.
#[derive(Debug, Clone, Default)]
pub struct RecordWriter {
    overwrite: bool,
}

impl RecordWriter {
    /// Refuses to replace an existing file.
    pub fn new() -> Self {
        Self { overwrite: false }
    }

    /// Replaces an existing file (successive corrected versions).
    pub fn overwriting() -> Self {
        Self { overwrite: true }
    }

    pub fn write_record(
        &self,
        record: &ClassificationRecord,
        path: &Path,
    ) -> Result<(), StoreError> {
        self.write_json(record, path)?;
        info!(
            path = %path.display(),
            creators = record.summary.total_creators,
            categories = record.summary.category_count,
            "Wrote classification record"
        );
        Ok(())
    }

    pub fn write_json<T: Serialize>(&self, value: &T, path: &Path) -> Result<(), StoreError> {
        if !self.overwrite && path.exists() {
            return Err(StoreError::OutputExists(path.to_path_buf()));
        }

        let temp_path = temp_path_for(path);
        // A temp file left by a crashed run for this target is stale
        if temp_path.exists() {
            fs::remove_file(&temp_path)?;
        }

        let file = fs::File::create(&temp_path)?;
        let mut out = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut out, value)?;
        out.write_all(b"\n")?;
        let file = out.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;

        fs::rename(&temp_path, path)?;
        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
