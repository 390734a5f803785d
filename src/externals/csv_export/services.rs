use std::{
    fs::OpenOptions,
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;

use crate::models::sensor_data::{SampleRecord, COLUMNS};

#[derive(Error, Debug)]
pub enum CsvExportError {
    #[error("Failed to open export file: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to write csv row: {0}")]
    Csv(#[from] csv::Error),
}

/// Appends one row per cycle to a local CSV file. The header is written
/// only when the file is new or empty.
pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn export(&self, record: &SampleRecord) -> Result<(), CsvExportError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let needs_header = file.metadata()?.len() == 0;

        let mut writer = csv::Writer::from_writer(file);
        if needs_header {
            writer.write_record(COLUMNS)?;
        }
        writer.write_record(record.to_row())?;
        writer.flush()?;

        debug!("Row appended to {}", self.path.display());
        Ok(())
    }
}
