//! CSV-backed roster and request log.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Deserialize;

use super::domain::{RequestRecord, RosterRecord, VolunteerRole};
use super::repository::{RequestStore, RosterSource, StoreError};

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Email ID")]
    email: String,
    #[serde(rename = "Phone Number", default)]
    phone: String,
    #[serde(rename = "Volunteer Category", default)]
    category: String,
    #[serde(rename = "Gender", default)]
    gender: String,
}

impl From<RosterRow> for RosterRecord {
    fn from(row: RosterRow) -> Self {
        RosterRecord {
            email: row.email,
            phone: row.phone,
            name: row.name,
            role: VolunteerRole::from_label(&row.category),
            gender: row.gender,
        }
    }
}

/// Parse a roster export with headers `Name, Email ID, Phone Number, Volunteer Category, Gender`.
pub fn read_roster<R: Read>(reader: R) -> Result<Vec<RosterRecord>, StoreError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in csv_reader.deserialize::<RosterRow>() {
        records.push(row?.into());
    }
    Ok(records)
}

/// Roster read from a CSV file on every [`RosterSource::load_roster`] call.
#[derive(Debug, Clone)]
pub struct CsvRoster {
    path: PathBuf,
}

impl CsvRoster {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RosterSource for CsvRoster {
    fn load_roster(&self) -> Result<Vec<RosterRecord>, StoreError> {
        let file = std::fs::File::open(&self.path)?;
        read_roster(file)
    }
}

/// Request log kept as a headerless CSV file, one row per stored request.
#[derive(Debug)]
pub struct CsvRequestLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvRequestLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RequestStore for CsvRequestLog {
    fn existing_ids(&self) -> Result<HashSet<String>, StoreError> {
        // A log that has never been written is an empty log.
        let file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(err) => return Err(err.into()),
        };

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut ids = HashSet::new();
        for row in csv_reader.records() {
            let row = row?;
            if let Some(id) = row.get(0).map(str::trim).filter(|id| !id.is_empty()) {
                ids.insert(id.to_string());
            }
        }
        Ok(ids)
    }

    fn append(&self, record: &RequestRecord) -> Result<(), StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("request log lock poisoned".to_string()))?;

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        // Serialize the whole row before touching the file so a bad row writes nothing.
        let mut buffer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        buffer.write_record(record.to_row())?;
        let bytes = buffer
            .into_inner()
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&bytes)?;
        file.sync_data()?;
        Ok(())
    }
}
