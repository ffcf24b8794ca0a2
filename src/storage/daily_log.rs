use crate::error::LedgerError;
use crate::model::event::EventRecord;
use crate::storage::codec;
use crate::storage::guard::StorageGuard;
use chrono::NaiveDate;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::sync::Arc;

/// Append-only store of one event file per calendar day. Files live under
/// `logs/YYYY/MM/DD.csv`, are created lazily on the first event of the day
/// with a header line, and are never rewritten afterward.
#[derive(Clone)]
pub struct DailyLogStore {
    storage: Arc<StorageGuard>,
}

impl DailyLogStore {
    pub fn new(storage: Arc<StorageGuard>) -> Self {
        Self { storage }
    }

    /// Appends one encoded row to the given day's file, creating missing
    /// directories and the file (with header) as needed, all under one
    /// guard acquisition.
    pub async fn append(&self, date: NaiveDate, record: &EventRecord) -> Result<(), LedgerError> {
        let medium = self.storage.acquire().await?;
        let path = medium.day_log_path(date);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let is_new = !path.exists();
        let mut file = OpenOptions::new().append(true).create(true).open(&path)?;
        if is_new {
            writeln!(file, "{}", codec::LOG_HEADER)?;
        }
        writeln!(file, "{}", codec::encode_row(record))?;
        Ok(())
    }

    /// Guarded read of a whole day file, header line included. A day with
    /// no file yet reads as empty.
    pub async fn read_lines(&self, date: NaiveDate) -> Result<Vec<String>, LedgerError> {
        let medium = self.storage.acquire().await?;
        let path = medium.day_log_path(date);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let lines = BufReader::new(file)
            .lines()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines)
    }
}
