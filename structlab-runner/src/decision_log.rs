//! Decision log: JSONL append-only persistence, one file per UTC day.
//!
//! Each line is an independent JSON object: either a full `SignalReport` or
//! an `{timestamp, error}` entry for an evaluation that failed. The format is
//! resilient to partial writes and easy to stream.

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::runner::SignalReport;

/// A failed evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub timestamp: DateTime<Utc>,
    pub error: String,
}

/// One line of the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogEntry {
    Decision(Box<SignalReport>),
    Error(ErrorEntry),
}

impl LogEntry {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            LogEntry::Decision(report) => report.evaluated_at,
            LogEntry::Error(entry) => entry.timestamp,
        }
    }
}

/// Daily JSONL decision log under one directory.
#[derive(Debug, Clone)]
pub struct DecisionLog {
    dir: PathBuf,
}

impl DecisionLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `decisions_<YYYY-MM-DD>.jsonl` for `day`.
    pub fn path_for(&self, day: NaiveDate) -> PathBuf {
        self.dir.join(format!("decisions_{}.jsonl", day.format("%Y-%m-%d")))
    }

    /// Append a report to the file of its evaluation day.
    pub fn append(&self, report: &SignalReport) -> io::Result<PathBuf> {
        self.append_entry(&LogEntry::Decision(Box::new(report.clone())))
    }

    /// Append an error entry instead of a report.
    pub fn append_error(&self, timestamp: DateTime<Utc>, error: impl Into<String>) -> io::Result<PathBuf> {
        self.append_entry(&LogEntry::Error(ErrorEntry { timestamp, error: error.into() }))
    }

    fn append_entry(&self, entry: &LogEntry) -> io::Result<PathBuf> {
        let json = serde_json::to_string(entry).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(entry.timestamp().date_naive());
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

        writeln!(file, "{json}")?;
        file.flush()?;

        Ok(path)
    }

    /// Read back every entry for `day`, skipping malformed lines.
    pub fn read_day(&self, day: NaiveDate) -> io::Result<Vec<LogEntry>> {
        let path = self.path_for(day);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let reader = io::BufReader::new(fs::File::open(&path)?);
        let mut entries = Vec::new();

        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<LogEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(path = %path.display(), line = lineno + 1, error = %e, "skipping malformed log line"),
            }
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_name_is_per_day() {
        let log = DecisionLog::new("/var/log/structlab");
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(log.path_for(day), PathBuf::from("/var/log/structlab/decisions_2024-03-01.jsonl"));
    }

    #[test]
    fn error_entries_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let log = DecisionLog::new(dir.path().join("nested"));
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 0).unwrap();

        let path = log.append_error(at, "network unreachable: timed out").unwrap();
        assert!(path.ends_with("decisions_2024-03-01.jsonl"));

        let entries = log.read_day(at.date_naive()).unwrap();
        assert_eq!(
            entries,
            vec![LogEntry::Error(ErrorEntry { timestamp: at, error: "network unreachable: timed out".into() })]
        );
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let log = DecisionLog::new(dir.path());
        let at = Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap();
        log.append_error(at, "first").unwrap();

        let path = log.path_for(at.date_naive());
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{not json").unwrap();
        writeln!(file).unwrap();
        drop(file);

        log.append_error(at, "second").unwrap();
        let entries = log.read_day(at.date_naive()).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn missing_day_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = DecisionLog::new(dir.path());
        let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert!(log.read_day(day).unwrap().is_empty());
    }
}
