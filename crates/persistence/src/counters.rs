//! Per-agent daily assignment counters.
//!
//! One JSON file holds every agent's `assigned_today` plus the date the
//! counters were last reset. Crossing midnight zeroes the counts while
//! keeping each agent's last assignment timestamp. Writes go through a
//! temp file and an atomic rename so a crash mid-write never leaves a
//! truncated counters file behind.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use lead_triage_config::DataConfig;
use lead_triage_core::{AssignmentRecord, CounterStore, StoreError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CountersFile {
    #[serde(default)]
    last_reset_date: Option<NaiveDate>,
    #[serde(default)]
    agents: BTreeMap<String, AssignmentRecord>,
}

pub struct FileCounterStore {
    path: PathBuf,
    // Serializes read-modify-write cycles inside the process; the rename
    // keeps concurrent readers consistent.
    lock: Mutex<()>,
}

impl FileCounterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn from_data_config(data: &DataConfig) -> Self {
        Self::new(&data.counters_path)
    }

    /// Loads the counters file, applying the daily reset in memory when
    /// the stored date is not `today`. Missing file means empty counters.
    fn load(&self, today: NaiveDate) -> Result<CountersFile, PersistenceError> {
        if !self.path.exists() {
            return Ok(CountersFile::default());
        }
        let raw = fs::read_to_string(&self.path)
            .map_err(|e| PersistenceError::io(&self.path, e))?;
        let mut file: CountersFile =
            serde_json::from_str(&raw).map_err(|e| PersistenceError::json(&self.path, e))?;

        if file.last_reset_date != Some(today) {
            tracing::info!(
                last = ?file.last_reset_date,
                today = %today,
                "daily counter reset"
            );
            for record in file.agents.values_mut() {
                record.assigned_today = 0;
            }
            file.last_reset_date = Some(today);
        }
        Ok(file)
    }

    fn save(&self, file: &CountersFile) -> Result<(), PersistenceError> {
        let parent = self.path.parent().filter(|p| !p.as_os_str().is_empty());
        let dir = parent.unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|e| PersistenceError::io(dir, e))?;

        let mut tmp =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| PersistenceError::io(dir, e))?;
        let body = serde_json::to_string_pretty(file)
            .map_err(|e| PersistenceError::json(&self.path, e))?;
        tmp.write_all(body.as_bytes())
            .map_err(|e| PersistenceError::io(&self.path, e))?;
        tmp.persist(&self.path)
            .map_err(|e| PersistenceError::io(&self.path, e.error))?;
        Ok(())
    }
}

impl CounterStore for FileCounterStore {
    fn snapshot(&self) -> Result<BTreeMap<String, AssignmentRecord>, StoreError> {
        let _guard = self.lock.lock();
        let file = self.load(Utc::now().date_naive())?;
        Ok(file.agents)
    }

    fn record_assignment(&self, agent_id: &str) -> Result<AssignmentRecord, StoreError> {
        let _guard = self.lock.lock();
        let today = Utc::now().date_naive();
        let mut file = self.load(today)?;
        file.last_reset_date = Some(today);

        let record = file.agents.entry(agent_id.to_string()).or_default();
        record.assigned_today += 1;
        record.last_assigned_at = Some(Utc::now());
        let updated = record.clone();

        self.save(&file)?;
        tracing::debug!(
            agent_id,
            assigned_today = updated.assigned_today,
            "assignment recorded"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_file_means_empty_counters() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCounterStore::new(dir.path().join("stats.json"));
        assert!(store.snapshot().unwrap().is_empty());
    }

    #[test]
    fn assignments_accumulate_and_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let store = FileCounterStore::new(&path);

        store.record_assignment("a1").unwrap();
        let record = store.record_assignment("a1").unwrap();
        assert_eq!(record.assigned_today, 2);
        assert!(record.last_assigned_at.is_some());

        // A fresh store over the same file sees the same counters.
        let reopened = FileCounterStore::new(&path);
        let snapshot = reopened.snapshot().unwrap();
        assert_eq!(snapshot["a1"].assigned_today, 2);
    }

    #[test]
    fn stale_date_resets_counts_but_keeps_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let body = json!({
            "last_reset_date": "2024-01-15",
            "agents": {
                "a1": {
                    "assigned_today": 7,
                    "last_assigned_at": "2024-01-15T18:30:00Z"
                }
            }
        });
        fs::write(&path, serde_json::to_string(&body).unwrap()).unwrap();

        let store = FileCounterStore::new(&path);
        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot["a1"].assigned_today, 0);
        assert!(snapshot["a1"].last_assigned_at.is_some());

        // The first assignment of the new day starts from zero.
        let record = store.record_assignment("a1").unwrap();
        assert_eq!(record.assigned_today, 1);
    }

    #[test]
    fn counter_writes_create_the_data_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("stats.json");
        let store = FileCounterStore::new(&path);
        store.record_assignment("a1").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn malformed_counters_surface_a_serde_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        fs::write(&path, "{ nope").unwrap();
        let err = FileCounterStore::new(&path).snapshot().unwrap_err();
        assert!(matches!(err, StoreError::Serde(_)));
    }
}
