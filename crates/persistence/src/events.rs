//! Append-only JSONL audit logs, one file per event stream.
//!
//! Records are written as single compact JSON lines so the files can be
//! tailed and consumed by dashboards without any framing logic.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use lead_triage_config::DataConfig;
use lead_triage_core::{EventSink, EventStream, StoreError};
use parking_lot::Mutex;

use crate::error::PersistenceError;

pub struct JsonlEventLog {
    leads: PathBuf,
    hot_leads: PathBuf,
    routing_decisions: PathBuf,
    followups: PathBuf,
    lock: Mutex<()>,
}

impl JsonlEventLog {
    pub fn new(
        leads: impl Into<PathBuf>,
        hot_leads: impl Into<PathBuf>,
        routing_decisions: impl Into<PathBuf>,
        followups: impl Into<PathBuf>,
    ) -> Self {
        Self {
            leads: leads.into(),
            hot_leads: hot_leads.into(),
            routing_decisions: routing_decisions.into(),
            followups: followups.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn from_data_config(data: &DataConfig) -> Self {
        Self::new(
            &data.leads_log_path,
            &data.hot_events_path,
            &data.routing_log_path,
            &data.followups_path,
        )
    }

    fn path_for(&self, stream: EventStream) -> &Path {
        match stream {
            EventStream::Leads => &self.leads,
            EventStream::HotLeads => &self.hot_leads,
            EventStream::RoutingDecisions => &self.routing_decisions,
            EventStream::Followups => &self.followups,
        }
    }

    fn write(
        &self,
        stream: EventStream,
        record: &serde_json::Value,
    ) -> Result<(), PersistenceError> {
        let path = self.path_for(stream);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PersistenceError::io(parent, e))?;
        }
        let line =
            serde_json::to_string(record).map_err(|e| PersistenceError::json(path, e))?;

        let _guard = self.lock.lock();
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| PersistenceError::io(path, e))?;
        writeln!(file, "{line}").map_err(|e| PersistenceError::io(path, e))?;
        Ok(())
    }
}

impl EventSink for JsonlEventLog {
    fn append(&self, stream: EventStream, record: &serde_json::Value) -> Result<(), StoreError> {
        self.write(stream, record).map_err(Into::into)
    }
}
