//! File-backed agent roster.
//!
//! The roster is a plain JSON array of agent records, maintained by
//! operations staff. When the configured file is absent the seed roster
//! shipped with the repo is used instead, so a fresh checkout routes
//! out of the box.

use std::fs;
use std::path::{Path, PathBuf};

use lead_triage_config::DataConfig;
use lead_triage_core::{Agent, RosterStore, StoreError};

use crate::error::PersistenceError;

pub struct FileRosterStore {
    path: PathBuf,
    seed_path: Option<PathBuf>,
}

impl FileRosterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            seed_path: None,
        }
    }

    pub fn with_seed(mut self, seed_path: impl Into<PathBuf>) -> Self {
        self.seed_path = Some(seed_path.into());
        self
    }

    pub fn from_data_config(data: &DataConfig) -> Self {
        Self::new(&data.roster_path).with_seed(&data.roster_example_path)
    }

    fn read(&self) -> Result<Vec<Agent>, PersistenceError> {
        let path = self.pick_path()?;
        let raw = fs::read_to_string(path).map_err(|e| PersistenceError::io(path, e))?;
        let agents: Vec<Agent> =
            serde_json::from_str(&raw).map_err(|e| PersistenceError::json(path, e))?;
        tracing::info!(path = %path.display(), count = agents.len(), "roster loaded");
        Ok(agents)
    }

    fn pick_path(&self) -> Result<&Path, PersistenceError> {
        if self.path.exists() {
            return Ok(&self.path);
        }
        if let Some(seed) = &self.seed_path {
            if seed.exists() {
                tracing::warn!(
                    missing = %self.path.display(),
                    seed = %seed.display(),
                    "roster file missing, using seed roster"
                );
                return Ok(seed);
            }
        }
        Err(PersistenceError::NotFound(format!(
            "roster file {}",
            self.path.display()
        )))
    }
}

impl RosterStore for FileRosterStore {
    fn load(&self) -> Result<Vec<Agent>, StoreError> {
        self.read().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_roster(path: &Path, body: &str) {
        let mut file = fs::File::create(path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
    }

    const ROSTER: &str = r#"[
        {
            "id": "a1",
            "name": "Ana Costa",
            "operations": ["buy"],
            "neighborhoods": ["Manaíra"],
            "tier": "senior"
        },
        {
            "id": "a2",
            "name": "Bruno Lima",
            "operations": ["buy", "rent"],
            "neighborhoods": ["*"],
            "specialties": ["generalista"]
        }
    ]"#;

    #[test]
    fn loads_agents_from_the_primary_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agents.json");
        write_roster(&path, ROSTER);

        let store = FileRosterStore::new(&path);
        let agents = store.load().unwrap();
        assert_eq!(agents.len(), 2);
        assert_eq!(agents[0].id, "a1");
        assert!(agents[1].is_generalist());
        // Omitted fields take their documented defaults.
        assert!(agents[0].active);
        assert_eq!(agents[0].daily_capacity, 20);
    }

    #[test]
    fn falls_back_to_the_seed_roster() {
        let dir = tempfile::tempdir().unwrap();
        let seed = dir.path().join("agents.example.json");
        write_roster(&seed, ROSTER);

        let store =
            FileRosterStore::new(dir.path().join("agents.json")).with_seed(&seed);
        let agents = store.load().unwrap();
        assert_eq!(agents.len(), 2);
    }

    #[test]
    fn missing_roster_is_an_error_not_an_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRosterStore::new(dir.path().join("agents.json"))
            .with_seed(dir.path().join("agents.example.json"));
        let err = store.load().unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn malformed_roster_surfaces_a_serde_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agents.json");
        write_roster(&path, "{ not json");

        let err = FileRosterStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Serde(_)));
        assert!(err.to_string().contains("agents.json"));
    }
}
