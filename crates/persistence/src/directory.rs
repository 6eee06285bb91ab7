//! File-backed neighborhood directory.
//!
//! A plain JSON array of neighborhood names, read once at startup and
//! handed to the extractor so spoken bairro names can be spotted in
//! free text. The engine's decision logic never consults it. When the
//! file is absent or unreadable the built-in João Pessoa list applies,
//! matching the city the default vocabulary targets.

use std::fs;
use std::path::{Path, PathBuf};

use lead_triage_config::DataConfig;
use lead_triage_core::NeighborhoodDirectory;

const DEFAULT_NEIGHBORHOODS: [&str; 8] = [
    "Aeroclube",
    "Altiplano",
    "Bessa",
    "Cabo Branco",
    "Intermares",
    "Jardim Oceania",
    "Manaíra",
    "Tambaú",
];

pub struct FileNeighborhoodDirectory {
    names: Vec<String>,
}

impl FileNeighborhoodDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            names: load_names(&path),
        }
    }

    pub fn from_data_config(data: &DataConfig) -> Self {
        Self::new(&data.neighborhoods_path)
    }
}

fn load_names(path: &Path) -> Vec<String> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::info!(
                path = %path.display(),
                error = %err,
                "neighborhood file unavailable, using built-in list"
            );
            return builtin();
        }
    };
    let mut names: Vec<String> = match serde_json::from_str(&raw) {
        Ok(names) => names,
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "neighborhood file malformed, using built-in list"
            );
            return builtin();
        }
    };
    names.retain(|name| !name.trim().is_empty());
    names.sort();
    names.dedup();
    if names.is_empty() {
        return builtin();
    }
    tracing::info!(path = %path.display(), count = names.len(), "neighborhood list loaded");
    names
}

fn builtin() -> Vec<String> {
    DEFAULT_NEIGHBORHOODS.iter().map(|s| s.to_string()).collect()
}

impl NeighborhoodDirectory for FileNeighborhoodDirectory {
    fn neighborhoods(&self) -> Vec<String> {
        self.names.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_sorted_distinct_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("neighborhoods.json");
        fs::write(&path, r#"["Tambaú", "Bessa", "Tambaú", "Manaíra"]"#).unwrap();

        let directory = FileNeighborhoodDirectory::new(&path);
        assert_eq!(directory.neighborhoods(), vec!["Bessa", "Manaíra", "Tambaú"]);
    }

    #[test]
    fn missing_file_falls_back_to_the_builtin_list() {
        let dir = tempfile::tempdir().unwrap();
        let directory = FileNeighborhoodDirectory::new(dir.path().join("none.json"));
        let names = directory.neighborhoods();
        assert!(names.contains(&"Manaíra".to_string()));
        assert!(names.contains(&"Cabo Branco".to_string()));
    }

    #[test]
    fn malformed_file_falls_back_to_the_builtin_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("neighborhoods.json");
        fs::write(&path, "not json").unwrap();

        let directory = FileNeighborhoodDirectory::new(&path);
        assert_eq!(directory.neighborhoods().len(), DEFAULT_NEIGHBORHOODS.len());
    }
}
