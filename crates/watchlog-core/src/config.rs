//! Pipeline configuration, loadable from YAML.
//!
//! ```yaml
//! results_dir: /data/results
//! database: /data/watchlog.db
//! prompt_path: /etc/watchlog/watch.md
//! log_cap_bytes: 65536
//! default_limit: 50
//! ```
//!
//! Every key is optional; missing keys take the defaults below.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::artifact::DirArtifactStore;
use crate::errors::ConfigError;
use crate::model::DEFAULT_LOG_CAP_BYTES;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchlogConfig {
    /// Directory holding `run_<id>.json` artifacts.
    pub results_dir: PathBuf,
    /// SQLite database file.
    pub database: PathBuf,
    /// Prompt handed to the agent each cycle.
    pub prompt_path: PathBuf,
    pub log_cap_bytes: usize,
    /// Row limit for list queries when the caller gives none.
    pub default_limit: usize,
}

impl Default for WatchlogConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            database: PathBuf::from("watchlog.db"),
            prompt_path: PathBuf::from("prompts/watch.md"),
            log_cap_bytes: DEFAULT_LOG_CAP_BYTES,
            default_limit: 50,
        }
    }
}

impl WatchlogConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let cfg: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_cap_bytes == 0 {
            return Err(ConfigError::Invalid("log_cap_bytes must be > 0".into()));
        }
        if self.default_limit == 0 {
            return Err(ConfigError::Invalid("default_limit must be > 0".into()));
        }
        Ok(())
    }

    pub fn artifact_store(&self) -> DirArtifactStore {
        DirArtifactStore::new(&self.results_dir).with_log_cap(self.log_cap_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("watchlog.yaml");
        fs::write(&path, "database: /tmp/w.db\nlog_cap_bytes: 1024\n").unwrap();

        let cfg = WatchlogConfig::load(&path).unwrap();
        assert_eq!(cfg.database, PathBuf::from("/tmp/w.db"));
        assert_eq!(cfg.log_cap_bytes, 1024);
        assert_eq!(cfg.results_dir, PathBuf::from("results"));
        assert_eq!(cfg.default_limit, 50);
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("watchlog.yaml");
        fs::write(&path, "").unwrap();
        assert_eq!(WatchlogConfig::load(&path).unwrap(), WatchlogConfig::default());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = WatchlogConfig::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn unknown_keys_and_zero_caps_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("watchlog.yaml");

        fs::write(&path, "databse: typo.db\n").unwrap();
        assert!(matches!(
            WatchlogConfig::load(&path).unwrap_err(),
            ConfigError::Parse { .. }
        ));

        fs::write(&path, "log_cap_bytes: 0\n").unwrap();
        assert!(matches!(
            WatchlogConfig::load(&path).unwrap_err(),
            ConfigError::Invalid(_)
        ));
    }
}
