//! Manager configuration.
//!
//! Persisted as camelCase JSON. A missing or unreadable file falls back to
//! defaults so a broken config never blocks the host from starting.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_meta::APP_CONFIG_DIR_NAME;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManagerConfig {
    /// Root of every file this crate writes (snapshots, payloads, icons).
    pub data_dir: PathBuf,
    /// Host executable used to run the export worker.
    pub host_binary: PathBuf,
    /// Script the worker runs against the library file.
    pub export_script: PathBuf,
    /// Extension of per-uuid payload files, without the dot.
    pub payload_extension: String,
    pub manifest_timeout_secs: u64,
    pub parse_timeout_secs: u64,
    /// Minimum delay between UI refresh signals while streaming an import.
    pub refresh_interval_ms: u64,
    /// Ask the worker to skip the host's builtin brushes.
    pub exclude_builtin: bool,
    pub compress_payloads: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            host_binary: PathBuf::from("blender"),
            export_script: PathBuf::from("scripts").join("export_brushes.py"),
            payload_extension: "blend".to_string(),
            manifest_timeout_secs: 60,
            parse_timeout_secs: 60,
            refresh_interval_ms: 200,
            exclude_builtin: true,
            compress_payloads: true,
        }
    }
}

impl ManagerConfig {
    /// Defaults rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!("Invalid manager config {:?}: {}", path, err);
                    Self::default()
                }
            },
            Err(err) => {
                tracing::warn!("Failed to read manager config {:?}: {}", path, err);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    pub fn manifest_timeout(&self) -> Duration {
        Duration::from_secs(self.manifest_timeout_secs)
    }

    pub fn parse_timeout(&self) -> Duration {
        Duration::from_secs(self.parse_timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_CONFIG_DIR_NAME)
        .join("brush_manager")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ManagerConfig::load(&dir.path().join("nope.json"));
        assert_eq!(config.manifest_timeout(), Duration::from_secs(60));
        assert_eq!(config.refresh_interval(), Duration::from_millis(200));
        assert_eq!(config.payload_extension, "blend");
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "manifestTimeoutSecs": 5, "excludeBuiltin": false }"#).unwrap();

        let config = ManagerConfig::load(&path);
        assert_eq!(config.manifest_timeout_secs, 5);
        assert!(!config.exclude_builtin);
        assert_eq!(config.parse_timeout_secs, 60);
    }

    #[test]
    fn invalid_json_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(ManagerConfig::load(&path), ManagerConfig::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = ManagerConfig::with_data_dir(dir.path());
        config.refresh_interval_ms = 50;
        config.save(&path).unwrap();
        assert_eq!(ManagerConfig::load(&path), config);
    }
}
