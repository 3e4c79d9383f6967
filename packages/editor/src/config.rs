use crate::errors::EditorError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "pagecraft.config.json";

/// What must still hold when an image upload finishes reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UploadPolicy {
    /// Apply if the target node is still in the document
    #[default]
    TargetPresent,
    /// Apply only if the target node is also still selected
    TargetSelected,
}

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Snapshots kept by the history (0 = unlimited)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default)]
    pub upload_policy: UploadPolicy,

    /// Prefix for generated node ids
    #[serde(default = "default_id_seed")]
    pub id_seed: String,

    /// tracing filter used when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_history_limit() -> usize {
    100
}

fn default_id_seed() -> String {
    "node".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl EditorConfig {
    /// Load config from a directory, falling back to defaults if absent
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, EditorError> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: EditorConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(EditorConfig::default())
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            upload_policy: UploadPolicy::default(),
            id_seed: default_id_seed(),
            log_filter: default_log_filter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "historyLimit": 20,
            "uploadPolicy": "targetSelected",
            "idSeed": "el"
        }"#;

        let config: EditorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.history_limit, 20);
        assert_eq!(config.upload_policy, UploadPolicy::TargetSelected);
        assert_eq!(config.id_seed, "el");
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_default_config() {
        let config = EditorConfig::default();
        assert_eq!(config.history_limit, 100);
        assert_eq!(config.upload_policy, UploadPolicy::TargetPresent);
        assert_eq!(config.id_seed, "node");
    }

    #[test]
    fn test_load_missing_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EditorConfig::load(dir.path()).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_load_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "{ nope").unwrap();
        assert!(matches!(
            EditorConfig::load(dir.path()),
            Err(EditorError::Json(_))
        ));
    }
}
