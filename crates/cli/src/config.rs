//! Configuration file loading.

use std::path::Path;

use pipeline::{TriageConfig, TriageError};

/// Reads and parses the YAML configuration at `path`.
pub async fn load_config(path: &Path) -> Result<TriageConfig, TriageError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| TriageError::Configuration {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
    TriageConfig::from_yaml_str(&text)
}
