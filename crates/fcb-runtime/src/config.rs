//! Persisted runtime overrides.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{RuntimeError, RuntimeKind, RuntimeResult};

/// User overrides applied before any detection query runs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub installation_path: Option<PathBuf>,
    pub runtime: Option<RuntimeKind>,
    pub version_override: Option<String>,
}

impl RuntimeConfig {
    /// Reads YAML (or JSON for a `.json` file). A missing file yields the
    /// defaults.
    pub fn load(path: &Path) -> RuntimeResult<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no runtime config, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let parsed = if is_json(path) {
            serde_json::from_str(&text).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<Option<Self>>(&text)
                .map(Option::unwrap_or_default)
                .map_err(|e| e.to_string())
        };
        parsed.map_err(|message| RuntimeError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn save(&self, path: &Path) -> RuntimeResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = if is_json(path) {
            serde_json::to_string_pretty(self).map_err(|e| e.to_string())
        } else {
            serde_yaml::to_string(self).map_err(|e| e.to_string())
        }
        .map_err(|message| RuntimeError::Config {
            path: path.to_path_buf(),
            message,
        })?;
        fs::write(path, text)?;
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json"))
}
