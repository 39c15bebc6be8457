//! Build manifest stored in `<case>/.fcb/manifest.json`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{AppError, AppResult};
use crate::report::{BuildMessage, BuildReport};
use crate::settings::{CaseSettings, SolverTarget};

pub const MANIFEST_DIR: &str = ".fcb";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseManifest {
    pub case_name: String,
    pub solver: SolverTarget,
    pub solver_name: String,
    /// SHA-256 of the serialized settings the case was built from.
    pub settings_hash: String,
    /// RFC 3339 build time.
    pub timestamp: String,
    pub success: bool,
    pub messages: Vec<BuildMessage>,
}

impl CaseManifest {
    pub fn new(settings: &CaseSettings, report: &BuildReport) -> Self {
        Self {
            case_name: settings.case_name.clone(),
            solver: settings.solver,
            solver_name: settings.solver_name.clone(),
            settings_hash: compute_settings_hash(settings),
            timestamp: chrono::Utc::now().to_rfc3339(),
            success: report.success,
            messages: report.messages.clone(),
        }
    }

    /// Whether `settings` are the ones this case was built from.
    pub fn matches(&self, settings: &CaseSettings) -> bool {
        self.settings_hash == compute_settings_hash(settings)
    }
}

pub fn compute_settings_hash(settings: &CaseSettings) -> String {
    let mut hasher = Sha256::new();
    let json = serde_json::to_string(settings).unwrap_or_default();
    hasher.update(json.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn manifest_path(case_dir: &Path) -> PathBuf {
    case_dir.join(MANIFEST_DIR).join(MANIFEST_FILE)
}

pub fn save_manifest(case_dir: &Path, manifest: &CaseManifest) -> AppResult<PathBuf> {
    let path = manifest_path(case_dir);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(&path, json)?;
    tracing::debug!(path = %path.display(), "wrote case manifest");
    Ok(path)
}

pub fn load_manifest(case_dir: &Path) -> AppResult<CaseManifest> {
    let path = manifest_path(case_dir);
    let json = std::fs::read_to_string(&path).map_err(|e| {
        AppError::Manifest(format!("Failed to read {}: {}", path.display(), e))
    })?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_stability() {
        let settings = CaseSettings::new("cavity", "/tmp/work", "icoFoam");
        assert_eq!(
            compute_settings_hash(&settings),
            compute_settings_hash(&settings.clone())
        );
        assert_eq!(compute_settings_hash(&settings).len(), 64);
    }

    #[test]
    fn hash_differs_for_different_settings() {
        let a = CaseSettings::new("cavity", "/tmp/work", "icoFoam");
        let mut b = a.clone();
        b.initial_values.pressure = 1.0;
        assert_ne!(compute_settings_hash(&a), compute_settings_hash(&b));
    }

    #[test]
    fn save_and_load() {
        let dir = std::env::temp_dir().join("fcb_app_manifest");
        let _ = std::fs::remove_dir_all(&dir);
        let settings = CaseSettings::new("cavity", &dir, "icoFoam");
        let mut report = BuildReport::new(&dir);
        report.success = true;
        report.info("done");

        let manifest = CaseManifest::new(&settings, &report);
        let path = save_manifest(&dir, &manifest).unwrap();
        assert_eq!(path, dir.join(".fcb").join("manifest.json"));

        let loaded = load_manifest(&dir).unwrap();
        assert_eq!(loaded, manifest);
        assert!(loaded.matches(&settings));
        assert!(chrono::DateTime::parse_from_rfc3339(&loaded.timestamp).is_ok());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_manifest_is_error() {
        let dir = std::env::temp_dir().join("fcb_app_manifest_missing");
        let _ = std::fs::remove_dir_all(&dir);
        assert!(matches!(load_manifest(&dir), Err(AppError::Manifest(_))));
    }
}
