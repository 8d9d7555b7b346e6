use crate::error::{CertifyError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// StorageConfig
// ---------------------------------------------------------------------------

/// When dashboard edits reach durable storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Re-serialize the whole record on every field change.
    Immediate,
    /// Mark dirty and flush on tab navigation, explicit save or close.
    #[default]
    Deferred,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_store_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_dashboard_key")]
    pub dashboard_key: String,
    #[serde(default)]
    pub write_policy: WritePolicy,
}

fn default_store_dir() -> PathBuf {
    PathBuf::from(paths::STORE_DIR)
}

fn default_dashboard_key() -> String {
    crate::dashboard::DEFAULT_STORAGE_KEY.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
            dashboard_key: default_dashboard_key(),
            write_policy: WritePolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// RecordConfig
// ---------------------------------------------------------------------------

/// What to do with patch keys that are not part of the record schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFieldPolicy {
    #[default]
    Reject,
    Ignore,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordConfig {
    #[serde(default)]
    pub unknown_fields: UnknownFieldPolicy,
}

// ---------------------------------------------------------------------------
// ContactConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactConfig {
    /// Simulated network delay before the form reports success.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_delay_ms() -> u64 {
    1500
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub records: RecordConfig,
    #[serde(default)]
    pub contact: ContactConfig,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: ProjectConfig {
                name: project_name.into(),
            },
            storage: StorageConfig::default(),
            records: RecordConfig::default(),
            contact: ContactConfig::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(CertifyError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Load the config, or fall back to defaults when the project is not
    /// initialized. Parse errors still surface.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        match Self::load(root) {
            Err(CertifyError::NotInitialized) => {
                let name = root
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "certify".to_string());
                Ok(Self::new(name))
            }
            other => other,
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn store_dir(&self, root: &Path) -> PathBuf {
        paths::store_dir(root, &self.storage.dir)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if paths::validate_key(&self.storage.dashboard_key).is_err() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "storage.dashboard_key '{}' is not a valid storage key",
                    self.storage.dashboard_key
                ),
            });
        }

        if self.storage.dir.as_os_str().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "storage.dir is empty".to_string(),
            });
        }

        if self.contact.delay_ms == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "contact.delay_ms is 0; submissions complete instantly".to_string(),
            });
        } else if self.contact.delay_ms > 30_000 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "contact.delay_ms={} (>30s is unusual)",
                    self.contact.delay_ms
                ),
            });
        }

        if self.records.unknown_fields == UnknownFieldPolicy::Ignore {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "records.unknown_fields is 'ignore'; misspelled fields are dropped"
                    .to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
