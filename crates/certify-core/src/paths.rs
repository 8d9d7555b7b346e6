use crate::error::{CertifyError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const CERTIFY_DIR: &str = ".certify";
pub const STORE_DIR: &str = ".certify/store";

pub const CONFIG_FILE: &str = ".certify/config.yaml";
pub const WIZARD_FILE: &str = ".certify/wizard.yaml";
pub const HANDOFF_FILE: &str = ".certify/handoff.json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn certify_dir(root: &Path) -> PathBuf {
    root.join(CERTIFY_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn wizard_path(root: &Path) -> PathBuf {
    root.join(WIZARD_FILE)
}

pub fn handoff_path(root: &Path) -> PathBuf {
    root.join(HANDOFF_FILE)
}

/// Resolve the store directory. Relative directories are anchored at `root`.
pub fn store_dir(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}

// ---------------------------------------------------------------------------
// Storage key validation
// ---------------------------------------------------------------------------

static KEY_RE: OnceLock<Regex> = OnceLock::new();

fn key_re() -> &'static Regex {
    KEY_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.\-]*$").unwrap())
}

/// Storage keys double as file names, so they are restricted to a safe subset.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.len() > 64 || !key_re().is_match(key) || key.contains("..") {
        return Err(CertifyError::InvalidKey(key.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
