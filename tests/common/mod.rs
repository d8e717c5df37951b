//! Shared test environment for CLI tests
//!
//! Every environment gets its own temporary home, data directory and config
//! file, and strips credentials inherited from the developer's shell.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Variables that would leak a real setup into the tests
const SCRUBBED_ENV: &[&str] = &[
    "OPENAI_API_KEY",
    "HUBSPOT_API_KEY",
    "NOVAMIND_CONFIG",
    "NOVAMIND_DEFAULT_MODE",
    "NOVAMIND_DATA_DIR",
    "NOVAMIND_OPENAI_API_KEY",
    "NOVAMIND_OPENAI_BASE_URL",
    "NOVAMIND_OPENAI_MODEL",
    "NOVAMIND_OPENAI_TIMEOUT_SECS",
    "NOVAMIND_HUBSPOT_API_KEY",
    "NOVAMIND_HUBSPOT_BASE_URL",
    "NOVAMIND_LOG_LEVEL",
    "NOVAMIND_LOG_FILE",
    "NOVAMIND_LOG_JSON",
    "RUST_LOG",
];

/// Path to a file under tests/fixtures
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Isolated home, config and data directory
pub struct TestEnvironment {
    pub root: TempDir,
    pub config_path: PathBuf,
    pub data_dir: PathBuf,
}

impl TestEnvironment {
    /// Environment with a minimal mock-mode configuration
    pub fn new() -> Self {
        Self::with_config("")
    }

    /// Environment whose config file holds `[campaign]` plus `extra`
    pub fn with_config(extra: &str) -> Self {
        let root = TempDir::new().expect("Failed to create temp directory");
        let data_dir = root.path().join("data");
        let config_path = root.path().join("novamind.toml");

        let config = format!(
            "[campaign]\ndefault_mode = \"mock\"\ndata_dir = \"{}\"\n\n{}\n",
            data_dir.display(),
            extra
        );
        fs::write(&config_path, config).expect("Failed to write config");

        Self {
            root,
            config_path,
            data_dir,
        }
    }

    /// Overwrite the config file verbatim
    pub fn write_config(&self, content: &str) {
        fs::write(&self.config_path, content).expect("Failed to write config");
    }

    pub fn config(&self) -> &str {
        self.config_path.to_str().expect("Non UTF-8 temp path")
    }

    /// The binary, pointed at this environment
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("novamind").expect("Binary not built");
        for var in SCRUBBED_ENV {
            cmd.env_remove(var);
        }
        cmd.env("HOME", self.root.path())
            .env("XDG_CONFIG_HOME", self.root.path().join(".config"))
            .env("NOVAMIND_CONFIG", self.config())
            .current_dir(self.root.path());
        cmd
    }

    /// Stored campaign directories, sorted by id
    pub fn campaign_dirs(&self) -> Vec<PathBuf> {
        let dir = self.data_dir.join("campaigns");
        if !dir.exists() {
            return Vec::new();
        }
        let mut dirs: Vec<PathBuf> = fs::read_dir(dir)
            .expect("Failed to read campaigns dir")
            .map(|e| e.expect("Bad dir entry").path())
            .filter(|p| p.is_dir())
            .collect();
        dirs.sort();
        dirs
    }

    /// The only stored campaign directory
    pub fn single_campaign(&self) -> PathBuf {
        let dirs = self.campaign_dirs();
        assert_eq!(dirs.len(), 1, "expected exactly one campaign, found {:?}", dirs);
        dirs.into_iter().next().unwrap()
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a JSON artifact
pub fn read_json(path: &Path) -> serde_json::Value {
    let raw = fs::read_to_string(path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e));
    serde_json::from_str(&raw).unwrap_or_else(|e| panic!("{}: {}", path.display(), e))
}

/// Number of files in a campaign subdirectory
pub fn count_files(dir: &Path) -> usize {
    if !dir.exists() {
        return 0;
    }
    fs::read_dir(dir).expect("Failed to read dir").count()
}
