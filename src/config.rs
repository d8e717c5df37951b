//! Configuration system for the NovaMind pipeline
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (NOVAMIND_* prefix, plus OPENAI_API_KEY / HUBSPOT_API_KEY)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::persona::Persona;
use crate::types::DistributionMode;

/// Main pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Campaign defaults and artifact location
    pub campaign: CampaignSettings,

    /// OpenAI-compatible text generation settings
    pub openai: OpenAiSettings,

    /// HubSpot CRM settings (live distribution)
    pub hubspot: HubSpotSettings,

    /// Mock engagement policy overrides
    pub mock: MockSettings,

    /// Logging configuration
    pub logging: LoggingSettings,

    /// Persona catalog (bundled catalog when empty)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub personas: Vec<Persona>,
}

/// Campaign defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignSettings {
    /// Distribution mode used when --mode is not given
    pub default_mode: DistributionMode,

    /// Root directory for campaign artifacts
    pub data_dir: String,
}

/// OpenAI-compatible API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    /// API base URL (e.g., "https://api.openai.com/v1", "http://localhost:11434/v1")
    pub base_url: String,

    /// API key (empty = offline templates)
    pub api_key: String,

    /// Model identifier
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// HubSpot marketing API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubSpotSettings {
    /// API base URL
    pub base_url: String,

    /// Private app access token
    pub api_key: String,

    /// Portal / account id, informational
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Engagement profile of one persona segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentProfile {
    /// Contacts in the segment
    pub segment_size: u64,

    /// Fraction of delivered contacts that open
    pub open_fraction: f64,

    /// Fraction of openers that click
    pub click_fraction: f64,
}

/// Mock engagement policy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MockSettings {
    /// Per-persona profile overrides, keyed by persona id
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub profiles: BTreeMap<String, SegmentProfile>,

    /// Click multiplier for blog content
    pub blog_kind_factor: f64,

    /// Click multiplier for newsletters
    pub newsletter_kind_factor: f64,

    /// Word count at which the length bonus saturates
    pub length_cap_words: u64,

    /// Maximum relative click bonus for long content
    pub length_bonus: f64,

    /// Fraction of delivered contacts that unsubscribe
    pub unsubscribe_fraction: f64,

    /// Fraction of deliveries that bounce
    pub bounce_fraction: f64,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

// Default implementations

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            campaign: CampaignSettings::default(),
            openai: OpenAiSettings::default(),
            hubspot: HubSpotSettings::default(),
            mock: MockSettings::default(),
            logging: LoggingSettings::default(),
            personas: Vec::new(),
        }
    }
}

impl Default for CampaignSettings {
    fn default() -> Self {
        Self {
            default_mode: DistributionMode::Mock,
            data_dir: "~/.novamind/data".to_string(),
        }
    }
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for HubSpotSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.hubapi.com".to_string(),
            api_key: String::new(),
            account_id: None,
            timeout_secs: 30,
        }
    }
}

impl Default for MockSettings {
    fn default() -> Self {
        Self {
            profiles: BTreeMap::new(),
            blog_kind_factor: 0.9,
            newsletter_kind_factor: 1.0,
            length_cap_words: 600,
            length_bonus: 0.25,
            unsubscribe_fraction: 0.005,
            bounce_fraction: 0.02,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_files: 5,
            json_format: false,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load from config file if it exists
        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            config = Self::from_file(&path)?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        // 2. Apply environment variable overrides
        config.apply_env_overrides()?;

        // 3. Expand paths
        config.expand_paths();

        // 4. Validate
        config.validate()?;

        Ok(config)
    }

    /// Parse a configuration file without overrides or validation
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::IoRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse {
            message: format!("{}: {}", path.display(), e),
            source: Some(e),
        })
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        // If explicit path provided, use it (error if not found)
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(Error::ConfigNotFound { path });
        }

        let search_paths = [
            // Current directory
            PathBuf::from("novamind.toml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("novamind").join("config.toml"))
                .unwrap_or_default(),
            // Home directory
            dirs::home_dir()
                .map(|p| p.join(".novamind").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &search_paths {
            if !path.as_os_str().is_empty() && path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        // Campaign settings
        if let Ok(val) = std::env::var("NOVAMIND_DEFAULT_MODE") {
            self.campaign.default_mode = val
                .parse()
                .map_err(|e: String| Error::config_field_invalid("NOVAMIND_DEFAULT_MODE", e))?;
        }
        if let Ok(val) = std::env::var("NOVAMIND_DATA_DIR") {
            self.campaign.data_dir = val;
        }

        // OpenAI settings (the vendor variable first so the prefixed one wins)
        if let Ok(val) = std::env::var("OPENAI_API_KEY") {
            self.openai.api_key = val;
        }
        if let Ok(val) = std::env::var("NOVAMIND_OPENAI_API_KEY") {
            self.openai.api_key = val;
        }
        if let Ok(val) = std::env::var("NOVAMIND_OPENAI_BASE_URL") {
            self.openai.base_url = val;
        }
        if let Ok(val) = std::env::var("NOVAMIND_OPENAI_MODEL") {
            self.openai.model = val;
        }
        if let Ok(val) = std::env::var("NOVAMIND_OPENAI_TIMEOUT_SECS") {
            if let Ok(n) = val.parse() {
                self.openai.timeout_secs = n;
            }
        }

        // HubSpot settings
        if let Ok(val) = std::env::var("HUBSPOT_API_KEY") {
            self.hubspot.api_key = val;
        }
        if let Ok(val) = std::env::var("NOVAMIND_HUBSPOT_API_KEY") {
            self.hubspot.api_key = val;
        }
        if let Ok(val) = std::env::var("NOVAMIND_HUBSPOT_BASE_URL") {
            self.hubspot.base_url = val;
        }

        // Logging settings
        if let Ok(val) = std::env::var("NOVAMIND_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("NOVAMIND_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("NOVAMIND_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }

        Ok(())
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        self.campaign.data_dir = expand_path(&self.campaign.data_dir);

        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        if self.campaign.data_dir.trim().is_empty() {
            return Err(Error::config_field_invalid(
                "campaign.data_dir",
                "data_dir cannot be empty",
            ));
        }

        if self.openai.base_url.is_empty() {
            return Err(Error::config_field_invalid("openai.base_url", "base_url cannot be empty"));
        }
        if self.openai.timeout_secs == 0 {
            return Err(Error::config_field_invalid("openai.timeout_secs", "timeout must be positive"));
        }

        // Persona ids
        let mut seen = HashSet::new();
        for persona in &self.personas {
            if persona.id.trim().is_empty() {
                return Err(Error::config_field_invalid("personas.id", "persona id cannot be empty"));
            }
            if !seen.insert(persona.id.as_str()) {
                return Err(Error::config_field_invalid(
                    "personas.id",
                    format!("duplicate persona id '{}'", persona.id),
                ));
            }
        }

        // Mock policy fractions
        check_fraction("mock.unsubscribe_fraction", self.mock.unsubscribe_fraction)?;
        check_fraction("mock.bounce_fraction", self.mock.bounce_fraction)?;
        for (id, profile) in &self.mock.profiles {
            check_fraction(&format!("mock.profiles.{}.open_fraction", id), profile.open_fraction)?;
            check_fraction(&format!("mock.profiles.{}.click_fraction", id), profile.click_fraction)?;
        }
        for (field, value) in [
            ("mock.blog_kind_factor", self.mock.blog_kind_factor),
            ("mock.newsletter_kind_factor", self.mock.newsletter_kind_factor),
            ("mock.length_bonus", self.mock.length_bonus),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::config_field_invalid(field, "must be a non-negative number"));
            }
        }
        if self.mock.length_cap_words == 0 {
            return Err(Error::config_field_invalid("mock.length_cap_words", "must be positive"));
        }

        Ok(())
    }

    /// Get the data directory as a PathBuf
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.campaign.data_dir)
    }
}

fn check_fraction(field: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::config_field_invalid(
            field,
            format!("{} is outside [0, 1]", value),
        ))
    }
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Default location for `config init`
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".novamind")
        .join("config.toml")
}

/// Initialize a new configuration file, returning its path
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(default_config_path);

    if config_path.exists() && !force {
        return Err(Error::config_validation(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    fs::write(&config_path, generate_default_config()).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    info!(path = %config_path.display(), "Configuration file created");
    Ok(config_path)
}

/// Generate default configuration content with comments
fn generate_default_config() -> String {
    r#"# NovaMind Pipeline Configuration

[campaign]
# Distribution mode when --mode is not given: "mock" or "live"
default_mode = "mock"

# Root directory for campaign artifacts
data_dir = "~/.novamind/data"

[openai]
# Any OpenAI-compatible endpoint (OpenAI, Ollama, vLLM, LM Studio, ...)
base_url = "https://api.openai.com/v1"

# API key; leave empty to use the offline templates (OPENAI_API_KEY also works)
api_key = ""

# Model identifier
model = "gpt-4o"

# Request timeout in seconds
timeout_secs = 60

[hubspot]
base_url = "https://api.hubapi.com"

# Private app token; live mode falls back to mock without it (HUBSPOT_API_KEY also works)
api_key = ""

# account_id = "12345678"

timeout_secs = 30

[mock]
# Click multipliers per content kind
blog_kind_factor = 0.9
newsletter_kind_factor = 1.0

# Long content earns up to length_bonus extra clicks, saturating at length_cap_words
length_cap_words = 600
length_bonus = 0.25

unsubscribe_fraction = 0.005
bounce_fraction = 0.02

# Per-persona overrides
# [mock.profiles.founders]
# segment_size = 90
# open_fraction = 0.30
# click_fraction = 0.18

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out to disable file logging)
# file = "~/.novamind/logs/novamind.log"

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false

# Personas; the bundled founders / creatives / operations catalog is used when none are listed
# [[personas]]
# id = "founders"
# name = "Founders / Decision-Makers"
# focus = ["ROI", "growth", "efficiency", "competitive advantage"]
# tone = "executive, data-driven, strategic"
"#
    .to_string()
}
