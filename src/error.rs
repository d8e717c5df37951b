//! Error types for the NovaMind pipeline
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-friendly messages with suggestions
//! - Exit codes for CLI
//! - A campaign failure wrapper that keeps the partial record

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::CampaignRecord;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // Persistence errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoNotFound = 203,
    Serialization = 204,

    // Validation errors (3xx)
    ValidationFailed = 300,
    PersonaNotFound = 301,

    // Generation errors (4xx)
    GenerationFailed = 400,
    GenerationMalformed = 401,

    // Distribution errors (5xx)
    DistributionFailed = 500,
    DistributionUnauthorized = 501,

    // Campaign errors (6xx)
    CampaignFailed = 600,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10, // Config errors
            200..=299 => 20, // Persistence errors
            300..=399 => 30, // Validation errors
            400..=499 => 40, // Generation errors
            500..=599 => 50, // Distribution errors
            600..=699 => 60, // Campaign errors
            900..=999 => 90, // Internal errors
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    // ─────────────────────────────────────────────────────────────
    // Persistence Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact write error
    #[error("Failed to write artifact: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    // ─────────────────────────────────────────────────────────────
    // Validation Errors
    // ─────────────────────────────────────────────────────────────

    /// Campaign input rejected before any state was created
    #[error("Invalid campaign input: {message}")]
    Validation { message: String },

    /// Unknown persona id
    #[error("Unknown persona: {persona_id}")]
    PersonaNotFound { persona_id: String },

    // ─────────────────────────────────────────────────────────────
    // Generation Errors
    // ─────────────────────────────────────────────────────────────

    /// Text-generation provider unavailable or failed
    #[error("Content generation failed: {message}")]
    Generation { message: String },

    /// Provider answered but the response could not be used
    #[error("Malformed generation response: {message}")]
    GenerationMalformed { message: String },

    // ─────────────────────────────────────────────────────────────
    // Distribution Errors
    // ─────────────────────────────────────────────────────────────

    /// CRM unavailable or misconfigured
    #[error("Distribution failed: {message}")]
    Distribution { message: String },

    /// CRM rejected the credentials
    #[error("CRM rejected credentials (HTTP {status})")]
    DistributionUnauthorized { status: u16 },

    // ─────────────────────────────────────────────────────────────
    // Campaign Errors
    // ─────────────────────────────────────────────────────────────

    /// The run reached the failed state; the partial record is retained
    #[error("Campaign {campaign_id} failed: {source}", campaign_id = .record.campaign_id)]
    CampaignFailed {
        record: Box<CampaignRecord>,
        #[source]
        source: Box<Error>,
    },

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    // ─────────────────────────────────────────────────────────────
    // Error Classification
    // ─────────────────────────────────────────────────────────────

    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                _ => ErrorCode::IoRead,
            },
            Error::Json(_) => ErrorCode::Serialization,
            Error::Toml(_) => ErrorCode::ConfigParseError,

            Error::Validation { .. } => ErrorCode::ValidationFailed,
            Error::PersonaNotFound { .. } => ErrorCode::PersonaNotFound,

            Error::Generation { .. } => ErrorCode::GenerationFailed,
            Error::GenerationMalformed { .. } => ErrorCode::GenerationMalformed,

            Error::Distribution { .. } => ErrorCode::DistributionFailed,
            Error::DistributionUnauthorized { .. } => ErrorCode::DistributionUnauthorized,

            Error::CampaignFailed { .. } => ErrorCode::CampaignFailed,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Generation { .. } | Error::GenerationMalformed { .. }
        )
    }

    /// Whether the error should switch the run to mock distribution
    pub fn is_distribution(&self) -> bool {
        matches!(
            self,
            Error::Distribution { .. } | Error::DistributionUnauthorized { .. }
        )
    }

    /// Whether this is a persistence failure (artifact write or encoding)
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Error::IoWrite { .. } | Error::IoRead { .. } | Error::Io(_) | Error::Json(_)
        )
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    /// The partial record of a failed campaign, if this error carries one
    pub fn campaign_record(&self) -> Option<&CampaignRecord> {
        match self {
            Error::CampaignFailed { record, .. } => Some(record),
            _ => None,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // User-Friendly Messages
    // ─────────────────────────────────────────────────────────────

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'novamind config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'novamind config validate' to see details."
            ),
            Error::ConfigValidation { .. } => Some(
                "Review the configuration file and fix the invalid values."
            ),

            Error::IoWrite { .. } => Some(
                "Check that the data directory exists and is writable (see [campaign].data_dir)."
            ),

            Error::Validation { .. } => Some(
                "Provide a non-empty topic, e.g. novamind \"AI workflow automation\"."
            ),
            Error::PersonaNotFound { .. } => Some(
                "Run 'novamind personas' to list the configured persona ids."
            ),

            Error::Generation { .. } | Error::GenerationMalformed { .. } => Some(
                "Check OPENAI_API_KEY and [openai].base_url. Without a key the offline templates are used."
            ),

            Error::Distribution { .. } | Error::DistributionUnauthorized { .. } => Some(
                "Set a valid HUBSPOT_API_KEY for live mode, or run with --mode mock."
            ),

            Error::CampaignFailed { source, .. } => source.suggestion(),

            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let code = self.code();
        let suggestion = self.suggestion();

        let mut output = format!(
            "\x1b[31mError [{}]\x1b[0m: {}\n",
            code.as_str(),
            self
        );

        if let Some(hint) = suggestion {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        let code = self.code();
        format!("[{}] {}", code.as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a config validation error
    pub fn config_validation(message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a campaign input validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Error::Generation {
            message: message.into(),
        }
    }

    /// Create a distribution error
    pub fn distribution(message: impl Into<String>) -> Self {
        Error::Distribution {
            message: message.into(),
        }
    }

    /// Wrap an error that terminated a campaign, keeping the partial record
    pub fn campaign_failed(record: CampaignRecord, source: Error) -> Self {
        Error::CampaignFailed {
            record: Box::new(record),
            source: Box::new(source),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        assert_eq!(ErrorCode::ConfigNotFound.as_str(), "E100");
        assert_eq!(ErrorCode::ValidationFailed.as_str(), "E300");
        assert_eq!(ErrorCode::InternalError.as_str(), "E900");
    }

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(ErrorCode::ConfigNotFound.exit_code(), 10);
        assert_eq!(ErrorCode::IoWrite.exit_code(), 20);
        assert_eq!(ErrorCode::PersonaNotFound.exit_code(), 30);
        assert_eq!(ErrorCode::GenerationFailed.exit_code(), 40);
        assert_eq!(ErrorCode::DistributionFailed.exit_code(), 50);
        assert_eq!(ErrorCode::CampaignFailed.exit_code(), 60);
        assert_eq!(ErrorCode::InternalError.exit_code(), 90);
    }

    #[test]
    fn test_error_codes() {
        let err = Error::validation("empty topic");
        assert_eq!(err.code(), ErrorCode::ValidationFailed);

        let err = Error::PersonaNotFound { persona_id: "pirates".into() };
        assert_eq!(err.code(), ErrorCode::PersonaNotFound);
        assert!(err.to_string().contains("pirates"));

        let err = Error::DistributionUnauthorized { status: 401 };
        assert_eq!(err.code(), ErrorCode::DistributionUnauthorized);
        assert!(err.is_distribution());
    }

    #[test]
    fn test_error_retryable() {
        assert!(Error::generation("provider down").is_retryable());
        assert!(Error::GenerationMalformed { message: "not json".into() }.is_retryable());
        assert!(!Error::distribution("no key").is_retryable());
        assert!(!Error::validation("empty").is_retryable());
    }

    #[test]
    fn test_persistence_classification() {
        let err = Error::IoWrite {
            path: PathBuf::from("/data/campaign.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.is_persistence());
        assert_eq!(err.code(), ErrorCode::IoWrite);
        assert!(!Error::generation("x").is_persistence());
    }

    #[test]
    fn test_campaign_failed_keeps_record() {
        let record = CampaignRecord::new("AI workflow automation", vec!["founders".into()]);
        let id = record.campaign_id.clone();
        let err = Error::campaign_failed(record, Error::generation("nothing generated"));

        assert_eq!(err.code(), ErrorCode::CampaignFailed);
        assert!(err.to_string().contains(&id));
        assert_eq!(err.campaign_record().map(|r| r.campaign_id.clone()), Some(id));
        // Suggestion comes from the underlying cause
        assert!(err.suggestion().unwrap().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_error_suggestions() {
        let err = Error::PersonaNotFound { persona_id: "x".into() };
        assert!(err.suggestion().unwrap().contains("novamind personas"));

        let err = Error::ConfigNotFound { path: PathBuf::from("/test") };
        assert!(err.suggestion().unwrap().contains("config init"));
    }

    #[test]
    fn test_format_for_terminal() {
        let err = Error::ConfigNotFound { path: PathBuf::from("/test/novamind.toml") };
        let formatted = err.format_for_terminal();

        assert!(formatted.contains("E100"));
        assert!(formatted.contains("\x1b[31m"));
        assert!(formatted.contains("Hint"));
    }

    #[test]
    fn test_format_for_log() {
        let err = Error::validation("topic must not be empty");
        let formatted = err.format_for_log();

        assert!(formatted.contains("[E300]"));
        assert!(!formatted.contains("\x1b["));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        assert_eq!(err.code(), ErrorCode::IoNotFound);
    }
}
