//! Error types for `kickoff`
//!
//! Configuration errors, match engine misuse errors, and the top-level
//! error that the CLI maps to process exit codes.

use std::path::PathBuf;
use thiserror::Error;

use crate::engine::decision::EventId;
use crate::tactics::{EventKind, TacticalResponse};

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `kickoff` CLI operations.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Match engine error (operation rejected by the engine)
    pub const MATCH_ERROR: i32 = 5;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `kickoff` operations.
#[derive(Debug, Error)]
pub enum KickoffError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Match engine error
    #[error(transparent)]
    Match(#[from] MatchError),

    /// Invalid command-line usage
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl KickoffError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) => ExitCode::CONFIG_ERROR,
            Self::Match(_) => ExitCode::MATCH_ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}: {}", summarize(errors))]
    ValidationError {
        /// Path to the configuration file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// Environment variable referenced in configuration is not set
    #[error("environment variable '{var}' not set (referenced at {location})")]
    EnvVarNotSet {
        /// Name of the environment variable
        var: String,
        /// Location in the configuration where it was referenced
        location: String,
    },
}

fn summarize(errors: &[ValidationIssue]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "clock.first_half")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - validation failure that prevents configuration from being used
    Error,
    /// Warning - potential issue that does not prevent configuration loading
    Warning,
}

// ============================================================================
// Match Engine Errors
// ============================================================================

/// Operations the match engine refused.
///
/// None of these are fatal: the engine logs them and leaves its state
/// unchanged. They are returned so callers can react if they care.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// `start_match` while a match is in progress
    #[error("match already in progress")]
    AlreadyRunning,

    /// Operation needs a running match
    #[error("no match in progress")]
    NotRunning,

    /// Response submitted with no decision pending
    #[error("no decision pending")]
    NoPendingDecision,

    /// New event requested while another decision is open
    #[error("decision {pending} is still pending")]
    DecisionPending {
        /// The decision that is still open
        pending: EventId,
    },

    /// Response is not one of the current event's candidates
    #[error("{response} is not a valid response to {kind} (decision {event})")]
    InvalidResponse {
        /// The rejected response
        response: TacticalResponse,
        /// Category of the pending event
        kind: EventKind,
        /// The pending event
        event: EventId,
    },

    /// Text did not name a known tactical response
    #[error("unknown tactical response '{input}'{}", suggestion_hint(suggestion.as_deref()))]
    UnknownResponse {
        /// What the user typed
        input: String,
        /// Closest known response, if any is close enough
        suggestion: Option<String>,
    },

    /// Text did not name a known event category
    #[error("unknown event '{input}'{}", suggestion_hint(suggestion.as_deref()))]
    UnknownEvent {
        /// What the user typed
        input: String,
        /// Closest known event, if any is close enough
        suggestion: Option<String>,
    },
}

fn suggestion_hint(suggestion: Option<&str>) -> String {
    suggestion.map_or_else(String::new, |s| format!(" (did you mean '{s}'?)"))
}

impl MatchError {
    /// Short, stable label used for metrics and structured events.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::AlreadyRunning => "already_running",
            Self::NotRunning => "not_running",
            Self::NoPendingDecision => "no_pending_decision",
            Self::DecisionPending { .. } => "decision_pending",
            Self::InvalidResponse { .. } => "invalid_response",
            Self::UnknownResponse { .. } => "unknown_response",
            Self::UnknownEvent { .. } => "unknown_event",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
