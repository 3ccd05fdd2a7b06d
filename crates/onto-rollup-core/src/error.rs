//! Error types and exit codes for onto-rollup
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure (I/O, checkpoint persistence)
//! - 2: Usage or configuration error
//! - 3: Data error (malformed records, unresolved references, cycles)

mod macros;

use thiserror::Error;

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage or configuration error (2)
    Usage = 2,
    /// Input data error (3)
    Data = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Errors that can occur while loading, building or rolling up an ontology
#[derive(Error, Debug)]
pub enum RollupError {
    // Usage and configuration errors (exit code 2)
    #[error("{0}")]
    UsageError(String),

    #[error("missing configuration key [{section}] {key}")]
    Configuration { section: String, key: String },

    #[error("invalid configuration value for {key}: {reason}")]
    InvalidConfig { key: String, reason: String },

    #[error("unknown format: {0} (expected: human or json)")]
    UnknownFormat(String),

    // Data errors (exit code 3)
    #[error("malformed record in {source_name} line {line}: {reason}")]
    MalformedRecord {
        source_name: String,
        line: usize,
        reason: String,
    },

    #[error("{context} references undeclared concept: {id}")]
    UnresolvedReference { context: String, id: String },

    #[error("cycle detected: {} concepts never completed aggregation (first: {})", pending.len(), pending.first().map(String::as_str).unwrap_or("?"))]
    UnresolvedCycle { pending: Vec<String> },

    #[error("concept not found: {id}")]
    UnknownConcept { id: String },

    #[error("concept is not a leaf: {id}")]
    NotALeaf { id: String },

    // Generic failures (exit code 1)
    #[error("failed to persist checkpoint for {annotator_count} annotators: {reason}")]
    Checkpoint {
        annotator_count: usize,
        reason: String,
    },

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to {operation} {target}: {reason}")]
    FailedOperationWithTarget {
        operation: String,
        target: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

impl RollupError {
    /// Create an error for a record line that cannot be parsed
    pub fn malformed(source_name: &str, line: usize, reason: impl std::fmt::Display) -> Self {
        RollupError::MalformedRecord {
            source_name: source_name.to_string(),
            line,
            reason: reason.to_string(),
        }
    }

    /// Create an error for a reference to a concept that was never declared
    pub fn unresolved(context: &str, id: impl std::fmt::Display) -> Self {
        RollupError::UnresolvedReference {
            context: context.to_string(),
            id: id.to_string(),
        }
    }

    /// Create an error for a required configuration key that is absent
    pub fn missing_key(section: &str, key: &str) -> Self {
        RollupError::Configuration {
            section: section.to_string(),
            key: key.to_string(),
        }
    }

    /// Create an error for a failed IO operation with context
    pub fn io_operation(
        operation: &str,
        path: impl std::fmt::Display,
        error: impl std::fmt::Display,
    ) -> Self {
        RollupError::FailedOperationWithTarget {
            operation: operation.to_string(),
            target: path.to_string(),
            reason: error.to_string(),
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            RollupError::UsageError(_)
            | RollupError::Configuration { .. }
            | RollupError::InvalidConfig { .. }
            | RollupError::UnknownFormat(_)
            | RollupError::Toml(_) => ExitCode::Usage,

            RollupError::MalformedRecord { .. }
            | RollupError::UnresolvedReference { .. }
            | RollupError::UnresolvedCycle { .. }
            | RollupError::UnknownConcept { .. }
            | RollupError::NotALeaf { .. } => ExitCode::Data,

            RollupError::Checkpoint { .. }
            | RollupError::Json(_)
            | RollupError::FailedOperationWithTarget { .. }
            | RollupError::Other(_) => ExitCode::Failure,
        }
    }

    /// Get the error type identifier
    pub fn error_type(&self) -> &'static str {
        match self {
            RollupError::UsageError(_) => "usage_error",
            RollupError::Configuration { .. } => "configuration_error",
            RollupError::InvalidConfig { .. } => "invalid_config",
            RollupError::UnknownFormat(_) => "unknown_format",
            RollupError::MalformedRecord { .. } => "malformed_record",
            RollupError::UnresolvedReference { .. } => "unresolved_reference",
            RollupError::UnresolvedCycle { .. } => "unresolved_cycle",
            RollupError::UnknownConcept { .. } => "unknown_concept",
            RollupError::NotALeaf { .. } => "not_a_leaf",
            RollupError::Checkpoint { .. } => "checkpoint_error",
            RollupError::Toml(_) => "toml_error",
            RollupError::Json(_) => "json_error",
            RollupError::FailedOperationWithTarget { .. } => "failed_operation_with_target",
            RollupError::Other(_) => "other",
        }
    }

    /// Convert error to JSON representation for structured error output
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.exit_code() as i32,
                "type": self.error_type(),
                "message": self.to_string(),
            }
        })
    }
}

/// Result type alias for onto-rollup operations
pub type Result<T> = std::result::Result<T, RollupError>;
