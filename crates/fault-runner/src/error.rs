//! Runner Error Types

use fault_rules::RuleError;
use thiserror::Error;

/// Errors raised by a [`crate::ReportSink`]
#[derive(Debug, Error)]
pub enum SinkError {
    /// Output could not be written
    #[error("Report I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Row could not be serialized
    #[error("Report serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Requested flag column absent from the table
    #[error("Flag column not found: {0}")]
    MissingFlagColumn(String),
}

/// Errors raised while loading settings or running rules
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Settings file or environment could not be read
    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    /// A rule failed to build or apply
    #[error("Rule {rule} failed: {source}")]
    Rule {
        rule: String,
        #[source]
        source: RuleError,
    },

    /// Downstream sink failed
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// Settings loaded but contained no rules
    #[error("No rules configured")]
    NoRules,

    /// Logging could not be initialized
    #[error("Logging error: {0}")]
    Logging(String),
}

impl RunnerError {
    pub(crate) fn rule(rule: impl ToString, source: RuleError) -> Self {
        RunnerError::Rule {
            rule: rule.to_string(),
            source,
        }
    }
}
