//! AHU Fault Detection Runner
//!
//! Builds fault rules from site settings, applies them to sensor tables and
//! hands the flagged output to downstream report sinks.

mod error;
mod registry;
mod settings;
mod sink;

pub use error::{RunnerError, SinkError};
pub use registry::{build_rule, FaultRunner, RuleRun};
pub use settings::{RuleConfig, RunnerSettings, ENV_PREFIX};
pub use sink::{resolve_flag_column, JsonLinesSink, ReportSink};

use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging at the given level ("error" through "trace")
pub fn init_logging(level: &str) -> Result<(), RunnerError> {
    let level = Level::from_str(level).map_err(|e| RunnerError::Logging(e.to_string()))?;
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| RunnerError::Logging(e.to_string()))
}
