//! Runner settings: which rules to build and how they are bound to a site's columns

use crate::error::RunnerError;
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File, FileFormat};
use fault_rules::{
    Fc10Config, Fc1Config, Fc4Config, Fc5Config, Fc6Config, Fc7Config, FaultCode, MixedAirConfig,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Prefix for environment overrides, e.g. `AHU_FDD__LOG_LEVEL=debug`
pub const ENV_PREFIX: &str = "AHU_FDD";

/// Configuration of a single rule, tagged by its fault code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "lowercase")]
pub enum RuleConfig {
    Fc1(Fc1Config),
    Fc2(MixedAirConfig),
    Fc3(MixedAirConfig),
    Fc4(Fc4Config),
    Fc5(Fc5Config),
    Fc6(Fc6Config),
    Fc7(Fc7Config),
    Fc10(Fc10Config),
}

impl RuleConfig {
    pub fn code(&self) -> FaultCode {
        match self {
            RuleConfig::Fc1(_) => FaultCode::Fc1,
            RuleConfig::Fc2(_) => FaultCode::Fc2,
            RuleConfig::Fc3(_) => FaultCode::Fc3,
            RuleConfig::Fc4(_) => FaultCode::Fc4,
            RuleConfig::Fc5(_) => FaultCode::Fc5,
            RuleConfig::Fc6(_) => FaultCode::Fc6,
            RuleConfig::Fc7(_) => FaultCode::Fc7,
            RuleConfig::Fc10(_) => FaultCode::Fc10,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Runner settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerSettings {
    /// Log level passed to [`crate::init_logging`]
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Attach a tracing observer to every rule
    #[serde(default)]
    pub troubleshoot: bool,
    /// Rules to run, in order
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            troubleshoot: false,
            rules: Vec::new(),
        }
    }
}

impl RunnerSettings {
    /// Load settings from a file (format from its extension) plus environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RunnerError> {
        let path = path.as_ref();
        info!("Loading runner settings from {}", path.display());
        Self::load(config::Config::builder().add_source(File::from(path)))
    }

    /// Load settings from a TOML document plus environment overrides
    pub fn from_toml_str(toml: &str) -> Result<Self, RunnerError> {
        Self::load(config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    fn load(builder: ConfigBuilder<DefaultState>) -> Result<Self, RunnerError> {
        let settings: RunnerSettings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;
        if settings.rules.is_empty() {
            return Err(RunnerError::NoRules);
        }
        info!(
            "Loaded {} rule(s): {:?}",
            settings.rules.len(),
            settings.rules.iter().map(RuleConfig::code).collect::<Vec<_>>()
        );
        Ok(settings)
    }
}
