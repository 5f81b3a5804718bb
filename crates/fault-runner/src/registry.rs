//! Rule registry and runner

use crate::error::RunnerError;
use crate::settings::{RuleConfig, RunnerSettings};
use crate::sink::ReportSink;
use data_validator::{ColumnContract, ValidationResult, Validator};
use fault_rules::{
    FaultCode, FaultConditionFive, FaultConditionFour, FaultConditionOne, FaultConditionSeven,
    FaultConditionSix, FaultConditionTen, FaultConditionThree, FaultConditionTwo, FaultRule,
    RuleError, RuleObserver, TracingObserver,
};
use sensor_table::SensorTable;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Build a rule from its configuration, optionally attaching an observer
pub fn build_rule(
    config: &RuleConfig,
    observer: Option<Arc<dyn RuleObserver>>,
) -> Result<Box<dyn FaultRule>, RuleError> {
    macro_rules! boxed {
        ($rule:expr) => {{
            let rule = $rule?;
            match observer {
                Some(observer) => Box::new(rule.with_observer(observer)) as Box<dyn FaultRule>,
                None => Box::new(rule),
            }
        }};
    }

    Ok(match config {
        RuleConfig::Fc1(c) => boxed!(FaultConditionOne::new(c.clone())),
        RuleConfig::Fc2(c) => boxed!(FaultConditionTwo::new(c.clone())),
        RuleConfig::Fc3(c) => boxed!(FaultConditionThree::new(c.clone())),
        RuleConfig::Fc4(c) => boxed!(FaultConditionFour::new(c.clone())),
        RuleConfig::Fc5(c) => boxed!(FaultConditionFive::new(c.clone())),
        RuleConfig::Fc6(c) => boxed!(FaultConditionSix::new(c.clone())),
        RuleConfig::Fc7(c) => boxed!(FaultConditionSeven::new(c.clone())),
        RuleConfig::Fc10(c) => boxed!(FaultConditionTen::new(c.clone())),
    })
}

/// Output of one rule over one table
#[derive(Debug, Clone)]
pub struct RuleRun {
    pub code: FaultCode,
    pub flag_column: String,
    /// Rows (or buckets, for FC4) flagged
    pub flagged: usize,
    pub table: SensorTable,
}

/// Applies a set of configured rules to sensor tables
pub struct FaultRunner {
    rules: Vec<Box<dyn FaultRule>>,
}

impl FaultRunner {
    pub fn new(rules: Vec<Box<dyn FaultRule>>) -> Self {
        Self { rules }
    }

    /// Build every configured rule; any invalid configuration fails the whole set
    pub fn from_settings(settings: &RunnerSettings) -> Result<Self, RunnerError> {
        let observer: Option<Arc<dyn RuleObserver>> = if settings.troubleshoot {
            Some(Arc::new(TracingObserver))
        } else {
            None
        };
        let rules = settings
            .rules
            .iter()
            .map(|c| build_rule(c, observer.clone()).map_err(|e| RunnerError::rule(c.code(), e)))
            .collect::<Result<Vec<_>, _>>()?;
        info!("Fault runner ready with {} rule(s)", rules.len());
        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn FaultRule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    /// Check every rule's column contracts against `table`, reporting all
    /// violations instead of stopping at the first
    pub fn preflight(&self, table: &SensorTable) -> ValidationResult {
        let mut contracts: Vec<ColumnContract> = Vec::new();
        for contract in self.rules.iter().flat_map(|r| r.contracts()) {
            if !contracts.contains(&contract) {
                contracts.push(contract);
            }
        }
        let result = Validator::default().check_all(table, &contracts);
        for err in &result.errors {
            warn!("Preflight: {}", err);
        }
        result
    }

    /// Apply every rule to the same input, each producing its own table
    pub fn run(&self, table: &SensorTable) -> Result<Vec<RuleRun>, RunnerError> {
        self.rules
            .iter()
            .map(|rule| {
                let output = rule
                    .apply(table)
                    .map_err(|e| RunnerError::rule(rule.code(), e))?;
                let flag_column = rule.flag_column();
                let flagged = output
                    .int_column(&flag_column)
                    .map(|flags| flags.iter().filter(|&&f| f == 1).count())
                    .map_err(|e| RunnerError::rule(rule.code(), e.into()))?;
                info!("{}: {} of {} flagged", rule.code(), flagged, output.len());
                Ok(RuleRun {
                    code: rule.code(),
                    flag_column,
                    flagged,
                    table: output,
                })
            })
            .collect()
    }

    /// Apply every row-preserving rule and attach their new columns to one table.
    ///
    /// Resampling rules (FC4) change the row index and are skipped here; use
    /// [`FaultRunner::run`] for their output.
    pub fn annotate(&self, table: &SensorTable) -> Result<SensorTable, RunnerError> {
        let mut annotated = table.clone();
        for rule in self.rules.iter().filter(|r| r.preserves_rows()) {
            let output = rule
                .apply(table)
                .map_err(|e| RunnerError::rule(rule.code(), e))?;
            for column in output.columns().iter().filter(|c| !table.has_column(&c.name)) {
                annotated
                    .insert_column(column.name.clone(), column.data.clone())
                    .map_err(|e| RunnerError::rule(rule.code(), e.into()))?;
            }
            debug!("{}: columns attached", rule.code());
        }
        Ok(annotated)
    }

    /// Run every rule and hand each result to `sink`, one artifact per rule
    pub fn run_and_render(
        &self,
        table: &SensorTable,
        sink: &dyn ReportSink,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, RunnerError> {
        let runs = self.run(table)?;
        let mut written = Vec::with_capacity(runs.len());
        for run in runs {
            let path = output_dir.join(format!("{}_report.{}", run.code, sink.extension()));
            sink.render(&path, &run.table, Some(run.flag_column.as_str()))?;
            written.push(path);
        }
        Ok(written)
    }
}
