//! Fault Conditions 2 and 3: mixed air temperature outside the return/outdoor band
//!
//! With a working economizer the mixed air temperature must lie between the
//! return and outdoor air temperatures. FC2 flags a mixed air reading below
//! the cooler bound, FC3 one above it, each widened by the sensor tolerances.

use crate::error::{check_column, check_threshold, check_window, RuleError};
use crate::observer::RuleObserver;
use crate::rule::{append_columns, nan_min, notify, FaultCode, FaultRule, ObserverSlot};
use crate::window::persist;
use data_validator::{ColumnContract, Validator};
use sensor_table::SensorTable;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Configuration shared by FC2 and FC3
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixedAirConfig {
    /// Mixed air sensor tolerance (°F)
    pub mix_degf_err_thres: f64,
    /// Return air sensor tolerance (°F)
    pub return_degf_err_thres: f64,
    /// Outdoor air sensor tolerance (°F)
    pub outdoor_degf_err_thres: f64,
    pub mat_col: String,
    pub rat_col: String,
    pub oat_col: String,
    pub rolling_window_size: usize,
}

impl Default for MixedAirConfig {
    fn default() -> Self {
        Self {
            mix_degf_err_thres: 2.0,
            return_degf_err_thres: 2.0,
            outdoor_degf_err_thres: 5.0,
            mat_col: "mat".into(),
            rat_col: "rat".into(),
            oat_col: "oat".into(),
            rolling_window_size: 1,
        }
    }
}

impl MixedAirConfig {
    pub fn validate(&self) -> Result<(), RuleError> {
        check_threshold("mix_degf_err_thres", self.mix_degf_err_thres)?;
        check_threshold("return_degf_err_thres", self.return_degf_err_thres)?;
        check_threshold("outdoor_degf_err_thres", self.outdoor_degf_err_thres)?;
        check_column("mat_col", &self.mat_col)?;
        check_column("rat_col", &self.rat_col)?;
        check_column("oat_col", &self.oat_col)?;
        check_window(self.rolling_window_size)?;
        Ok(())
    }

    fn contracts(&self) -> Vec<ColumnContract> {
        vec![
            ColumnContract::float(&self.mat_col),
            ColumnContract::float(&self.rat_col),
            ColumnContract::float(&self.oat_col),
        ]
    }
}

/// Which side of the band a rule checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    Low,
    High,
}

fn evaluate(
    config: &MixedAirConfig,
    band: Band,
    table: &SensorTable,
) -> Result<Vec<bool>, RuleError> {
    let mat = table.float_column(&config.mat_col)?;
    let rat = table.float_column(&config.rat_col)?;
    let oat = table.float_column(&config.oat_col)?;

    let mix = config.mix_degf_err_thres;
    let ret = config.return_degf_err_thres;
    let out = config.outdoor_degf_err_thres;

    let raw = mat
        .iter()
        .zip(rat)
        .zip(oat)
        .map(|((&m, &r), &o)| match band {
            Band::Low => m + mix < nan_min(r - ret, o - out),
            Band::High => m - mix > nan_min(r + ret, o + out),
        })
        .collect::<Vec<_>>();
    Ok(persist(&raw, config.rolling_window_size))
}

/// Mixed air temperature too low
pub struct FaultConditionTwo {
    config: MixedAirConfig,
    validator: Validator,
    observer: ObserverSlot,
}

impl FaultConditionTwo {
    pub fn new(config: MixedAirConfig) -> Result<Self, RuleError> {
        config.validate()?;
        info!("Creating FC2 rule with config: {:?}", config);
        Ok(Self {
            config,
            validator: Validator::default(),
            observer: None,
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn RuleObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &MixedAirConfig {
        &self.config
    }
}

impl FaultRule for FaultConditionTwo {
    fn code(&self) -> FaultCode {
        FaultCode::Fc2
    }

    fn contracts(&self) -> Vec<ColumnContract> {
        self.config.contracts()
    }

    fn apply(&self, table: &SensorTable) -> Result<SensorTable, RuleError> {
        self.validator.validate(table, &self.contracts())?;
        let flags = evaluate(&self.config, Band::Low, table)?;
        let out = append_columns(table, self.code(), vec![], flags)?;
        notify(&self.observer, self.code(), "flagged", &out);
        Ok(out)
    }
}

/// Mixed air temperature too high
pub struct FaultConditionThree {
    config: MixedAirConfig,
    validator: Validator,
    observer: ObserverSlot,
}

impl FaultConditionThree {
    pub fn new(config: MixedAirConfig) -> Result<Self, RuleError> {
        config.validate()?;
        info!("Creating FC3 rule with config: {:?}", config);
        Ok(Self {
            config,
            validator: Validator::default(),
            observer: None,
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn RuleObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &MixedAirConfig {
        &self.config
    }
}

impl FaultRule for FaultConditionThree {
    fn code(&self) -> FaultCode {
        FaultCode::Fc3
    }

    fn contracts(&self) -> Vec<ColumnContract> {
        self.config.contracts()
    }

    fn apply(&self, table: &SensorTable) -> Result<SensorTable, RuleError> {
        self.validator.validate(table, &self.contracts())?;
        let flags = evaluate(&self.config, Band::High, table)?;
        let out = append_columns(table, self.code(), vec![], flags)?;
        notify(&self.observer, self.code(), "flagged", &out);
        Ok(out)
    }
}
