//! Fault Condition 5: supply air temperature too low given mixing and fan heat

use crate::error::{check_column, check_threshold, check_window, RuleError};
use crate::observer::RuleObserver;
use crate::rule::{append_columns, notify, FaultCode, FaultRule, ObserverSlot};
use crate::window::persist;
use data_validator::{ColumnContract, Validator};
use sensor_table::SensorTable;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// FC5 configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fc5Config {
    pub mix_degf_err_thres: f64,
    pub supply_degf_err_thres: f64,
    /// Expected temperature rise across the supply fan (°F)
    pub delta_t_supply_fan: f64,
    pub mat_col: String,
    pub sat_col: String,
    pub rolling_window_size: usize,
}

impl Default for Fc5Config {
    fn default() -> Self {
        Self {
            mix_degf_err_thres: 2.0,
            supply_degf_err_thres: 2.0,
            delta_t_supply_fan: 2.0,
            mat_col: "mat".into(),
            sat_col: "sat".into(),
            rolling_window_size: 1,
        }
    }
}

impl Fc5Config {
    pub fn validate(&self) -> Result<(), RuleError> {
        check_threshold("mix_degf_err_thres", self.mix_degf_err_thres)?;
        check_threshold("supply_degf_err_thres", self.supply_degf_err_thres)?;
        check_threshold("delta_t_supply_fan", self.delta_t_supply_fan)?;
        check_column("mat_col", &self.mat_col)?;
        check_column("sat_col", &self.sat_col)?;
        check_window(self.rolling_window_size)?;
        Ok(())
    }
}

/// Supply air no warmer than mixed air plus fan heat
pub struct FaultConditionFive {
    config: Fc5Config,
    validator: Validator,
    observer: ObserverSlot,
}

impl FaultConditionFive {
    pub fn new(config: Fc5Config) -> Result<Self, RuleError> {
        config.validate()?;
        info!("Creating FC5 rule with config: {:?}", config);
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

    pub fn config(&self) -> &Fc5Config {
        &self.config
    }
}

impl FaultRule for FaultConditionFive {
    fn code(&self) -> FaultCode {
        FaultCode::Fc5
    }

    fn contracts(&self) -> Vec<ColumnContract> {
        vec![
            ColumnContract::float(&self.config.mat_col),
            ColumnContract::float(&self.config.sat_col),
        ]
    }

    fn apply(&self, table: &SensorTable) -> Result<SensorTable, RuleError> {
        self.validator.validate(table, &self.contracts())?;
        let c = &self.config;

        let mat = table.float_column(&c.mat_col)?;
        let sat = table.float_column(&c.sat_col)?;

        // inclusive: supply air merely equal to the expected floor still counts
        let raw: Vec<bool> = sat
            .iter()
            .zip(mat)
            .map(|(&s, &m)| {
                s + c.supply_degf_err_thres <= m - c.mix_degf_err_thres + c.delta_t_supply_fan
            })
            .collect();

        let out = append_columns(table, self.code(), vec![], persist(&raw, c.rolling_window_size))?;
        notify(&self.observer, self.code(), "flagged", &out);
        Ok(out)
    }
}
