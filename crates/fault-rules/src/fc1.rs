//! Fault Condition 1: duct static pressure too low with the supply fan at full speed

use crate::error::{check_column, check_threshold, check_window, RuleError};
use crate::observer::RuleObserver;
use crate::rule::{append_columns, notify, FaultCode, FaultRule, ObserverSlot};
use crate::window::persist;
use data_validator::{ColumnContract, Validator};
use sensor_table::SensorTable;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// FC1 configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fc1Config {
    /// Fan speed error tolerance (fraction)
    pub vfd_speed_percent_err_thres: f64,
    /// Maximum fan speed command (fraction)
    pub vfd_speed_percent_max: f64,
    /// Duct static error tolerance (inches of water)
    pub duct_static_inches_err_thres: f64,
    pub duct_static_col: String,
    pub supply_vfd_speed_col: String,
    pub duct_static_setpoint_col: String,
    /// Consecutive rows the fault must persist before flagging
    pub rolling_window_size: usize,
}

impl Default for Fc1Config {
    fn default() -> Self {
        Self {
            vfd_speed_percent_err_thres: 0.05,
            vfd_speed_percent_max: 0.99,
            duct_static_inches_err_thres: 0.1,
            duct_static_col: "duct_static".into(),
            supply_vfd_speed_col: "supply_vfd_speed".into(),
            duct_static_setpoint_col: "duct_static_setpoint".into(),
            rolling_window_size: 1,
        }
    }
}

impl Fc1Config {
    pub fn validate(&self) -> Result<(), RuleError> {
        check_threshold("vfd_speed_percent_err_thres", self.vfd_speed_percent_err_thres)?;
        check_threshold("vfd_speed_percent_max", self.vfd_speed_percent_max)?;
        check_threshold("duct_static_inches_err_thres", self.duct_static_inches_err_thres)?;
        check_column("duct_static_col", &self.duct_static_col)?;
        check_column("supply_vfd_speed_col", &self.supply_vfd_speed_col)?;
        check_column("duct_static_setpoint_col", &self.duct_static_setpoint_col)?;
        check_window(self.rolling_window_size)?;
        Ok(())
    }
}

/// Duct static pressure below setpoint while the fan is at or near maximum speed
pub struct FaultConditionOne {
    config: Fc1Config,
    validator: Validator,
    observer: ObserverSlot,
}

impl FaultConditionOne {
    pub fn new(config: Fc1Config) -> Result<Self, RuleError> {
        config.validate()?;
        info!("Creating FC1 rule with config: {:?}", config);
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

    pub fn config(&self) -> &Fc1Config {
        &self.config
    }
}

impl FaultRule for FaultConditionOne {
    fn code(&self) -> FaultCode {
        FaultCode::Fc1
    }

    fn contracts(&self) -> Vec<ColumnContract> {
        vec![
            ColumnContract::float(&self.config.duct_static_col),
            ColumnContract::float(&self.config.duct_static_setpoint_col),
            ColumnContract::fraction(&self.config.supply_vfd_speed_col),
        ]
    }

    fn apply(&self, table: &SensorTable) -> Result<SensorTable, RuleError> {
        self.validator.validate(table, &self.contracts())?;
        let c = &self.config;

        let static_pressure = table.float_column(&c.duct_static_col)?;
        let setpoint = table.float_column(&c.duct_static_setpoint_col)?;
        let fan_speed = table.float_column(&c.supply_vfd_speed_col)?;

        let speed_floor = c.vfd_speed_percent_max - c.vfd_speed_percent_err_thres;
        let raw: Vec<bool> = static_pressure
            .iter()
            .zip(setpoint)
            .zip(fan_speed)
            .map(|((&sp, &stp), &fan)| {
                sp < stp - c.duct_static_inches_err_thres && fan > speed_floor
            })
            .collect();

        let out = append_columns(table, self.code(), vec![], persist(&raw, c.rolling_window_size))?;
        notify(&self.observer, self.code(), "flagged", &out);
        Ok(out)
    }
}
