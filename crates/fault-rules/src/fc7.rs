//! Fault Condition 7: supply air temperature too low in full heating

use crate::error::{check_column, check_threshold, check_window, RuleError};
use crate::observer::RuleObserver;
use crate::rule::{append_columns, notify, FaultCode, FaultRule, ObserverSlot};
use crate::window::persist;
use data_validator::{ColumnContract, Validator};
use sensor_table::SensorTable;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Heating valve command treated as fully open
const FULL_HEATING: f64 = 0.9;

/// FC7 configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fc7Config {
    pub supply_degf_err_thres: f64,
    pub sat_col: String,
    pub sat_setpoint_col: String,
    pub heating_sig_col: String,
    pub supply_vfd_speed_col: String,
    pub rolling_window_size: usize,
}

impl Default for Fc7Config {
    fn default() -> Self {
        Self {
            supply_degf_err_thres: 2.0,
            sat_col: "sat".into(),
            sat_setpoint_col: "sat_setpoint".into(),
            heating_sig_col: "heating_sig".into(),
            supply_vfd_speed_col: "supply_vfd_speed".into(),
            rolling_window_size: 1,
        }
    }
}

impl Fc7Config {
    pub fn validate(&self) -> Result<(), RuleError> {
        check_threshold("supply_degf_err_thres", self.supply_degf_err_thres)?;
        check_column("sat_col", &self.sat_col)?;
        check_column("sat_setpoint_col", &self.sat_setpoint_col)?;
        check_column("heating_sig_col", &self.heating_sig_col)?;
        check_column("supply_vfd_speed_col", &self.supply_vfd_speed_col)?;
        check_window(self.rolling_window_size)?;
        Ok(())
    }
}

/// Supply air below setpoint while the heating valve is wide open and the fan runs
pub struct FaultConditionSeven {
    config: Fc7Config,
    validator: Validator,
    observer: ObserverSlot,
}

impl FaultConditionSeven {
    pub fn new(config: Fc7Config) -> Result<Self, RuleError> {
        config.validate()?;
        info!("Creating FC7 rule with config: {:?}", config);
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

    pub fn config(&self) -> &Fc7Config {
        &self.config
    }
}

impl FaultRule for FaultConditionSeven {
    fn code(&self) -> FaultCode {
        FaultCode::Fc7
    }

    fn contracts(&self) -> Vec<ColumnContract> {
        vec![
            ColumnContract::float(&self.config.sat_col),
            ColumnContract::float(&self.config.sat_setpoint_col),
            ColumnContract::fraction(&self.config.heating_sig_col),
            ColumnContract::fraction(&self.config.supply_vfd_speed_col),
        ]
    }

    fn apply(&self, table: &SensorTable) -> Result<SensorTable, RuleError> {
        self.validator.validate(table, &self.contracts())?;
        let c = &self.config;

        let sat = table.float_column(&c.sat_col)?;
        let setpoint = table.float_column(&c.sat_setpoint_col)?;
        let heating = table.float_column(&c.heating_sig_col)?;
        let fan = table.float_column(&c.supply_vfd_speed_col)?;

        let raw: Vec<bool> = sat
            .iter()
            .zip(setpoint)
            .zip(heating.iter().zip(fan))
            .map(|((&s, &sp), (&h, &f))| {
                s < sp - c.supply_degf_err_thres && h > FULL_HEATING && f > 0.0
            })
            .collect();

        let out = append_columns(table, self.code(), vec![], persist(&raw, c.rolling_window_size))?;
        notify(&self.observer, self.code(), "flagged", &out);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::float_table;

    #[test]
    fn test_full_heating_cannot_reach_setpoint() {
        let table = float_table(&[
            ("sat", vec![60.0, 60.0, 60.0, 67.0]),
            ("sat_setpoint", vec![68.0; 4]),
            ("heating_sig", vec![0.95, 0.5, 0.95, 0.95]),
            ("supply_vfd_speed", vec![0.6, 0.6, 0.0, 0.6]),
        ]);
        let out = FaultConditionSeven::new(Fc7Config::default())
            .unwrap()
            .apply(&table)
            .unwrap();
        // valve not open, fan off, and within tolerance do not flag
        assert_eq!(out.int_column("fc7_flag").unwrap(), &[1, 0, 0, 0]);
    }

    #[test]
    fn test_heating_in_percent_rejected() {
        let table = float_table(&[
            ("sat", vec![60.0]),
            ("sat_setpoint", vec![68.0]),
            ("heating_sig", vec![95.0]),
            ("supply_vfd_speed", vec![0.6]),
        ]);
        let err = FaultConditionSeven::new(Fc7Config::default())
            .unwrap()
            .apply(&table)
            .unwrap_err();
        assert!(err.is_type_error());
        assert!(err.to_string().starts_with("heating_sig column"));
    }
}
