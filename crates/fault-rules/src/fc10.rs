//! Fault Condition 10: outdoor and mixed air temperatures disagree in economizer plus mechanical cooling
//!
//! With the outdoor air damper fully open the mixed air stream is almost all
//! outdoor air, so MAT and OAT should agree within the combined sensor error.

use crate::error::{check_column, check_threshold, check_window, RuleError};
use crate::observer::RuleObserver;
use crate::rule::{append_columns, notify, FaultCode, FaultRule, ObserverSlot};
use crate::window::persist;
use data_validator::{ColumnContract, Validator};
use sensor_table::{ColumnData, SensorTable};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

const COOLING_ON: f64 = 0.01;
const DAMPER_FULL_OPEN: f64 = 0.9;

/// FC10 configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fc10Config {
    pub outdoor_degf_err_thres: f64,
    pub mix_degf_err_thres: f64,
    pub mat_col: String,
    pub oat_col: String,
    pub cooling_sig_col: String,
    pub economizer_sig_col: String,
    pub rolling_window_size: usize,
}

impl Default for Fc10Config {
    fn default() -> Self {
        Self {
            outdoor_degf_err_thres: 5.0,
            mix_degf_err_thres: 5.0,
            mat_col: "mat".into(),
            oat_col: "oat".into(),
            cooling_sig_col: "cooling_sig".into(),
            economizer_sig_col: "economizer_sig".into(),
            rolling_window_size: 1,
        }
    }
}

impl Fc10Config {
    pub fn validate(&self) -> Result<(), RuleError> {
        check_threshold("outdoor_degf_err_thres", self.outdoor_degf_err_thres)?;
        check_threshold("mix_degf_err_thres", self.mix_degf_err_thres)?;
        check_column("mat_col", &self.mat_col)?;
        check_column("oat_col", &self.oat_col)?;
        check_column("cooling_sig_col", &self.cooling_sig_col)?;
        check_column("economizer_sig_col", &self.economizer_sig_col)?;
        check_window(self.rolling_window_size)?;
        Ok(())
    }

    /// Combined MAT/OAT sensor error, root-sum-square
    pub fn combined_error(&self) -> f64 {
        self.mix_degf_err_thres.hypot(self.outdoor_degf_err_thres)
    }
}

/// MAT and OAT disagree in economizer plus mechanical cooling with the damper full open
pub struct FaultConditionTen {
    config: Fc10Config,
    validator: Validator,
    observer: ObserverSlot,
}

impl FaultConditionTen {
    pub fn new(config: Fc10Config) -> Result<Self, RuleError> {
        config.validate()?;
        info!("Creating FC10 rule with config: {:?}", config);
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

    pub fn config(&self) -> &Fc10Config {
        &self.config
    }
}

impl FaultRule for FaultConditionTen {
    fn code(&self) -> FaultCode {
        FaultCode::Fc10
    }

    fn contracts(&self) -> Vec<ColumnContract> {
        vec![
            ColumnContract::float(&self.config.mat_col),
            ColumnContract::float(&self.config.oat_col),
            ColumnContract::fraction(&self.config.cooling_sig_col),
            ColumnContract::fraction(&self.config.economizer_sig_col),
        ]
    }

    fn apply(&self, table: &SensorTable) -> Result<SensorTable, RuleError> {
        self.validator.validate(table, &self.contracts())?;
        let c = &self.config;

        let mat = table.float_column(&c.mat_col)?;
        let oat = table.float_column(&c.oat_col)?;
        let cooling = table.float_column(&c.cooling_sig_col)?;
        let economizer = table.float_column(&c.economizer_sig_col)?;

        let spread: Vec<f64> = mat.iter().zip(oat).map(|(&m, &o)| (m - o).abs()).collect();
        let limit = c.combined_error();
        let raw: Vec<bool> = spread
            .iter()
            .zip(cooling.iter().zip(economizer))
            .map(|(&d, (&clg, &econ))| d > limit && clg > COOLING_ON && econ > DAMPER_FULL_OPEN)
            .collect();

        let out = append_columns(
            table,
            self.code(),
            vec![("abs_mat_minus_oat", ColumnData::Float(spread))],
            persist(&raw, c.rolling_window_size),
        )?;
        notify(&self.observer, self.code(), "flagged", &out);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::float_table;

    #[test]
    fn test_combined_error() {
        let config = Fc10Config {
            outdoor_degf_err_thres: 3.0,
            mix_degf_err_thres: 4.0,
            ..Default::default()
        };
        assert_eq!(config.combined_error(), 5.0);
    }

    #[test]
    fn test_mat_oat_disagree_with_damper_open() {
        // sqrt(5^2 + 5^2) ~= 7.07
        let table = float_table(&[
            ("mat", vec![70.0, 70.0, 70.0, 70.0]),
            ("oat", vec![60.0, 65.0, 60.0, 60.0]),
            ("cooling_sig", vec![0.5, 0.5, 0.0, 0.5]),
            ("economizer_sig", vec![1.0, 1.0, 1.0, 0.5]),
        ]);
        let out = FaultConditionTen::new(Fc10Config::default())
            .unwrap()
            .apply(&table)
            .unwrap();
        assert_eq!(out.int_column("fc10_flag").unwrap(), &[1, 0, 0, 0]);
        assert_eq!(out.float_column("abs_mat_minus_oat").unwrap(), &[10.0, 5.0, 10.0, 10.0]);
    }
}
