//! Fault Condition 6: outdoor air fraction disagrees with the minimum airflow setpoint
//!
//! Cross-checks two independent estimates of how much outdoor air the unit
//! is taking in: one from temperature mixing, one from the minimum outdoor
//! airflow setpoint over the measured total supply airflow. The temperature
//! estimate is only trusted when return and outdoor air differ by at least
//! `oat_rat_delta_min`.

use crate::error::{check_column, check_threshold, check_window, RuleError};
use crate::observer::RuleObserver;
use crate::rule::{append_columns, notify, FaultCode, FaultRule, ObserverSlot};
use crate::window::persist;
use data_validator::{ColumnContract, Validator};
use sensor_table::{ColumnData, SensorTable};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Temperature-implied outdoor air fraction column
pub const PERCENT_OA_CALC_COL: &str = "percent_oa_calc";
/// Airflow-implied minimum outdoor air column
pub const PERC_OA_MIN_COL: &str = "perc_oa_min";

/// FC6 configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fc6Config {
    /// Allowed difference between the two outdoor air estimates
    pub airflow_err_thres: f64,
    /// Minimum outdoor airflow setpoint (CFM)
    pub ahu_min_oa_cfm_stp: f64,
    /// Smallest |RAT - OAT| spread at which the mixing estimate is trusted (°F)
    pub oat_rat_delta_min: f64,
    pub mat_col: String,
    pub oat_col: String,
    pub rat_col: String,
    /// Total supply airflow, e.g. summed VAV box flows or fan AFMS (CFM)
    pub supply_fan_air_volume_col: String,
    pub rolling_window_size: usize,
}

impl Default for Fc6Config {
    fn default() -> Self {
        Self {
            airflow_err_thres: 0.3,
            ahu_min_oa_cfm_stp: 2500.0,
            oat_rat_delta_min: 10.0,
            mat_col: "mat".into(),
            oat_col: "oat".into(),
            rat_col: "rat".into(),
            supply_fan_air_volume_col: "supply_fan_air_volume".into(),
            rolling_window_size: 1,
        }
    }
}

impl Fc6Config {
    pub fn validate(&self) -> Result<(), RuleError> {
        check_threshold("airflow_err_thres", self.airflow_err_thres)?;
        check_threshold("ahu_min_oa_cfm_stp", self.ahu_min_oa_cfm_stp)?;
        check_threshold("oat_rat_delta_min", self.oat_rat_delta_min)?;
        check_column("mat_col", &self.mat_col)?;
        check_column("oat_col", &self.oat_col)?;
        check_column("rat_col", &self.rat_col)?;
        check_column("supply_fan_air_volume_col", &self.supply_fan_air_volume_col)?;
        check_window(self.rolling_window_size)?;
        Ok(())
    }
}

/// Derived values for one row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirflowEstimate {
    /// |RAT - OAT|
    pub rat_minus_oat: f64,
    /// (MAT - RAT) / (OAT - RAT), zero when not positive
    pub percent_oa_calc: f64,
    /// min OA setpoint / total airflow * 100
    pub perc_oa_min: f64,
}

impl AirflowEstimate {
    pub fn compute(mat: f64, rat: f64, oat: f64, min_cfm: f64, total_cfm: f64) -> Self {
        let ratio = (mat - rat) / (oat - rat);
        // negative or undefined ratios mean no usable outdoor air reading
        let percent_oa_calc = if ratio > 0.0 { ratio } else { 0.0 };
        Self {
            rat_minus_oat: (rat - oat).abs(),
            percent_oa_calc,
            perc_oa_min: min_cfm / total_cfm * 100.0,
        }
    }

    pub fn difference(&self) -> f64 {
        (self.percent_oa_calc - self.perc_oa_min).abs()
    }

    /// Raw FC6 predicate before the persistence window
    pub fn is_fault(&self, config: &Fc6Config) -> bool {
        self.rat_minus_oat >= config.oat_rat_delta_min
            && self.difference() > config.airflow_err_thres
    }
}

/// Outdoor air fraction cross-check
pub struct FaultConditionSix {
    config: Fc6Config,
    validator: Validator,
    observer: ObserverSlot,
}

impl FaultConditionSix {
    pub fn new(config: Fc6Config) -> Result<Self, RuleError> {
        config.validate()?;
        info!("Creating FC6 rule with config: {:?}", config);
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

    pub fn config(&self) -> &Fc6Config {
        &self.config
    }

    /// Per-row airflow estimates
    pub fn estimates(&self, table: &SensorTable) -> Result<Vec<AirflowEstimate>, RuleError> {
        let c = &self.config;
        let mat = table.float_column(&c.mat_col)?;
        let oat = table.float_column(&c.oat_col)?;
        let rat = table.float_column(&c.rat_col)?;
        let flow = table.float_column(&c.supply_fan_air_volume_col)?;
        Ok(mat
            .iter()
            .zip(rat)
            .zip(oat)
            .zip(flow)
            .map(|(((&m, &r), &o), &f)| AirflowEstimate::compute(m, r, o, c.ahu_min_oa_cfm_stp, f))
            .collect())
    }
}

impl FaultRule for FaultConditionSix {
    fn code(&self) -> FaultCode {
        FaultCode::Fc6
    }

    fn contracts(&self) -> Vec<ColumnContract> {
        vec![
            ColumnContract::float(&self.config.mat_col),
            ColumnContract::float(&self.config.oat_col),
            ColumnContract::float(&self.config.rat_col),
            ColumnContract::float(&self.config.supply_fan_air_volume_col),
        ]
    }

    fn apply(&self, table: &SensorTable) -> Result<SensorTable, RuleError> {
        self.validator.validate(table, &self.contracts())?;

        let estimates = self.estimates(table)?;
        if self.observer.is_some() {
            let diagnostics = SensorTable::new(table.index().to_vec())?
                .with_column(
                    "rat_minus_oat",
                    ColumnData::Float(estimates.iter().map(|e| e.rat_minus_oat).collect()),
                )?
                .with_column(
                    "percent_oa_calc_minus_perc_oa_min",
                    ColumnData::Float(estimates.iter().map(|e| e.difference()).collect()),
                )?;
            notify(&self.observer, self.code(), "airflow_estimates", &diagnostics);
        }

        let raw: Vec<bool> = estimates.iter().map(|e| e.is_fault(&self.config)).collect();
        let out = append_columns(
            table,
            self.code(),
            vec![
                (
                    PERCENT_OA_CALC_COL,
                    ColumnData::Float(estimates.iter().map(|e| e.percent_oa_calc).collect()),
                ),
                (
                    PERC_OA_MIN_COL,
                    ColumnData::Float(estimates.iter().map(|e| e.perc_oa_min).collect()),
                ),
            ],
            persist(&raw, self.config.rolling_window_size),
        )?;
        notify(&self.observer, self.code(), "flagged", &out);
        Ok(out)
    }
}
