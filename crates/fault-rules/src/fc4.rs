//! Fault Condition 4: too many operating state changes per interval
//!
//! Every row is classified into at most one AHU operating mode. Rows are then
//! grouped into fixed time buckets and, per bucket, the number of times the
//! unit *entered* each mode is counted. An entry is a row in the mode whose
//! predecessor row in the dataset was not; the first row of the dataset has
//! no predecessor, so a mode held there counts as one entry. A bucket is
//! flagged when any mode was entered more than `delta_os_max` times.
//!
//! Because the predecessor is taken across bucket boundaries, a mode held
//! from one bucket into the next is a single entry in the earlier bucket.
//! Resamplers that shift within each bucket (for example a pandas
//! `resample(..).apply(shift)` pipeline) count it again in the later bucket,
//! so their counts can be higher.
//!
//! Unlike the other rules the output is indexed by bucket start, not by the
//! input rows. Every bucket between the first and last row is present; empty
//! buckets carry zero counts.

use crate::bucket::TimeBucket;
use crate::error::{check_column, check_fraction, RuleError};
use crate::observer::RuleObserver;
use crate::rule::{notify, FaultCode, FaultRule, ObserverSlot};
use data_validator::{ColumnContract, Validator};
use sensor_table::{ColumnData, SensorTable};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Upper bound on resampled output rows
const MAX_BUCKETS: u64 = 1_000_000;

/// AHU operating modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatingMode {
    /// Outdoor air damper at minimum, heating modulating
    Heating,
    /// Outdoor air damper modulating, no mechanical cooling
    EconOnlyCooling,
    /// Outdoor air damper open and mechanical cooling running
    EconPlusMechCooling,
    /// Outdoor air damper at minimum, mechanical cooling running
    MechCoolingOnly,
}

impl OperatingMode {
    pub const ALL: [OperatingMode; 4] = [
        OperatingMode::Heating,
        OperatingMode::EconOnlyCooling,
        OperatingMode::EconPlusMechCooling,
        OperatingMode::MechCoolingOnly,
    ];

    /// Output column holding this mode's per-bucket entry count
    pub fn column_name(&self) -> &'static str {
        match self {
            OperatingMode::Heating => "heating_mode",
            OperatingMode::EconOnlyCooling => "econ_only_cooling_mode",
            OperatingMode::EconPlusMechCooling => "econ_plus_mech_cooling_mode",
            OperatingMode::MechCoolingOnly => "mech_cooling_only_mode",
        }
    }

    fn slot(&self) -> usize {
        match self {
            OperatingMode::Heating => 0,
            OperatingMode::EconOnlyCooling => 1,
            OperatingMode::EconPlusMechCooling => 2,
            OperatingMode::MechCoolingOnly => 3,
        }
    }

    /// Classify one row of control signals.
    ///
    /// The four bands are disjoint: heating needs cooling off and the damper
    /// at minimum, the cooling modes need heating off and split on whether
    /// cooling runs and whether the damper is above minimum.
    pub fn classify(economizer: f64, heating: f64, cooling: f64, ahu_min_oa: f64) -> Option<Self> {
        let damper_at_min = economizer == ahu_min_oa;
        let damper_open = economizer > ahu_min_oa;
        if heating > 0.0 && cooling == 0.0 && damper_at_min {
            Some(OperatingMode::Heating)
        } else if heating == 0.0 && cooling == 0.0 && damper_open {
            Some(OperatingMode::EconOnlyCooling)
        } else if heating == 0.0 && cooling > 0.0 && damper_open {
            Some(OperatingMode::EconPlusMechCooling)
        } else if heating == 0.0 && cooling > 0.0 && damper_at_min {
            Some(OperatingMode::MechCoolingOnly)
        } else {
            None
        }
    }
}

/// FC4 configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fc4Config {
    /// Maximum mode entries allowed per bucket
    pub delta_os_max: u32,
    /// Minimum outdoor air damper position (fraction)
    pub ahu_min_oa: f64,
    pub economizer_sig_col: String,
    pub heating_sig_col: String,
    pub cooling_sig_col: String,
    /// Resampling interval
    pub bucket: TimeBucket,
}

impl Default for Fc4Config {
    fn default() -> Self {
        Self {
            delta_os_max: 7,
            ahu_min_oa: 0.2,
            economizer_sig_col: "economizer_sig".into(),
            heating_sig_col: "heating_sig".into(),
            cooling_sig_col: "cooling_sig".into(),
            bucket: TimeBucket::default(),
        }
    }
}

impl Fc4Config {
    pub fn validate(&self) -> Result<(), RuleError> {
        check_fraction("ahu_min_oa", self.ahu_min_oa)?;
        check_column("economizer_sig_col", &self.economizer_sig_col)?;
        check_column("heating_sig_col", &self.heating_sig_col)?;
        check_column("cooling_sig_col", &self.cooling_sig_col)?;
        self.bucket.validate()?;
        Ok(())
    }
}

/// Short-cycling between operating modes
pub struct FaultConditionFour {
    config: Fc4Config,
    validator: Validator,
    observer: ObserverSlot,
}

impl FaultConditionFour {
    pub fn new(config: Fc4Config) -> Result<Self, RuleError> {
        config.validate()?;
        info!("Creating FC4 rule with config: {:?}", config);
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

    pub fn config(&self) -> &Fc4Config {
        &self.config
    }

    /// Per-row operating mode
    pub fn classify_rows(&self, table: &SensorTable) -> Result<Vec<Option<OperatingMode>>, RuleError> {
        let c = &self.config;
        let econ = table.float_column(&c.economizer_sig_col)?;
        let htg = table.float_column(&c.heating_sig_col)?;
        let clg = table.float_column(&c.cooling_sig_col)?;
        Ok(econ
            .iter()
            .zip(htg)
            .zip(clg)
            .map(|((&e, &h), &cl)| OperatingMode::classify(e, h, cl, c.ahu_min_oa))
            .collect())
    }

    fn mode_table(
        &self,
        table: &SensorTable,
        modes: &[Option<OperatingMode>],
    ) -> Result<SensorTable, RuleError> {
        let mut out = SensorTable::new(table.index().to_vec())?;
        for mode in OperatingMode::ALL {
            out.insert_column(
                mode.column_name(),
                ColumnData::flags(modes.iter().map(|m| *m == Some(mode))),
            )?;
        }
        Ok(out)
    }

    /// Count mode entries per bucket
    fn count_entries(
        &self,
        table: &SensorTable,
        modes: &[Option<OperatingMode>],
    ) -> Result<(i64, Vec<[i64; 4]>), RuleError> {
        let bucket = self.config.bucket;
        let index = table.index();
        let (Some(first), Some(last)) = (index.first(), index.last()) else {
            return Ok((0, Vec::new()));
        };
        let first_id = bucket.bucket_id(*first);
        let buckets = (bucket.bucket_id(*last) - first_id) as u64 + 1;
        if buckets > MAX_BUCKETS {
            return Err(RuleError::TooManyBuckets {
                buckets,
                max: MAX_BUCKETS,
            });
        }
        let span = buckets as usize;

        let mut counts = vec![[0i64; 4]; span];
        let mut previous: Option<OperatingMode> = None;
        for (ts, mode) in index.iter().zip(modes) {
            if let Some(mode) = mode {
                if previous != Some(*mode) {
                    let slot = (bucket.bucket_id(*ts) - first_id) as usize;
                    counts[slot][mode.slot()] += 1;
                }
            }
            previous = *mode;
        }
        Ok((first_id, counts))
    }
}

impl FaultRule for FaultConditionFour {
    fn code(&self) -> FaultCode {
        FaultCode::Fc4
    }

    fn contracts(&self) -> Vec<ColumnContract> {
        vec![
            ColumnContract::fraction(&self.config.economizer_sig_col),
            ColumnContract::fraction(&self.config.heating_sig_col),
            ColumnContract::fraction(&self.config.cooling_sig_col),
        ]
    }

    fn apply(&self, table: &SensorTable) -> Result<SensorTable, RuleError> {
        self.validator.validate(table, &self.contracts())?;

        let modes = self.classify_rows(table)?;
        if self.observer.is_some() {
            let per_row = self.mode_table(table, &modes)?;
            notify(&self.observer, self.code(), "operating_modes", &per_row);
        }

        let (first_id, counts) = self.count_entries(table, &modes)?;
        let bucket = self.config.bucket;
        let index = (0..counts.len() as i64)
            .map(|offset| bucket.bucket_start(first_id + offset))
            .collect::<Result<Vec<_>, _>>()?;

        let mut out = SensorTable::new(index)?;
        for mode in OperatingMode::ALL {
            let column = counts.iter().map(|c| c[mode.slot()]).collect();
            out.insert_column(mode.column_name(), ColumnData::Int(column))?;
        }
        let max = i64::from(self.config.delta_os_max);
        let flags: Vec<bool> = counts.iter().map(|c| c.iter().any(|&n| n > max)).collect();
        let flagged = flags.iter().filter(|&&f| f).count();
        out.insert_column(self.code().flag_column(), ColumnData::flags(flags))?;

        debug!(
            "{}: {} rows resampled into {} buckets, {} flagged",
            self.code(),
            table.len(),
            out.len(),
            flagged
        );
        notify(&self.observer, self.code(), "flagged", &out);
        Ok(out)
    }

    fn preserves_rows(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{flag_sum, start};
    use chrono::Duration;
    use proptest::prelude::*;
    use std::sync::Mutex;

    const MIN_OA: f64 = 0.2;

    fn signals_table(rows: &[(f64, f64, f64)], step: Duration) -> SensorTable {
        SensorTable::with_regular_index(start(), step, rows.len())
            .unwrap()
            .with_column("economizer_sig", ColumnData::Float(rows.iter().map(|r| r.0).collect()))
            .unwrap()
            .with_column("heating_sig", ColumnData::Float(rows.iter().map(|r| r.1).collect()))
            .unwrap()
            .with_column("cooling_sig", ColumnData::Float(rows.iter().map(|r| r.2).collect()))
            .unwrap()
    }

    fn rule(delta_os_max: u32) -> FaultConditionFour {
        FaultConditionFour::new(Fc4Config {
            delta_os_max,
            ahu_min_oa: MIN_OA,
            ..Default::default()
        })
        .unwrap()
    }

    /// Heating toggled on three times inside one hour
    fn three_heating_entries() -> SensorTable {
        let heat = (MIN_OA, 0.5, 0.0);
        let idle = (MIN_OA, 0.0, 0.0);
        signals_table(&[heat, idle, heat, idle, heat, idle], Duration::minutes(5))
    }

    #[test]
    fn test_classify_modes() {
        assert_eq!(OperatingMode::classify(0.2, 0.4, 0.0, 0.2), Some(OperatingMode::Heating));
        assert_eq!(OperatingMode::classify(0.6, 0.0, 0.0, 0.2), Some(OperatingMode::EconOnlyCooling));
        assert_eq!(OperatingMode::classify(1.0, 0.0, 0.3, 0.2), Some(OperatingMode::EconPlusMechCooling));
        assert_eq!(OperatingMode::classify(0.2, 0.0, 0.3, 0.2), Some(OperatingMode::MechCoolingOnly));
        // simultaneous heating and cooling matches nothing
        assert_eq!(OperatingMode::classify(0.2, 0.4, 0.3, 0.2), None);
        // all off with damper at minimum
        assert_eq!(OperatingMode::classify(0.2, 0.0, 0.0, 0.2), None);
    }

    #[test]
    fn test_flagged_when_entries_exceed_max() {
        let out = rule(2).apply(&three_heating_entries()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.int_column("heating_mode").unwrap(), &[3]);
        assert_eq!(out.int_column("fc4_flag").unwrap(), &[1]);
    }

    #[test]
    fn test_not_flagged_at_max() {
        let out = rule(3).apply(&three_heating_entries()).unwrap();
        assert_eq!(out.int_column("fc4_flag").unwrap(), &[0]);
    }

    #[test]
    fn test_first_row_counts_as_entry() {
        let econ = (0.7, 0.0, 0.0);
        let out = rule(7).apply(&signals_table(&[econ; 4], Duration::minutes(1))).unwrap();
        assert_eq!(out.int_column("econ_only_cooling_mode").unwrap(), &[1]);
        assert_eq!(out.int_column("heating_mode").unwrap(), &[0]);
    }

    #[test]
    fn test_mode_held_across_bucket_boundary_is_one_entry() {
        // 20-minute steps starting on the hour: rows at :00 :20 :40 and next hour :00 :20
        let mech = (MIN_OA, 0.0, 0.6);
        let out = rule(0).apply(&signals_table(&[mech; 5], Duration::minutes(20))).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.int_column("mech_cooling_only_mode").unwrap(), &[1, 0]);
        assert_eq!(out.int_column("fc4_flag").unwrap(), &[1, 0]);
    }

    #[test]
    fn test_switch_between_modes_counts_each_entry() {
        let heat = (MIN_OA, 0.5, 0.0);
        let econ = (0.8, 0.0, 0.0);
        let both = (0.9, 0.0, 0.4);
        let rows = [heat, econ, both, econ, heat];
        let out = rule(7).apply(&signals_table(&rows, Duration::minutes(1))).unwrap();
        assert_eq!(out.int_column("heating_mode").unwrap(), &[2]);
        assert_eq!(out.int_column("econ_only_cooling_mode").unwrap(), &[2]);
        assert_eq!(out.int_column("econ_plus_mech_cooling_mode").unwrap(), &[1]);
    }

    #[test]
    fn test_empty_buckets_emitted() {
        let heat = (MIN_OA, 0.5, 0.0);
        let t0 = start();
        let table = SensorTable::new(vec![t0, t0 + Duration::hours(3)])
            .unwrap()
            .with_column("economizer_sig", ColumnData::Float(vec![heat.0; 2]))
            .unwrap()
            .with_column("heating_sig", ColumnData::Float(vec![heat.1; 2]))
            .unwrap()
            .with_column("cooling_sig", ColumnData::Float(vec![heat.2; 2]))
            .unwrap();
        let out = rule(7).apply(&table).unwrap();
        assert_eq!(out.len(), 4);
        assert_eq!(out.index()[1], t0 + Duration::hours(1));
        // consecutive rows both heating: second is not a new entry
        assert_eq!(out.int_column("heating_mode").unwrap(), &[1, 0, 0, 0]);
    }

    #[test]
    fn test_configurable_bucket_width() {
        let config = Fc4Config {
            delta_os_max: 1,
            ahu_min_oa: MIN_OA,
            bucket: TimeBucket::Minutes(10),
            ..Default::default()
        };
        // six 5-minute rows -> three 10-minute buckets, one heating entry each
        let out = FaultConditionFour::new(config)
            .unwrap()
            .apply(&three_heating_entries())
            .unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out.int_column("heating_mode").unwrap(), &[1, 1, 1]);
        assert_eq!(flag_sum(&out, "fc4_flag"), 0);
    }

    #[test]
    fn test_bucket_span_bounded() {
        let config = Fc4Config {
            bucket: TimeBucket::Seconds(1),
            ..Default::default()
        };
        let t0 = start();
        let table = SensorTable::new(vec![t0, t0 + Duration::days(3 * 365)])
            .unwrap()
            .with_column("economizer_sig", ColumnData::Float(vec![MIN_OA; 2]))
            .unwrap()
            .with_column("heating_sig", ColumnData::Float(vec![0.5; 2]))
            .unwrap()
            .with_column("cooling_sig", ColumnData::Float(vec![0.0; 2]))
            .unwrap();
        let err = FaultConditionFour::new(config).unwrap().apply(&table).unwrap_err();
        assert!(matches!(
            err,
            RuleError::TooManyBuckets { buckets, max } if buckets == 3 * 365 * 86_400 + 1 && max == MAX_BUCKETS
        ));
    }

    #[test]
    fn test_empty_table() {
        let out = rule(7).apply(&signals_table(&[], Duration::minutes(1))).unwrap();
        assert!(out.is_empty());
        assert!(out.has_column("fc4_flag"));
    }

    #[test]
    fn test_percent_signals_rejected() {
        let table = signals_table(&[(20.0, 0.0, 0.0)], Duration::minutes(1));
        let err = rule(7).apply(&table).unwrap_err();
        assert!(err.is_type_error());
        assert!(err.to_string().starts_with("economizer_sig"));
    }

    #[test]
    fn test_observer_sees_per_row_modes() {
        struct Capture(Mutex<Vec<(String, usize)>>);
        impl RuleObserver for Capture {
            fn observe(&self, _code: FaultCode, stage: &str, table: &SensorTable) {
                self.0.lock().unwrap().push((stage.to_string(), table.len()));
            }
        }
        let capture = Arc::new(Capture(Mutex::new(Vec::new())));
        let rule = rule(2).with_observer(capture.clone());
        rule.apply(&three_heating_entries()).unwrap();
        let seen = capture.0.lock().unwrap();
        assert_eq!(
            *seen,
            vec![("operating_modes".to_string(), 6), ("flagged".to_string(), 1)]
        );
    }

    #[test]
    fn test_invalid_min_oa() {
        let err = FaultConditionFour::new(Fc4Config {
            ahu_min_oa: 20.0,
            ..Default::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, RuleError::Config(_)));
    }

    fn signal() -> impl Strategy<Value = f64> {
        prop_oneof![Just(0.0), Just(MIN_OA), 0.0..=1.0f64]
    }

    proptest! {
        #[test]
        fn modes_are_mutually_exclusive(econ in signal(), htg in signal(), clg in signal()) {
            let hits = OperatingMode::ALL
                .iter()
                .filter(|m| OperatingMode::classify(econ, htg, clg, MIN_OA) == Some(**m))
                .count();
            prop_assert!(hits <= 1);
        }

        #[test]
        fn entries_never_exceed_rows(rows in proptest::collection::vec((signal(), signal(), signal()), 1..120)) {
            let table = signals_table(&rows, Duration::minutes(1));
            let out = rule(7).apply(&table).unwrap();
            let total: i64 = OperatingMode::ALL
                .iter()
                .map(|m| out.int_column(m.column_name()).unwrap().iter().sum::<i64>())
                .sum();
            prop_assert!(total as usize <= rows.len());
        }
    }
}
