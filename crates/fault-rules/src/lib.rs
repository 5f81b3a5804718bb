//! AHU Fault Condition Rules
//!
//! Implements ASHRAE Guideline 36 fault conditions for air-handling units as
//! pure transformations over a [`SensorTable`]: each rule validates its input
//! columns, evaluates its fault signature and returns a new table with an
//! `fc{N}_flag` column (0/1) appended.
//!
//! FC4 is the exception: it resamples into fixed time buckets and returns one
//! row per bucket.

mod bucket;
mod error;
mod fc1;
mod fc10;
mod fc4;
mod fc5;
mod fc6;
mod fc7;
mod mixed_air;
mod observer;
mod rule;
mod window;

#[cfg(test)]
mod test_util;

pub use bucket::TimeBucket;
pub use error::{ConfigError, RuleError};
pub use fc1::{Fc1Config, FaultConditionOne};
pub use fc10::{Fc10Config, FaultConditionTen};
pub use fc4::{Fc4Config, FaultConditionFour, OperatingMode};
pub use fc5::{Fc5Config, FaultConditionFive};
pub use fc6::{AirflowEstimate, Fc6Config, FaultConditionSix, PERCENT_OA_CALC_COL, PERC_OA_MIN_COL};
pub use fc7::{Fc7Config, FaultConditionSeven};
pub use mixed_air::{FaultConditionThree, FaultConditionTwo, MixedAirConfig};
pub use observer::{RuleObserver, TracingObserver};
pub use rule::{FaultCode, FaultRule};
pub use window::persist;

pub use sensor_table::SensorTable;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::float_table;
    use proptest::prelude::*;

    fn all_rules() -> Vec<Box<dyn FaultRule>> {
        vec![
            Box::new(FaultConditionOne::new(Fc1Config::default()).unwrap()),
            Box::new(FaultConditionTwo::new(MixedAirConfig::default()).unwrap()),
            Box::new(FaultConditionThree::new(MixedAirConfig::default()).unwrap()),
            Box::new(FaultConditionFour::new(Fc4Config::default()).unwrap()),
            Box::new(FaultConditionFive::new(Fc5Config::default()).unwrap()),
            Box::new(FaultConditionSix::new(Fc6Config::default()).unwrap()),
            Box::new(FaultConditionSeven::new(Fc7Config::default()).unwrap()),
            Box::new(FaultConditionTen::new(Fc10Config::default()).unwrap()),
        ]
    }

    #[test]
    fn test_config_accessors() {
        let fc4 = Fc4Config {
            delta_os_max: 3,
            bucket: TimeBucket::Minutes(15),
            ..Default::default()
        };
        assert_eq!(FaultConditionFour::new(fc4.clone()).unwrap().config(), &fc4);

        let mixed = MixedAirConfig {
            mix_degf_err_thres: 3.0,
            ..Default::default()
        };
        assert_eq!(FaultConditionTwo::new(mixed.clone()).unwrap().config(), &mixed);
        assert_eq!(FaultConditionThree::new(mixed.clone()).unwrap().config(), &mixed);
        assert_eq!(FaultConditionFive::new(Fc5Config::default()).unwrap().config(), &Fc5Config::default());
        assert_eq!(FaultConditionSix::new(Fc6Config::default()).unwrap().config(), &Fc6Config::default());
        assert_eq!(FaultConditionSeven::new(Fc7Config::default()).unwrap().config(), &Fc7Config::default());
        assert_eq!(FaultConditionTen::new(Fc10Config::default()).unwrap().config(), &Fc10Config::default());
    }

    proptest! {
        #[test]
        fn apply_is_pure(
            temps in proptest::collection::vec((30.0..90.0f64, 30.0..90.0f64, 30.0..90.0f64, 500.0..20_000.0f64), 1..40),
            signals in proptest::collection::vec((0.0..=1.0f64, 0.0..=1.0f64, 0.0..=1.0f64, 0.0..=1.0f64, 0.0..2.0f64), 40),
        ) {
            let rows = temps.len();
            let signals = &signals[..rows];
            let table = float_table(&[
                ("mat", temps.iter().map(|r| r.0).collect()),
                ("rat", temps.iter().map(|r| r.1).collect()),
                ("oat", temps.iter().map(|r| r.2).collect()),
                ("sat", temps.iter().map(|r| r.0 + 1.0).collect()),
                ("sat_setpoint", vec![55.0; rows]),
                ("supply_fan_air_volume", temps.iter().map(|r| r.3).collect()),
                ("supply_vfd_speed", signals.iter().map(|s| s.0).collect()),
                ("economizer_sig", signals.iter().map(|s| s.1).collect()),
                ("heating_sig", signals.iter().map(|s| s.2).collect()),
                ("cooling_sig", signals.iter().map(|s| s.3).collect()),
                ("duct_static", signals.iter().map(|s| s.4).collect()),
                ("duct_static_setpoint", vec![1.0; rows]),
            ]);
            let snapshot = table.clone();
            for rule in all_rules() {
                let first = rule.apply(&table).unwrap();
                let second = rule.apply(&table).unwrap();
                let flag = rule.flag_column();
                prop_assert_eq!(first.index(), second.index());
                prop_assert_eq!(first.int_column(&flag).unwrap(), second.int_column(&flag).unwrap());
                if rule.preserves_rows() {
                    prop_assert_eq!(first.len(), table.len());
                } else {
                    prop_assert_eq!(rule.code(), FaultCode::Fc4);
                    prop_assert!(first.len() <= table.len());
                }
            }
            prop_assert_eq!(&table, &snapshot);
        }
    }
}
