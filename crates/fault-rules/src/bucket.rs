//! Fixed-width time buckets for resampling.
//!
//! Bucket ids count forward from the Unix epoch in whole bucket widths, so
//! an hourly bucket always starts on the hour. Ids are signed and computed
//! with Euclidean division, which keeps them monotonic for pre-epoch data.

use crate::error::{ConfigError, RuleError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * 60;

/// Resampling bucket width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBucket {
    Seconds(u32),
    Minutes(u32),
    Hours(u32),
}

impl Default for TimeBucket {
    fn default() -> Self {
        TimeBucket::Hours(1)
    }
}

impl TimeBucket {
    /// Bucket width in whole seconds
    pub fn len_secs(&self) -> i64 {
        match *self {
            TimeBucket::Seconds(n) => n as i64,
            TimeBucket::Minutes(n) => (n as i64) * SECONDS_PER_MINUTE,
            TimeBucket::Hours(n) => (n as i64) * SECONDS_PER_HOUR,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.len_secs() > 0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidBucket)
        }
    }

    /// Bucket id containing `ts`
    pub fn bucket_id(&self, ts: DateTime<Utc>) -> i64 {
        ts.timestamp().div_euclid(self.len_secs())
    }

    /// Start timestamp of bucket `id`
    pub fn bucket_start(&self, id: i64) -> Result<DateTime<Utc>, RuleError> {
        let secs = id
            .checked_mul(self.len_secs())
            .ok_or(RuleError::BucketOutOfRange(id))?;
        DateTime::<Utc>::from_timestamp(secs, 0).ok_or(RuleError::BucketOutOfRange(secs))
    }
}
