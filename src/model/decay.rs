use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{constants::DEFAULT_PERIOD_LENGTH_MS, error::RatingError};

/// # How this works
/// - A rating period has a fixed length, P (here, `period_length`).
/// - The competitor's RD was last finalized at time T.
/// - At time D the competitor has been idle for (D - T) / P periods. This is
///     usually not a whole number.
/// - The RD at time D is `sqrt(RD² + periods * σ²)`, the idle-period inflation of
///     Glicko-2 stretched over a fractional number of periods.
///
/// # Rules
/// - Elapsed periods are never negative. If D is before T, no time has passed.
/// - RD and σ must be on the same scale. Competitors always pass internal-scale values.
///
/// The calculator holds nothing but the period length and may be shared by any
/// number of competitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FractionalPeriodCalculator {
    period_length_ms: i64
}

impl Default for FractionalPeriodCalculator {
    fn default() -> Self {
        FractionalPeriodCalculator {
            period_length_ms: DEFAULT_PERIOD_LENGTH_MS
        }
    }
}

impl FractionalPeriodCalculator {
    pub fn new(period_length_ms: i64) -> Result<FractionalPeriodCalculator, RatingError> {
        if period_length_ms <= 0 {
            return Err(RatingError::InvalidConfiguration(format!(
                "period length must be positive, got {}ms",
                period_length_ms
            )));
        }

        Ok(FractionalPeriodCalculator { period_length_ms })
    }

    pub fn from_duration(period_length: Duration) -> Result<FractionalPeriodCalculator, RatingError> {
        Self::new(period_length.num_milliseconds())
    }

    pub fn period_length(&self) -> Duration {
        Duration::milliseconds(self.period_length_ms)
    }

    pub fn period_length_ms(&self) -> i64 {
        self.period_length_ms
    }

    /// The number of (possibly partial) periods between the last update and `now`.
    pub fn elapsed_periods(&self, last_update: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
        let elapsed_ms = (now - last_update).num_milliseconds();

        (elapsed_ms as f64 / self.period_length_ms as f64).max(0.0)
    }

    /// RD after `last_update` has sat idle until `now`.
    pub fn decay_between(
        &self,
        rating_deviation: f64,
        volatility: f64,
        last_update: DateTime<Utc>,
        now: DateTime<Utc>
    ) -> f64 {
        decayed_rd(rating_deviation, volatility, self.elapsed_periods(last_update, now))
    }
}

/// `sqrt(RD² + periods * σ²)`
pub fn decayed_rd(rating_deviation: f64, volatility: f64, elapsed_periods: f64) -> f64 {
    (rating_deviation.powi(2) + elapsed_periods * volatility.powi(2)).sqrt()
}
