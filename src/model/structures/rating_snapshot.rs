use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A competitor's rating as seen from outside, on the public scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSnapshot {
    pub rating: f64,
    pub rating_deviation: f64,
    pub volatility: f64,
    pub last_update: DateTime<Utc>
}

impl RatingSnapshot {
    /// 95% confidence interval around the rating.
    pub fn interval(&self) -> (f64, f64) {
        (
            self.rating - 1.96 * self.rating_deviation,
            self.rating + 1.96 * self.rating_deviation
        )
    }
}
