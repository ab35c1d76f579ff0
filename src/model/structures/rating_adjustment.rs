use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::structures::{rating_adjustment_type::RatingAdjustmentType, rating_snapshot::RatingSnapshot};

/// Before/after record of one change to a competitor's rating, on the public scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingAdjustment<K> {
    pub competitor_id: K,
    pub adjustment_type: RatingAdjustmentType,
    pub rating_before: f64,
    pub rating_after: f64,
    pub rating_deviation_before: f64,
    pub rating_deviation_after: f64,
    pub volatility_before: f64,
    pub volatility_after: f64,
    pub timestamp: DateTime<Utc>
}

impl<K> RatingAdjustment<K> {
    pub fn new(
        competitor_id: K,
        adjustment_type: RatingAdjustmentType,
        before: &RatingSnapshot,
        after: &RatingSnapshot
    ) -> RatingAdjustment<K> {
        RatingAdjustment {
            competitor_id,
            adjustment_type,
            rating_before: before.rating,
            rating_after: after.rating,
            rating_deviation_before: before.rating_deviation,
            rating_deviation_after: after.rating_deviation,
            volatility_before: before.volatility,
            volatility_after: after.volatility,
            timestamp: after.last_update
        }
    }

    pub fn rating_delta(&self) -> f64 {
        self.rating_after - self.rating_before
    }

    pub fn rating_deviation_delta(&self) -> f64 {
        self.rating_deviation_after - self.rating_deviation_before
    }
}
