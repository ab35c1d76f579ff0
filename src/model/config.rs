use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    constants::{
        DEFAULT_PERIOD_LENGTH_MS, DEFAULT_RATING, DEFAULT_RATING_DEVIATION, DEFAULT_SYSTEM_CONSTANT,
        DEFAULT_VOLATILITY, MAX_SYSTEM_CONSTANT
    },
    decay::FractionalPeriodCalculator,
    error::{ensure_finite, ensure_positive, RatingError},
    player::Player,
    volatility::{AnySolver, VolatilityAlgorithm}
};

/// Settings shared by every competitor in a rating pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RatingConfig {
    /// System constant τ
    pub tau: f64,
    pub period_length_ms: i64,
    pub algorithm: VolatilityAlgorithm,
    /// Starting rating for new players. The public scale stays centered on 1500.
    pub default_rating: f64,
    pub default_rating_deviation: f64,
    pub default_volatility: f64
}

impl Default for RatingConfig {
    fn default() -> Self {
        RatingConfig {
            tau: DEFAULT_SYSTEM_CONSTANT,
            period_length_ms: DEFAULT_PERIOD_LENGTH_MS,
            algorithm: VolatilityAlgorithm::default(),
            default_rating: DEFAULT_RATING,
            default_rating_deviation: DEFAULT_RATING_DEVIATION,
            default_volatility: DEFAULT_VOLATILITY
        }
    }
}

impl RatingConfig {
    pub fn validate(&self) -> Result<(), RatingError> {
        ensure_positive("tau", self.tau)?;
        if self.tau > MAX_SYSTEM_CONSTANT {
            return Err(RatingError::InvalidConfiguration(format!(
                "tau must be at most {}, got {}",
                MAX_SYSTEM_CONSTANT, self.tau
            )));
        }

        ensure_finite("default rating", self.default_rating)?;
        ensure_positive("default rating deviation", self.default_rating_deviation)?;
        ensure_positive("default volatility", self.default_volatility)?;
        FractionalPeriodCalculator::new(self.period_length_ms)?;

        Ok(())
    }

    pub fn calculator(&self) -> Result<Arc<FractionalPeriodCalculator>, RatingError> {
        Ok(Arc::new(FractionalPeriodCalculator::new(self.period_length_ms)?))
    }

    pub fn solver(&self) -> AnySolver {
        AnySolver::from(self.algorithm)
    }

    /// A player using this configuration's τ and solver. Missing values fall back to the defaults.
    pub fn player(
        &self,
        rating: Option<f64>,
        rating_deviation: Option<f64>,
        volatility: Option<f64>,
        created_at: DateTime<Utc>
    ) -> Result<Player<AnySolver>, RatingError> {
        Player::with_solver(
            rating.unwrap_or(self.default_rating),
            rating_deviation.unwrap_or(self.default_rating_deviation),
            volatility.unwrap_or(self.default_volatility),
            self.tau,
            self.solver(),
            created_at
        )
    }
}
