use std::{fs, path::Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::model::{
    config::RatingConfig,
    error::RatingError,
    rating_period::{RatingPeriod, Standing},
    structures::rating_adjustment::RatingAdjustment,
    volatility::AnySolver
};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse input: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Rating(#[from] RatingError)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInput {
    pub id: String,
    pub rating: Option<f64>,
    pub rating_deviation: Option<f64>,
    pub volatility: Option<f64>,
    pub last_update: Option<DateTime<Utc>>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchInput {
    pub a: String,
    pub b: String,
    /// From `a`'s point of view
    pub outcome: f64
}

/// One rating period as read from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodInput {
    pub players: Vec<PlayerInput>,
    #[serde(default)]
    pub matches: Vec<MatchInput>,
    pub closed_at: Option<DateTime<Utc>>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodOutput {
    pub adjustments: Vec<RatingAdjustment<String>>,
    pub standings: Vec<Standing<String>>
}

impl PeriodInput {
    pub fn from_path(path: &Path) -> Result<PeriodInput, InputError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Builds the period, optionally decays every player up to the close time, then closes it.
    pub fn process(&self, config: &RatingConfig, decay: bool, show_progress: bool) -> Result<PeriodOutput, InputError> {
        config.validate()?;

        let closed_at = self.closed_at.unwrap_or_else(Utc::now);
        let calculator = config.calculator()?;
        let mut period: RatingPeriod<String, AnySolver> = RatingPeriod::new().with_progress(show_progress);

        for p in &self.players {
            let mut player = config.player(
                p.rating,
                p.rating_deviation,
                p.volatility,
                p.last_update.unwrap_or(closed_at)
            )?;

            if decay {
                player.attach_fractional_calculator(calculator.clone());
            }

            period.insert(p.id.clone(), player);
        }

        info!(n_players = period.len(), n_matches = self.matches.len(), "Input loaded");

        for m in &self.matches {
            period.record_match(&m.a, &m.b, m.outcome)?;
        }

        let mut adjustments = Vec::new();
        if decay {
            adjustments.extend(period.apply_decay(closed_at));
        }
        adjustments.extend(period.close(closed_at)?);

        Ok(PeriodOutput {
            adjustments,
            standings: period.standings()
        })
    }
}
