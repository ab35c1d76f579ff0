use std::{cmp::Ordering, fmt::Debug, hash::Hash};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    model::{
        error::RatingError,
        player::Player,
        structures::{rating_adjustment::RatingAdjustment, rating_adjustment_type::RatingAdjustmentType},
        volatility::{IllinoisSolver, VolatilitySolver}
    },
    utils::progress_utils::progress_bar
};

/// A competitor's place in the standings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing<K> {
    pub competitor_id: K,
    pub rank: usize,
    pub rating: f64,
    pub rating_deviation: f64,
    pub percentile: f64
}

/// Collects head-to-head results for a set of competitors and rates them all
/// when the period closes.
///
/// Results are recorded against each opponent's rating as it stood when the
/// result was recorded, which is the rating from before this period since no one
/// is updated until [`RatingPeriod::close`].
pub struct RatingPeriod<K, S = IllinoisSolver> {
    players: IndexMap<K, Player<S>>,
    show_progress: bool
}

impl<K, S> Default for RatingPeriod<K, S> {
    fn default() -> Self {
        RatingPeriod {
            players: IndexMap::new(),
            show_progress: false
        }
    }
}

impl<K, S> RatingPeriod<K, S>
where
    K: Hash + Eq + Clone + Debug + Send + Sync,
    S: VolatilitySolver + Clone + Send + Sync
{
    pub fn new() -> RatingPeriod<K, S> {
        RatingPeriod::default()
    }

    pub fn with_progress(mut self, show_progress: bool) -> RatingPeriod<K, S> {
        self.show_progress = show_progress;
        self
    }

    /// Adds a competitor, replacing and returning any previous one with the same id.
    pub fn insert(&mut self, id: K, player: Player<S>) -> Option<Player<S>> {
        self.players.insert(id, player)
    }

    pub fn get(&self, id: &K) -> Option<&Player<S>> {
        self.players.get(id)
    }

    pub fn get_mut(&mut self, id: &K) -> Option<&mut Player<S>> {
        self.players.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn players(&self) -> impl Iterator<Item = (&K, &Player<S>)> {
        self.players.iter()
    }

    pub fn into_players(self) -> IndexMap<K, Player<S>> {
        self.players
    }

    /// Records a game between `a` and `b`. `outcome` is from `a`'s point of view;
    /// `b` receives `1 - outcome`.
    pub fn record_match(&mut self, a: &K, b: &K, outcome: f64) -> Result<(), RatingError> {
        if a == b {
            return Err(RatingError::InvalidConfiguration(format!(
                "competitor {:?} cannot play itself",
                a
            )));
        }

        let (a_rating, a_rd) = self.public_rating(a)?;
        let (b_rating, b_rd) = self.public_rating(b)?;

        self.player_mut(a)?.record_result(b_rating, b_rd, outcome);
        self.player_mut(b)?.record_result(a_rating, a_rd, 1.0 - outcome);

        Ok(())
    }

    /// Runs the period update for every competitor, in parallel.
    ///
    /// Either every competitor is updated or, if any update fails, none are.
    pub fn close(&mut self, at: DateTime<Utc>) -> Result<Vec<RatingAdjustment<K>>, RatingError> {
        let bar = progress_bar(self.players.len() as u64, "Closing rating period".to_string(), self.show_progress);

        let updated: Vec<(Player<S>, RatingAdjustment<K>)> = self
            .players
            .par_iter()
            .map(|(id, player)| -> Result<(Player<S>, RatingAdjustment<K>), RatingError> {
                let adjustment_type = if player.pending_results().is_empty() {
                    RatingAdjustmentType::Idle
                } else {
                    RatingAdjustmentType::Period
                };

                let before = player.snapshot();
                let mut next = player.duplicate();
                let after = next.run_period_update(at)?;

                if let Some(bar) = &bar {
                    bar.inc(1);
                }

                Ok((next, RatingAdjustment::new(id.clone(), adjustment_type, &before, &after)))
            })
            .collect::<Result<_, _>>()?;

        if let Some(bar) = bar {
            bar.finish();
        }

        let mut adjustments = Vec::with_capacity(updated.len());
        for ((_, slot), (player, adjustment)) in self.players.iter_mut().zip(updated) {
            *slot = player;
            adjustments.push(adjustment);
        }

        info!(
            n_players = adjustments.len(),
            n_rated = adjustments
                .iter()
                .filter(|a| a.adjustment_type == RatingAdjustmentType::Period)
                .count(),
            "Rating period closed"
        );

        Ok(adjustments)
    }

    /// Applies fractional RD decay up to `at` for every competitor with a calculator attached.
    pub fn apply_decay(&mut self, at: DateTime<Utc>) -> Vec<RatingAdjustment<K>> {
        self.players
            .par_iter_mut()
            .filter(|(_, player)| player.calculator().is_some())
            .map(|(id, player)| {
                let before = player.snapshot();
                let after = player.advance_for_elapsed_time(at);

                RatingAdjustment::new(id.clone(), RatingAdjustmentType::Decay, &before, &after)
            })
            .collect()
    }

    /// Competitors ordered by public rating, highest first.
    /// Percentile is `P = (N - rank) / N * 100`.
    pub fn standings(&self) -> Vec<Standing<K>> {
        let total = self.players.len();

        self.players
            .iter()
            .sorted_by(|(_, a), (_, b)| b.rating().partial_cmp(&a.rating()).unwrap_or(Ordering::Equal))
            .enumerate()
            .map(|(i, (id, player))| {
                let rank = i + 1;
                Standing {
                    competitor_id: id.clone(),
                    rank,
                    rating: player.rating(),
                    rating_deviation: player.rating_deviation(),
                    percentile: (total - rank) as f64 / total as f64 * 100.0
                }
            })
            .collect()
    }

    fn public_rating(&self, id: &K) -> Result<(f64, f64), RatingError> {
        let player = self
            .players
            .get(id)
            .ok_or_else(|| RatingError::UnknownCompetitor(format!("{:?}", id)))?;

        Ok((player.rating(), player.rating_deviation()))
    }

    fn player_mut(&mut self, id: &K) -> Result<&mut Player<S>, RatingError> {
        self.players
            .get_mut(id)
            .ok_or_else(|| RatingError::UnknownCompetitor(format!("{:?}", id)))
    }
}
