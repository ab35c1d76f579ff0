use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    constants::{HINT_PENALTY_WEIGHT, PUZZLE_MIN_RD, TIME_PENALTY_WEIGHT},
    error::RatingError,
    player::Player,
    structures::rating_snapshot::RatingSnapshot,
    volatility::VolatilitySolver
};

/// A puzzle treated as the opponent of whoever attempts it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    pub rating: f64,
    pub rating_deviation: f64
}

impl Puzzle {
    /// RD used for the puzzle as an opponent. Floored so a long-lived puzzle
    /// never counts as a perfectly known quantity.
    pub fn opponent_rd(&self) -> f64 {
        self.rating_deviation.max(PUZZLE_MIN_RD)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleAttempt {
    pub solved: bool,
    pub solve_time_ms: i64,
    /// Time a solver at the puzzle's rating is expected to take
    pub par_time_ms: i64,
    pub hints_used: u32,
    pub hint_count: u32
}

impl PuzzleAttempt {
    /// Score in [0, 1]. An unsolved puzzle is a loss; a solve loses credit for
    /// going over par and for each hint taken.
    pub fn outcome(&self) -> f64 {
        if !self.solved {
            return 0.0;
        }

        (1.0 - self.time_penalty() - self.hint_penalty()).clamp(0.0, 1.0)
    }

    fn time_penalty(&self) -> f64 {
        if self.par_time_ms <= 0 {
            return 0.0;
        }

        let ratio = self.solve_time_ms as f64 / self.par_time_ms as f64;
        TIME_PENALTY_WEIGHT * (ratio - 1.0).max(0.0)
    }

    fn hint_penalty(&self) -> f64 {
        if self.hint_count == 0 {
            return 0.0;
        }

        let used = self.hints_used.min(self.hint_count);
        HINT_PENALTY_WEIGHT * used as f64 / self.hint_count as f64
    }
}

impl<S: VolatilitySolver> Player<S> {
    /// Rates a puzzle attempt immediately, with the puzzle as the opponent.
    pub fn solve_puzzle(
        &mut self,
        puzzle: &Puzzle,
        attempt: &PuzzleAttempt,
        at: DateTime<Utc>
    ) -> Result<RatingSnapshot, RatingError> {
        self.instant_update(puzzle.rating, puzzle.opponent_rd(), attempt.outcome(), at)
    }
}
