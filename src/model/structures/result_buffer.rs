use serde::{Deserialize, Serialize};

use crate::model::scale::ScaleConverter;

/// A single result against an opponent, stored on the internal Glicko-2 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpponentResult {
    pub rating: f64,
    pub rating_deviation: f64,
    /// 1.0 = win, 0.5 = draw, 0.0 = loss. Fractional values are allowed.
    pub outcome: f64
}

/// Results recorded since the competitor's last period update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultBuffer {
    results: Vec<OpponentResult>
}

impl ResultBuffer {
    pub fn new() -> ResultBuffer {
        ResultBuffer { results: Vec::new() }
    }

    /// Converts the opponent's public rating and RD to the internal scale and appends the result.
    /// The outcome is stored as given; keeping it within [0, 1] is the caller's job.
    pub fn record(&mut self, opponent_rating: f64, opponent_rd: f64, outcome: f64) {
        let scale = ScaleConverter::STANDARD;

        self.results.push(OpponentResult {
            rating: scale.to_internal_rating(opponent_rating),
            rating_deviation: scale.to_internal_rd(opponent_rd),
            outcome
        });
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OpponentResult> {
        self.results.iter()
    }

    pub fn as_slice(&self) -> &[OpponentResult] {
        &self.results
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }
}
