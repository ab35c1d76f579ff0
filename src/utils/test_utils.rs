use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::model::{constants::DEFAULT_SYSTEM_CONSTANT, player::Player, rating_period::RatingPeriod};

/// A head-to-head result, `outcome` from `a`'s point of view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratedMatch {
    pub a: i32,
    pub b: i32,
    pub outcome: f64
}

pub fn generate_player(rating: f64, rating_deviation: f64, created_at: DateTime<Utc>) -> Player {
    Player::new_at(rating, rating_deviation, 0.06, DEFAULT_SYSTEM_CONSTANT, created_at)
        .unwrap_or_else(|e| panic!("Expected valid test player: {}", e))
}

/// Players 1..=n with ratings spread within ±300 of 1500, reproducible for a given seed.
pub fn generate_players(n: i32, seed: u64, created_at: DateTime<Utc>) -> Vec<(i32, Player)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    (1..=n)
        .map(|id| {
            let rating = 1500.0 + rng.random_range(-300.0..=300.0);
            let rating_deviation = rng.random_range(50.0..=350.0);

            (id, generate_player(rating, rating_deviation, created_at))
        })
        .collect()
}

/// `n_matches` random pairings between players 1..=n_players. Outcomes are wins,
/// losses or draws.
pub fn generate_matches(n_players: i32, n_matches: usize, seed: u64) -> Vec<GeneratedMatch> {
    if n_players < 2 {
        panic!("Need at least 2 players to generate matches");
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut matches = Vec::with_capacity(n_matches);

    while matches.len() < n_matches {
        let a = rng.random_range(1..=n_players);
        let b = rng.random_range(1..=n_players);
        if a == b {
            continue;
        }

        let outcome = match rng.random_range(0..3) {
            0 => 0.0,
            1 => 0.5,
            _ => 1.0
        };

        matches.push(GeneratedMatch { a, b, outcome });
    }

    matches
}

pub fn generate_rating_period(n_players: i32, n_matches: usize, seed: u64, created_at: DateTime<Utc>) -> RatingPeriod<i32> {
    let mut period = RatingPeriod::new();
    for (id, player) in generate_players(n_players, seed, created_at) {
        period.insert(id, player);
    }

    for m in generate_matches(n_players, n_matches, seed) {
        period
            .record_match(&m.a, &m.b, m.outcome)
            .unwrap_or_else(|e| panic!("Expected generated match to be valid: {}", e));
    }

    period
}
