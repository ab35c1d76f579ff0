use std::f64::consts::PI;

use tracing::debug;

use crate::model::{
    error::RatingError,
    structures::result_buffer::OpponentResult,
    volatility::{VolatilityContext, VolatilitySolver}
};

/// Rating, RD and volatility on the internal Glicko-2 scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glicko2State {
    pub rating: f64,
    pub rating_deviation: f64,
    pub volatility: f64
}

/// Discounts an opponent's influence by their uncertainty.
pub fn g(rating_deviation: f64) -> f64 {
    1.0 / (1.0 + 3.0 * rating_deviation.powi(2) / PI.powi(2)).sqrt()
}

/// Expected score against an opponent, all values on the internal scale.
pub fn expected_score(rating: f64, opponent_rating: f64, opponent_rd: f64) -> f64 {
    1.0 / (1.0 + (-g(opponent_rd) * (rating - opponent_rating)).exp())
}

/// RD growth for a period without results: `sqrt(RD² + σ²)`.
pub fn inflate_rd(rating_deviation: f64, volatility: f64) -> f64 {
    (rating_deviation.powi(2) + volatility.powi(2)).sqrt()
}

/// # Glicko-2 period update
///
/// Computes the state at the end of a rating period from the state at its start
/// and the results recorded during it. Nothing is mutated, so a solver failure leaves
/// the caller's state as it was.
///
/// Steps:
/// 1. With no results, only the RD grows: `RD' = sqrt(RD² + σ²)`.
/// 2. Otherwise compute the estimated variance `v` and improvement `delta`.
/// 3. Solve for the new volatility `σ'`.
/// 4. Inflate the *pre-period* RD with the *new* volatility.
/// 5. Combine with `v` to get the new RD, then move the rating.
pub fn rate<S: VolatilitySolver + ?Sized>(
    state: Glicko2State,
    results: &[OpponentResult],
    tau: f64,
    solver: &S
) -> Result<Glicko2State, RatingError> {
    if results.is_empty() {
        return Ok(Glicko2State {
            rating_deviation: inflate_rd(state.rating_deviation, state.volatility),
            ..state
        });
    }

    let mut variance_inv = 0.0;
    let mut improvement_sum = 0.0;

    for result in results {
        let g_j = g(result.rating_deviation);
        let e_j = expected_score(state.rating, result.rating, result.rating_deviation);

        variance_inv += g_j.powi(2) * e_j * (1.0 - e_j);
        improvement_sum += g_j * (result.outcome - e_j);
    }

    let v = 1.0 / variance_inv;
    let delta = v * improvement_sum;

    let volatility = solver.solve(
        v,
        delta,
        &VolatilityContext {
            volatility: state.volatility,
            tau,
            rating_deviation: state.rating_deviation,
            rating: state.rating
        }
    )?;

    // Order matters here: the new volatility inflates the RD from before this period
    let pre_rating_rd = inflate_rd(state.rating_deviation, volatility);
    let rating_deviation = 1.0 / (1.0 / pre_rating_rd.powi(2) + 1.0 / v).sqrt();
    let rating = state.rating + rating_deviation.powi(2) * improvement_sum;

    debug!(
        n_results = results.len(),
        v,
        delta,
        rating_before = state.rating,
        rating_after = rating,
        rd_after = rating_deviation,
        volatility_after = volatility,
        "Glicko-2 period update"
    );

    Ok(Glicko2State {
        rating,
        rating_deviation,
        volatility
    })
}
