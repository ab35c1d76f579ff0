use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::model::{
    constants::MAX_SYSTEM_CONSTANT,
    decay::FractionalPeriodCalculator,
    error::{ensure_finite, ensure_positive, RatingError},
    glicko::{self, Glicko2State},
    scale::ScaleConverter,
    structures::{rating_snapshot::RatingSnapshot, result_buffer::ResultBuffer},
    volatility::{IllinoisSolver, VolatilitySolver}
};

const SCALE: ScaleConverter = ScaleConverter::STANDARD;

/// A competitor's Glicko-2 rating.
///
/// Rating and RD are stored on the internal Glicko-2 scale and exposed on the
/// public scale. Results are buffered until [`Player::run_period_update`] consumes
/// them. When a [`FractionalPeriodCalculator`] is attached, RD also grows
/// continuously with the time since `last_update`.
///
/// Cloning a player (see [`Player::duplicate`]) copies all of its state; the
/// calculator handle is shared.
#[derive(Debug, Clone)]
pub struct Player<S = IllinoisSolver> {
    rating: f64,
    rating_deviation: f64,
    volatility: f64,
    system_constant: f64,
    results: ResultBuffer,
    last_update: DateTime<Utc>,
    calculator: Option<Arc<FractionalPeriodCalculator>>,
    solver: S
}

impl Player<IllinoisSolver> {
    /// Creates a player from public-scale values, last updated now.
    pub fn new(rating: f64, rating_deviation: f64, volatility: f64, system_constant: f64) -> Result<Self, RatingError> {
        Self::new_at(rating, rating_deviation, volatility, system_constant, Utc::now())
    }

    pub fn new_at(
        rating: f64,
        rating_deviation: f64,
        volatility: f64,
        system_constant: f64,
        created_at: DateTime<Utc>
    ) -> Result<Self, RatingError> {
        Player::with_solver(
            rating,
            rating_deviation,
            volatility,
            system_constant,
            IllinoisSolver::default(),
            created_at
        )
    }
}

impl<S: VolatilitySolver> Player<S> {
    pub fn with_solver(
        rating: f64,
        rating_deviation: f64,
        volatility: f64,
        system_constant: f64,
        solver: S,
        created_at: DateTime<Utc>
    ) -> Result<Self, RatingError> {
        ensure_finite("rating", rating)?;
        ensure_positive("rating deviation", rating_deviation)?;
        ensure_positive("volatility", volatility)?;
        ensure_positive("system constant", system_constant)?;

        if system_constant > MAX_SYSTEM_CONSTANT {
            return Err(RatingError::InvalidConfiguration(format!(
                "system constant must be at most {}, got {}",
                MAX_SYSTEM_CONSTANT, system_constant
            )));
        }

        Ok(Player {
            rating: SCALE.to_internal_rating(rating),
            rating_deviation: SCALE.to_internal_rd(rating_deviation),
            volatility,
            system_constant,
            results: ResultBuffer::new(),
            last_update: created_at,
            calculator: None,
            solver
        })
    }

    pub fn rating(&self) -> f64 {
        SCALE.to_public_rating(self.rating)
    }

    pub fn set_rating(&mut self, rating: f64) -> Result<(), RatingError> {
        self.rating = SCALE.to_internal_rating(ensure_finite("rating", rating)?);
        Ok(())
    }

    pub fn rating_deviation(&self) -> f64 {
        SCALE.to_public_rd(self.rating_deviation)
    }

    pub fn set_rating_deviation(&mut self, rating_deviation: f64) -> Result<(), RatingError> {
        self.rating_deviation = SCALE.to_internal_rd(ensure_positive("rating deviation", rating_deviation)?);
        Ok(())
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn set_volatility(&mut self, volatility: f64) -> Result<(), RatingError> {
        self.volatility = ensure_positive("volatility", volatility)?;
        Ok(())
    }

    pub fn system_constant(&self) -> f64 {
        self.system_constant
    }

    pub fn last_update(&self) -> DateTime<Utc> {
        self.last_update
    }

    pub fn pending_results(&self) -> &ResultBuffer {
        &self.results
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn calculator(&self) -> Option<&Arc<FractionalPeriodCalculator>> {
        self.calculator.as_ref()
    }

    /// Rating, RD and volatility on the internal scale.
    pub fn internal_state(&self) -> Glicko2State {
        Glicko2State {
            rating: self.rating,
            rating_deviation: self.rating_deviation,
            volatility: self.volatility
        }
    }

    /// Stored state on the public scale, without any time decay.
    pub fn snapshot(&self) -> RatingSnapshot {
        RatingSnapshot {
            rating: self.rating(),
            rating_deviation: self.rating_deviation(),
            volatility: self.volatility,
            last_update: self.last_update
        }
    }

    /// Expected score against an opponent given on the public scale.
    pub fn expected_score(&self, opponent_rating: f64, opponent_rd: f64) -> f64 {
        glicko::expected_score(
            self.rating,
            SCALE.to_internal_rating(opponent_rating),
            SCALE.to_internal_rd(opponent_rd)
        )
    }

    /// Buffers a result against an opponent given on the public scale.
    /// `outcome` is expected in [0, 1] and is not checked.
    pub fn record_result(&mut self, opponent_rating: f64, opponent_rd: f64, outcome: f64) {
        self.results.record(opponent_rating, opponent_rd, outcome);
    }

    /// Runs the Glicko-2 update over the buffered results and clears the buffer.
    ///
    /// With an empty buffer only the RD grows by one period. On error nothing changes,
    /// including the buffer.
    pub fn run_period_update(&mut self, at: DateTime<Utc>) -> Result<RatingSnapshot, RatingError> {
        let state = glicko::rate(
            self.internal_state(),
            self.results.as_slice(),
            self.system_constant,
            &self.solver
        )?;

        debug!(n_results = self.results.len(), rating = SCALE.to_public_rating(state.rating), "Period update applied");

        self.apply(state);
        self.results.clear();
        self.touch(at);

        Ok(self.snapshot())
    }

    pub fn run_period_update_now(&mut self) -> Result<RatingSnapshot, RatingError> {
        self.run_period_update(Utc::now())
    }

    pub fn attach_fractional_calculator(&mut self, calculator: Arc<FractionalPeriodCalculator>) {
        self.calculator = Some(calculator);
    }

    pub fn detach_fractional_calculator(&mut self) -> Option<Arc<FractionalPeriodCalculator>> {
        self.calculator.take()
    }

    /// Grows the stored RD for the time elapsed since `last_update` and moves
    /// `last_update` forward to `at`.
    ///
    /// Without a calculator the RD is left alone and only the timestamp moves.
    pub fn advance_for_elapsed_time(&mut self, at: DateTime<Utc>) -> RatingSnapshot {
        self.rating_deviation = self.decayed_internal_rd(at);
        self.touch(at);

        self.snapshot()
    }

    /// The state this player would have at `at` if decay were applied, without changing anything.
    /// `last_update` in the result is the stored one.
    pub fn current_state_at(&self, at: DateTime<Utc>) -> RatingSnapshot {
        RatingSnapshot {
            rating_deviation: SCALE.to_public_rd(self.decayed_internal_rd(at)),
            ..self.snapshot()
        }
    }

    pub fn current_state(&self) -> RatingSnapshot {
        self.current_state_at(Utc::now())
    }

    /// Applies a single result immediately instead of waiting for the period to close.
    ///
    /// RD is first decayed up to `at`, then the result is rated on its own and
    /// `last_update` becomes `at`. Buffered results are left for the next period
    /// update. On error nothing changes.
    pub fn instant_update(
        &mut self,
        opponent_rating: f64,
        opponent_rd: f64,
        outcome: f64,
        at: DateTime<Utc>
    ) -> Result<RatingSnapshot, RatingError> {
        let decayed = Glicko2State {
            rating_deviation: self.decayed_internal_rd(at),
            ..self.internal_state()
        };

        let mut single = ResultBuffer::new();
        single.record(opponent_rating, opponent_rd, outcome);

        let state = glicko::rate(decayed, single.as_slice(), self.system_constant, &self.solver)?;

        debug!(
            opponent_rating,
            outcome,
            rating = SCALE.to_public_rating(state.rating),
            "Instant update applied"
        );

        self.apply(state);
        self.touch(at);

        Ok(self.snapshot())
    }

    fn decayed_internal_rd(&self, at: DateTime<Utc>) -> f64 {
        match &self.calculator {
            Some(calculator) => calculator.decay_between(self.rating_deviation, self.volatility, self.last_update, at),
            None => self.rating_deviation
        }
    }

    fn apply(&mut self, state: Glicko2State) {
        self.rating = state.rating;
        self.rating_deviation = state.rating_deviation;
        self.volatility = state.volatility;
    }

    /// `last_update` never moves backwards.
    fn touch(&mut self, at: DateTime<Utc>) {
        self.last_update = self.last_update.max(at);
    }
}

impl<S: VolatilitySolver + Clone> Player<S> {
    /// Independent copy for exploring a rating trajectory without touching this player.
    pub fn duplicate(&self) -> Player<S> {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::model::{
        decay::{decayed_rd, FractionalPeriodCalculator},
        error::RatingError,
        player::Player,
        scale::ScaleConverter,
        volatility::{NewtonSolver, VolatilityContext, VolatilitySolver}
    };
    use approx::assert_abs_diff_eq;
    use chrono::{DateTime, Duration, Utc};

    #[derive(Debug, Clone)]
    struct FailingSolver;

    impl VolatilitySolver for FailingSolver {
        fn solve(&self, _v: f64, _delta: f64, _context: &VolatilityContext) -> Result<f64, RatingError> {
            Err(RatingError::NonConvergence { iterations: 0 })
        }
    }

    fn epoch() -> DateTime<Utc> {
        "2024-01-01T00:00:00Z".parse().unwrap()
    }

    fn daily() -> Arc<FractionalPeriodCalculator> {
        Arc::new(FractionalPeriodCalculator::new(24 * 60 * 60 * 1000).unwrap())
    }

    fn test_player() -> Player {
        Player::new_at(1500.0, 100.0, 0.06, 0.5, epoch()).unwrap()
    }

    #[test]
    fn test_new_exposes_public_values() {
        let player = Player::new_at(1732.0, 80.0, 0.07, 0.5, epoch()).unwrap();

        assert_abs_diff_eq!(player.rating(), 1732.0, epsilon = 1e-9);
        assert_abs_diff_eq!(player.rating_deviation(), 80.0, epsilon = 1e-9);
        assert_eq!(player.volatility(), 0.07);
        assert_eq!(player.system_constant(), 0.5);
        assert_eq!(player.last_update(), epoch());
        assert!(player.pending_results().is_empty());
        assert!(player.calculator().is_none());
    }

    #[test]
    fn test_new_rejects_invalid_configuration() {
        assert!(Player::new_at(1500.0, 0.0, 0.06, 0.5, epoch()).is_err());
        assert!(Player::new_at(1500.0, 100.0, -0.06, 0.5, epoch()).is_err());
        assert!(Player::new_at(1500.0, 100.0, 0.06, 0.0, epoch()).is_err());
        assert!(Player::new_at(1500.0, 100.0, 0.06, 25.0, epoch()).is_err());
        assert!(Player::new_at(f64::NAN, 100.0, 0.06, 0.5, epoch()).is_err());
    }

    #[test]
    fn test_internal_state_is_scaled() {
        let player = Player::new_at(1400.0, 200.0, 0.06, 0.5, epoch()).unwrap();
        let state = player.internal_state();

        assert_abs_diff_eq!(state.rating, -0.5756, epsilon = 1e-4);
        assert_abs_diff_eq!(state.rating_deviation, 1.1513, epsilon = 1e-4);
    }

    #[test]
    fn test_setters() {
        let mut player = test_player();
        player.set_rating(1800.0).unwrap();
        player.set_rating_deviation(45.0).unwrap();
        player.set_volatility(0.05).unwrap();

        assert_abs_diff_eq!(player.rating(), 1800.0, epsilon = 1e-9);
        assert_abs_diff_eq!(player.rating_deviation(), 45.0, epsilon = 1e-9);
        assert_eq!(player.volatility(), 0.05);
    }

    #[test]
    fn test_setters_reject_non_positive() {
        let mut player = test_player();

        assert!(player.set_rating_deviation(0.0).is_err());
        assert!(player.set_volatility(0.0).is_err());
        assert!(player.set_rating(f64::INFINITY).is_err());
        assert_abs_diff_eq!(player.rating_deviation(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_expected_score_between_equals() {
        let player = test_player();
        assert_abs_diff_eq!(player.expected_score(1500.0, 100.0), 0.5);
    }

    #[test]
    fn test_win_against_stronger_opponent() {
        let mut player = test_player();
        player.record_result(1600.0, 50.0, 1.0);

        let snapshot = player.run_period_update(epoch() + Duration::days(1)).unwrap();

        assert!(snapshot.rating > 1500.0);
        assert!(snapshot.rating_deviation < 100.0);
        assert!(player.pending_results().is_empty());
        assert_eq!(snapshot.last_update, epoch() + Duration::days(1));
    }

    #[test]
    fn test_loss_against_weaker_opponent() {
        let mut player = test_player();
        player.record_result(1400.0, 50.0, 0.0);

        let snapshot = player.run_period_update(epoch()).unwrap();
        assert!(snapshot.rating < 1500.0);
    }

    #[test]
    fn test_buffer_cleared_between_periods() {
        let mut once = test_player();
        once.record_result(1600.0, 50.0, 1.0);
        once.run_period_update(epoch()).unwrap();
        let after_first = once.snapshot();

        // A second period without results must not replay the win
        let idle = once.run_period_update(epoch()).unwrap();

        assert_abs_diff_eq!(idle.rating, after_first.rating, epsilon = 1e-9);
        assert!(idle.rating_deviation > after_first.rating_deviation);
    }

    #[test]
    fn test_idle_period() {
        let mut player = test_player();
        let snapshot = player.run_period_update(epoch()).unwrap();

        let scale = ScaleConverter::default();
        let expected = scale.to_public_rd((scale.to_internal_rd(100.0).powi(2) + 0.06f64.powi(2)).sqrt());

        assert_abs_diff_eq!(snapshot.rating, 1500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(snapshot.rating_deviation, expected, epsilon = 1e-9);
        assert_eq!(snapshot.volatility, 0.06);
    }

    #[test]
    fn test_failed_update_leaves_player_untouched() {
        let mut player = Player::with_solver(1500.0, 100.0, 0.06, 0.5, FailingSolver, epoch()).unwrap();
        player.record_result(1600.0, 50.0, 1.0);
        let before = player.snapshot();

        let result = player.run_period_update(epoch() + Duration::days(1));

        assert!(matches!(result, Err(RatingError::NonConvergence { .. })));
        assert_eq!(player.snapshot(), before);
        assert_eq!(player.pending_results().len(), 1);

        let instant = player.instant_update(1600.0, 50.0, 1.0, epoch() + Duration::days(1));
        assert!(instant.is_err());
        assert_eq!(player.snapshot(), before);
        assert_eq!(player.pending_results().len(), 1);
    }

    #[test]
    fn test_alternate_solver() {
        let mut newton = Player::with_solver(1500.0, 100.0, 0.06, 0.5, NewtonSolver::default(), epoch()).unwrap();
        let mut illinois = test_player();

        newton.record_result(1600.0, 50.0, 1.0);
        illinois.record_result(1600.0, 50.0, 1.0);

        let a = newton.run_period_update(epoch()).unwrap();
        let b = illinois.run_period_update(epoch()).unwrap();

        assert_abs_diff_eq!(a.rating, b.rating, epsilon = 1e-3);
        assert_abs_diff_eq!(a.volatility, b.volatility, epsilon = 1e-6);
    }

    #[test]
    fn test_advance_without_calculator_only_moves_time() {
        let mut player = test_player();
        let snapshot = player.advance_for_elapsed_time(epoch() + Duration::days(10));

        assert_abs_diff_eq!(snapshot.rating_deviation, 100.0, epsilon = 1e-9);
        assert_eq!(snapshot.last_update, epoch() + Duration::days(10));
    }

    #[test]
    fn test_advance_with_calculator() {
        let mut player = test_player();
        player.attach_fractional_calculator(daily());

        let snapshot = player.advance_for_elapsed_time(epoch() + Duration::hours(36));

        let scale = ScaleConverter::default();
        let expected = scale.to_public_rd(decayed_rd(scale.to_internal_rd(100.0), 0.06, 1.5));

        assert_abs_diff_eq!(snapshot.rating_deviation, expected, epsilon = 1e-9);
        assert_abs_diff_eq!(player.rating_deviation(), expected, epsilon = 1e-9);
        assert_eq!(player.last_update(), epoch() + Duration::hours(36));
    }

    #[test]
    fn test_advance_into_the_past_is_a_no_op() {
        let mut player = test_player();
        player.attach_fractional_calculator(daily());

        let snapshot = player.advance_for_elapsed_time(epoch() - Duration::days(2));

        assert_abs_diff_eq!(snapshot.rating_deviation, 100.0, epsilon = 1e-9);
        assert_eq!(player.last_update(), epoch());
    }

    #[test]
    fn test_sequential_advances_match_single_advance() {
        let mut stepped = test_player();
        stepped.attach_fractional_calculator(daily());
        let mut single = stepped.duplicate();

        stepped.advance_for_elapsed_time(epoch() + Duration::hours(10));
        stepped.advance_for_elapsed_time(epoch() + Duration::hours(70));
        single.advance_for_elapsed_time(epoch() + Duration::hours(70));

        assert_abs_diff_eq!(stepped.rating_deviation(), single.rating_deviation(), epsilon = 1e-9);
    }

    #[test]
    fn test_current_state_at_is_read_only() {
        let mut player = test_player();
        player.attach_fractional_calculator(daily());
        let before = player.snapshot();
        let at = epoch() + Duration::days(30);

        let first = player.current_state_at(at);
        let second = player.current_state_at(at);

        assert_eq!(first, second);
        assert!(first.rating_deviation > before.rating_deviation);
        assert_eq!(first.last_update, epoch());
        assert_eq!(player.snapshot(), before);
    }

    #[test]
    fn test_detach_stops_decay() {
        let mut player = test_player();
        player.attach_fractional_calculator(daily());
        assert!(player.detach_fractional_calculator().is_some());

        let projected = player.current_state_at(epoch() + Duration::days(30));
        assert_abs_diff_eq!(projected.rating_deviation, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_duplicate_is_independent_and_shares_calculator() {
        let calculator = daily();
        let mut original = test_player();
        original.attach_fractional_calculator(calculator.clone());
        original.record_result(1600.0, 50.0, 1.0);

        let mut copy = original.duplicate();
        copy.run_period_update(epoch()).unwrap();

        assert_eq!(original.pending_results().len(), 1);
        assert_abs_diff_eq!(original.rating(), 1500.0, epsilon = 1e-9);
        assert!(copy.rating() > 1500.0);
        assert!(Arc::ptr_eq(copy.calculator().unwrap(), &calculator));
    }

    #[test]
    fn test_instant_update_composes_decay_and_period_update() {
        let at = epoch() + Duration::hours(12);

        let mut instant = test_player();
        instant.attach_fractional_calculator(daily());
        let mut manual = instant.duplicate();

        let snapshot = instant.instant_update(1600.0, 50.0, 1.0, at).unwrap();

        manual.advance_for_elapsed_time(at);
        manual.record_result(1600.0, 50.0, 1.0);
        let expected = manual.run_period_update(at).unwrap();

        assert_abs_diff_eq!(snapshot.rating, expected.rating, epsilon = 1e-9);
        assert_abs_diff_eq!(snapshot.rating_deviation, expected.rating_deviation, epsilon = 1e-9);
        assert_abs_diff_eq!(snapshot.volatility, expected.volatility, epsilon = 1e-12);
        assert_eq!(snapshot.last_update, at);
        assert!(instant.pending_results().is_empty());
    }

    #[test]
    fn test_instant_update_ignores_pending_results() {
        let mut pending = test_player();
        pending.record_result(1400.0, 50.0, 0.0);
        pending.record_result(1450.0, 50.0, 0.0);
        let mut clean = test_player();

        let with_pending = pending.instant_update(1600.0, 50.0, 1.0, epoch()).unwrap();
        let without = clean.instant_update(1600.0, 50.0, 1.0, epoch()).unwrap();

        assert_abs_diff_eq!(with_pending.rating, without.rating, epsilon = 1e-9);
        assert_abs_diff_eq!(with_pending.rating, 1534.12, epsilon = 0.05);
        assert_abs_diff_eq!(with_pending.rating_deviation, without.rating_deviation, epsilon = 1e-9);

        // Both losses still belong to the next period update
        assert_eq!(pending.pending_results().len(), 2);
        assert!(pending.pending_results().iter().all(|r| r.outcome == 0.0));
    }
}
