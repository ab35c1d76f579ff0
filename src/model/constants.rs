// Scale constants
/// 400 / ln(10). Converts between the public scale and the internal Glicko-2 scale.
pub const SCALING_FACTOR: f64 = 173.7178;
pub const DEFAULT_RATING: f64 = 1500.0;
pub const DEFAULT_RATING_DEVIATION: f64 = 350.0;
pub const DEFAULT_VOLATILITY: f64 = 0.06;
// Recommended range for tau is 0.3 to 1.2
pub const DEFAULT_SYSTEM_CONSTANT: f64 = 0.5;
pub const MAX_SYSTEM_CONSTANT: f64 = 10.0;
// Volatility solver
pub const CONVERGENCE_TOLERANCE: f64 = 0.000_001;
pub const MAX_SOLVER_ITERATIONS: u32 = 100;
// Fractional periods
pub const DEFAULT_PERIOD_LENGTH_MS: i64 = 24 * 60 * 60 * 1000;
// Puzzle heuristics
pub const TIME_PENALTY_WEIGHT: f64 = 0.25;
pub const HINT_PENALTY_WEIGHT: f64 = 0.5;
pub const PUZZLE_MIN_RD: f64 = 30.0;
