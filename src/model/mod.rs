//! Glicko-2 ratings with continuous RD decay between updates.
//!
//! The flow of a rating:
//! 1. A [`player::Player`] is created on the public scale and stored on the internal one.
//! 2. Results are buffered with `record_result`.
//! 3. `run_period_update` runs the Glicko-2 algorithm in [`glicko`] and clears the buffer.
//! 4. Between updates, an attached [`decay::FractionalPeriodCalculator`] grows RD with
//!    elapsed time, either in place or as a read-only projection.

pub mod config;
pub mod constants;
pub mod decay;
pub mod error;
pub mod glicko;
pub mod player;
pub mod puzzle;
pub mod rating_period;
pub mod scale;
pub mod structures;
pub mod volatility;

pub use config::RatingConfig;
pub use decay::FractionalPeriodCalculator;
pub use error::RatingError;
pub use player::Player;
pub use rating_period::RatingPeriod;
pub use structures::rating_snapshot::RatingSnapshot;
pub use volatility::{AnySolver, IllinoisSolver, NewtonSolver, VolatilityAlgorithm, VolatilitySolver};
