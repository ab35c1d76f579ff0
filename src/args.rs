use std::path::PathBuf;

use clap::Parser;

use crate::model::{
    config::RatingConfig,
    constants::{DEFAULT_PERIOD_LENGTH_MS, DEFAULT_SYSTEM_CONSTANT},
    volatility::VolatilityAlgorithm
};

#[derive(Parser, Clone, Debug)]
#[command(
    display_name = "Glicko-2 Fractional",
    long_about = "Rates one Glicko-2 rating period, with optional fractional RD decay for idle time"
)]
pub struct Args {
    /// JSON file describing the players and matches of the period.
    /// Example: { "players": [{ "id": "a", "rating": 1500 }], "matches": [], "closedAt": null }
    #[arg(short, long, env = "GLICKO_INPUT", help = "Path to the period JSON file")]
    pub input: PathBuf,

    /// System constant τ. Smaller values keep volatility steady.
    #[arg(short, long, env = "GLICKO_TAU", default_value_t = DEFAULT_SYSTEM_CONSTANT)]
    pub tau: f64,

    /// Length of one rating period in milliseconds, used for fractional decay
    #[arg(short, long, env = "GLICKO_PERIOD_LENGTH_MS", default_value_t = DEFAULT_PERIOD_LENGTH_MS)]
    pub period_length_ms: i64,

    #[arg(
        short,
        long,
        env = "GLICKO_ALGORITHM",
        default_value_t = VolatilityAlgorithm::Illinois,
        help = "Volatility solver (illinois, newton)"
    )]
    pub algorithm: VolatilityAlgorithm,

    /// Grow every player's RD for the time since their last update before closing the period
    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    pub decay: bool,

    #[arg(long, action = clap::ArgAction::SetTrue, help = "Show a progress bar while rating")]
    pub progress: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        env = "RUST_LOG",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"],
        help = "Sets the logging verbosity"
    )]
    pub log_level: String
}

impl Args {
    pub fn rating_config(&self) -> RatingConfig {
        RatingConfig {
            tau: self.tau,
            period_length_ms: self.period_length_ms,
            algorithm: self.algorithm,
            ..RatingConfig::default()
        }
    }
}
