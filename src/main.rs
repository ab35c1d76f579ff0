use clap::Parser;
use glicko2_fractional::{args::Args, input::PeriodInput};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    dotenv::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log_level))
        .with_writer(std::io::stderr)
        .init();

    let config = args.rating_config();
    if let Err(e) = config.validate() {
        error!("{}", e);
        std::process::exit(2);
    }

    let input = match PeriodInput::from_path(&args.input) {
        Ok(input) => input,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!(path = %args.input.display(), algorithm = %config.algorithm, "Rating period");

    let output = match input.process(&config, args.decay, args.progress) {
        Ok(output) => output,
        Err(e) => {
            error!("Rating period failed: {}", e);
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!("Failed to serialize output: {}", e);
            std::process::exit(1);
        }
    }
}
