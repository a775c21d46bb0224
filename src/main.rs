use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use hexapod_gait_runtime::config::{DEFAULT_DT, DEFAULT_WARMUP_STEPS, LOOP_HZ, RobotConfig};
use hexapod_gait_runtime::controller::ControlMode;
use hexapod_gait_runtime::runtime::RunOptions;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Neural,
    Trajectory,
}

/// Hexapod gait runtime: ticks the gait controller and publishes joint angles over Zenoh
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON robot config (geometry, leg table, neural constants)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial gait pipeline
    #[arg(long, value_enum, default_value_t = Mode::Neural)]
    mode: Mode,

    /// Integration step handed to the controller each tick
    #[arg(long, default_value_t = DEFAULT_DT)]
    dt: f32,

    /// Neural ticks to run before publishing
    #[arg(long, default_value_t = DEFAULT_WARMUP_STEPS)]
    warmup: usize,

    /// Control loop frequency (1..=1000 Hz)
    #[arg(long, default_value_t = LOOP_HZ, value_parser = clap::value_parser!(u64).range(1..=1000))]
    loop_hz: u64,
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init(); // installs the subscriber globally

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match RobotConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Config error ({}): {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => RobotConfig::default(),
    };

    let options = RunOptions {
        config,
        mode: match args.mode {
            Mode::Neural => ControlMode::Neural,
            Mode::Trajectory => ControlMode::Trajectory,
        },
        dt: args.dt,
        warmup_steps: args.warmup,
        loop_hz: args.loop_hz,
    };

    if let Err(e) = hexapod_gait_runtime::runtime::run(options).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_rate_is_bounded() {
        assert!(Args::try_parse_from(["hexapod-gait-runtime", "--loop-hz", "2000"]).is_err());
        assert!(Args::try_parse_from(["hexapod-gait-runtime", "--loop-hz", "0"]).is_err());

        let args = Args::try_parse_from(["hexapod-gait-runtime", "--loop-hz", "1000"])
            .expect("1000 Hz is accepted");
        assert_eq!(args.loop_hz, 1000);
        let args = Args::try_parse_from(["hexapod-gait-runtime"]).expect("defaults parse");
        assert_eq!(args.loop_hz, LOOP_HZ);
    }
}
