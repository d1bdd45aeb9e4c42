use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use swerve_zenoh_runtime::config::RobotConfig;

#[derive(Parser, Debug)]
#[command(about = "Swerve drive runtime: chassis commands in, module setpoints out")]
struct Args {
    /// Robot config JSON (built-in MK4i defaults if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log module setpoints instead of publishing them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init(); // installs the subscriber globally

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            match RobotConfig::load(path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Config error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        None => RobotConfig::default(),
    };

    if let Err(e) = swerve_zenoh_runtime::runtime::run(config, args.dry_run).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
