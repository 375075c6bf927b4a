//! Rain CLI - command line tool for per-cell temporal rainfall features.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "rain-cli",
    version,
    about = "Hourly rainfall grid feature toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: rain_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    log::debug!("rain-cli {}", env!("CARGO_PKG_VERSION"));
    rain_cmd::run(cli.command)
}
