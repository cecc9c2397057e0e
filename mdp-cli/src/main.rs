//! MDP CLI - marine debris predictions for coastal sites.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "mdp-cli",
    version,
    about = "Marine debris prediction and dashboard toolkit"
)]
struct Cli {
    #[command(flatten)]
    settings: mdp_cmd::Settings,

    #[command(subcommand)]
    command: mdp_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("Using database {}", cli.settings.database.display());
    mdp_cmd::run(cli.command, &cli.settings).await
}
