use clap::Parser;
use shield_cli::Cli;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "supplyshield=info,shield_cli=info,shield_core=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    shield_cli::run(Cli::parse()).await
}
