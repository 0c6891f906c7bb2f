//! `supplyshield`: the dashboard's views and report exports from a terminal.

pub mod commands;
pub mod state;

use clap::{Args, Parser, Subcommand};
use risk_registry::{Category, SignalSource};
use shield_core::api::DEFAULT_TREND_DAYS;
use shield_core::ExportFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "supplyshield")]
#[command(about = "Supply chain risk dashboard client", version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Backend API base URL (overrides SUPPLYSHIELD_API_BASE)
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Preference database path (overrides SUPPLYSHIELD_STORE)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Bearer token to use instead of the stored login
    #[arg(long, global = true, env = "SUPPLYSHIELD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Print raw JSON instead of a table
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Overall and per-segment risk with bottlenecks and recommendations
    Dashboard,
    /// Daily risk history
    Trend {
        #[arg(long, default_value_t = DEFAULT_TREND_DAYS)]
        days: u32,
    },
    /// Latest signals from every source you can see
    Signals {
        #[arg(long)]
        source: Option<SignalSource>,
    },
    /// Risk points and corridors
    Map,
    /// Category insight (premium)
    Category { category: Category },
    /// Write a category report file (premium)
    Export {
        category: Category,
        #[arg(long, default_value = "pdf")]
        format: ExportFormat,
        /// Directory to write into
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Raw records from one data feed
    Data {
        feed: SignalSource,
        #[arg(long)]
        commodity: Option<String>,
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        corridor_id: Option<String>,
        #[arg(long)]
        mode: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Subscription tier
    Premium {
        #[command(subcommand)]
        action: PremiumAction,
    },
    /// Saved colour theme
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SUPPLYSHIELD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SUPPLYSHIELD_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        company: Option<String>,
    },
    /// Profile of the signed-in user
    Me,
    Logout,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PremiumAction {
    Status,
    Upgrade,
    Downgrade,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeAction {
    Show,
    Dark,
    Light,
    Toggle,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let app = state::build_state(&cli.global)?;
    let mut out = std::io::stdout().lock();
    commands::execute(&app, cli.command, cli.global.json, &mut out).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn export_parses_category_and_format() {
        let cli = Cli::try_parse_from([
            "supplyshield",
            "export",
            "clothing",
            "--format",
            "CSV",
            "--out",
            "reports",
        ])
        .unwrap();
        match cli.command {
            Command::Export {
                category,
                format,
                out,
            } => {
                assert_eq!(category, Category::Clothing);
                assert_eq!(format, ExportFormat::Csv);
                assert_eq!(out, PathBuf::from("reports"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = Cli::try_parse_from(["supplyshield", "category", "furniture"]).unwrap_err();
        assert!(err.to_string().contains("furniture"));
    }

    #[test]
    fn global_flags_work_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "supplyshield",
            "trend",
            "--days",
            "30",
            "--api-base",
            "http://backend:9000/api",
            "--json",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Trend { days: 30 }));
        assert_eq!(cli.global.api_base.as_deref(), Some("http://backend:9000/api"));
        assert!(cli.global.json);
    }

    #[test]
    fn trend_defaults_to_the_backend_window() {
        let cli = Cli::try_parse_from(["supplyshield", "trend"]).unwrap();
        assert!(matches!(cli.command, Command::Trend { days } if days == DEFAULT_TREND_DAYS));
    }
}
