use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use liquidity_matrix::{
    analysis::{AnalysisOutcome, Analyzer},
    config::Config,
    report::format_report,
    schedule::AlertKind,
    service::AlertService,
};

#[derive(Parser, Debug)]
#[command(name = "liquidity-matrix", version, about = "Liquidity sweep alerts for gold and crypto")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the daily schedule until Ctrl-C
    Run,
    /// Run one alert job immediately
    Once {
        #[arg(long, value_enum, default_value_t = Kind::PostOpen)]
        kind: Kind,
    },
    /// Analyze symbols and print the result without sending anything
    Analyze {
        /// Defaults to ALERT_SYMBOLS
        symbols: Vec<String>,
        /// Print JSON instead of the message text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Kind {
    PreSession,
    PostOpen,
}

impl From<Kind> for AlertKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::PreSession => AlertKind::PreSession,
            Kind::PostOpen => AlertKind::PostOpen,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("loading configuration")?;

    let analyzer = Analyzer::builder(config.twelvedata_client()?)
        .config(config.analysis.clone())
        .profiles(config.profiles())
        .build()?;

    match cli.command {
        Command::Run => {
            let service = AlertService::new(
                analyzer,
                config.telegram_notifier()?,
                config.schedule.clone(),
                config.symbols.clone(),
            );
            info!(
                session = %config.schedule.name,
                timezone = %config.schedule.timezone,
                symbols = ?config.symbols,
                "🚀 Liquidity Matrix scheduler started"
            );
            service
                .run_until(async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!("failed to listen for Ctrl-C: {e}");
                        std::future::pending::<()>().await;
                    }
                })
                .await;
        },
        Command::Once { kind } => {
            let service = AlertService::new(
                analyzer,
                config.telegram_notifier()?,
                config.schedule.clone(),
                config.symbols.clone(),
            );
            let report = service.run_job(kind.into(), Utc::now()).await;
            info!(
                delivered = report.delivered,
                failed_deliveries = report.failed_deliveries,
                "job complete"
            );
            if report.failed_deliveries > 0 {
                anyhow::bail!("{} message(s) could not be delivered", report.failed_deliveries);
            }
        },
        Command::Analyze { symbols, json } => {
            let symbols = if symbols.is_empty() {
                config.symbols.clone()
            } else {
                symbols
            };
            let outcomes: Vec<AnalysisOutcome> =
                futures::future::join_all(symbols.iter().map(|s| analyzer.analyze(s))).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcomes)?);
            } else {
                for outcome in &outcomes {
                    println!("{}\n", format_report(outcome));
                }
            }
        },
    }

    Ok(())
}
