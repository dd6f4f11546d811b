use anyhow::{Context, Result};
use chrono::{Timelike, Utc};
use clap::{Parser, Subcommand};
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

use trendbot::backtest::{BacktestConfig, MarketScenario, Simulator, SyntheticDataGenerator};
use trendbot::exchange::{BinanceClient, MarketData};
use trendbot::execution::PaperVenue;
use trendbot::live::{CycleOutcome, DecisionLoop};
use trendbot::Config;

#[derive(Parser)]
#[command(name = "trendbot", about = "MACD/PSAR/EMA trend bot", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the hourly decision loop against the exchange (paper execution)
    Live,
    /// Replay the strategy over historical bars and print a report
    Backtest {
        /// Number of bars to fetch (exchange caps one request at 1000)
        #[arg(long, default_value_t = 1000)]
        bars: usize,
        /// Use a seeded synthetic series instead of exchange data
        #[arg(long)]
        synthetic: bool,
        /// Emit the full trade ledger as JSON instead of the text report
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();

    // Configuration problems are fatal before any cycle runs
    let config = Config::load().context("startup configuration error")?;

    match cli.command {
        Command::Live => run_live(config).await,
        Command::Backtest {
            bars,
            synthetic,
            json,
        } => run_backtest(config, bars, synthetic, json).await,
    }
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trendbot=info".into()),
        )
        .init();
}

/// Seconds until the top of the next hour
fn next_hour_boundary() -> Instant {
    let now = Utc::now();
    let seconds_into_hour = now.minute() * 60 + now.second();
    let seconds_until_next = 3600 - seconds_into_hour as u64;
    Instant::now() + Duration::from_secs(seconds_until_next)
}

async fn run_live(config: Config) -> Result<()> {
    tracing::info!(
        "trendbot live: {} {} bars of {}, EMA window {}",
        config.bar_limit,
        config.interval,
        config.pair,
        config.ema_window
    );

    let market = BinanceClient::new()?;
    let venue = PaperVenue::new(config.initial_balance);
    let mut cycle = DecisionLoop::new(config, market, venue);

    let start = next_hour_boundary();
    tracing::info!(
        "first cycle in {:?} at the next hour boundary",
        start - Instant::now()
    );

    let mut ticker = interval_at(start, Duration::from_secs(3600));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received Ctrl+C, shutting down");
                break;
            }
            _ = ticker.tick() => {
                // One failed cycle never stops the loop
                match cycle.run_cycle().await {
                    Ok(CycleOutcome::Dispatched(intent)) => {
                        tracing::info!("cycle done: order {} dispatched", intent.id);
                    }
                    Ok(CycleOutcome::GateRejected(signal)) => {
                        tracing::info!("cycle done: {:?} signal not admitted", signal);
                    }
                    Ok(CycleOutcome::NoSignal) => {
                        tracing::info!("cycle done: no signal");
                    }
                    Err(e) => {
                        tracing::error!("cycle failed: {:#}", e);
                    }
                }
            }
        }
    }

    Ok(())
}

async fn run_backtest(config: Config, bars: usize, synthetic: bool, json: bool) -> Result<()> {
    let series = if synthetic {
        let mut gen = SyntheticDataGenerator::new(42);
        gen.generate(MarketScenario::Reversal, bars, 60)
    } else {
        let client = BinanceClient::new()?;
        client
            .fetch_bars(&config.pair, &config.interval, bars)
            .await
            .context("failed to fetch historical bars")?
    };

    let simulator = Simulator::new(BacktestConfig {
        ema_window: config.ema_window,
        initial_balance: config.initial_balance,
        close_on_opposite: config.close_on_opposite,
    });
    let ledger = simulator.run(&series)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ledger)?);
    } else {
        ledger.report.print_report();
    }

    Ok(())
}
