//! eventfolio CLI: replay a CSV of bars through the portfolio engine.
//!
//! Runs a buy-and-hold strategy over every symbol with the naive fixed-size
//! portfolio and a simulated broker, then writes the equity curve as CSV.

use anyhow::{bail, Context, Result};
use clap::Parser;
use eventfolio_core::Config;
use eventfolio_data::{load_bars_csv, parse_timestamp, BarSource, HistoricBarSource};
use eventfolio_portfolio::{Backtest, BuyAndHold, NaivePortfolio, SimulatedExecution};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "eventfolio",
    about = "Replay bar data through the eventfolio portfolio engine"
)]
struct Cli {
    /// CSV of bars: symbol,datetime,open,high,low,close,volume.
    #[arg(long)]
    bars: PathBuf,

    /// JSON configuration file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Symbols to trade (repeatable). Overrides the configuration; defaults to every symbol in the data.
    #[arg(long = "symbol")]
    symbols: Vec<String>,

    /// Initial snapshot time (YYYY-MM-DD or RFC 3339). Defaults to just before the first bar.
    #[arg(long)]
    start: Option<String>,

    /// Where to write the equity curve CSV. Defaults to stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    let bars = load_bars_csv(&cli.bars)
        .with_context(|| format!("loading bars {}", cli.bars.display()))?;
    if bars.is_empty() {
        bail!("no bars in {}", cli.bars.display());
    }

    if !cli.symbols.is_empty() {
        config.universe.symbols = cli.symbols.clone();
    }
    let feed = if config.universe.symbols.is_empty() {
        HistoricBarSource::from_bars(bars)?
    } else {
        HistoricBarSource::new(config.universe.symbols.iter().cloned(), bars)?
    };
    config.universe.symbols = feed.symbols().to_vec();

    if let Some(start) = &cli.start {
        config.universe.start_ts_ms = Some(parse_timestamp(start)?);
    }
    let first_ts = feed
        .first_timestamp()
        .context("no bars for the selected symbols")?;
    // Initial snapshot precedes the first bar
    let portfolio = NaivePortfolio::from_config(&config, first_ts - 1)?;

    info!(
        symbols = ?config.universe.symbols,
        steps = feed.timeline_len(),
        initial_capital = config.portfolio.initial_capital,
        "replaying bars"
    );

    let mut backtest = Backtest::new(feed, BuyAndHold::new(), portfolio, SimulatedExecution::new())
        .with_periods_per_year(config.performance.periods_per_year);
    let report = backtest.run()?;

    let sink: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = csv::Writer::from_writer(sink);
    for point in &report.equity_curve {
        writer.serialize(point)?;
    }
    writer.flush()?;

    let summary = &report.summary;
    info!(
        final_equity = summary.final_equity,
        total_return = summary.total_return,
        sharpe_ratio = summary.sharpe_ratio,
        max_drawdown = summary.max_drawdown,
        max_drawdown_duration = summary.max_drawdown_duration,
        "performance"
    );

    Ok(())
}
