//! Replicating an equal-weight basket of Canadian banks with 50bps of cash.
//!
//! This example demonstrates:
//! - Building a long-format price history and deriving a returns matrix from it
//! - Optimizing a replica once on the training window
//! - Re-optimizing the replica daily on an expanding point-in-time window
//! - Comparing tracking error against a pro-rata default portfolio
//!
//! Prices are synthetic: every bank loads on a common market factor with its
//! own beta plus an idiosyncratic term.
//!
//! Run with `RUST_LOG=debug` to see each reoptimization.

use anyhow::{Context, Result};
use chrono::{Datelike, Weekday};
use malaga::backtest::{Backtest, BacktestConfig};
use malaga::eval::Strategy;
use malaga::optim::ActiveRiskMinimizer;
use malaga::traits::{MarketData, PriceHistoryProvider};
use malaga::{CASH, Date, WeightVector};
use polars::prelude::*;
use tracing_subscriber::EnvFilter;

/// Benchmark constituents and their market betas.
const BANKS: &[(&str, f64)] = &[
    ("BNS CN", 0.90),
    ("BMO CN", 1.05),
    ("TD CN", 1.00),
    ("CM CN", 1.15),
    ("RY CN", 0.95),
    ("NA CN", 1.20),
];

/// Cash every replica must hold.
const CASH_DRAG: f64 = 50.0 / 1e4;

fn date(year: i32, month: u32, day: u32) -> Result<Date> {
    Date::from_ymd_opt(year, month, day)
        .with_context(|| format!("invalid date {year}-{month}-{day}"))
}

/// Weekday closes for every bank between `start` and `end`.
fn synthetic_prices(start: Date, end: Date) -> Result<DataFrame> {
    let days: Vec<Date> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .collect();

    let mut symbols = Vec::with_capacity(days.len() * BANKS.len());
    let mut dates = Vec::with_capacity(days.len() * BANKS.len());
    let mut closes = Vec::with_capacity(days.len() * BANKS.len());

    for (j, (ticker, beta)) in BANKS.iter().enumerate() {
        let mut close = 100.0;
        for (t, day) in days.iter().enumerate() {
            if t > 0 {
                let t = t as f64;
                let market = 0.008 * (0.11 * t).sin() + 0.006 * (0.53 * t + 1.0).sin();
                let own = 0.004 * ((0.37 + 0.05 * j as f64) * t + j as f64).sin();
                close *= 1.0 + beta * market + own;
            }
            symbols.push(ticker.to_string());
            dates.push(*day);
            closes.push(close);
        }
    }

    tracing::info!(rows = closes.len(), securities = BANKS.len(), "generated price history");
    Ok(df! {
        "symbol" => symbols,
        "date" => dates,
        "close" => closes,
    }?)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let history_start = date(2018, 11, 16)?;
    let prices = synthetic_prices(history_start, date(2024, 6, 28)?)?;
    let provider = PriceHistoryProvider::new(MarketData::new(prices));

    let benchmark = WeightVector::new(
        BANKS
            .iter()
            .map(|(ticker, _)| (ticker.to_string(), 1.0 / BANKS.len() as f64))
            .chain([(CASH.to_string(), 0.0)]),
    )?;
    let config = BacktestConfig::with_equal_weight_default(
        benchmark,
        CASH_DRAG,
        date(2023, 12, 29)?,
        date(2024, 1, 3)?,
    )?;

    let report = Backtest::new(config, ActiveRiskMinimizer::default())
        .run_with_provider(&provider, history_start)?;

    println!("\nOptimized replica on {}:", report.test_dates[0]);
    for (ticker, weight) in report.optimized_weights.iter() {
        println!("  {ticker:<8} {:>8.4}%", weight * 100.0);
    }

    println!("\nTracking versus benchmark:");
    for strategy in Strategy::CANDIDATES {
        let stats = &report.tracking[&strategy];
        println!(
            "  Bench - {strategy:<16} daily std dev {:>7.3}bps  annualized {:>7.2}bps  ({} days)",
            stats.tracking_error_bps, stats.annualized_bps, stats.n_obs
        );
    }

    println!("\nCumulative returns:");
    for strategy in Strategy::ALL {
        if let Some(cumulative) = report.comparison.final_cumulative(strategy) {
            println!("  {strategy:<16} {:>+9.4}%", cumulative * 100.0);
        }
    }

    let df = report.comparison.to_dataframe()?;
    println!(
        "\nComparison table: {} rows, columns {:?}",
        df.height(),
        df.get_column_names()
    );

    println!("\n{}", serde_json::to_string_pretty(&report.tracking)?);
    Ok(())
}
