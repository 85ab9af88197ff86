use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use cnweather_core::{BatchSummary, ConfigBundle, ConfigStore, WeatherCrawler, dispatch};
use serde::Serialize;
use std::{path::PathBuf, sync::Arc, time::Instant};
use tracing::info;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cnweather", version, about = "China weather crawler")]
pub struct Cli {
    /// Directory holding city_code.toml, china_weather.toml and crawler.toml.
    #[arg(long, global = true, env = "CNWEATHER_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Current conditions for a city.
    Realtime { city: String },

    /// 7-day forecast for a city.
    Week { city: String },

    /// 15-day forecast for a city.
    Fortnight { city: String },

    /// Hourly forecast for a city.
    Hourly { city: String },

    /// Current conditions for every configured city.
    Batch {
        /// Number of concurrent requests; 1 runs the cities one by one.
        #[arg(long, default_value_t = 1)]
        pool: usize,

        /// Also print the retrieved records as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let store = match self.config_dir {
            Some(dir) => ConfigStore::new(dir),
            None => ConfigStore::from_default_dir()?,
        };
        let config = ConfigBundle::load(&store).with_context(|| {
            format!("Failed to load configuration from {}", store.dir().display())
        })?;
        let crawler = Arc::new(
            WeatherCrawler::new(Arc::new(config)).context("Failed to set up the HTTP client")?,
        );

        match self.command {
            Command::Realtime { city } => {
                let weather = crawler
                    .get_real_time_weather(&city)
                    .await
                    .with_context(|| format!("Failed to get current weather for {city}"))?;
                print_json(&weather)
            }
            Command::Week { city } => {
                let forecast = crawler
                    .get_7d_weather(&city)
                    .await
                    .with_context(|| format!("Failed to get 7-day forecast for {city}"))?;
                print_json(&forecast)
            }
            Command::Fortnight { city } => {
                let forecast = crawler
                    .get_15d_weather(&city)
                    .await
                    .with_context(|| format!("Failed to get 15-day forecast for {city}"))?;
                print_json(&forecast)
            }
            Command::Hourly { city } => {
                let forecast = crawler
                    .get_hourly_weather(&city)
                    .await
                    .with_context(|| format!("Failed to get hourly forecast for {city}"))?;
                print_json(&forecast)
            }
            Command::Batch { pool, json } => run_batch(crawler, pool, json).await,
        }
    }
}

async fn run_batch(crawler: Arc<WeatherCrawler>, pool: usize, json: bool) -> anyhow::Result<()> {
    let started_at = Local::now();
    let clock = Instant::now();

    let cities: Vec<String> = crawler.city_names().map(str::to_owned).collect();
    info!(cities = cities.len(), pool, "starting real-time batch");

    let task_crawler = Arc::clone(&crawler);
    let slots = dispatch::run(
        cities,
        move |city| {
            let crawler = Arc::clone(&task_crawler);
            async move { crawler.get_real_time_weather(&city).await }
        },
        pool,
    )
    .await;

    let summary = BatchSummary::from_slots(&slots);
    if json {
        let records: Vec<_> = slots.into_iter().flatten().collect();
        print_json(&records)?;
    }

    let started = started_at.format("%Y-%m-%d %H:%M:%S").to_string();
    println!("{}", batch_report(&started, &summary, clock.elapsed().as_secs_f64()));
    Ok(())
}

fn batch_report(started: &str, summary: &BatchSummary, elapsed_secs: f64) -> String {
    format!(
        "started: {started}, cities: {}, succeeded: {}, failed: {}, elapsed: {elapsed_secs:.0}s",
        summary.total(),
        summary.succeeded,
        summary.failed,
    )
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    println!("{text}");
    Ok(())
}
