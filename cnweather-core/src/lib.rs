//! Core library for the `cnweather` crawler.
//!
//! This crate defines:
//! - Configuration tables (city codes, URL templates, code labels, headers)
//! - City name resolution and page fetching
//! - Parsers that normalize the provider's four endpoint shapes
//! - A dispatcher that runs one retrieval over many cities
//!
//! It is used by `cnweather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod crawler;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod fetch;
pub mod model;
pub mod parse;
pub mod resolver;

pub use config::{ConfigBundle, ConfigStore, ConfigTable, TableSource};
pub use crawler::WeatherCrawler;
pub use dispatch::BatchSummary;
pub use endpoint::Endpoint;
pub use error::{CrawlError, Result};
pub use fetch::{FETCH_TIMEOUT, HttpFetcher, PageSource};
pub use model::{
    CityCode, CityWeatherResult, ForecastDay, HourlyForecast, RealTimeWeather, WeatherSnapshot,
};
pub use resolver::CityResolver;
