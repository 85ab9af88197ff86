use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::{
    config::ConfigBundle,
    endpoint::Endpoint,
    error::Result,
    fetch::{HttpFetcher, PageSource},
    model::{CityCode, CityWeatherResult, ForecastDay, HourlyForecast, RealTimeWeather},
    parse,
    resolver::CityResolver,
};

/// Retrieves and normalizes weather for one city per call.
///
/// Holds no state between calls beyond the shared configuration; every
/// operation re-fetches its page.
#[derive(Debug, Clone)]
pub struct WeatherCrawler<S = HttpFetcher> {
    config: Arc<ConfigBundle>,
    resolver: CityResolver,
    source: S,
}

impl WeatherCrawler<HttpFetcher> {
    pub fn new(config: Arc<ConfigBundle>) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::with_source(config, fetcher))
    }
}

impl<S: PageSource> WeatherCrawler<S> {
    pub fn with_source(config: Arc<ConfigBundle>, source: S) -> Self {
        Self { resolver: CityResolver::new(Arc::clone(&config)), config, source }
    }

    pub fn config(&self) -> &ConfigBundle {
        &self.config
    }

    /// Every configured city name, sorted by name.
    pub fn city_names(&self) -> impl Iterator<Item = &str> {
        self.config.city_codes.keys()
    }

    pub fn resolve(&self, city_name: &str) -> Result<CityCode> {
        self.resolver.resolve(city_name)
    }

    async fn page(&self, endpoint: Endpoint, city_name: &str) -> Result<(CityCode, String)> {
        let code = self.resolver.resolve(city_name)?;
        let url = self.config.url_for(endpoint, &code)?;
        let body = self.source.fetch(&url).await?;
        Ok((code, body))
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get_real_time_weather(&self, city_name: &str) -> Result<RealTimeWeather> {
        let (code, body) = self.page(Endpoint::RealTime, city_name).await?;
        let weather = parse::parse_real_time(&body)?;

        match weather.snapshot() {
            Some(snapshot) if snapshot.city_code != code.as_str() => {
                warn!(
                    city = city_name,
                    resolved = %code,
                    reported = %snapshot.city_code,
                    "provider reported a different city code"
                );
            }
            Some(_) => {}
            None => warn!(city = city_name, "real-time interface returned an unexpected format"),
        }

        Ok(weather)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get_7d_weather(&self, city_name: &str) -> Result<CityWeatherResult<ForecastDay>> {
        let (code, body) = self.page(Endpoint::SevenDay, city_name).await?;
        let page = parse::parse_seven_day(&body)?;
        info!(city = city_name, days = page.days.len(), "parsed 7-day forecast");

        Ok(CityWeatherResult {
            city: city_name.to_string(),
            city_code: code,
            update_time: page.update_time,
            data: page.days,
        })
    }

    /// The 7-day forecast followed by the provider's days 8–15. The 7-day
    /// page is fetched again as part of this call.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_15d_weather(&self, city_name: &str) -> Result<CityWeatherResult<ForecastDay>> {
        let (code, body) = self.page(Endpoint::FifteenDay, city_name).await?;
        let page = parse::parse_fifteen_day(&body)?;

        let mut data = self.get_7d_weather(city_name).await?.data;
        data.extend(page.days);
        info!(city = city_name, days = data.len(), "parsed 15-day forecast");

        Ok(CityWeatherResult {
            city: city_name.to_string(),
            city_code: code,
            update_time: page.update_time,
            data,
        })
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get_hourly_weather(
        &self,
        city_name: &str,
    ) -> Result<CityWeatherResult<HourlyForecast>> {
        let (code, body) = self.page(Endpoint::Hourly, city_name).await?;
        let page = parse::parse_hourly(&body, &self.config)?;
        info!(city = city_name, hours = page.hours.len(), "parsed hourly forecast");

        Ok(CityWeatherResult {
            city: city_name.to_string(),
            city_code: code,
            update_time: page.update_time,
            data: page.hours,
        })
    }
}
