use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider-assigned city identifier, substituted into endpoint URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityCode(String);

impl CityCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current conditions as reported by the real-time endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub update_time: String,
    pub date: String,
    pub city_name: String,
    pub city_code: String,
    pub temperature_c: String,
    pub temperature_f: String,
    pub wind_direction: String,
    pub humidity: String,
    pub weather: String,
    pub wind_speed: String,
    pub rainfall_24h: String,
    pub aqi_pm25: String,
}

/// Outcome of a real-time lookup. `FormatChanged` is returned, not raised,
/// when the provider answers without the `time` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RealTimeWeather {
    Snapshot(WeatherSnapshot),
    FormatChanged { error: String },
}

impl RealTimeWeather {
    pub const FORMAT_CHANGED: &'static str = "real-time interface format changed";

    pub fn format_changed() -> Self {
        RealTimeWeather::FormatChanged { error: Self::FORMAT_CHANGED.to_string() }
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        match self {
            RealTimeWeather::Snapshot(s) => Some(s),
            RealTimeWeather::FormatChanged { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: String,
    /// "今天", weekday and similar qualifiers shown under the date.
    pub date_info: String,
    pub high_temp: String,
    pub low_temp: String,
    pub weather: String,
    /// Distinct wind directions for the day, comma-joined. Order is not part
    /// of the contract.
    pub wind_direction: String,
    pub wind_speed: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyForecast {
    pub weather: String,
    pub wind_direction: String,
    pub temperature: String,
    pub time: String,
    pub wind_speed: String,
}

/// Envelope for the multi-record endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityWeatherResult<T> {
    pub city: String,
    pub city_code: CityCode,
    pub update_time: String,
    pub data: Vec<T>,
}
