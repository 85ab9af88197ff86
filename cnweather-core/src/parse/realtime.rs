use serde_json::{Map, Value};

use super::script::literal_text;
use crate::{
    error::{CrawlError, Result},
    model::{RealTimeWeather, WeatherSnapshot},
};

const ASSIGNMENT_PREFIX: &str = "var dataSK = ";

/// Parse the `var dataSK = {...}` body of the real-time endpoint.
///
/// A payload without `time` is the provider's "interface changed" answer and
/// yields [`RealTimeWeather::FormatChanged`] instead of an error.
pub fn parse_real_time(body: &str) -> Result<RealTimeWeather> {
    let trimmed = body.trim_start();
    let json = trimmed.strip_prefix(ASSIGNMENT_PREFIX).unwrap_or(trimmed);

    let value: Value = serde_json::from_str(json.trim_end().trim_end_matches(';'))
        .map_err(|source| CrawlError::MalformedLiteral { name: "dataSK".into(), source })?;

    let Value::Object(data) = value else {
        return Err(CrawlError::UpstreamFormat("real-time payload is not an object".into()));
    };

    if !data.contains_key("time") {
        return Ok(RealTimeWeather::format_changed());
    }

    Ok(RealTimeWeather::Snapshot(WeatherSnapshot {
        update_time: field(&data, "time")?,
        date: field(&data, "date")?,
        city_name: field(&data, "cityname")?,
        city_code: field(&data, "city")?,
        temperature_c: field(&data, "temp")?,
        temperature_f: field(&data, "tempf")?,
        wind_direction: field(&data, "WD")?,
        humidity: field(&data, "SD")?,
        weather: field(&data, "weather")?,
        wind_speed: field(&data, "wse")?.replace("&lt;", "<"),
        rainfall_24h: field(&data, "rain24h")?,
        aqi_pm25: field(&data, "aqi_pm25")?,
    }))
}

fn field(data: &Map<String, Value>, key: &str) -> Result<String> {
    data.get(key)
        .cloned()
        .map(literal_text)
        .ok_or_else(|| CrawlError::UpstreamFormat(format!("real-time field '{key}' missing")))
}
