use serde::Deserialize;

use super::script::{self, HOUR3DATA, UPTIME};
use crate::{
    config::ConfigBundle,
    error::{CrawlError, Result},
    model::HourlyForecast,
};

/// One entry of the `hour3data` script variable, as sent by the provider.
#[derive(Debug, Clone, Deserialize)]
struct Observation {
    #[serde(rename = "ja", deserialize_with = "script::text_field")]
    weather_code: String,
    #[serde(rename = "jb", deserialize_with = "script::text_field")]
    temperature: String,
    #[serde(rename = "jc", deserialize_with = "script::text_field")]
    wind_speed_code: String,
    #[serde(rename = "jd", deserialize_with = "script::text_field")]
    wind_direction_code: String,
    #[serde(rename = "jf", deserialize_with = "script::text_field")]
    time: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourlyPage {
    pub update_time: String,
    pub hours: Vec<HourlyForecast>,
}

/// Parse the hourly page, decoding every short code through its table.
/// One unknown code fails the whole page.
pub fn parse_hourly(html: &str, config: &ConfigBundle) -> Result<HourlyPage> {
    let series: Vec<Vec<Observation>> = HOUR3DATA.literal(html)?;
    let observations = series
        .into_iter()
        .next()
        .ok_or_else(|| CrawlError::UpstreamFormat("hour3data holds no series".into()))?;

    let hours = observations
        .iter()
        .map(|obs| decode(obs, config))
        .collect::<Result<Vec<_>>>()?;

    let update_time = script::clean_update_time(&UPTIME.text(html)?);

    Ok(HourlyPage { update_time, hours })
}

fn decode(obs: &Observation, config: &ConfigBundle) -> Result<HourlyForecast> {
    Ok(HourlyForecast {
        weather: config.weather_codes.decode(&obs.weather_code)?.to_string(),
        wind_direction: config.wind_direction_codes.decode(&obs.wind_direction_code)?.to_string(),
        temperature: obs.temperature.clone(),
        time: obs.time.clone(),
        wind_speed: config.wind_speed_codes.decode(&obs.wind_speed_code)?.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigTable;

    fn config() -> ConfigBundle {
        ConfigBundle {
            weather_codes: ConfigTable::new("WeatherCode", [("00", "晴"), ("01", "多云")]),
            wind_direction_codes: ConfigTable::new("WindDirectionCode", [("4", "南风")]),
            wind_speed_codes: ConfigTable::new("WindSpeedCode", [("0", "<3级")]),
            ..Default::default()
        }
    }

    const PAGE: &str = r#"<script>
var hour3data=[[{"ja":"00","jb":"18","jc":"0","jd":"4","jf":"2026101908"},
{"ja":"01","jb":21,"jc":0,"jd":"4","jf":"2026101911"}],[]];
var uptime="07:30更新";
</script>"#;

    #[test]
    fn codes_are_decoded() {
        let page = parse_hourly(PAGE, &config()).unwrap();

        assert_eq!(page.update_time, "07:30");
        assert_eq!(
            page.hours,
            vec![
                HourlyForecast {
                    weather: "晴".into(),
                    wind_direction: "南风".into(),
                    temperature: "18".into(),
                    time: "2026101908".into(),
                    wind_speed: "<3级".into(),
                },
                HourlyForecast {
                    weather: "多云".into(),
                    wind_direction: "南风".into(),
                    temperature: "21".into(),
                    time: "2026101911".into(),
                    wind_speed: "<3级".into(),
                },
            ]
        );
    }

    #[test]
    fn unknown_code_fails_whole_page() {
        let page = PAGE.replace(r#""ja":"01""#, r#""ja":"53""#);
        let err = parse_hourly(&page, &config()).unwrap_err();
        assert!(matches!(err, CrawlError::UnknownCode { ref table, ref code }
            if table == "WeatherCode" && code == "53"));
    }

    #[test]
    fn empty_series_is_upstream_format() {
        let page = "var hour3data=[];var uptime=\"07:30\";";
        assert!(matches!(parse_hourly(page, &config()), Err(CrawlError::UpstreamFormat(_))));
    }
}
