use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::warn;

use super::script::{self, EVENT_DAY, EVENT_NIGHT, FIF_DAY, FIF_NIGHT, ScriptVar, UPTIME};
use crate::{
    error::{CrawlError, Result},
    model::ForecastDay,
};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid CSS")
}

static DATE_CONTAINER: Lazy<Selector> = Lazy::new(|| selector("ul.date-container"));
static LIST_ITEM: Lazy<Selector> = Lazy::new(|| selector("li"));
const SEVEN_DAY_LIST: &str = "ul.blue-container.sky";
const FIFTEEN_DAY_LIST: &str = "ul.blue-container";

static SEVEN_DAY_CONTAINER: Lazy<Selector> = Lazy::new(|| selector(SEVEN_DAY_LIST));
static FIFTEEN_DAY_CONTAINER: Lazy<Selector> = Lazy::new(|| selector(FIFTEEN_DAY_LIST));
static DAY_ITEM: Lazy<Selector> = Lazy::new(|| selector("li.blue-item"));
static DATE: Lazy<Selector> = Lazy::new(|| selector("p.date"));
static DATE_INFO: Lazy<Selector> = Lazy::new(|| selector("p.date-info"));
static WEATHER_INFO: Lazy<Selector> = Lazy::new(|| selector("p.weather-info"));
static WIND_INFO: Lazy<Selector> = Lazy::new(|| selector("p.wind-info"));
static WIND_CONTAINER: Lazy<Selector> = Lazy::new(|| selector("div.wind-container"));
static WIND_ICON: Lazy<Selector> = Lazy::new(|| selector("i"));
static UPDATE_TIME_INPUT: Lazy<Selector> = Lazy::new(|| selector("input#update_time"));

/// Days and update time read from one forecast page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastPage {
    pub update_time: String,
    pub days: Vec<ForecastDay>,
}

pub fn parse_seven_day(html: &str) -> Result<ForecastPage> {
    let document = Html::parse_document(html);
    let container = (&*SEVEN_DAY_CONTAINER, SEVEN_DAY_LIST);
    let days = extract_days(&document, html, container, &EVENT_DAY, &EVENT_NIGHT)?;
    let update_time = script::clean_update_time(&UPTIME.text(html)?);

    Ok(ForecastPage { update_time, days })
}

/// Parse the 8–15 day page. Only this page's own days are returned.
pub fn parse_fifteen_day(html: &str) -> Result<ForecastPage> {
    let document = Html::parse_document(html);
    let container = (&*FIFTEEN_DAY_CONTAINER, FIFTEEN_DAY_LIST);
    let days = extract_days(&document, html, container, &FIF_DAY, &FIF_NIGHT)?;

    let update_time = document
        .select(&UPDATE_TIME_INPUT)
        .next()
        .and_then(|input| input.value().attr("value"))
        .ok_or_else(|| missing("input#update_time[value]"))?
        .to_string();

    Ok(ForecastPage { update_time, days })
}

fn extract_days(
    document: &Html,
    html: &str,
    (day_container, day_container_css): (&Selector, &str),
    highs: &ScriptVar,
    lows: &ScriptVar,
) -> Result<Vec<ForecastDay>> {
    let dates: Vec<ElementRef> = document
        .select(&DATE_CONTAINER)
        .next()
        .ok_or_else(|| missing("ul.date-container"))?
        .select(&LIST_ITEM)
        .collect();

    let items: Vec<ElementRef> = document
        .select(day_container)
        .next()
        .ok_or_else(|| missing(day_container_css))?
        .select(&DAY_ITEM)
        .collect();

    let high: Vec<Value> = highs.literal(html)?;
    let low: Vec<Value> = lows.literal(html)?;

    let lengths = [dates.len(), high.len(), low.len(), items.len()];
    if lengths.iter().any(|&n| n != lengths[0]) {
        warn!(
            dates = dates.len(),
            highs = high.len(),
            lows = low.len(),
            items = items.len(),
            high_var = highs.name(),
            "forecast sequences differ in length; extra entries dropped"
        );
    }

    dates
        .iter()
        .zip(high)
        .zip(low)
        .zip(items.iter())
        .map(|(((date, high), low), item)| -> Result<ForecastDay> {
            Ok(ForecastDay {
                date: child_text(date, &DATE, "p.date")?,
                date_info: child_text(date, &DATE_INFO, "p.date-info")?,
                high_temp: script::literal_text(high),
                low_temp: script::literal_text(low),
                weather: child_text(item, &WEATHER_INFO, "p.weather-info")?,
                wind_direction: wind_directions(item)?,
                wind_speed: child_text(item, &WIND_INFO, "p.wind-info")?.replace('\n', ""),
            })
        })
        .collect()
}

/// Distinct `title`s of the wind icons, first-seen order, comma-joined.
fn wind_directions(item: &ElementRef) -> Result<String> {
    let container = item
        .select(&WIND_CONTAINER)
        .next()
        .ok_or_else(|| missing("div.wind-container"))?;

    let mut seen: Vec<&str> = Vec::new();
    for title in container.select(&WIND_ICON).filter_map(|i| i.value().attr("title")) {
        if !seen.contains(&title) {
            seen.push(title);
        }
    }
    Ok(seen.join(","))
}

fn child_text(parent: &ElementRef, sel: &Selector, what: &str) -> Result<String> {
    parent
        .select(sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .ok_or_else(|| missing(what))
}

fn missing(what: &str) -> CrawlError {
    CrawlError::UpstreamFormat(format!("forecast page has no {what}"))
}
