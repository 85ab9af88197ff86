use std::sync::Arc;

use crate::{
    config::ConfigBundle,
    error::{CrawlError, Result},
    model::CityCode,
};

/// Resolves city names to provider codes.
///
/// Prefixes of the name are tried from one character upwards and the first
/// one present in the city table wins. "上海市" therefore resolves through
/// "上海" when only the short form is configured. The scan must stay
/// shortest-first: for ambiguous names a longer match would pick a
/// different city.
#[derive(Debug, Clone)]
pub struct CityResolver {
    config: Arc<ConfigBundle>,
}

impl CityResolver {
    pub fn new(config: Arc<ConfigBundle>) -> Self {
        Self { config }
    }

    pub fn resolve(&self, city_name: &str) -> Result<CityCode> {
        let cities = &self.config.city_codes;

        city_name
            .char_indices()
            .map(|(i, c)| &city_name[..i + c.len_utf8()])
            .find_map(|prefix| cities.get(prefix))
            .map(CityCode::new)
            .ok_or_else(|| CrawlError::UnknownCity(city_name.to_string()))
    }
}
