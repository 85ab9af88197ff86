use directories::ProjectDirs;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::{
    endpoint::Endpoint,
    error::{CrawlError, Result},
    model::CityCode,
};

/// Placeholder substituted with the city code in every URL template.
pub const CITY_CODE_PLACEHOLDER: &str = "{city_code}";

/// A named, read-only key→value table loaded from one config section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigTable {
    name: String,
    entries: BTreeMap<String, String>,
}

impl ConfigTable {
    pub fn new<I, K, V>(name: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            entries: entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Map a provider short code to its label. A code missing from the table
    /// is an error; there is no fallback label.
    pub fn decode(&self, code: &str) -> Result<&str> {
        self.get(code).ok_or_else(|| CrawlError::UnknownCode {
            table: self.name.clone(),
            code: code.to_string(),
        })
    }
}

/// The six tables the crawler reads, and the file/section each lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSource {
    CityCode,
    AllUrl,
    WindDirectionCode,
    WindSpeedCode,
    WeatherCode,
    BrowserHeader,
}

impl TableSource {
    pub fn file_name(&self) -> &'static str {
        match self {
            TableSource::CityCode => "city_code.toml",
            TableSource::AllUrl
            | TableSource::WindDirectionCode
            | TableSource::WindSpeedCode
            | TableSource::WeatherCode => "china_weather.toml",
            TableSource::BrowserHeader => "crawler.toml",
        }
    }

    pub fn section(&self) -> &'static str {
        match self {
            TableSource::CityCode => "CityCode",
            TableSource::AllUrl => "AllUrl",
            TableSource::WindDirectionCode => "WindDirectionCode",
            TableSource::WindSpeedCode => "WindSpeedCode",
            TableSource::WeatherCode => "WeatherCode",
            TableSource::BrowserHeader => "BrowserHeader",
        }
    }
}

/// Reads config tables from the TOML files of one directory.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the platform config directory.
    pub fn from_default_dir() -> Result<Self> {
        Ok(Self::new(Self::default_dir()?))
    }

    pub fn default_dir() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("cn", "cnweather", "cnweather").ok_or_else(|| {
            CrawlError::ConfigNotFound("platform config directory could not be determined".into())
        })?;

        Ok(dirs.config_dir().to_path_buf())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load one table. Fails with `ConfigNotFound` if its file or section is missing.
    pub fn load(&self, source: TableSource) -> Result<ConfigTable> {
        let path = self.dir.join(source.file_name());
        if !path.exists() {
            return Err(CrawlError::ConfigNotFound(format!(
                "{}\nHint: copy the sample files from `configs/` into {}.",
                path.display(),
                self.dir.display()
            )));
        }

        let contents = fs::read_to_string(&path).map_err(|e| CrawlError::InvalidConfig {
            resource: path.display().to_string(),
            message: e.to_string(),
        })?;

        let table = parse_section(&contents, source.section(), &path.display().to_string())?;
        debug!(table = table.name(), entries = table.len(), "loaded config table");
        Ok(table)
    }
}

fn parse_section(contents: &str, section: &str, resource: &str) -> Result<ConfigTable> {
    let invalid = |message: String| CrawlError::InvalidConfig {
        resource: resource.to_string(),
        message,
    };

    let doc: toml::Table = toml::from_str(contents).map_err(|e| invalid(e.to_string()))?;

    let raw = doc
        .get(section)
        .ok_or_else(|| CrawlError::ConfigNotFound(format!("section [{section}] in {resource}")))?
        .as_table()
        .ok_or_else(|| invalid(format!("[{section}] is not a table")))?;

    let mut entries = BTreeMap::new();
    for (key, value) in raw {
        let value = value
            .as_str()
            .ok_or_else(|| invalid(format!("[{section}] value of '{key}' must be a string")))?;
        entries.insert(key.clone(), value.to_string());
    }

    Ok(ConfigTable { name: section.to_string(), entries })
}

/// All tables the crawler needs, loaded once and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct ConfigBundle {
    pub city_codes: ConfigTable,
    pub urls: ConfigTable,
    pub wind_direction_codes: ConfigTable,
    pub wind_speed_codes: ConfigTable,
    pub weather_codes: ConfigTable,
    pub browser_headers: ConfigTable,
}

impl ConfigBundle {
    pub fn load(store: &ConfigStore) -> Result<Self> {
        let bundle = Self {
            city_codes: store.load(TableSource::CityCode)?,
            urls: store.load(TableSource::AllUrl)?,
            wind_direction_codes: store.load(TableSource::WindDirectionCode)?,
            wind_speed_codes: store.load(TableSource::WindSpeedCode)?,
            weather_codes: store.load(TableSource::WeatherCode)?,
            browser_headers: store.load(TableSource::BrowserHeader)?,
        };
        bundle.validate()?;
        Ok(bundle)
    }

    /// Every endpoint must have a URL template.
    pub fn validate(&self) -> Result<()> {
        for endpoint in Endpoint::all() {
            if !self.urls.contains(endpoint.as_str()) {
                return Err(CrawlError::ConfigNotFound(format!(
                    "URL template '{endpoint}' in [{}]",
                    self.urls.name()
                )));
            }
        }
        Ok(())
    }

    pub fn url_for(&self, endpoint: Endpoint, code: &CityCode) -> Result<String> {
        let template = self.urls.get(endpoint.as_str()).ok_or_else(|| {
            CrawlError::ConfigNotFound(format!("URL template '{endpoint}'"))
        })?;

        Ok(template.replace(CITY_CODE_PLACEHOLDER, code.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const CHINA_WEATHER: &str = r#"
[AllUrl]
realtime = "http://d1.weather.com.cn/sk_2d/{city_code}.html"
seven_day = "http://www.weather.com.cn/weather/{city_code}.shtml"
fifteen_day = "http://www.weather.com.cn/weather15d/{city_code}.shtml"
hourly = "http://www.weather.com.cn/weather1d/{city_code}.shtml"

[WindDirectionCode]
"0" = "无持续风向"
"4" = "南风"

[WindSpeedCode]
"0" = "<3级"

[WeatherCode]
"00" = "晴"
"01" = "多云"
"#;

    fn write_configs(dir: &Path) {
        fs::write(dir.join("city_code.toml"), "[CityCode]\n\"北京\" = \"101010100\"\n").unwrap();
        fs::write(dir.join("china_weather.toml"), CHINA_WEATHER).unwrap();
        fs::write(dir.join("crawler.toml"), "[BrowserHeader]\nUser-Agent = \"Mozilla/5.0\"\n")
            .unwrap();
    }

    #[test]
    fn load_missing_file_is_config_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());

        let err = store.load(TableSource::CityCode).unwrap_err();
        assert!(matches!(err, CrawlError::ConfigNotFound(_)));
        assert!(err.to_string().contains("city_code.toml"));
    }

    #[test]
    fn load_missing_section_is_config_not_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("crawler.toml"), "[Other]\nkey = \"v\"\n").unwrap();

        let err = ConfigStore::new(dir.path()).load(TableSource::BrowserHeader).unwrap_err();
        assert!(matches!(err, CrawlError::ConfigNotFound(ref msg) if msg.contains("[BrowserHeader]")));
    }

    #[test]
    fn non_string_value_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("city_code.toml"), "[CityCode]\n\"北京\" = 101010100\n").unwrap();

        let err = ConfigStore::new(dir.path()).load(TableSource::CityCode).unwrap_err();
        assert!(matches!(err, CrawlError::InvalidConfig { .. }));
    }

    #[test]
    fn bundle_loads_all_tables() {
        let dir = tempfile::tempdir().unwrap();
        write_configs(dir.path());

        let bundle = ConfigBundle::load(&ConfigStore::new(dir.path())).expect("bundle must load");

        assert_eq!(bundle.city_codes.get("北京"), Some("101010100"));
        assert_eq!(bundle.weather_codes.name(), "WeatherCode");
        assert_eq!(bundle.wind_speed_codes.get("0"), Some("<3级"));
        assert_eq!(bundle.browser_headers.get("User-Agent"), Some("Mozilla/5.0"));
    }

    #[test]
    fn bundle_requires_every_url_template() {
        let dir = tempfile::tempdir().unwrap();
        write_configs(dir.path());
        let trimmed = CHINA_WEATHER.replace("hourly = ", "# hourly = ");
        fs::write(dir.path().join("china_weather.toml"), trimmed).unwrap();

        let err = ConfigBundle::load(&ConfigStore::new(dir.path())).unwrap_err();
        assert!(err.to_string().contains("'hourly'"));
    }

    #[test]
    fn url_for_substitutes_city_code() {
        let bundle = ConfigBundle {
            urls: ConfigTable::new("AllUrl", [("realtime", "http://host/sk_2d/{city_code}.html")]),
            ..Default::default()
        };

        let url = bundle.url_for(Endpoint::RealTime, &CityCode::new("101020100")).unwrap();
        assert_eq!(url, "http://host/sk_2d/101020100.html");
    }

    #[test]
    fn keys_are_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("city_code.toml"),
            "[CityCode]\n\"上海\" = \"101020100\"\n\"北京\" = \"101010100\"\n\"广州\" = \"101280101\"\n",
        )
        .unwrap();

        let table = ConfigStore::new(dir.path()).load(TableSource::CityCode).unwrap();
        let mut expected = vec!["上海", "北京", "广州"];
        expected.sort_unstable();
        assert_eq!(table.keys().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn decode_unknown_code_fails() {
        let table = ConfigTable::new("WindSpeedCode", [("0", "<3级")]);

        assert_eq!(table.decode("0").unwrap(), "<3级");
        let err = table.decode("9").unwrap_err();
        assert!(matches!(err, CrawlError::UnknownCode { ref table, ref code }
            if table == "WindSpeedCode" && code == "9"));
    }
}
