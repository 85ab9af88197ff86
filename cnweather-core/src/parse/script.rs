//! Extraction of `var name = <literal>;` assignments from inline page scripts.
//!
//! Values are parsed as JSON literal data. Anything that is not a plain
//! array, object, string, number, boolean or null literal is rejected.

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{CrawlError, Result};

pub(crate) static EVENT_DAY: ScriptVar = ScriptVar::new("eventDay");
pub(crate) static EVENT_NIGHT: ScriptVar = ScriptVar::new("eventNight");
pub(crate) static FIF_DAY: ScriptVar = ScriptVar::new("fifDay");
pub(crate) static FIF_NIGHT: ScriptVar = ScriptVar::new("fifNight");
pub(crate) static UPTIME: ScriptVar = ScriptVar::new("uptime");
pub(crate) static HOUR3DATA: ScriptVar = ScriptVar::new("hour3data");

/// A named script variable with a lazily compiled lookup pattern.
#[derive(Debug)]
pub(crate) struct ScriptVar {
    name: &'static str,
    pattern: OnceCell<Regex>,
}

impl ScriptVar {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self { name, pattern: OnceCell::new() }
    }

    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    fn pattern(&self) -> &Regex {
        self.pattern.get_or_init(|| {
            Regex::new(&format!(r"(?s)var\s+{}\s*=\s*(.*?);", regex::escape(self.name)))
                .expect("script variable pattern is a valid regex")
        })
    }

    /// Source text of the first assignment, up to the terminating `;`.
    pub(crate) fn raw<'a>(&self, html: &'a str) -> Result<&'a str> {
        self.pattern()
            .captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .ok_or_else(|| {
                CrawlError::UpstreamFormat(format!("script variable '{}' not found", self.name))
            })
    }

    pub(crate) fn literal<T: DeserializeOwned>(&self, html: &str) -> Result<T> {
        let raw = self.raw(html)?;
        serde_json::from_str(raw)
            .map_err(|source| CrawlError::MalformedLiteral { name: self.name.to_string(), source })
    }

    /// String value of the variable. A quoted literal is unquoted; bare text
    /// is returned with stray quote characters removed.
    pub(crate) fn text(&self, html: &str) -> Result<String> {
        let raw = self.raw(html)?;
        Ok(serde_json::from_str::<String>(raw)
            .unwrap_or_else(|_| raw.chars().filter(|c| !matches!(c, '"' | '\'')).collect()))
    }
}

/// Render a literal scalar the way the page shows it.
pub(crate) fn literal_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Serde adapter for fields the provider sends as either strings or numbers.
pub(crate) fn text_field<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(literal_text)
}

/// Drop the "更新" (updated) marker the provider wraps timestamps in.
pub(crate) fn clean_update_time(raw: &str) -> String {
    raw.replace("更新", "").trim().to_string()
}
