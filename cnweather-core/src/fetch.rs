use async_trait::async_trait;
use reqwest::{
    Client,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use std::{fmt::Debug, time::Duration};
use tracing::debug;

use crate::{
    config::ConfigBundle,
    error::{CrawlError, Result},
};

/// Upper bound on a single request, connect to last byte.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Something that turns a URL into page text.
#[async_trait]
pub trait PageSource: Send + Sync + Debug {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Plain GET with the configured browser headers.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    pub fn new(config: &ConfigBundle) -> Result<Self> {
        Self::with_timeout(config, FETCH_TIMEOUT)
    }

    pub fn with_timeout(config: &ConfigBundle, timeout: Duration) -> Result<Self> {
        let headers = header_map(config)?;

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| CrawlError::InvalidConfig {
                resource: "HTTP client".into(),
                message: e.to_string(),
            })?;

        Ok(Self { http })
    }
}

fn header_map(config: &ConfigBundle) -> Result<HeaderMap> {
    let table = &config.browser_headers;
    let invalid = |key: &str, message: String| CrawlError::InvalidConfig {
        resource: format!("[{}] {key}", table.name()),
        message,
    };

    let mut headers = HeaderMap::with_capacity(table.len());
    for (key, value) in table.iter() {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| invalid(key, e.to_string()))?;
        let value = HeaderValue::from_str(value).map_err(|e| invalid(key, e.to_string()))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

#[async_trait]
impl PageSource for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let network = |source| CrawlError::Network { url: url.to_string(), source };

        debug!(url, "fetching");
        let res = self.http.get(url).send().await.map_err(network)?;

        let status = res.status();
        // The provider mislabels its charset; bodies are always UTF-8.
        let bytes = res.bytes().await.map_err(network)?;
        let body = String::from_utf8(bytes.to_vec())
            .map_err(|_| CrawlError::Decode { url: url.to_string() })?;

        if !status.is_success() {
            return Err(CrawlError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        debug!(url, bytes = body.len(), "fetched");
        Ok(body)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigTable;

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "晴".repeat(300);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn invalid_header_name_is_config_error() {
        let bundle = ConfigBundle {
            browser_headers: ConfigTable::new("BrowserHeader", [("Bad Header", "x")]),
            ..Default::default()
        };

        let err = HttpFetcher::new(&bundle).unwrap_err();
        assert!(matches!(err, CrawlError::InvalidConfig { ref resource, .. }
            if resource.contains("Bad Header")));
    }
}
