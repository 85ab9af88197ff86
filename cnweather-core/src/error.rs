//! Error taxonomy shared by every retrieval operation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    /// A configuration file or one of its sections does not exist.
    #[error("Configuration resource not found: {0}")]
    ConfigNotFound(String),

    #[error("Invalid configuration in {resource}: {message}")]
    InvalidConfig { resource: String, message: String },

    #[error("Unknown city '{0}': no prefix of it is a known city name")]
    UnknownCity(String),

    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} failed with status {status}: {body}")]
    HttpStatus { url: String, status: u16, body: String },

    #[error("Response from {url} is not valid UTF-8")]
    Decode { url: String },

    /// The provider's response no longer has the expected shape.
    #[error("Upstream format changed: {0}")]
    UpstreamFormat(String),

    #[error("Unknown {table} code '{code}'")]
    UnknownCode { table: String, code: String },

    #[error("Script variable '{name}' is not a literal value: {source}")]
    MalformedLiteral {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CrawlError {
    /// Whether this error belongs to the transport class (timeout, connection,
    /// bad status or undecodable body).
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::HttpStatus { .. } | Self::Decode { .. })
    }
}

pub type Result<T, E = CrawlError> = std::result::Result<T, E>;
