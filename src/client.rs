use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::error::{RestError, Result};
use crate::executor::{Executor, HttpExecutor};
use crate::params::Params;
use crate::request::RequestBuilder;

/// Default API endpoint root
pub const DEFAULT_ENDPOINT: &str = "https://www.kaltura.com";

/// Connection settings resolved once per build and carried by the descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfiguration {
    /// Endpoint root, without trailing slash
    pub endpoint: String,
    /// Ask the server for gzip compressed responses
    pub accept_gzip_encoding: bool,
    /// Total request timeout
    pub timeout: Duration,
    /// Connection establishment timeout
    pub connect_timeout: Duration,
}

impl Default for ConnectionConfiguration {
    fn default() -> Self {
        ConnectionConfiguration {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            accept_gzip_encoding: false,
            timeout: Duration::from_secs(300), // 5 minutes
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ConnectionConfiguration {
    /// Create a connection configuration for the given endpoint root
    pub fn new(endpoint: &str) -> Result<Self> {
        ConnectionConfiguration::default().with_endpoint(endpoint)
    }

    /// Set the endpoint root; it must be an absolute URL
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        Url::parse(endpoint)?;
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Enable or disable gzip negotiation
    pub fn with_accept_gzip_encoding(mut self, accept: bool) -> Self {
        self.accept_gzip_encoding = accept;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Configuration consumed by request builders.
///
/// Values are plain data: pass one explicitly to `build`, or let the builder
/// fall back to [`Config::default`].
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Connection settings
    pub connection: ConnectionConfiguration,
    /// Parameters attached to every request made with this configuration
    pub client_params: Params,
    /// Per-request parameters, merged after the client ones
    pub request_params: Params,
    /// Sign requests sent through [`Client`]
    pub sign_requests: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            connection: ConnectionConfiguration::default(),
            client_params: Params::new().with("clientTag", concat!("rust:", env!("CARGO_PKG_VERSION"))),
            request_params: Params::new(),
            sign_requests: false,
        }
    }
}

impl Config {
    /// Create a new configuration talking to `endpoint`
    pub fn new(endpoint: &str) -> Result<Self> {
        Ok(Config {
            connection: ConnectionConfiguration::new(endpoint)?,
            ..Config::default()
        })
    }

    /// Endpoint root
    pub fn endpoint(&self) -> &str {
        &self.connection.endpoint
    }

    /// Set the client tag reported to the server
    pub fn with_client_tag(mut self, tag: &str) -> Self {
        self.client_params.add("clientTag", tag);
        self
    }

    /// Pin the API version
    pub fn with_api_version(mut self, version: &str) -> Self {
        self.client_params.add("apiVersion", version);
        self
    }

    /// Set the session token
    pub fn with_ks(mut self, ks: &str) -> Self {
        self.request_params.add("ks", ks);
        self
    }

    /// Set the partner the requests act on behalf of
    pub fn with_partner_id(mut self, partner_id: i64) -> Self {
        self.request_params.add("partnerId", partner_id);
        self
    }

    /// Enable or disable gzip negotiation
    pub fn with_accept_gzip_encoding(mut self, accept: bool) -> Self {
        self.connection.accept_gzip_encoding = accept;
        self
    }

    /// Sign requests sent through [`Client`]
    pub fn with_signing(mut self, sign: bool) -> Self {
        self.sign_requests = sign;
        self
    }

    /// Current session token
    pub fn ks(&self) -> Option<&str> {
        self.request_params.get_str("ks")
    }
}

/// Client pairs a configuration with the executor sending its requests
pub struct Client<E = HttpExecutor> {
    /// Configuration applied to every request
    pub config: Config,
    executor: E,
}

impl Client<HttpExecutor> {
    /// Create a client with the default HTTP executor
    pub fn new(config: Config) -> Result<Self> {
        let executor = HttpExecutor::new(&config.connection)?;
        Ok(Client { config, executor })
    }
}

impl<E: Executor> Client<E> {
    /// Create a client sending requests through `executor`
    pub fn with_executor(config: Config, executor: E) -> Self {
        Client { config, executor }
    }

    /// Build, send and resolve a request; the outcome goes to the builder's completion
    pub fn queue<T: DeserializeOwned>(&self, builder: &mut RequestBuilder<T>) -> Result<()> {
        let request = builder.build(Some(&self.config), self.config.sign_requests);
        let response = self.executor.execute(&request);
        builder.on_complete(&response)
    }

    /// Build, send and resolve a request, returning the outcome.
    ///
    /// Any completion registered on the builder is not called.
    pub fn apply<T: DeserializeOwned>(&self, mut builder: RequestBuilder<T>) -> Result<T> {
        builder.clear_completion();
        self.queue(&mut builder)?;
        builder
            .take_outcome()
            .unwrap_or(Err(RestError::Missing("response outcome")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.endpoint(), "https://www.kaltura.com");
        assert!(!config.connection.accept_gzip_encoding);
        assert!(config.client_params.get_str("clientTag").unwrap().starts_with("rust:"));
        assert!(config.request_params.is_empty());
    }

    #[test]
    fn test_config_with_endpoint() {
        let config = Config::new("http://localhost:8080/").unwrap();
        assert_eq!(config.endpoint(), "http://localhost:8080");
    }

    #[test]
    fn test_config_rejects_relative_endpoint() {
        let result = Config::new("localhost");
        assert!(matches!(result, Err(RestError::UrlParse(_))));
    }

    #[test]
    fn test_config_session_params() {
        let config = Config::default().with_ks("djJ8MTIz").with_partner_id(102);
        assert_eq!(config.ks(), Some("djJ8MTIz"));
        assert_eq!(config.request_params.get("partnerId"), Some(&serde_json::json!(102)));
    }
}
