use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::{Config, ConnectionConfiguration};
use crate::descriptor::{
    default_header, put_header, Headers, RequestDescriptor, DEFAULT_ACCEPT, DEFAULT_ACCEPT_CHARSET,
    ENCODING_GZIP, HEADER_ACCEPT, HEADER_ACCEPT_CHARSET, HEADER_ACCEPT_ENCODING,
};
use crate::error::{RestError, Result};
use crate::files::{FileHolder, Files};
use crate::params::Params;
use crate::resolver::resolve;
use crate::response::ResponseElement;
use crate::signature::apply_signature;

/// API version segment placed between the endpoint root and the request tail
pub const URL_API_VERSION: &str = "/api_v3/";

/// Flag asking the server to leave null fields out of its responses
pub const IGNORE_NULL_PARAM: &str = "ignoreNull";

/// Completion receiving the outcome of a request
pub type OnCompletion<T> = Box<dyn FnMut(Result<T>) + Send>;

/// Endpoint names the remote call a request builder targets.
pub trait Endpoint: Send {
    /// Path appended after the API version segment
    fn url_tail(&self) -> String;

    /// Short name used in logs, e.g. `media.get`
    fn tag(&self) -> String;
}

/// A `service/<service>/action/<action>` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAction {
    pub service: String,
    pub action: String,
}

impl ServiceAction {
    /// Create a new ServiceAction
    pub fn new(service: impl Into<String>, action: impl Into<String>) -> Self {
        ServiceAction {
            service: service.into(),
            action: action.into(),
        }
    }
}

impl Endpoint for ServiceAction {
    fn url_tail(&self) -> String {
        format!("service/{}/action/{}", self.service, self.action)
    }

    fn tag(&self) -> String {
        format!("{}.{}", self.service, self.action)
    }
}

/// Resolution state of a builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Not built yet
    Idle,
    /// Built, waiting for its response
    Pending,
    /// Response resolved; build again to issue another request
    Resolved,
}

/// RequestBuilder assembles a call whose result is parsed as `T`.
///
/// The builder owns the caller's parameters and headers. [`build`](Self::build)
/// layers defaults and configuration over them, optionally signs the body and
/// returns an immutable [`RequestDescriptor`]; the builder itself is left
/// untouched apart from the cached URL, so it can be built again.
///
/// Once built, the executor hands the response back through
/// [`on_complete`](Self::on_complete), which delivers exactly one outcome.
pub struct RequestBuilder<T> {
    endpoint: Box<dyn Endpoint>,
    id: Option<String>,
    url: Option<String>,
    params: Params,
    files: Option<Files>,
    headers: Option<Headers>,
    connection: Option<ConnectionConfiguration>,
    completion: Option<OnCompletion<T>>,
    outcome: Option<Result<T>>,
    state: RequestState,
}

impl<T> RequestBuilder<T> {
    /// Create a builder calling `action` on `service`
    pub fn new(service: &str, action: &str) -> Self {
        Self::with_endpoint(ServiceAction::new(service, action))
    }

    /// Create a builder for a custom endpoint
    pub fn with_endpoint(endpoint: impl Endpoint + 'static) -> Self {
        RequestBuilder {
            endpoint: Box::new(endpoint),
            id: None,
            url: None,
            params: Params::new(),
            files: None,
            headers: None,
            connection: None,
            completion: None,
            outcome: None,
            state: RequestState::Idle,
        }
    }

    /// Start from an initial parameter container
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Give this builder a file attachment slot
    pub fn with_files(mut self, files: Files) -> Self {
        self.files = Some(files);
        self
    }

    /// Merge `params` over the current parameters
    pub fn set_params(&mut self, params: &Params) -> &mut Self {
        self.params.put_all(params);
        self
    }

    /// Add a single parameter
    pub fn add_param(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.params.add(key, value);
        self
    }

    /// Caller parameters, before defaults and configuration are applied
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Mutable access to the caller parameters
    pub fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    /// Attach a file; ignored by builders created without a file slot
    pub fn attach_file(&mut self, key: impl Into<String>, file: FileHolder) -> &mut Self {
        match self.files.as_mut() {
            Some(files) => files.add(key, file),
            None => {
                tracing::debug!(tag = %self.endpoint.tag(), "request does not carry files, attachment ignored")
            }
        }
        self
    }

    /// Overwrite or append headers
    pub fn set_headers(&mut self, headers: Headers) -> &mut Self {
        let current = self.headers.get_or_insert_with(Headers::new);
        for (name, value) in headers {
            put_header(current, name, value);
        }
        self
    }

    /// Overwrite or append a single header
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        put_header(self.headers.get_or_insert_with(Headers::new), name.into(), value.into());
        self
    }

    /// Overwrite or append headers given as a flat `name, value, ...` list
    pub fn set_header_pairs(&mut self, pairs: &[&str]) -> Result<&mut Self> {
        if pairs.len() % 2 != 0 {
            return Err(RestError::OddHeaderPairs(pairs.len()));
        }
        for pair in pairs.chunks_exact(2) {
            self.set_header(pair[0], pair[1]);
        }
        Ok(self)
    }

    /// Caller headers, before defaults are applied
    pub fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    /// Set an identifier carried by the descriptor
    pub fn set_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.id = Some(id.into());
        self
    }

    /// Use an explicit URL instead of the composed one
    pub fn set_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.url = Some(url.into());
        self
    }

    /// Request URL, once set or composed by a build
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Short name of the called action
    pub fn tag(&self) -> String {
        self.endpoint.tag()
    }

    /// Connection settings resolved by the last build
    pub fn connection(&self) -> Option<&ConnectionConfiguration> {
        self.connection.as_ref()
    }

    /// Register the completion receiving the outcome
    pub fn set_completion<F>(&mut self, completion: F) -> &mut Self
    where
        F: FnMut(Result<T>) + Send + 'static,
    {
        self.completion = Some(Box::new(completion));
        self
    }

    pub(crate) fn clear_completion(&mut self) {
        self.completion = None;
    }

    /// Current resolution state
    pub fn state(&self) -> RequestState {
        self.state
    }

    /// Take the outcome of a resolution that had no completion registered
    pub fn take_outcome(&mut self) -> Option<Result<T>> {
        self.outcome.take()
    }

    /// Build the request descriptor.
    ///
    /// Falls back to [`Config::default`] connection settings when no
    /// configuration is given. Parameters and headers are recomputed on every
    /// call; the URL is composed once and reused.
    pub fn build(&mut self, config: Option<&Config>, add_signature: bool) -> RequestDescriptor {
        let connection = match config {
            Some(config) => config.connection.clone(),
            None => ConnectionConfiguration::default(),
        };
        self.connection = Some(connection.clone());

        let (params, signature) = self.prepare_params(config, add_signature);
        let headers = self.prepare_headers(&connection);
        let url = self.prepare_url(&connection.endpoint);

        self.state = RequestState::Pending;
        self.outcome = None;

        let request = RequestDescriptor {
            id: self.id.clone(),
            tag: self.endpoint.tag(),
            url,
            body: params.serialize(),
            params,
            headers,
            files: self.files.clone(),
            connection,
            signature,
        };
        tracing::debug!(tag = %request.tag, url = %request.url, signed = add_signature, "built request");
        request
    }

    fn prepare_params(&self, config: Option<&Config>, add_signature: bool) -> (Params, Option<String>) {
        let mut params = self.params.clone();

        params.add(IGNORE_NULL_PARAM, true);
        if let Some(config) = config {
            params.put_all(&config.client_params);
            params.put_all(&config.request_params);
        }

        let signature = add_signature.then(|| apply_signature(&mut params));
        (params, signature)
    }

    fn prepare_headers(&self, connection: &ConnectionConfiguration) -> Headers {
        let mut headers = self.headers.clone().unwrap_or_default();

        default_header(&mut headers, HEADER_ACCEPT, DEFAULT_ACCEPT);
        default_header(&mut headers, HEADER_ACCEPT_CHARSET, DEFAULT_ACCEPT_CHARSET);
        if connection.accept_gzip_encoding {
            default_header(&mut headers, HEADER_ACCEPT_ENCODING, ENCODING_GZIP);
        }
        headers
    }

    fn prepare_url(&mut self, endpoint: &str) -> String {
        self.url
            .get_or_insert_with(|| {
                format!("{}{}{}", endpoint, URL_API_VERSION, self.endpoint.url_tail())
            })
            .clone()
    }
}

impl<T: DeserializeOwned> RequestBuilder<T> {
    /// Resolve the response to the last built request.
    ///
    /// Delivers the outcome to the registered completion, or stores it for
    /// [`take_outcome`](Self::take_outcome) when none is registered. Fails
    /// with [`RestError::NotPending`] unless a build preceded this call.
    pub fn on_complete(&mut self, response: &dyn ResponseElement) -> Result<()> {
        if self.state != RequestState::Pending {
            return Err(RestError::NotPending);
        }
        self.state = RequestState::Resolved;

        let outcome = resolve::<T>(response);
        match self.completion.as_mut() {
            Some(completion) => completion(outcome),
            None => self.outcome = Some(outcome),
        }
        Ok(())
    }
}

impl<T> std::fmt::Debug for RequestBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("tag", &self.endpoint.tag())
            .field("id", &self.id)
            .field("url", &self.url)
            .field("params", &self.params)
            .field("headers", &self.headers)
            .field("state", &self.state)
            .field("completion", &self.completion.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
