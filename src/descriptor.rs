use indexmap::IndexMap;
use reqwest::Method;

use crate::client::ConnectionConfiguration;
use crate::files::Files;
use crate::params::Params;

/// Header names and default values
pub const HEADER_ACCEPT: &str = "Accept";
pub const HEADER_ACCEPT_CHARSET: &str = "Accept-Charset";
pub const HEADER_ACCEPT_ENCODING: &str = "Accept-Encoding";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const DEFAULT_ACCEPT: &str = "application/json";
pub const DEFAULT_ACCEPT_CHARSET: &str = "utf-8,ISO-8859-1;q=0.7,*;q=0.5";
pub const ENCODING_GZIP: &str = "gzip";
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Header mapping, in insertion order
pub type Headers = IndexMap<String, String>;

/// Look up a header by case-insensitive name
pub fn find_header<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Insert a header, replacing any entry whose name differs only by case
pub(crate) fn put_header(headers: &mut Headers, name: String, value: String) {
    headers.retain(|key, _| !key.eq_ignore_ascii_case(&name));
    headers.insert(name, value);
}

/// Insert a header unless one with the same name is already present
pub(crate) fn default_header(headers: &mut Headers, name: &str, value: &str) {
    if find_header(headers, name).is_none() {
        headers.insert(name.to_string(), value.to_string());
    }
}

/// RequestDescriptor is the fully resolved, immutable form of a request.
///
/// Produced by `RequestBuilder::build` and handed to an executor. Its body
/// and signature are fixed at build time and cannot drift apart.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub(crate) id: Option<String>,
    pub(crate) tag: String,
    pub(crate) url: String,
    pub(crate) params: Params,
    pub(crate) body: String,
    pub(crate) headers: Headers,
    pub(crate) files: Option<Files>,
    pub(crate) connection: ConnectionConfiguration,
    pub(crate) signature: Option<String>,
}

impl RequestDescriptor {
    /// HTTP method; every API call is a POST
    pub fn method(&self) -> Method {
        Method::POST
    }

    /// Absolute request URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Serialized request body
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Final parameters the body was rendered from
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Request headers
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Get a header by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Content type of the body
    pub fn content_type(&self) -> &str {
        self.header(HEADER_CONTENT_TYPE).unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    /// Caller supplied identifier
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Short name of the called action, e.g. `media.get`
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attached files, for requests that carry them
    pub fn files(&self) -> Option<&Files> {
        self.files.as_ref()
    }

    /// Connection settings resolved at build time
    pub fn connection(&self) -> &ConnectionConfiguration {
        &self.connection
    }

    /// Body signature, when the request was signed
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }
}
