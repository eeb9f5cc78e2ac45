use reqwest::blocking::{multipart, Client, ClientBuilder};
use std::time::Instant;

use crate::client::ConnectionConfiguration;
use crate::descriptor::{RequestDescriptor, HEADER_CONTENT_TYPE};
use crate::error::Result;
use crate::response::RawResponse;

/// Header carrying the server-side request identifier
pub const HEADER_REQUEST_ID: &str = "X-Me";

/// Executor sends built requests and reports what came back.
///
/// Transport failures are not errors at this boundary: they come back as
/// unsuccessful responses and are resolved like any other failure.
pub trait Executor {
    /// Send `request` and wait for its response
    fn execute(&self, request: &RequestDescriptor) -> RawResponse;
}

/// Create the default HTTP client for API requests
/// with optimized settings for connection pooling and timeouts
pub fn create_rest_client(connection: &ConnectionConfiguration) -> Result<Client> {
    Ok(ClientBuilder::new()
        .gzip(connection.accept_gzip_encoding)
        .pool_max_idle_per_host(50)
        .timeout(connection.timeout)
        .connect_timeout(connection.connect_timeout)
        .build()?)
}

/// HttpExecutor sends requests with a blocking reqwest client
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
}

impl HttpExecutor {
    /// Create an executor with client settings taken from `connection`
    pub fn new(connection: &ConnectionConfiguration) -> Result<Self> {
        Ok(HttpExecutor {
            client: create_rest_client(connection)?,
        })
    }

    /// Create an executor around an existing client
    pub fn with_client(client: Client) -> Self {
        HttpExecutor { client }
    }

    fn send(&self, request: &RequestDescriptor) -> Result<RawResponse> {
        let mut builder = self.client.request(request.method(), request.url());
        let files = request.files().filter(|files| !files.is_empty());
        for (name, value) in request.headers() {
            // set below; multipart picks its own boundary
            if name.eq_ignore_ascii_case(HEADER_CONTENT_TYPE) {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match files {
            Some(files) => {
                let mut form = multipart::Form::new().text("json", request.body().to_string());
                for (key, file) in files.iter() {
                    let part = multipart::Part::bytes(file.content.to_vec())
                        .file_name(file.name.clone())
                        .mime_str(&file.mime_type)?;
                    form = form.part(key.clone(), part);
                }
                builder.multipart(form)
            }
            None => builder
                .header(HEADER_CONTENT_TYPE, request.content_type())
                .body(request.body().to_string()),
        };

        let http_response = builder.send()?;
        let status = http_response.status();
        let request_id = http_response
            .headers()
            .get(HEADER_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = http_response.text()?;

        Ok(RawResponse {
            success: status.is_success(),
            status: Some(status.as_u16()),
            body,
            request_id,
        })
    }
}

impl Executor for HttpExecutor {
    fn execute(&self, request: &RequestDescriptor) -> RawResponse {
        let start = Instant::now();
        let response = self
            .send(request)
            .unwrap_or_else(|e| RawResponse::failure(None, e.to_string()));
        tracing::debug!(
            method = %request.method(),
            tag = %request.tag(),
            duration = ?start.elapsed(),
            status = ?response.status,
            "request sent"
        );
        response
    }
}

#[cfg(feature = "async")]
pub use self::nonblocking::AsyncHttpExecutor;

#[cfg(feature = "async")]
mod nonblocking {
    use reqwest::multipart;
    use std::time::Instant;

    use crate::client::ConnectionConfiguration;
    use crate::descriptor::{RequestDescriptor, HEADER_CONTENT_TYPE};
    use crate::error::Result;
    use crate::response::RawResponse;

    use super::HEADER_REQUEST_ID;

    /// AsyncHttpExecutor sends requests with an async reqwest client
    #[derive(Debug, Clone)]
    pub struct AsyncHttpExecutor {
        client: reqwest::Client,
    }

    impl AsyncHttpExecutor {
        /// Create an executor with client settings taken from `connection`
        pub fn new(connection: &ConnectionConfiguration) -> Result<Self> {
            let client = reqwest::Client::builder()
                .gzip(connection.accept_gzip_encoding)
                .pool_max_idle_per_host(50)
                .timeout(connection.timeout)
                .connect_timeout(connection.connect_timeout)
                .build()?;
            Ok(AsyncHttpExecutor { client })
        }

        /// Send `request` and wait for its response
        pub async fn execute(&self, request: &RequestDescriptor) -> RawResponse {
            let start = Instant::now();
            let response = match self.send(request).await {
                Ok(response) => response,
                Err(e) => RawResponse::failure(None, e.to_string()),
            };
            tracing::debug!(
                method = %request.method(),
                tag = %request.tag(),
                duration = ?start.elapsed(),
                status = ?response.status,
                "request sent"
            );
            response
        }

        async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse> {
            let mut builder = self.client.request(request.method(), request.url());
            for (name, value) in request.headers() {
                if name.eq_ignore_ascii_case(HEADER_CONTENT_TYPE) {
                    continue;
                }
                builder = builder.header(name.as_str(), value.as_str());
            }

            builder = match request.files().filter(|files| !files.is_empty()) {
                Some(files) => {
                    let mut form = multipart::Form::new().text("json", request.body().to_string());
                    for (key, file) in files.iter() {
                        let part = multipart::Part::bytes(file.content.to_vec())
                            .file_name(file.name.clone())
                            .mime_str(&file.mime_type)?;
                        form = form.part(key.clone(), part);
                    }
                    builder.multipart(form)
                }
                None => builder
                    .header(HEADER_CONTENT_TYPE, request.content_type())
                    .body(request.body().to_string()),
            };

            let http_response = builder.send().await?;

            let status = http_response.status();
            let request_id = http_response
                .headers()
                .get(HEADER_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string());
            let body = http_response.text().await?;

            Ok(RawResponse {
                success: status.is_success(),
                status: Some(status.as_u16()),
                body,
                request_id,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestBuilder;

    #[test]
    fn test_unreachable_server_is_a_failed_response() {
        let connection = ConnectionConfiguration::new("http://127.0.0.1:9")
            .unwrap()
            .with_timeout(std::time::Duration::from_secs(2));
        let config = crate::Config {
            connection: connection.clone(),
            ..crate::Config::default()
        };
        let mut builder: RequestBuilder<bool> = RequestBuilder::new("system", "ping");
        let request = builder.build(Some(&config), false);

        let response = HttpExecutor::new(&connection).unwrap().execute(&request);
        assert!(!response.success);
        assert!(!response.body.is_empty());
    }
}
