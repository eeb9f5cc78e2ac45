//! # kapi - request building and response dispatch for a typed REST API
//!
//! The core of a REST client SDK: it turns a logical API call (service,
//! action, typed parameters) into a signed, header-complete request
//! descriptor, and turns the raw response back into either a typed result or
//! a structured error delivered to a completion callback.
//!
//! ## Features
//!
//! - Ordered parameter container with a canonical, signable JSON body
//! - Optional MD5 body signature under the reserved `kalsig` parameter
//! - Default header negotiation (`Accept`, `Accept-Charset`, gzip)
//! - Exactly one outcome per resolution: `Ok(T)` or a [`RestError`]
//! - Pluggable executors, with a reqwest based one included
//!
//! ## Basic Usage
//!
//! ```no_run
//! use kapi::{Client, Config, Params, RequestBuilder};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct MediaEntry {
//!     id: String,
//!     name: String,
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new(Config::default().with_ks("djJ8MTIz"))?;
//!
//!     let builder: RequestBuilder<MediaEntry> = RequestBuilder::new("media", "get")
//!         .with_params(Params::new().with("entryId", "0_abc"));
//!     let entry = client.apply(builder)?;
//!
//!     println!("Entry: {} ({})", entry.name, entry.id);
//!     Ok(())
//! }
//! ```
//!
//! ## Driving the builder directly
//!
//! ```
//! use kapi::{RawResponse, RequestBuilder};
//!
//! let mut builder: RequestBuilder<bool> = RequestBuilder::new("system", "ping");
//! builder.set_completion(|outcome| println!("ping: {:?}", outcome));
//!
//! let request = builder.build(None, true);
//! assert_eq!(request.method(), "POST");
//! assert!(request.signature().is_some());
//!
//! // ... send `request`, then hand the response back
//! builder.on_complete(&RawResponse::success("true"))?;
//! # Ok::<(), kapi::RestError>(())
//! ```

pub mod client;
pub mod descriptor;
pub mod error;
pub mod executor;
pub mod files;
pub mod params;
pub mod parser;
pub mod request;
pub mod resolver;
pub mod response;
pub mod signature;

// Re-export main types for convenience
pub use client::{Client, Config, ConnectionConfiguration};
pub use descriptor::{Headers, RequestDescriptor};
pub use error::{RestError, Result};
#[cfg(feature = "async")]
pub use executor::AsyncHttpExecutor;
pub use executor::{Executor, HttpExecutor};
pub use files::{FileHolder, Files};
pub use params::{ApiEnum, Params};
pub use request::{Endpoint, OnCompletion, RequestBuilder, RequestState, ServiceAction};
pub use resolver::resolve;
pub use response::{ListResponse, RawResponse, ResponseElement};

// Re-export serde_json for convenience
pub use serde_json::json;
