//! HTTP transport layer
//!
//! Every call the client makes goes through [`Transport`]: a single attempt,
//! no retries, and the status code plus raw body handed back untouched.
//! Interpreting status codes is the caller's job.

mod config;
mod http_client;
#[cfg(test)]
pub(crate) mod testing;

use std::path::PathBuf;

use async_trait::async_trait;
use http::{Method, StatusCode};
use thiserror::Error;

pub use config::{ClientConfig, TlsIdentity};
pub use http_client::ReqwestTransport;

/// Boxed error produced by the underlying HTTP stack
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Raw outcome of one HTTP call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code returned by the server
    pub status: StatusCode,
    /// Unparsed response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response from a status and body
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Body decoded as UTF-8, lossily
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Errors raised below the API layer
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request could not be sent or no response arrived
    #[error("{method} {url} failed")]
    Request {
        /// HTTP method of the failed call.
        method: Method,
        /// Absolute URL of the failed call.
        url: String,
        /// Underlying cause.
        #[source]
        source: BoxError,
    },

    /// The response arrived but its body could not be read
    #[error("failed to read response body from {url}")]
    Body {
        /// Absolute URL of the call.
        url: String,
        /// Underlying cause.
        #[source]
        source: BoxError,
    },

    /// A PEM file of the TLS identity could not be read
    #[error("reading TLS material from {}", path.display())]
    TlsMaterial {
        /// Path that failed to load.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client rejected its configuration
    #[error("configuring HTTP client")]
    Client(#[source] reqwest::Error),
}

/// The four HTTP primitives the API layer is built on
#[async_trait]
#[allow(clippy::missing_errors_doc)]
pub trait Transport: Send + Sync {
    /// Issues a GET request
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;

    /// Issues a POST request with a JSON body
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, TransportError>;

    /// Issues a POST request with a form-encoded body
    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<HttpResponse, TransportError>;

    /// Issues a DELETE request
    async fn delete(&self, url: &str) -> Result<HttpResponse, TransportError>;
}
