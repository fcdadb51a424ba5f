//! Client configuration consumed by [`ReqwestTransport`](super::ReqwestTransport)

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use super::TransportError;

/// Default timeout applied to every individual HTTP call
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection and authentication settings for one client
///
/// The auth mode is part of this value: a bearer token, a session cookie
/// and a TLS client identity can each be set independently and are applied
/// to every request the transport issues.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the API
    pub endpoint: Url,

    /// Token sent as `Authorization: Bearer <token>`
    pub bearer_token: Option<String>,

    /// Value of the `SESSION` cookie installed for the endpoint
    pub session: Option<String>,

    /// Client certificate and key for mutual TLS
    pub identity: Option<TlsIdentity>,

    /// Skip server certificate verification
    pub accept_invalid_certs: bool,

    /// Timeout of a single HTTP call
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Creates a configuration with no authentication
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            bearer_token: None,
            session: None,
            identity: None,
            accept_invalid_certs: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Sets the bearer token
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Sets the session cookie value
    #[must_use]
    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    /// Sets the TLS client identity
    #[must_use]
    pub fn with_identity(mut self, identity: TlsIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Disables server certificate verification
    #[must_use]
    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Sets the per-call timeout
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Endpoint without a trailing slash, ready for path concatenation
    #[must_use]
    pub fn base_url(&self) -> String {
        self.endpoint.as_str().trim_end_matches('/').to_string()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .field("session", &self.session.as_ref().map(|_| "<redacted>"))
            .field("identity", &self.identity)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// PEM certificate/key pair presented to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsIdentity {
    /// Path to the PEM certificate
    pub cert_path: PathBuf,
    /// Path to the PEM private key
    pub key_path: PathBuf,
}

impl TlsIdentity {
    /// Creates an identity from its two PEM files
    #[must_use]
    pub fn new(cert_path: impl Into<PathBuf>, key_path: impl Into<PathBuf>) -> Self {
        Self {
            cert_path: cert_path.into(),
            key_path: key_path.into(),
        }
    }

    /// Reads both files into one PEM bundle (certificate first)
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::TlsMaterial`] if either file is unreadable.
    pub fn load_pem(&self) -> Result<Vec<u8>, TransportError> {
        let read = |path: &PathBuf| {
            std::fs::read(path).map_err(|source| TransportError::TlsMaterial {
                path: path.clone(),
                source,
            })
        };

        let mut pem = read(&self.cert_path)?;
        if !pem.ends_with(b"\n") {
            pem.push(b'\n');
        }
        pem.extend(read(&self.key_path)?);
        Ok(pem)
    }
}
