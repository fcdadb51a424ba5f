//! `reqwest`-backed transport
//!
//! One `reqwest::Client` (one connection pool, one cookie jar) is shared by
//! every call of an invocation. Calls are awaited one at a time by the API
//! layer, so the jar is never raced.

use std::sync::Arc;

use async_trait::async_trait;
use http::Method;
use reqwest::RequestBuilder;
use reqwest::cookie::Jar;
use tracing::debug;

use super::{ClientConfig, HttpResponse, Transport, TransportError};

/// Production [`Transport`] over HTTPS
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    bearer_token: Option<String>,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl ReqwestTransport {
    /// Builds the HTTP client described by `config`
    ///
    /// # Errors
    ///
    /// Fails if the TLS identity cannot be read or parsed, or if the client
    /// cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let jar = Arc::new(Jar::default());
        if let Some(session) = &config.session {
            jar.add_cookie_str(&format!("SESSION={session}"), &config.endpoint);
            debug!(endpoint = %config.endpoint, "Installed session cookie");
        }

        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .cookie_provider(jar)
            .timeout(config.request_timeout);

        if let Some(identity) = &config.identity {
            debug!(
                cert = %identity.cert_path.display(),
                key = %identity.key_path.display(),
                "Configuring TLS with pem cert/key pair"
            );
            let pem = identity.load_pem()?;
            let identity = reqwest::Identity::from_pem(&pem).map_err(TransportError::Client)?;
            builder = builder
                .identity(identity)
                .min_tls_version(reqwest::tls::Version::TLS_1_2)
                .danger_accept_invalid_certs(true);
        }

        if config.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(TransportError::Client)?;

        Ok(Self {
            client,
            bearer_token: config.bearer_token.clone(),
        })
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        request: RequestBuilder,
    ) -> Result<HttpResponse, TransportError> {
        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Request {
                method,
                url: url.to_string(),
                source: Box::new(e),
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| TransportError::Body {
            url: url.to_string(),
            source: Box::new(e),
        })?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let request = self.request(Method::GET, url);
        self.send(Method::GET, url, request).await
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, TransportError> {
        let request = self.request(Method::POST, url).json(body);
        self.send(Method::POST, url, request).await
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<HttpResponse, TransportError> {
        let request = self.request(Method::POST, url).form(form);
        self.send(Method::POST, url, request).await
    }

    async fn delete(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let request = self.request(Method::DELETE, url);
        self.send(Method::DELETE, url, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_new_without_auth() {
        let config = ClientConfig::new(Url::parse("https://gate.example.com").unwrap());
        let transport = ReqwestTransport::new(&config).unwrap();
        assert!(transport.bearer_token.is_none());
    }

    #[test]
    fn test_new_keeps_bearer_token() {
        let config = ClientConfig::new(Url::parse("https://gate.example.com").unwrap())
            .with_bearer_token("iap-token")
            .with_session("abc");
        let transport = ReqwestTransport::new(&config).unwrap();
        assert_eq!(transport.bearer_token.as_deref(), Some("iap-token"));
    }

    #[test]
    fn test_new_fails_on_missing_identity() {
        let config = ClientConfig::new(Url::parse("https://gate.example.com").unwrap())
            .with_identity(crate::transport::TlsIdentity::new("/missing.crt", "/missing.key"));
        let err = ReqwestTransport::new(&config).unwrap_err();
        assert!(matches!(err, TransportError::TlsMaterial { .. }));
    }
}
