//! Gate API client
//!
//! [`GateClient`] owns the endpoint and a [`Transport`]. Its operations are
//! split into capability traits so callers (and tests) depend only on what
//! they use:
//!
//! - [`ApplicationApi`]: application tasks and lookups
//! - [`PipelineApi`]: plan and pipeline configs
//! - [`TemplateApi`]: pipeline template publish/delete
//! - [`TaskApi`]: task status
//! - [`SessionApi`]: form login

mod applications;
mod errors;
pub mod model;
mod pipelines;
mod session;
mod tasks;
mod templates;

use http::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::transport::{ClientConfig, HttpResponse, ReqwestTransport, Transport, TransportError};

pub use applications::ApplicationApi;
pub use errors::{ApiError, ApiResult};
pub use model::{
    ApplicationAttributes, ApplicationInfo, ExecutionResponse, ExecutionStatus, ExecutionStep,
    ExecutionVariable, JsonMap, PipelineConfig, RetrofitErrorResponse, Task, TaskJob, TaskRef,
    TemplatedPipelineError, TemplatedPipelineErrorResponse,
};
pub use pipelines::PipelineApi;
pub use session::SessionApi;
pub use tasks::TaskApi;
pub use templates::{PublishTemplateOptions, TemplateApi};

/// Client for one API endpoint
#[derive(Debug)]
pub struct GateClient<T = ReqwestTransport> {
    endpoint: String,
    transport: T,
}

impl GateClient<ReqwestTransport> {
    /// Builds a client with the production transport
    ///
    /// # Errors
    ///
    /// Fails if the transport cannot be configured.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::new(config.base_url(), transport))
    }
}

impl<T: Transport> GateClient<T> {
    /// Creates a client for `endpoint` over `transport`
    #[must_use]
    pub fn new(endpoint: impl Into<String>, transport: T) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self {
            endpoint,
            transport,
        }
    }

    /// Base URL, without trailing slash
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Underlying transport
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    fn endpoint_url(&self) -> ApiResult<Url> {
        Url::parse(&self.endpoint).map_err(|e| {
            ApiError::InvalidArgument(format!("invalid endpoint {}: {e}", self.endpoint))
        })
    }

    /// URL of `segments` under the endpoint; each segment is percent-encoded
    fn resource_url(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.endpoint_url()?;
        url.path_segments_mut()
            .map_err(|()| {
                ApiError::InvalidArgument(format!("endpoint {} cannot take a path", self.endpoint))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, context: &str, url: &str) -> ApiResult<HttpResponse> {
        let response = self
            .transport
            .get(url)
            .await
            .map_err(|e| ApiError::transport(context, e))?;
        log_response(&response);
        Ok(response)
    }

    async fn post_json<B>(&self, context: &str, url: &str, body: &B) -> ApiResult<HttpResponse>
    where
        B: Serialize + Sync + ?Sized,
    {
        let payload = serde_json::to_value(body).map_err(|source| ApiError::Encode {
            context: context.to_string(),
            source,
        })?;
        let response = self
            .transport
            .post_json(url, &payload)
            .await
            .map_err(|e| ApiError::transport(context, e))?;
        log_response(&response);
        Ok(response)
    }

    async fn post_form(
        &self,
        context: &str,
        url: &str,
        form: &[(&str, &str)],
    ) -> ApiResult<HttpResponse> {
        let response = self
            .transport
            .post_form(url, form)
            .await
            .map_err(|e| ApiError::transport(context, e))?;
        log_response(&response);
        Ok(response)
    }

    async fn delete(&self, context: &str, url: &str) -> ApiResult<HttpResponse> {
        let response = self
            .transport
            .delete(url)
            .await
            .map_err(|e| ApiError::transport(context, e))?;
        log_response(&response);
        Ok(response)
    }
}

fn log_response(response: &HttpResponse) {
    debug!(status = %response.status, body = %response.body_text(), "Response");
}

/// Fails with [`ApiError::UnexpectedStatus`] unless `response` has `expected`
fn expect_status(
    response: HttpResponse,
    expected: StatusCode,
    operation: &str,
) -> ApiResult<HttpResponse> {
    if response.status == expected {
        Ok(response)
    } else {
        Err(ApiError::UnexpectedStatus {
            operation: operation.to_string(),
            status: response.status,
            body: response.body,
        })
    }
}

fn decode<D: DeserializeOwned>(body: &[u8], context: &str) -> ApiResult<D> {
    serde_json::from_slice(body).map_err(|e| ApiError::decode(context, e))
}
