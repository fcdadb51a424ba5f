//! Form-based session login

use async_trait::async_trait;

use super::{ApiError, ApiResult, GateClient};
use crate::transport::Transport;

/// Session establishment
#[async_trait]
#[allow(clippy::missing_errors_doc)]
pub trait SessionApi: Send + Sync {
    /// Logs in with a username/password form; the session cookie the
    /// server sets is kept by the transport for later calls
    async fn login(&self, username: &str, password: &str) -> ApiResult<()>;
}

#[async_trait]
impl<T: Transport> SessionApi for GateClient<T> {
    async fn login(&self, username: &str, password: &str) -> ApiResult<()> {
        let url = self.url("/login");
        let form = [
            ("username", username),
            ("password", password),
            ("submit", "Login"),
        ];
        let response = self.post_form("fiat login", &url, &form).await?;

        if response.status.is_client_error() || response.status.is_server_error() {
            return Err(ApiError::UnexpectedStatus {
                operation: "login".to_string(),
                status: response.status,
                body: response.body,
            });
        }
        Ok(())
    }
}
