//! Narrow identity-provider admin client.
//!
//! The auth provider is an external service; the only operation this
//! backend ever performs against it is deleting an auth account at the end
//! of the account-deletion cascade. Everything else (sign-up, credential
//! checks, federation) happens on the provider's side and reaches us as
//! events.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Identity provider errors.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP transport failure.
    #[error("identity provider request failed: {0}")]
    Transport(String),

    /// Provider rejected the request.
    #[error("identity provider returned status {status}: {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Provider error message.
        message: String,
    },
}

/// Deletes auth accounts on the external identity provider.
pub trait IdentityProvider: Send + Sync {
    /// Delete the auth account with the given provider uid.
    fn delete_account(
        &self,
        provider_uid: &str,
    ) -> impl std::future::Future<Output = Result<(), IdentityError>> + Send;
}

/// Identity client selected at startup from configuration.
///
/// `Disabled` is used when no identity section is configured: record
/// cascades still run, and the auth-account removal is skipped with a log
/// line instead of failing the operation.
pub enum IdentityClient {
    /// HTTP admin API client.
    Http(HttpIdentityProvider),
    /// No provider configured.
    Disabled,
}

impl IdentityClient {
    /// Build an HTTP-backed client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn http(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, IdentityError> {
        Ok(Self::Http(HttpIdentityProvider::new(base_url, api_key)?))
    }
}

impl IdentityProvider for IdentityClient {
    async fn delete_account(&self, provider_uid: &str) -> Result<(), IdentityError> {
        match self {
            Self::Http(provider) => provider.delete_account(provider_uid).await,
            Self::Disabled => {
                info!(provider_uid, "Identity provider disabled; auth account left in place");
                Ok(())
            }
        }
    }
}

/// reqwest-backed admin API client.
pub struct HttpIdentityProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    message: String,
}

impl HttpIdentityProvider {
    /// Create a new client for the provider admin API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

impl IdentityProvider for HttpIdentityProvider {
    async fn delete_account(&self, provider_uid: &str) -> Result<(), IdentityError> {
        let url = format!("{}/accounts/{provider_uid}", self.base_url);

        let response = self
            .http
            .delete(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
            // Already-gone accounts make deletion re-runnable.
            return Ok(());
        }

        let message = response
            .json::<ProviderErrorBody>()
            .await
            .map(|body| body.message)
            .unwrap_or_default();

        Err(IdentityError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
