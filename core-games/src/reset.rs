//! # Achievement Reset
//!
//! Resets every achievement for the signed-in player through the games
//! management API. This is a developer/QA facility, so it talks HTTP
//! directly instead of going through the games service port.
//!
//! ## Flow
//!
//! 1. Ask the `TokenProvider` for the signed-in account
//! 2. Fetch an access token for the management scope
//! 3. POST to the reset endpoint with the token as a bearer header
//!
//! The coordinator always re-queries achievements afterwards, whatever
//! happened here.

use crate::{GamesError, Result};
use bridge_traits::{HttpClient, HttpRequest, TokenProvider};
use core_runtime::config::{BridgeConfig, ManagementApiConfig};
use core_runtime::logging::redact_if_sensitive;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Performs achievement resets against the management API.
#[derive(Clone)]
pub struct AchievementResetter {
    http_client: Arc<dyn HttpClient>,
    token_provider: Arc<dyn TokenProvider>,
    api: ManagementApiConfig,
}

impl AchievementResetter {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        token_provider: Arc<dyn TokenProvider>,
        api: ManagementApiConfig,
    ) -> Self {
        Self {
            http_client,
            token_provider,
            api,
        }
    }

    /// Build a resetter if the config carries both an HTTP client and a token provider.
    pub fn from_config(config: &BridgeConfig) -> Option<Self> {
        let http_client = config.http_client.clone()?;
        let token_provider = config.token_provider.clone()?;
        Some(Self::new(
            http_client,
            token_provider,
            config.management_api.clone(),
        ))
    }

    /// Run the reset and return the HTTP status.
    ///
    /// # Errors
    ///
    /// - `GamesError::Service` if the account, token or HTTP call fails
    /// - `GamesError::Runtime` if the endpoint does not parse
    /// - `GamesError::ResetRejected` for a non-2xx response
    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<u16> {
        let account = self.token_provider.account_name().await?;
        debug!(
            account = %redact_if_sensitive("account", &account),
            "Fetching management token"
        );

        let token = self
            .token_provider
            .access_token(&account, &self.api.games_scope)
            .await?;

        let url = self.api.reset_url()?;
        let request = HttpRequest::post(url.as_str())
            .bearer_token(token)
            .timeout(self.api.reset_timeout);

        debug!(url = %url, "Posting achievement reset");
        let response = self.http_client.execute(request).await?;
        info!(status = response.status, "Achievement reset responded");

        if !response.is_success() {
            return Err(GamesError::ResetRejected {
                status: response.status,
            });
        }

        Ok(response.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{BridgeError, HttpMethod, HttpResponse};
    use bytes::Bytes;
    use core_runtime::config::{DEFAULT_GAMES_SCOPE, DEFAULT_RESET_ENDPOINT};
    use mockall::mock;
    use std::collections::HashMap;
    use std::time::Duration;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    mock! {
        TokenProvider {}

        #[async_trait]
        impl TokenProvider for TokenProvider {
            async fn account_name(&self) -> BridgeResult<String>;
            async fn access_token(&self, account: &str, scope: &str) -> BridgeResult<String>;
        }
    }

    fn response(status: u16) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::new(),
        }
    }

    fn signed_in_tokens() -> MockTokenProvider {
        let mut tokens = MockTokenProvider::new();
        tokens
            .expect_account_name()
            .returning(|| Ok("player@example.com".to_string()));
        tokens
            .expect_access_token()
            .withf(|account: &str, scope: &str| {
                account == "player@example.com" && scope == DEFAULT_GAMES_SCOPE
            })
            .returning(|_, _| Ok("ya29.token".to_string()));
        tokens
    }

    #[tokio::test]
    async fn test_reset_posts_with_bearer_token() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|request: &HttpRequest| {
                request.method == HttpMethod::Post
                    && request.url == DEFAULT_RESET_ENDPOINT
                    && request.headers.get("Authorization")
                        == Some(&"Bearer ya29.token".to_string())
                    && request.timeout == Some(Duration::from_secs(30))
                    && !request.url.contains("ya29")
            })
            .times(1)
            .returning(|_| Ok(response(200)));

        let resetter = AchievementResetter::new(
            Arc::new(http),
            Arc::new(signed_in_tokens()),
            ManagementApiConfig::default(),
        );

        assert_eq!(resetter.reset().await.unwrap(), 200);
    }

    #[tokio::test]
    async fn test_reset_reports_rejected_status() {
        let mut http = MockHttpClient::new();
        http.expect_execute().returning(|_| Ok(response(401)));

        let resetter = AchievementResetter::new(
            Arc::new(http),
            Arc::new(signed_in_tokens()),
            ManagementApiConfig::default(),
        );

        let err = resetter.reset().await.unwrap_err();
        assert!(matches!(err, GamesError::ResetRejected { status: 401 }));
    }

    #[tokio::test]
    async fn test_reset_without_account_skips_http() {
        let mut tokens = MockTokenProvider::new();
        tokens
            .expect_account_name()
            .returning(|| Err(BridgeError::NotSignedIn));
        tokens.expect_access_token().never();

        let mut http = MockHttpClient::new();
        http.expect_execute().never();

        let resetter = AchievementResetter::new(
            Arc::new(http),
            Arc::new(tokens),
            ManagementApiConfig::default(),
        );

        let err = resetter.reset().await.unwrap_err();
        assert!(matches!(err, GamesError::Service(BridgeError::NotSignedIn)));
    }

    #[tokio::test]
    async fn test_reset_with_bad_endpoint_skips_http() {
        let mut http = MockHttpClient::new();
        http.expect_execute().never();

        let api = ManagementApiConfig {
            reset_endpoint: "::not a url::".to_string(),
            ..Default::default()
        };
        let resetter =
            AchievementResetter::new(Arc::new(http), Arc::new(signed_in_tokens()), api);

        let err = resetter.reset().await.unwrap_err();
        assert!(matches!(err, GamesError::Runtime(_)));
    }
}
