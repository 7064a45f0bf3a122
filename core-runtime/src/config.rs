//! # Bridge Configuration Module
//!
//! Collects the host ports and settings the bridge needs and validates them
//! before any task is spawned.
//!
//! ## Required Ports
//!
//! - `GamesService` - Remote games service connection and data
//! - `EngineNotifier` - Notifications back into the native engine
//!
//! ## Optional Ports
//!
//! - `AdSurface` - Banner slot; ad commands are ignored without it
//! - `HttpClient` + `TokenProvider` - Needed for achievement reset
//! - `LifecycleObserver` - Automatic resume/disconnect on app transitions
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::BridgeConfig;
//! use std::sync::Arc;
//!
//! let config = BridgeConfig::builder()
//!     .games_service(Arc::new(PlayGamesService::new(activity)))
//!     .engine_notifier(Arc::new(JniNotifier::new(env)))
//!     .ad_surface(Arc::new(AdMobSurface::new(activity)))
//!     .http_client(Arc::new(ReqwestHttpClient::new()?))
//!     .token_provider(Arc::new(GoogleAuthTokens::new(activity)))
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::BridgeConfig;
//!
//! // Missing GamesService and EngineNotifier
//! let config = BridgeConfig::builder()
//!     .build()
//!     .expect("Should fail - missing required ports");
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{
    AdSize, AdSurface, EngineNotifier, GamesService, HttpClient, LifecycleObserver, TokenProvider,
};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Games management endpoint that resets the player's achievements.
pub const DEFAULT_RESET_ENDPOINT: &str =
    "https://www.googleapis.com/games/v1management/achievements/reset";

/// OAuth scope string requested for the management API.
pub const DEFAULT_GAMES_SCOPE: &str = "oauth2:https://www.googleapis.com/auth/games";

/// Default timeout for the reset HTTP call.
pub const DEFAULT_RESET_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for the achievement management API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagementApiConfig {
    /// Endpoint receiving the reset POST
    pub reset_endpoint: String,
    /// OAuth scope for the access token
    pub games_scope: String,
    /// Timeout for the reset call
    pub reset_timeout: Duration,
}

impl Default for ManagementApiConfig {
    fn default() -> Self {
        Self {
            reset_endpoint: DEFAULT_RESET_ENDPOINT.to_string(),
            games_scope: DEFAULT_GAMES_SCOPE.to_string(),
            reset_timeout: DEFAULT_RESET_TIMEOUT,
        }
    }
}

impl ManagementApiConfig {
    /// Parse and check the reset endpoint.
    pub fn reset_url(&self) -> Result<Url> {
        let url = Url::parse(&self.reset_endpoint).map_err(|e| Error::InvalidEndpoint {
            endpoint: self.reset_endpoint.clone(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "https" | "http" => Ok(url),
            other => Err(Error::InvalidEndpoint {
                endpoint: self.reset_endpoint.clone(),
                reason: format!("must use http or https, got '{}'", other),
            }),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.reset_url()?;

        if self.games_scope.trim().is_empty() {
            return Err(Error::Config("Games OAuth scope cannot be empty".to_string()));
        }

        if self.reset_timeout.is_zero() {
            return Err(Error::Config(
                "Reset timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Bridge configuration.
///
/// Use [`BridgeConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct BridgeConfig {
    /// Remote games service (required)
    pub games_service: Arc<dyn GamesService>,

    /// Engine notification sink (required)
    pub engine_notifier: Arc<dyn EngineNotifier>,

    /// Banner slot (optional)
    pub ad_surface: Option<Arc<dyn AdSurface>>,

    /// HTTP client for the management API (optional)
    pub http_client: Option<Arc<dyn HttpClient>>,

    /// Account token source for the management API (optional)
    pub token_provider: Option<Arc<dyn TokenProvider>>,

    /// App lifecycle observer (optional)
    pub lifecycle_observer: Option<Arc<dyn LifecycleObserver>>,

    /// Whether the title has the games service switched on
    pub games_enabled: bool,

    /// Management API settings
    pub management_api: ManagementApiConfig,

    /// Banner dimensions passed to the surface on construction
    pub ad_size: AdSize,

    /// Capacity of the diagnostic event bus
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("games_service", &"GamesService { ... }")
            .field("engine_notifier", &"EngineNotifier { ... }")
            .field(
                "ad_surface",
                &self.ad_surface.as_ref().map(|_| "AdSurface { ... }"),
            )
            .field(
                "http_client",
                &self.http_client.as_ref().map(|_| "HttpClient { ... }"),
            )
            .field(
                "token_provider",
                &self.token_provider.as_ref().map(|_| "TokenProvider { ... }"),
            )
            .field(
                "lifecycle_observer",
                &self
                    .lifecycle_observer
                    .as_ref()
                    .map(|_| "LifecycleObserver { ... }"),
            )
            .field("games_enabled", &self.games_enabled)
            .field("management_api", &self.management_api)
            .field("ad_size", &self.ad_size)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl BridgeConfig {
    /// Creates a new builder for constructing a `BridgeConfig`.
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }

    /// Whether achievement reset has everything it needs.
    pub fn supports_reset(&self) -> bool {
        self.http_client.is_some() && self.token_provider.is_some()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.management_api.validate()?;

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.ad_size.width_dp == 0 || self.ad_size.height_dp == 0 {
            return Err(Error::Config(format!(
                "Ad size must be non-zero, got {}x{}",
                self.ad_size.width_dp, self.ad_size.height_dp
            )));
        }

        Ok(())
    }
}

fn games_service_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "GamesService".to_string(),
        message: "A GamesService implementation is required to reach the games backend. \
                 Android: wrap the Play Games client. \
                 iOS: wrap Game Center."
            .to_string(),
    }
}

fn engine_notifier_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "EngineNotifier".to_string(),
        message: "An EngineNotifier implementation is required to deliver connection and \
                 achievement results to the engine."
            .to_string(),
    }
}

/// Builder for constructing [`BridgeConfig`] instances.
#[derive(Default)]
pub struct BridgeConfigBuilder {
    games_service: Option<Arc<dyn GamesService>>,
    engine_notifier: Option<Arc<dyn EngineNotifier>>,
    ad_surface: Option<Arc<dyn AdSurface>>,
    http_client: Option<Arc<dyn HttpClient>>,
    token_provider: Option<Arc<dyn TokenProvider>>,
    lifecycle_observer: Option<Arc<dyn LifecycleObserver>>,
    games_enabled: Option<bool>,
    management_api: Option<ManagementApiConfig>,
    ad_size: Option<AdSize>,
    event_buffer_size: Option<usize>,
}

impl BridgeConfigBuilder {
    /// Sets the games service port (required).
    pub fn games_service(mut self, service: Arc<dyn GamesService>) -> Self {
        self.games_service = Some(service);
        self
    }

    /// Sets the engine notification port (required).
    pub fn engine_notifier(mut self, notifier: Arc<dyn EngineNotifier>) -> Self {
        self.engine_notifier = Some(notifier);
        self
    }

    pub fn ad_surface(mut self, surface: Arc<dyn AdSurface>) -> Self {
        self.ad_surface = Some(surface);
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.token_provider = Some(provider);
        self
    }

    pub fn lifecycle_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.lifecycle_observer = Some(observer);
        self
    }

    /// Switch the games service on or off for this title. Defaults to on.
    pub fn games_enabled(mut self, enabled: bool) -> Self {
        self.games_enabled = Some(enabled);
        self
    }

    pub fn management_api(mut self, config: ManagementApiConfig) -> Self {
        self.management_api = Some(config);
        self
    }

    /// Overrides the reset endpoint, keeping the other management defaults.
    pub fn reset_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let mut api = self.management_api.take().unwrap_or_default();
        api.reset_endpoint = endpoint.into();
        self.management_api = Some(api);
        self
    }

    pub fn ad_size(mut self, size: AdSize) -> Self {
        self.ad_size = Some(size);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds the final `BridgeConfig` instance.
    ///
    /// # Errors
    ///
    /// - `CapabilityMissing` if `GamesService` or `EngineNotifier` is absent
    /// - `Config` if a setting is out of range
    pub fn build(self) -> Result<BridgeConfig> {
        let games_service = self
            .games_service
            .ok_or_else(games_service_missing_error)?;
        let engine_notifier = self
            .engine_notifier
            .ok_or_else(engine_notifier_missing_error)?;

        let config = BridgeConfig {
            games_service,
            engine_notifier,
            ad_surface: self.ad_surface,
            http_client: self.http_client,
            token_provider: self.token_provider,
            lifecycle_observer: self.lifecycle_observer,
            games_enabled: self.games_enabled.unwrap_or(true),
            management_api: self.management_api.unwrap_or_default(),
            ad_size: self.ad_size.unwrap_or_default(),
            event_buffer_size: self
                .event_buffer_size
                .unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}
