//! # Host Bridge Traits
//!
//! Ports the host platform implements so the bridge core can talk to the
//! games service, the ad surface, and the native engine without knowing
//! anything about JNI, activities, or SDK classes.
//!
//! ## Traits
//!
//! ### Remote services
//! - [`GamesService`](games::GamesService) - Connection lifecycle, achievement catalog, leaderboards
//! - [`TokenProvider`](auth::TokenProvider) - Signed-in account and scoped OAuth tokens
//! - [`HttpClient`](http::HttpClient) - Direct calls to the games management API
//!
//! ### Host UI and engine
//! - [`AdSurface`](ads::AdSurface) - The single banner slot
//! - [`EngineNotifier`](engine::EngineNotifier) - Completion notifications back to the engine
//!
//! ### Platform integration
//! - [`LifecycleObserver`](lifecycle::LifecycleObserver) - Foreground/background transitions
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Threading
//!
//! All traits require `Send + Sync`. The bridge calls UI-affecting methods
//! (`AdSurface`, resolution and leaderboard UI on `GamesService`) only from its
//! own single-owner tasks, never concurrently for the same port.
//!
//! ## Error Handling
//!
//! All ports use [`BridgeError`](error::BridgeError). Implementations should
//! convert SDK exceptions into `BridgeError::OperationFailed` with the SDK
//! message attached.

pub mod ads;
pub mod auth;
pub mod engine;
pub mod error;
pub mod games;
pub mod http;
pub mod lifecycle;
pub mod logging;

pub use error::BridgeError;

// Re-export commonly used types
pub use ads::{AdGravity, AdSize, AdSurface};
pub use auth::TokenProvider;
pub use engine::{AchievementProgress, EngineNotifier};
pub use games::{
    AchievementBuffer, AchievementKind, AchievementState, ConnectionFailure, GamesService,
    RemoteAchievement, ResolutionToken, ServiceAvailability, INTERNAL_ERROR, RESULT_CANCELED,
    RESULT_OK,
};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use lifecycle::{LifecycleChangeStream, LifecycleObserver, LifecycleState};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
