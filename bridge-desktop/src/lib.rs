//! # Desktop Bridge Implementations
//!
//! Default port implementations for hosts that do not bring their own
//! platform stack (desktop builds, integration harnesses).
//!
//! - `HttpClient` using `reqwest`, used by the achievement reset flow
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::ReqwestHttpClient;
//! use std::sync::Arc;
//!
//! let config = BridgeConfig::builder()
//!     .games_service(games)
//!     .engine_notifier(notifier)
//!     .http_client(Arc::new(ReqwestHttpClient::new()?))
//!     .token_provider(tokens)
//!     .build()?;
//! ```

mod http;

pub use http::ReqwestHttpClient;
