//! Platform bridge umbrella crate.
//!
//! Re-exports the `core-service` façade so a host can depend on one package
//! and pick the pieces it wants through features:
//!
//! - `service` (default): the [`PlatformBridge`] façade and its config types
//! - `desktop-shims`: the `reqwest` HTTP client used for achievement resets

#[cfg(feature = "service")]
pub use core_service::{CoreError, PlatformBridge, Result};

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop::ReqwestHttpClient;
