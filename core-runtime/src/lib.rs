//! # Core Runtime Module
//!
//! Ambient infrastructure shared by the bridge state machines:
//! - Configuration and port wiring
//! - Logging and tracing infrastructure
//! - Internal event bus for diagnostics
//!
//! ## Overview
//!
//! Nothing in here holds bridge state. The games coordinator and the ad
//! controller read their ports and settings from [`config::BridgeConfig`] and
//! publish what they do on [`events::EventBus`].

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
