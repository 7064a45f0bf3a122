//! App Lifecycle Observation
//!
//! The bridge reconnects when the app returns to the foreground (if it has
//! connected before) and disconnects when it goes to the background. Hosts
//! either call the façade directly from their activity callbacks or hand the
//! bridge a [`LifecycleObserver`] to follow.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    /// Application is visible (Android `onStart`)
    Foreground,
    /// Application is no longer visible (Android `onStop`)
    Background,
}

/// Lifecycle observer trait
///
/// # Platform Support
///
/// - **Android**: Activity `onStart` / `onStop`
/// - **iOS**: `UIApplication` foreground/background notifications
/// - **Desktop**: Window focus events
///
/// # Example
///
/// ```ignore
/// use bridge_traits::lifecycle::{LifecycleObserver, LifecycleState};
///
/// async fn follow(observer: &dyn LifecycleObserver) -> Result<()> {
///     let mut stream = observer.subscribe_changes().await?;
///     while let Some(state) = stream.next().await {
///         println!("now {:?}", state);
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait LifecycleObserver: Send + Sync {
    /// Get current lifecycle state
    async fn get_state(&self) -> Result<LifecycleState>;

    /// Subscribe to lifecycle state changes
    async fn subscribe_changes(&self) -> Result<Box<dyn LifecycleChangeStream>>;
}

/// Stream of lifecycle state changes
#[async_trait]
pub trait LifecycleChangeStream: Send {
    /// Get the next lifecycle state update
    ///
    /// Returns `None` when the stream is closed.
    async fn next(&mut self) -> Option<LifecycleState>;
}
