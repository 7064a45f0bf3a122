//! Games Service Abstraction
//!
//! Port to the remote identity/leaderboard/achievement service (Google Play
//! Games on Android, Game Center on iOS).
//!
//! Connection lifecycle is push-based: the host calls back into the bridge
//! when the service reports `connected`, `suspended` or `failed`, and when a
//! resolution flow finishes. Data requests (catalog loads, step updates,
//! score submission) are request/response and exposed as async methods.
//!
//! Methods that launch host UI (`start_resolution`, `show_error_surface`,
//! `show_leaderboard`, `show_achievements`) are synchronous; the bridge only
//! ever calls them from its coordinator task.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Result code reported when a connection or resolution completed successfully.
pub const RESULT_OK: i32 = -1;

/// Result code reported when the user backed out of a resolution flow.
pub const RESULT_CANCELED: i32 = 0;

/// Error code used when the connect request could not even be dispatched.
pub const INTERNAL_ERROR: i32 = 8;

/// Availability of the games service on this device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceAvailability {
    /// Service present and usable
    Available,
    /// Service present but needs an update; connecting will offer it
    UpdateRequired,
    /// Service missing or disabled; carries the platform status code
    Unavailable(i32),
}

impl ServiceAvailability {
    /// Whether a connection attempt should be made.
    pub fn allows_connect(&self) -> bool {
        matches!(
            self,
            ServiceAvailability::Available | ServiceAvailability::UpdateRequired
        )
    }

    /// Status code forwarded to the engine when connecting is refused.
    pub fn status_code(&self) -> i32 {
        match self {
            ServiceAvailability::Available => 0,
            ServiceAvailability::UpdateRequired => 2,
            ServiceAvailability::Unavailable(code) => *code,
        }
    }
}

/// Opaque handle to a remediation flow offered by the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolutionToken(pub String);

impl ResolutionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

/// A failed connection attempt as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionFailure {
    /// Platform error code
    pub error_code: i32,
    /// Remediation flow, if the service offers one
    pub resolution: Option<ResolutionToken>,
}

impl ConnectionFailure {
    pub fn with_resolution(error_code: i32, resolution: ResolutionToken) -> Self {
        Self {
            error_code,
            resolution: Some(resolution),
        }
    }

    pub fn without_resolution(error_code: i32) -> Self {
        Self {
            error_code,
            resolution: None,
        }
    }

    pub fn has_resolution(&self) -> bool {
        self.resolution.is_some()
    }
}

impl fmt::Display for ConnectionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConnectionFailure(code={}, resolution={})",
            self.error_code,
            self.has_resolution()
        )
    }
}

/// How an achievement tracks progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementKind {
    /// Locked or unlocked, nothing in between
    Standard,
    /// Step count out of a fixed total
    Incremental,
}

/// Visibility/unlock state of an achievement for the signed-in player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementState {
    Hidden,
    Revealed,
    Unlocked,
}

/// One catalog entry as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAchievement {
    pub id: String,
    pub kind: AchievementKind,
    pub state: AchievementState,
    /// Player's current steps (incremental only)
    pub current_steps: u32,
    /// Steps required to unlock (incremental only)
    pub total_steps: u32,
}

impl RemoteAchievement {
    pub fn standard(id: impl Into<String>, state: AchievementState) -> Self {
        Self {
            id: id.into(),
            kind: AchievementKind::Standard,
            state,
            current_steps: 0,
            total_steps: 0,
        }
    }

    pub fn incremental(
        id: impl Into<String>,
        state: AchievementState,
        current_steps: u32,
        total_steps: u32,
    ) -> Self {
        Self {
            id: id.into(),
            kind: AchievementKind::Incremental,
            state,
            current_steps,
            total_steps,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.state == AchievementState::Unlocked
    }
}

/// Catalog result holding a host-side buffer.
///
/// Hosts that back the catalog with a native buffer register a release hook;
/// it runs exactly once when the buffer is dropped, after the bridge has
/// extracted what it needs.
pub struct AchievementBuffer {
    entries: Vec<RemoteAchievement>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl AchievementBuffer {
    pub fn new(entries: Vec<RemoteAchievement>) -> Self {
        Self {
            entries,
            release: None,
        }
    }

    /// Attach a hook that frees the host resource backing this buffer.
    pub fn with_release<F>(mut self, release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.release = Some(Box::new(release));
        self
    }

    pub fn entries(&self) -> &[RemoteAchievement] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Drop for AchievementBuffer {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for AchievementBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AchievementBuffer")
            .field("entries", &self.entries.len())
            .field("has_release", &self.release.is_some())
            .finish()
    }
}

/// Remote games service port.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::games::{GamesService, ServiceAvailability};
///
/// fn try_connect(service: &dyn GamesService) -> Result<()> {
///     if service.availability().allows_connect() {
///         service.connect()?;
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait GamesService: Send + Sync {
    /// Check whether the service can be used on this device.
    fn availability(&self) -> ServiceAvailability;

    /// Begin a connection attempt. The outcome arrives later through the
    /// connection callbacks.
    fn connect(&self) -> Result<()>;

    /// Tear down the connection. Safe to call in any state.
    fn disconnect(&self);

    /// Launch the remediation flow carried by a failure.
    ///
    /// The host reports the outcome through the resolution-finished callback.
    fn start_resolution(&self, failure: &ConnectionFailure) -> Result<()>;

    /// Show the service's error surface for an unresolvable failure code.
    ///
    /// Dismissal is reported through the resolution-finished callback.
    fn show_error_surface(&self, error_code: i32) -> Result<()>;

    /// Show the leaderboard UI for one board.
    fn show_leaderboard(&self, leaderboard_id: &str) -> Result<()>;

    /// Show the achievements overview UI.
    fn show_achievements(&self) -> Result<()>;

    /// Fetch the full achievement catalog with the player's progress.
    async fn load_achievements(&self) -> Result<AchievementBuffer>;

    /// Set an incremental achievement to at least `steps`.
    async fn set_steps(&self, achievement_id: &str, steps: u32) -> Result<()>;

    /// Unlock a standard achievement.
    async fn unlock(&self, achievement_id: &str) -> Result<()>;

    /// Submit a leaderboard score.
    async fn submit_score(&self, leaderboard_id: &str, value: i64) -> Result<()>;
}
