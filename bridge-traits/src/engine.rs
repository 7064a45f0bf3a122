//! Engine Notification Port
//!
//! Outbound half of the engine-facing surface. The engine cannot await, so
//! every result the bridge produces is pushed through this trait from a
//! bridge task. Implementations typically forward over JNI/FFI and must not
//! block.

use serde::{Deserialize, Serialize};

/// Progress of one achievement as reported to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementProgress {
    pub id: String,
    /// Percentage in `[0, 100]`
    pub progress_percent: f64,
}

impl AchievementProgress {
    pub fn new(id: impl Into<String>, progress_percent: f64) -> Self {
        Self {
            id: id.into(),
            progress_percent,
        }
    }
}

/// Engine notification sink.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::engine::{AchievementProgress, EngineNotifier};
///
/// struct JniNotifier { /* env, class refs */ }
///
/// impl EngineNotifier for JniNotifier {
///     fn connection_completed(&self, result_code: i32) { /* nativeCompletedConnection */ }
///     fn achievements_updated(&self, achievements: Vec<AchievementProgress>) { /* ... */ }
///     fn achievements_update_failed(&self) { /* ... */ }
/// }
/// ```
pub trait EngineNotifier: Send + Sync {
    /// A connection attempt finished; `RESULT_OK` on success.
    fn connection_completed(&self, result_code: i32);

    /// Fresh progress for every achievement, in catalog order.
    ///
    /// Queries that arrive while one is in flight are coalesced into a
    /// single follow-up fetch, so the engine may receive fewer calls than it
    /// issued queries. Each call carries the latest state.
    fn achievements_updated(&self, achievements: Vec<AchievementProgress>);

    /// An achievement query could not be served.
    fn achievements_update_failed(&self);
}
