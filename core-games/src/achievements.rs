//! # Achievement Cache & Conversion
//!
//! The engine reports achievement progress as a percentage. The service wants
//! step counts for incremental achievements and a plain unlock for standard
//! ones, so the bridge keeps a descriptor per achievement id, rebuilt from
//! the remote catalog every time the connection comes up.
//!
//! Queries go the other way: remote entries become engine-facing
//! percentages, computed fresh from each fetch and never cached.

use bridge_traits::{AchievementKind, AchievementProgress, RemoteAchievement};
use std::collections::HashMap;

/// Cached shape of one achievement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementDescriptor {
    pub id: String,
    pub kind: AchievementKind,
    /// Steps to unlock; always 1 for standard achievements
    pub max_steps: u32,
}

/// What a progress report turns into on the service side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressAction {
    SetSteps(u32),
    Unlock,
    Nothing,
}

impl AchievementDescriptor {
    pub fn from_remote(remote: &RemoteAchievement) -> Self {
        let max_steps = match remote.kind {
            AchievementKind::Standard => 1,
            AchievementKind::Incremental => remote.total_steps.max(1),
        };

        Self {
            id: remote.id.clone(),
            kind: remote.kind,
            max_steps,
        }
    }

    /// Map an engine percentage onto a service request.
    ///
    /// Incremental: `round(percent / 100 * max_steps)`, sent only when > 0.
    /// Standard: unlock only at 100 or above.
    pub fn progress_action(&self, percent: f64) -> ProgressAction {
        match self.kind {
            AchievementKind::Incremental => {
                let steps = (percent / 100.0 * f64::from(self.max_steps)).round();
                if steps > 0.0 {
                    // `as` saturates; step counts past u32::MAX are not meaningful
                    ProgressAction::SetSteps(steps as u32)
                } else {
                    ProgressAction::Nothing
                }
            }
            AchievementKind::Standard => {
                if percent >= 100.0 {
                    ProgressAction::Unlock
                } else {
                    ProgressAction::Nothing
                }
            }
        }
    }
}

/// Descriptors keyed by achievement id.
#[derive(Debug, Default, Clone)]
pub struct DescriptorCache {
    entries: HashMap<String, AchievementDescriptor>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole cache with the given catalog.
    pub fn rebuild(&mut self, catalog: &[RemoteAchievement]) {
        self.entries.clear();
        for remote in catalog {
            let descriptor = AchievementDescriptor::from_remote(remote);
            self.entries.insert(descriptor.id.clone(), descriptor);
        }
    }

    pub fn get(&self, id: &str) -> Option<&AchievementDescriptor> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Engine-facing progress for one remote entry.
pub fn to_progress(remote: &RemoteAchievement) -> AchievementProgress {
    let percent = if remote.is_unlocked() {
        100.0
    } else {
        match remote.kind {
            AchievementKind::Incremental if remote.total_steps > 0 => {
                100.0 * f64::from(remote.current_steps) / f64::from(remote.total_steps)
            }
            _ => 0.0,
        }
    };

    AchievementProgress::new(remote.id.clone(), percent)
}

/// Convert a whole catalog, keeping its order.
pub fn progress_report(catalog: &[RemoteAchievement]) -> Vec<AchievementProgress> {
    catalog.iter().map(to_progress).collect()
}
