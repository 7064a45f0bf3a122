//! Ad Surface Abstraction
//!
//! Port to the single banner slot hosted by the platform (AdMob `AdView` in a
//! popup window on Android).
//!
//! Every method mutates host UI and is only called from the ad controller
//! task, which is the bridge's UI-affinity context for the slot. Hosts whose
//! toolkit requires a specific thread must marshal inside the implementation.
//! Load outcomes are reported back asynchronously through the controller's
//! `load_succeeded` / `load_failed` callbacks.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Screen edge the banner is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdGravity {
    #[default]
    Top,
    Bottom,
}

impl AdGravity {
    pub fn from_bottom_flag(bottom: bool) -> Self {
        if bottom {
            AdGravity::Bottom
        } else {
            AdGravity::Top
        }
    }
}

/// Banner dimensions in density-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdSize {
    pub width_dp: u32,
    pub height_dp: u32,
}

impl AdSize {
    /// Standard 320x50 banner.
    pub const BANNER: AdSize = AdSize {
        width_dp: 320,
        height_dp: 50,
    };
}

impl Default for AdSize {
    fn default() -> Self {
        Self::BANNER
    }
}

/// Host ad surface port.
pub trait AdSurface: Send + Sync {
    /// One-time construction of the ad view and its container.
    fn create(&self, unit_id: &str, size: AdSize) -> Result<()>;

    /// Issue an ad load request. Completion arrives through the controller.
    fn load(&self) -> Result<()>;

    /// Make the surface visible at the given edge.
    fn show(&self, gravity: AdGravity);

    /// Hide the surface without destroying the loaded ad.
    fn hide(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gravity_from_flag() {
        assert_eq!(AdGravity::from_bottom_flag(true), AdGravity::Bottom);
        assert_eq!(AdGravity::from_bottom_flag(false), AdGravity::Top);
        assert_eq!(AdGravity::default(), AdGravity::Top);
    }

    #[test]
    fn test_default_size_is_banner() {
        let size = AdSize::default();
        assert_eq!(size.width_dp, 320);
        assert_eq!(size.height_dp, 50);
    }
}
