//! # Ad Slot State
//!
//! Intent and availability flags for the banner slot. Every transition
//! returns the surface actions the controller must perform, in order.
//!
//! Visibility is always `available && wants_shown`. A load request and an
//! available ad never coexist: a request ends in exactly one of
//! `load_succeeded` or `load_failed` before another is issued.

use bridge_traits::AdGravity;
use serde::{Deserialize, Serialize};

/// Surface work produced by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdAction {
    /// One-time construction for this ad unit
    Create { unit_id: String },
    /// Request a fresh ad
    Load,
    Show(AdGravity),
    Hide,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdSlotState {
    pub initialized: bool,
    pub wants_shown: bool,
    pub available: bool,
    pub requested: bool,
    pub gravity: AdGravity,
    /// Whether the surface is currently on screen
    pub shown: bool,
    pub unit_id: Option<String>,
}

impl AdSlotState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine asked for the banner at the given edge.
    ///
    /// The first call constructs the slot for `unit_id`; later calls keep the
    /// original unit. A gravity change only applies the next time the
    /// banner goes from hidden to shown.
    pub fn request_show(&mut self, unit_id: &str, gravity: AdGravity) -> Vec<AdAction> {
        self.gravity = gravity;

        let mut actions = Vec::new();
        if !self.initialized {
            self.initialized = true;
            self.unit_id = Some(unit_id.to_string());
            actions.push(AdAction::Create {
                unit_id: unit_id.to_string(),
            });
        }

        self.wants_shown = true;
        actions.extend(self.evaluate(true));
        actions
    }

    pub fn request_hide(&mut self) -> Vec<AdAction> {
        self.wants_shown = false;
        self.evaluate(true)
    }

    /// Same as hide; the loaded ad is kept.
    pub fn request_close(&mut self) -> Vec<AdAction> {
        self.request_hide()
    }

    pub fn load_succeeded(&mut self) -> Vec<AdAction> {
        self.available = true;
        self.requested = false;
        self.evaluate(true)
    }

    /// A failed load is not retried until the next show request.
    pub fn load_failed(&mut self) -> Vec<AdAction> {
        self.available = false;
        self.requested = false;
        self.evaluate(false)
    }

    /// Host could not construct the slot; forget the attempt.
    pub fn creation_failed(&mut self) {
        self.initialized = false;
        self.wants_shown = false;
        self.requested = false;
        self.unit_id = None;
    }

    /// Visibility the flags call for.
    pub fn should_be_visible(&self) -> bool {
        self.available && self.wants_shown
    }

    fn evaluate(&mut self, load_if_needed: bool) -> Vec<AdAction> {
        if !self.initialized {
            return Vec::new();
        }

        let mut actions = Vec::new();
        if self.wants_shown && !self.available && !self.requested && load_if_needed {
            self.requested = true;
            actions.push(AdAction::Load);
        }

        if self.should_be_visible() {
            if !self.shown {
                self.shown = true;
                actions.push(AdAction::Show(self.gravity));
            }
        } else if self.shown {
            self.shown = false;
            actions.push(AdAction::Hide);
        }

        actions
    }
}
