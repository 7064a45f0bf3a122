//! # Ad Surface State Machine
//!
//! Drives the single banner slot: lazy construction on the first show,
//! load on demand, and show/hide as a pure function of two flags.
//!
//! ## Components
//!
//! - **Slot state** (`slot`): Flags and the actions each transition requires
//! - **Controller** (`controller`): Single-owner actor applying actions to the `AdSurface`

pub mod controller;
pub mod error;
pub mod slot;

pub use controller::{AdController, AdHandle};
pub use error::{AdError, Result};
pub use slot::{AdAction, AdSlotState};
