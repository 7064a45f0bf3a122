//! # Games Connection & Achievement Coordinator
//!
//! Keeps one connection to the remote games service alive, recovers from
//! connection errors through the service's resolution flows, and translates
//! engine-side achievement percentages into service-native requests.
//!
//! ## Components
//!
//! - **Connection state machine** (`connection`): Pure transitions returning effects
//! - **Achievement cache** (`achievements`): Descriptor cache and percentage conversion
//! - **Reset** (`reset`): Management API call that wipes player achievements
//! - **Coordinator** (`coordinator`): Single-owner actor tying the above to the ports

pub mod achievements;
pub mod connection;
pub mod coordinator;
pub mod error;
pub mod reset;

pub use achievements::{AchievementDescriptor, DescriptorCache, ProgressAction};
pub use connection::{ConnectionEffect, ConnectionMachine, ConnectionState};
pub use coordinator::{GamesCommand, GamesCoordinator, GamesHandle, GamesSnapshot, ServiceCallback};
pub use error::{GamesError, Result};
pub use reset::AchievementResetter;
