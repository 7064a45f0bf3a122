//! # Event Bus System
//!
//! Diagnostic event stream for the bridge, built on `tokio::sync::broadcast`.
//!
//! The engine never depends on these events; it is notified through
//! [`EngineNotifier`](bridge_traits::EngineNotifier). The bus exists so host
//! tooling, tests, and debug overlays can observe state transitions without
//! touching the coordinators.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   emit    ┌───────────┐
//! │ GamesCoordinator ├──────────>│           │   subscribe   ┌────────────┐
//! └──────────────────┘           │ EventBus  ├──────────────>│ Subscriber │
//! ┌──────────────────┐   emit    │           │               └────────────┘
//! │ AdController     ├──────────>│           │
//! └──────────────────┘           └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{ConnectionEvent, CoreEvent, EventBus};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(100);
//! let mut stream = bus.subscribe();
//!
//! bus.emit(CoreEvent::Connection(ConnectionEvent::Connected)).ok();
//!
//! let event = stream.recv().await.unwrap();
//! assert_eq!(event.description(), "Connected to games service");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: Subscriber fell behind and missed `n` events.
//!   Non-fatal; keep receiving.
//! - **`RecvError::Closed`**: The bridge shut down.
//!
//! `emit` fails only when nobody is subscribed, which emitters ignore.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Games service connection lifecycle
    Connection(ConnectionEvent),
    /// Achievement catalog and progress traffic
    Achievements(AchievementEvent),
    /// Banner slot transitions
    Ad(AdEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Connection(e) => e.description(),
            CoreEvent::Achievements(e) => e.description(),
            CoreEvent::Ad(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Connection(ConnectionEvent::Failed { .. })
            | CoreEvent::Achievements(AchievementEvent::QueryFailed { .. })
            | CoreEvent::Achievements(AchievementEvent::ResetFailed { .. }) => EventSeverity::Error,
            CoreEvent::Connection(ConnectionEvent::Suspended { .. })
            | CoreEvent::Ad(AdEvent::LoadFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Connection(ConnectionEvent::Connected)
            | CoreEvent::Connection(ConnectionEvent::Disconnected)
            | CoreEvent::Achievements(AchievementEvent::Queried { .. })
            | CoreEvent::Ad(AdEvent::Initialized { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Connection Events
// ============================================================================

/// Events from the games connection state machine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum ConnectionEvent {
    /// A connect request was issued to the service.
    Connecting,
    /// The service reported a live connection.
    Connected,
    /// The service dropped the connection temporarily.
    Suspended {
        /// Platform cause code
        cause: i32,
    },
    /// A connection attempt failed.
    Failed {
        /// Platform error code
        error_code: i32,
        /// Whether a remediation flow was offered
        has_resolution: bool,
    },
    /// A remediation flow or error surface was launched.
    ResolutionStarted {
        /// Error code being resolved
        error_code: i32,
    },
    /// The host reported the end of a remediation flow.
    ResolutionFinished {
        /// Activity-style result code
        result_code: i32,
    },
    /// The connection was torn down by the bridge.
    Disconnected,
}

impl ConnectionEvent {
    fn description(&self) -> &str {
        match self {
            ConnectionEvent::Connecting => "Connecting to games service",
            ConnectionEvent::Connected => "Connected to games service",
            ConnectionEvent::Suspended { .. } => "Connection suspended",
            ConnectionEvent::Failed { .. } => "Connection failed",
            ConnectionEvent::ResolutionStarted { .. } => "Resolution flow started",
            ConnectionEvent::ResolutionFinished { .. } => "Resolution flow finished",
            ConnectionEvent::Disconnected => "Disconnected from games service",
        }
    }
}

// ============================================================================
// Achievement Events
// ============================================================================

/// Events from achievement catalog, progress and reset handling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AchievementEvent {
    /// The descriptor cache was rebuilt from a fresh catalog.
    CatalogCached {
        /// Number of descriptors cached
        count: usize,
    },
    /// A progress write was forwarded to the service.
    ProgressWritten {
        /// Achievement identifier
        achievement_id: String,
        /// Steps set, or `None` for an unlock
        steps: Option<u32>,
    },
    /// A progress query completed and was delivered to the engine.
    Queried {
        /// Number of entries delivered
        count: usize,
    },
    /// A progress query failed; the engine was told.
    QueryFailed {
        /// Human-readable error message
        message: String,
    },
    /// An achievement reset call was dispatched.
    ResetRequested,
    /// The reset call failed; the re-query still runs.
    ResetFailed {
        /// Human-readable error message
        message: String,
    },
}

impl AchievementEvent {
    fn description(&self) -> &str {
        match self {
            AchievementEvent::CatalogCached { .. } => "Achievement catalog cached",
            AchievementEvent::ProgressWritten { .. } => "Achievement progress written",
            AchievementEvent::Queried { .. } => "Achievements queried",
            AchievementEvent::QueryFailed { .. } => "Achievement query failed",
            AchievementEvent::ResetRequested => "Achievement reset requested",
            AchievementEvent::ResetFailed { .. } => "Achievement reset failed",
        }
    }
}

// ============================================================================
// Ad Events
// ============================================================================

/// Events from the banner slot state machine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AdEvent {
    /// The banner view was created for an ad unit.
    Initialized {
        /// Ad unit identifier
        unit_id: String,
    },
    /// A banner load was requested.
    LoadRequested,
    /// The host reported a loaded banner.
    Loaded,
    /// The host reported a failed load.
    LoadFailed {
        /// Host error code
        code: i32,
    },
    /// The banner was made visible.
    Shown {
        /// Whether it was anchored to the bottom edge
        bottom: bool,
    },
    /// The banner was hidden.
    Hidden,
}

impl AdEvent {
    fn description(&self) -> &str {
        match self {
            AdEvent::Initialized { .. } => "Ad slot initialized",
            AdEvent::LoadRequested => "Ad load requested",
            AdEvent::Loaded => "Ad loaded",
            AdEvent::LoadFailed { .. } => "Ad load failed",
            AdEvent::Shown { .. } => "Ad shown",
            AdEvent::Hidden => "Ad hidden",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to bridge events.
///
/// Cloning shares the same channel; each `subscribe()` call gets an
/// independent receiver that sees only future events.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// Subscribers that fall behind by more than `capacity` events receive
    /// `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let bus = EventBus::new(100);
/// let ads_only = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Ad(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive a matching event without waiting.
    ///
    /// Returns `None` if no events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}
