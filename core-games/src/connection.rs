//! # Connection State Machine
//!
//! Pure model of the games service connection. It never touches a port;
//! every transition returns the effects the coordinator must carry out.
//!
//! ## State Machine
//!
//! ```text
//!                 connect()                 on_connected()
//! Disconnected ─────────────> Connecting ─────────────────> Connected
//!      ↑                          │                             │
//!      │                on_failed │                  disconnect │
//!      │                          ↓                             │
//!      │  finished(!OK)    ResolvingError                       │
//!      ├──────────────────────────┤                             │
//!      │                          │ finished(OK) -> Connecting  │
//!      └────────────────────────────────────────────────────────┘
//! ```
//!
//! The resolving flag is kept separate from the link state: the host tears
//! the link down while a resolution activity is in front, and the flag must
//! survive that.

use bridge_traits::{ConnectionFailure, ServiceAvailability, INTERNAL_ERROR, RESULT_OK};
use serde::{Deserialize, Serialize};

/// Observable connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// A resolution flow or error surface is in front of the user
    ResolvingError,
}

/// State of the underlying service link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Disconnected,
    Connecting,
    Connected,
}

/// Work the coordinator performs after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEffect {
    /// Ask the service to connect
    IssueConnect,
    /// Launch the remediation flow carried by the failure
    StartResolution(ConnectionFailure),
    /// Show the service error surface for an unresolvable code
    ShowErrorSurface { error_code: i32 },
    /// Tell the engine the connection attempt completed
    NotifyCompleted { result_code: i32 },
    /// Refresh the achievement descriptor cache
    LoadDescriptors,
    /// Tear the link down
    Disconnect,
}

#[derive(Debug, Clone)]
pub struct ConnectionMachine {
    link: Link,
    resolving: bool,
    has_ever_connected: bool,
    last_error_code: Option<i32>,
}

impl Default for ConnectionMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionMachine {
    pub fn new() -> Self {
        Self {
            link: Link::Disconnected,
            resolving: false,
            has_ever_connected: false,
            last_error_code: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        match self.link {
            Link::Connected => ConnectionState::Connected,
            Link::Connecting => ConnectionState::Connecting,
            Link::Disconnected if self.resolving => ConnectionState::ResolvingError,
            Link::Disconnected => ConnectionState::Disconnected,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.link == Link::Connected
    }

    pub fn is_resolving(&self) -> bool {
        self.resolving
    }

    pub fn has_ever_connected(&self) -> bool {
        self.has_ever_connected
    }

    /// Error code of the last failure shown on the error surface.
    pub fn last_error_code(&self) -> Option<i32> {
        self.last_error_code
    }

    /// Engine-initiated connect, gated on the service availability check.
    pub fn connect(&mut self, availability: ServiceAvailability) -> Vec<ConnectionEffect> {
        if !availability.allows_connect() {
            return vec![ConnectionEffect::NotifyCompleted {
                result_code: availability.status_code(),
            }];
        }
        self.begin_connect()
    }

    /// Foreground transition. Reconnects only after a first success.
    pub fn resume(&mut self) -> Vec<ConnectionEffect> {
        if !self.has_ever_connected {
            return Vec::new();
        }
        self.begin_connect()
    }

    /// Background transition. Always tears the link down.
    pub fn disconnect(&mut self) -> Vec<ConnectionEffect> {
        self.link = Link::Disconnected;
        vec![ConnectionEffect::Disconnect]
    }

    pub fn on_connected(&mut self) -> Vec<ConnectionEffect> {
        self.link = Link::Connected;
        self.has_ever_connected = true;
        vec![
            ConnectionEffect::NotifyCompleted {
                result_code: RESULT_OK,
            },
            ConnectionEffect::LoadDescriptors,
        ]
    }

    /// Suspension is logged by the caller; no transition.
    pub fn on_suspended(&mut self) -> Vec<ConnectionEffect> {
        Vec::new()
    }

    pub fn on_failed(&mut self, failure: ConnectionFailure) -> Vec<ConnectionEffect> {
        self.link = Link::Disconnected;

        if self.resolving {
            return Vec::new();
        }

        self.resolving = true;
        if failure.has_resolution() {
            vec![ConnectionEffect::StartResolution(failure)]
        } else {
            self.last_error_code = Some(failure.error_code);
            vec![ConnectionEffect::ShowErrorSurface {
                error_code: failure.error_code,
            }]
        }
    }

    /// The service refused the connect request outright.
    pub fn on_connect_dispatch_failed(&mut self) -> Vec<ConnectionEffect> {
        self.on_failed(ConnectionFailure::without_resolution(INTERNAL_ERROR))
    }

    /// Launching the remediation flow failed; retry the connection directly.
    pub fn on_resolution_start_failed(&mut self) -> Vec<ConnectionEffect> {
        self.resolving = false;
        self.begin_connect()
    }

    /// The error surface could not be shown, so no finish callback will come.
    pub fn on_error_surface_failed(&mut self, error_code: i32) -> Vec<ConnectionEffect> {
        self.resolving = false;
        vec![ConnectionEffect::NotifyCompleted {
            result_code: error_code,
        }]
    }

    pub fn on_resolution_finished(&mut self, result_code: i32) -> Vec<ConnectionEffect> {
        self.resolving = false;

        if result_code == RESULT_OK {
            self.begin_connect()
        } else {
            vec![ConnectionEffect::NotifyCompleted { result_code }]
        }
    }

    fn begin_connect(&mut self) -> Vec<ConnectionEffect> {
        match self.link {
            Link::Connecting | Link::Connected => Vec::new(),
            Link::Disconnected => {
                self.link = Link::Connecting;
                vec![ConnectionEffect::IssueConnect]
            }
        }
    }
}
