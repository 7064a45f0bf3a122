//! Platform bridge façade and bootstrap.
//!
//! [`PlatformBridge`] is the one object the engine binding talks to. It wires
//! the host-provided ports from a [`BridgeConfig`] into the games coordinator
//! and the ad controller, then exposes:
//!
//! - the engine command surface, as synchronous fire-and-forget calls
//! - the host callback surface (connection results, resolution results, ad
//!   load outcomes), callable from any thread
//! - lifecycle routing: foreground resumes the games connection, background
//!   drops it
//!
//! Results flow back to the engine only through the configured
//! `EngineNotifier`. Ad state changes are published on the event bus.
//!
//! With the `desktop-shims` feature a `reqwest` HTTP client from
//! `bridge-desktop` is filled in when the config does not carry one.
//!
//! ```ignore
//! use core_service::PlatformBridge;
//! use core_runtime::config::BridgeConfig;
//!
//! let config = BridgeConfig::builder()
//!     .games_service(games)
//!     .engine_notifier(notifier)
//!     .ad_surface(ad_view)
//!     .build()?;
//!
//! let bridge = PlatformBridge::start(config)?;
//! bridge.connect()?;
//! bridge.show_ad("ca-app-pub-123/456", true)?;
//! ```

pub mod error;

pub use error::{CoreError, Result};

use std::sync::{Arc, Mutex};

use bridge_traits::{ConnectionFailure, LifecycleObserver, LifecycleState};
use core_ads::{AdController, AdHandle, AdSlotState};
use core_games::{GamesCoordinator, GamesHandle, GamesSnapshot};
use core_runtime::config::BridgeConfig;
use core_runtime::events::{EventBus, EventStream};
use tokio::runtime::Handle;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, instrument, warn};

/// Primary façade exposed to the engine binding.
///
/// Cheap to clone; all clones drive the same actors.
#[derive(Clone)]
pub struct PlatformBridge {
    games: GamesHandle,
    ads: Option<AdHandle>,
    event_bus: EventBus,
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
    lifecycle: Option<Arc<AbortHandle>>,
}

impl PlatformBridge {
    /// Start the bridge on the ambient tokio runtime.
    ///
    /// # Errors
    ///
    /// `CoreError::Runtime` with `CapabilityMissing` if called outside a
    /// tokio runtime.
    pub fn start(config: BridgeConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            core_runtime::Error::CapabilityMissing {
                capability: "tokio runtime".to_string(),
                message: e.to_string(),
            }
        })?;
        Ok(Self::start_on(config, &runtime))
    }

    /// Start the bridge on an explicit runtime, for hosts that own one.
    pub fn start_on(config: BridgeConfig, runtime: &Handle) -> Self {
        let config = with_default_http_client(config);
        let event_bus = EventBus::new(config.event_buffer_size);
        let mut tasks = Vec::new();

        let (games, games_task) = GamesCoordinator::spawn(&config, event_bus.clone(), runtime);
        tasks.push(games_task);

        let ads = config.ad_surface.clone().map(|surface| {
            let (ads, ads_task) =
                AdController::spawn(surface, config.ad_size, event_bus.clone(), runtime);
            tasks.push(ads_task);
            ads
        });

        let lifecycle = config.lifecycle_observer.clone().map(|observer| {
            let task = runtime.spawn(follow_lifecycle(observer, games.clone()));
            let abort = Arc::new(task.abort_handle());
            tasks.push(task);
            abort
        });

        info!(
            ads = ads.is_some(),
            reset = config.supports_reset(),
            lifecycle = lifecycle.is_some(),
            "Platform bridge started"
        );

        Self {
            games,
            ads,
            event_bus,
            tasks: Arc::new(Mutex::new(tasks)),
            lifecycle,
        }
    }

    // ------------------------------------------------------------------
    // Engine commands
    // ------------------------------------------------------------------

    pub fn connect(&self) -> Result<()> {
        Ok(self.games.connect()?)
    }

    pub fn show_leaderboard(&self, leaderboard_id: &str) -> Result<()> {
        Ok(self.games.show_leaderboard(leaderboard_id)?)
    }

    pub fn show_achievements_ui(&self) -> Result<()> {
        Ok(self.games.show_achievements()?)
    }

    pub fn write_leaderboard_value(&self, leaderboard_id: &str, value: i64) -> Result<()> {
        Ok(self.games.write_leaderboard_value(leaderboard_id, value)?)
    }

    /// Report achievement progress as a percentage in `[0, 100]`.
    pub fn write_achievement_progress(&self, achievement_id: &str, percent: f64) -> Result<()> {
        Ok(self.games.write_achievement_progress(achievement_id, percent)?)
    }

    pub fn query_achievements(&self) -> Result<()> {
        Ok(self.games.query_achievements()?)
    }

    pub fn reset_achievements(&self) -> Result<()> {
        Ok(self.games.reset_achievements()?)
    }

    pub fn show_ad(&self, unit_id: &str, bottom: bool) -> Result<()> {
        match &self.ads {
            Some(ads) => Ok(ads.show_ad(unit_id, bottom)?),
            None => {
                debug!(unit_id, "No ad surface configured; ignoring show");
                Ok(())
            }
        }
    }

    pub fn hide_ad(&self) -> Result<()> {
        match &self.ads {
            Some(ads) => Ok(ads.hide_ad()?),
            None => Ok(()),
        }
    }

    pub fn close_ad(&self) -> Result<()> {
        match &self.ads {
            Some(ads) => Ok(ads.close_ad()?),
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Host callbacks
    // ------------------------------------------------------------------

    pub fn on_connected(&self) -> Result<()> {
        Ok(self.games.on_connected()?)
    }

    pub fn on_connection_suspended(&self, cause: i32) -> Result<()> {
        Ok(self.games.on_connection_suspended(cause)?)
    }

    pub fn on_connection_failed(&self, failure: ConnectionFailure) -> Result<()> {
        Ok(self.games.on_connection_failed(failure)?)
    }

    /// Result of a resolution flow or error surface started by the bridge.
    pub fn on_resolution_finished(&self, result_code: i32) -> Result<()> {
        Ok(self.games.on_resolution_finished(result_code)?)
    }

    pub fn on_ad_loaded(&self) -> Result<()> {
        match &self.ads {
            Some(ads) => Ok(ads.on_load_succeeded()?),
            None => Ok(()),
        }
    }

    pub fn on_ad_load_failed(&self, code: i32) -> Result<()> {
        match &self.ads {
            Some(ads) => Ok(ads.on_load_failed(code)?),
            None => Ok(()),
        }
    }

    /// Route an app lifecycle transition.
    #[instrument(skip(self))]
    pub fn on_lifecycle(&self, state: LifecycleState) -> Result<()> {
        Ok(route_lifecycle(&self.games, state)?)
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    /// Subscribe to bridge events.
    pub fn events(&self) -> EventStream {
        EventStream::new(self.event_bus.subscribe())
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub async fn games_snapshot(&self) -> Result<GamesSnapshot> {
        Ok(self.games.snapshot().await?)
    }

    /// Ad slot flags, or `None` when no ad surface is configured.
    pub async fn ad_snapshot(&self) -> Result<Option<AdSlotState>> {
        match &self.ads {
            Some(ads) => Ok(Some(ads.snapshot().await?)),
            None => Ok(None),
        }
    }

    /// Stop every actor after the messages already queued and wait for them.
    pub async fn shutdown(&self) -> Result<()> {
        if let Some(lifecycle) = &self.lifecycle {
            lifecycle.abort();
        }
        let _ = self.games.shutdown();
        if let Some(ads) = &self.ads {
            let _ = ads.shutdown();
        }

        let tasks = match self.tasks.lock() {
            Ok(mut tasks) => std::mem::take(&mut *tasks),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };

        for task in tasks {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "Bridge task ended abnormally");
                }
            }
        }

        info!("Platform bridge stopped");
        Ok(())
    }
}

impl std::fmt::Debug for PlatformBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformBridge")
            .field("ads", &self.ads.is_some())
            .field("subscribers", &self.event_bus.subscriber_count())
            .finish()
    }
}

fn route_lifecycle(games: &GamesHandle, state: LifecycleState) -> core_games::Result<()> {
    match state {
        LifecycleState::Foreground => games.resume(),
        LifecycleState::Background => games.disconnect(),
    }
}

/// Forward observer transitions until the stream or the coordinator ends.
async fn follow_lifecycle(observer: Arc<dyn LifecycleObserver>, games: GamesHandle) {
    let mut stream = match observer.subscribe_changes().await {
        Ok(stream) => stream,
        Err(e) => {
            warn!(error = %e, "Could not subscribe to lifecycle changes");
            return;
        }
    };

    while let Some(state) = stream.next().await {
        debug!(?state, "Lifecycle transition");
        if route_lifecycle(&games, state).is_err() {
            break;
        }
    }

    debug!("Lifecycle stream ended");
}

#[cfg(feature = "desktop-shims")]
fn with_default_http_client(mut config: BridgeConfig) -> BridgeConfig {
    if config.http_client.is_none() {
        match bridge_desktop::ReqwestHttpClient::new() {
            Ok(client) => config.http_client = Some(Arc::new(client)),
            Err(e) => warn!(error = %e, "Default HTTP client unavailable"),
        }
    }
    config
}

#[cfg(not(feature = "desktop-shims"))]
fn with_default_http_client(config: BridgeConfig) -> BridgeConfig {
    config
}
