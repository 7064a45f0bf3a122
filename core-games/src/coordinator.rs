//! # Games Coordinator
//!
//! Single-owner actor for the games service connection and achievement data.
//!
//! ## Overview
//!
//! One tokio task owns the [`ConnectionMachine`], the [`DescriptorCache`] and
//! the in-flight bookkeeping. Everything reaches it as a message on one
//! unbounded channel:
//! - engine commands ([`GamesCommand`])
//! - host service callbacks ([`ServiceCallback`])
//! - completions of the port calls it spawned (catalog loads, resets)
//!
//! Handlers never await. Slow port calls run in their own tasks and report
//! back as tagged messages, so state is only ever touched by the actor.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_games::GamesCoordinator;
//!
//! let (games, task) = GamesCoordinator::spawn(&config, event_bus, &runtime);
//! games.connect()?;
//!
//! // Host callbacks, from any thread
//! games.on_connected()?;
//! games.write_achievement_progress("ach_collect_100", 50.0)?;
//! ```

use crate::achievements::{progress_report, DescriptorCache, ProgressAction};
use crate::connection::{ConnectionEffect, ConnectionMachine, ConnectionState};
use crate::reset::AchievementResetter;
use crate::{GamesError, Result};
use bridge_traits::error::Result as PortResult;
use bridge_traits::{AchievementBuffer, ConnectionFailure, EngineNotifier, GamesService};
use core_runtime::config::BridgeConfig;
use core_runtime::events::{AchievementEvent, ConnectionEvent, CoreEvent, EventBus};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Commands issued by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum GamesCommand {
    Connect,
    /// App returned to the foreground
    Resume,
    /// App went to the background
    Disconnect,
    ShowLeaderboard {
        leaderboard_id: String,
    },
    ShowAchievements,
    WriteLeaderboardValue {
        leaderboard_id: String,
        value: i64,
    },
    WriteAchievementProgress {
        achievement_id: String,
        percent: f64,
    },
    QueryAchievements,
    ResetAchievements,
}

/// Connection callbacks delivered by the host games service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCallback {
    Connected,
    ConnectionSuspended { cause: i32 },
    ConnectionFailed(ConnectionFailure),
    ResolutionFinished { result_code: i32 },
}

/// Point-in-time view of the coordinator state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamesSnapshot {
    pub state: ConnectionState,
    pub has_ever_connected: bool,
    pub resolving: bool,
    pub cached_descriptors: usize,
    pub descriptors_loading: bool,
    pub query_in_flight: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CatalogPurpose {
    Descriptors,
    Query,
}

enum Message {
    Command(GamesCommand),
    Callback(ServiceCallback),
    CatalogLoaded {
        purpose: CatalogPurpose,
        result: PortResult<AchievementBuffer>,
    },
    ResetFinished,
    Snapshot(oneshot::Sender<GamesSnapshot>),
    Shutdown,
}

/// One outstanding fetch per kind, with a single queued repeat.
#[derive(Debug, Default)]
struct FetchSlot {
    in_flight: bool,
    again: bool,
}

impl FetchSlot {
    /// Returns true if the caller should start a fetch now.
    fn begin(&mut self) -> bool {
        if self.in_flight {
            self.again = true;
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Returns true if another fetch was requested meanwhile.
    fn finish(&mut self) -> bool {
        self.in_flight = false;
        std::mem::take(&mut self.again)
    }
}

/// Cloneable, thread-safe entry point to a running [`GamesCoordinator`].
///
/// Every call only enqueues a message; the only failure is
/// `GamesError::CoordinatorStopped`.
#[derive(Debug, Clone)]
pub struct GamesHandle {
    tx: mpsc::UnboundedSender<Message>,
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Message::Command(command) => f.debug_tuple("Command").field(command).finish(),
            Message::Callback(callback) => f.debug_tuple("Callback").field(callback).finish(),
            Message::CatalogLoaded { purpose, result } => f
                .debug_struct("CatalogLoaded")
                .field("purpose", purpose)
                .field("ok", &result.is_ok())
                .finish(),
            Message::ResetFinished => f.write_str("ResetFinished"),
            Message::Snapshot(_) => f.write_str("Snapshot"),
            Message::Shutdown => f.write_str("Shutdown"),
        }
    }
}

impl GamesHandle {
    fn send(&self, message: Message) -> Result<()> {
        self.tx
            .send(message)
            .map_err(|_| GamesError::CoordinatorStopped)
    }

    pub fn command(&self, command: GamesCommand) -> Result<()> {
        self.send(Message::Command(command))
    }

    pub fn callback(&self, callback: ServiceCallback) -> Result<()> {
        self.send(Message::Callback(callback))
    }

    pub fn connect(&self) -> Result<()> {
        self.command(GamesCommand::Connect)
    }

    pub fn resume(&self) -> Result<()> {
        self.command(GamesCommand::Resume)
    }

    pub fn disconnect(&self) -> Result<()> {
        self.command(GamesCommand::Disconnect)
    }

    pub fn show_leaderboard(&self, leaderboard_id: impl Into<String>) -> Result<()> {
        self.command(GamesCommand::ShowLeaderboard {
            leaderboard_id: leaderboard_id.into(),
        })
    }

    pub fn show_achievements(&self) -> Result<()> {
        self.command(GamesCommand::ShowAchievements)
    }

    pub fn write_leaderboard_value(
        &self,
        leaderboard_id: impl Into<String>,
        value: i64,
    ) -> Result<()> {
        self.command(GamesCommand::WriteLeaderboardValue {
            leaderboard_id: leaderboard_id.into(),
            value,
        })
    }

    pub fn write_achievement_progress(
        &self,
        achievement_id: impl Into<String>,
        percent: f64,
    ) -> Result<()> {
        self.command(GamesCommand::WriteAchievementProgress {
            achievement_id: achievement_id.into(),
            percent,
        })
    }

    pub fn query_achievements(&self) -> Result<()> {
        self.command(GamesCommand::QueryAchievements)
    }

    pub fn reset_achievements(&self) -> Result<()> {
        self.command(GamesCommand::ResetAchievements)
    }

    pub fn on_connected(&self) -> Result<()> {
        self.callback(ServiceCallback::Connected)
    }

    pub fn on_connection_suspended(&self, cause: i32) -> Result<()> {
        self.callback(ServiceCallback::ConnectionSuspended { cause })
    }

    pub fn on_connection_failed(&self, failure: ConnectionFailure) -> Result<()> {
        self.callback(ServiceCallback::ConnectionFailed(failure))
    }

    pub fn on_resolution_finished(&self, result_code: i32) -> Result<()> {
        self.callback(ServiceCallback::ResolutionFinished { result_code })
    }

    /// Ask the actor for its current state.
    ///
    /// Resolves after every message sent before it has been handled.
    pub async fn snapshot(&self) -> Result<GamesSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(Message::Snapshot(reply))?;
        rx.await.map_err(|_| GamesError::CoordinatorStopped)
    }

    /// Stop the actor after the messages already queued.
    pub fn shutdown(&self) -> Result<()> {
        self.send(Message::Shutdown)
    }
}

/// Connection & achievement actor.
pub struct GamesCoordinator {
    service: Arc<dyn GamesService>,
    notifier: Arc<dyn EngineNotifier>,
    resetter: Option<AchievementResetter>,
    games_enabled: bool,
    event_bus: EventBus,
    inbox: mpsc::WeakUnboundedSender<Message>,

    machine: ConnectionMachine,
    descriptors: DescriptorCache,
    descriptor_fetch: FetchSlot,
    query_fetch: FetchSlot,
}

impl GamesCoordinator {
    /// Spawn the actor on `runtime` and return its handle.
    pub fn spawn(
        config: &BridgeConfig,
        event_bus: EventBus,
        runtime: &Handle,
    ) -> (GamesHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();

        let coordinator = Self {
            service: Arc::clone(&config.games_service),
            notifier: Arc::clone(&config.engine_notifier),
            resetter: AchievementResetter::from_config(config),
            games_enabled: config.games_enabled,
            event_bus,
            inbox: tx.downgrade(),
            machine: ConnectionMachine::new(),
            descriptors: DescriptorCache::new(),
            descriptor_fetch: FetchSlot::default(),
            query_fetch: FetchSlot::default(),
        };

        let task = runtime.spawn(coordinator.run(rx));
        (GamesHandle { tx }, task)
    }

    async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<Message>) {
        info!(
            games_enabled = self.games_enabled,
            reset_supported = self.resetter.is_some(),
            "Games coordinator started"
        );

        while let Some(message) = inbox.recv().await {
            match message {
                Message::Command(command) => self.handle_command(command),
                Message::Callback(callback) => self.handle_callback(callback),
                Message::CatalogLoaded { purpose, result } => self.handle_catalog(purpose, result),
                Message::ResetFinished => self.query_achievements(),
                Message::Snapshot(reply) => {
                    let _ = reply.send(self.snapshot());
                }
                Message::Shutdown => break,
            }
        }

        info!("Games coordinator stopped");
    }

    fn snapshot(&self) -> GamesSnapshot {
        GamesSnapshot {
            state: self.machine.state(),
            has_ever_connected: self.machine.has_ever_connected(),
            resolving: self.machine.is_resolving(),
            cached_descriptors: self.descriptors.len(),
            descriptors_loading: self.descriptor_fetch.in_flight,
            query_in_flight: self.query_fetch.in_flight,
        }
    }

    #[instrument(skip(self))]
    fn handle_command(&mut self, command: GamesCommand) {
        match command {
            GamesCommand::Connect => self.connect(),
            GamesCommand::Resume => {
                let effects = self.machine.resume();
                if effects.is_empty() {
                    debug!("Never connected; not reconnecting on resume");
                }
                self.apply(effects);
            }
            GamesCommand::Disconnect => {
                let effects = self.machine.disconnect();
                self.apply(effects);
            }
            GamesCommand::ShowLeaderboard { leaderboard_id } => {
                if !self.require_connected("show leaderboard") {
                    return;
                }
                if let Err(e) = self.service.show_leaderboard(&leaderboard_id) {
                    warn!(error = %e, "Failed to show leaderboard UI");
                }
            }
            GamesCommand::ShowAchievements => {
                if !self.require_connected("show achievements") {
                    return;
                }
                if let Err(e) = self.service.show_achievements() {
                    warn!(error = %e, "Failed to show achievements UI");
                }
            }
            GamesCommand::WriteLeaderboardValue {
                leaderboard_id,
                value,
            } => {
                if !self.require_connected("submit score") {
                    return;
                }
                let service = Arc::clone(&self.service);
                spawn_port_call("submit_score", async move {
                    service.submit_score(&leaderboard_id, value).await
                });
            }
            GamesCommand::WriteAchievementProgress {
                achievement_id,
                percent,
            } => self.write_achievement_progress(achievement_id, percent),
            GamesCommand::QueryAchievements => self.query_achievements(),
            GamesCommand::ResetAchievements => self.reset_achievements(),
        }
    }

    #[instrument(skip(self))]
    fn handle_callback(&mut self, callback: ServiceCallback) {
        let effects = match callback {
            ServiceCallback::Connected => {
                info!("Connected to games service");
                self.emit(CoreEvent::Connection(ConnectionEvent::Connected));
                self.machine.on_connected()
            }
            ServiceCallback::ConnectionSuspended { cause } => {
                info!(cause, "Games service connection suspended");
                self.emit(CoreEvent::Connection(ConnectionEvent::Suspended { cause }));
                self.machine.on_suspended()
            }
            ServiceCallback::ConnectionFailed(failure) => {
                info!(%failure, "Games service connection failed");
                self.emit(CoreEvent::Connection(ConnectionEvent::Failed {
                    error_code: failure.error_code,
                    has_resolution: failure.has_resolution(),
                }));
                if self.machine.is_resolving() {
                    debug!("Already resolving a connection error; dropping failure");
                }
                self.machine.on_failed(failure)
            }
            ServiceCallback::ResolutionFinished { result_code } => {
                info!(result_code, "Connection resolution finished");
                self.emit(CoreEvent::Connection(ConnectionEvent::ResolutionFinished {
                    result_code,
                }));
                self.machine.on_resolution_finished(result_code)
            }
        };

        self.apply(effects);
    }

    fn connect(&mut self) {
        if !self.games_enabled {
            debug!("Games service disabled for this title; ignoring connect");
            return;
        }

        let availability = self.service.availability();
        if !availability.allows_connect() {
            info!(?availability, "Games service unavailable on this device");
        }

        let effects = self.machine.connect(availability);
        self.apply(effects);
    }

    /// Carry out connection effects, including any follow-ups they trigger.
    fn apply(&mut self, effects: Vec<ConnectionEffect>) {
        let mut pending: VecDeque<ConnectionEffect> = effects.into();

        while let Some(effect) = pending.pop_front() {
            let follow_up = match effect {
                ConnectionEffect::IssueConnect => {
                    self.emit(CoreEvent::Connection(ConnectionEvent::Connecting));
                    match self.service.connect() {
                        Ok(()) => Vec::new(),
                        Err(e) => {
                            warn!(error = %e, "Connect request was rejected");
                            self.machine.on_connect_dispatch_failed()
                        }
                    }
                }
                ConnectionEffect::StartResolution(failure) => {
                    self.emit(CoreEvent::Connection(ConnectionEvent::ResolutionStarted {
                        error_code: failure.error_code,
                    }));
                    match self.service.start_resolution(&failure) {
                        Ok(()) => Vec::new(),
                        Err(e) => {
                            warn!(error = %e, "Could not start resolution; retrying connect");
                            self.machine.on_resolution_start_failed()
                        }
                    }
                }
                ConnectionEffect::ShowErrorSurface { error_code } => {
                    self.emit(CoreEvent::Connection(ConnectionEvent::ResolutionStarted {
                        error_code,
                    }));
                    match self.service.show_error_surface(error_code) {
                        Ok(()) => Vec::new(),
                        Err(e) => {
                            warn!(error = %e, error_code, "Could not show error surface");
                            self.machine.on_error_surface_failed(error_code)
                        }
                    }
                }
                ConnectionEffect::NotifyCompleted { result_code } => {
                    self.notifier.connection_completed(result_code);
                    Vec::new()
                }
                ConnectionEffect::LoadDescriptors => {
                    self.request_catalog(CatalogPurpose::Descriptors);
                    Vec::new()
                }
                ConnectionEffect::Disconnect => {
                    self.service.disconnect();
                    self.emit(CoreEvent::Connection(ConnectionEvent::Disconnected));
                    Vec::new()
                }
            };

            pending.extend(follow_up);
        }
    }

    fn require_connected(&self, operation: &str) -> bool {
        if self.machine.is_connected() {
            return true;
        }
        debug!(operation, "Not connected to games service; ignoring");
        false
    }

    fn write_achievement_progress(&mut self, achievement_id: String, percent: f64) {
        let Some(descriptor) = self.descriptors.get(&achievement_id) else {
            debug!(%achievement_id, "No cached achievement; not setting progress");
            return;
        };

        if !self.require_connected("set achievement progress") {
            return;
        }

        let service = Arc::clone(&self.service);
        match descriptor.progress_action(percent) {
            ProgressAction::SetSteps(steps) => {
                debug!(%achievement_id, steps, "Setting incremental achievement steps");
                self.emit(CoreEvent::Achievements(AchievementEvent::ProgressWritten {
                    achievement_id: achievement_id.clone(),
                    steps: Some(steps),
                }));
                spawn_port_call("set_steps", async move {
                    service.set_steps(&achievement_id, steps).await
                });
            }
            ProgressAction::Unlock => {
                debug!(%achievement_id, "Unlocking achievement");
                self.emit(CoreEvent::Achievements(AchievementEvent::ProgressWritten {
                    achievement_id: achievement_id.clone(),
                    steps: None,
                }));
                spawn_port_call("unlock", async move { service.unlock(&achievement_id).await });
            }
            ProgressAction::Nothing => {
                debug!(%achievement_id, percent, "Progress maps to no service request");
            }
        }
    }

    fn query_achievements(&mut self) {
        if !self.machine.is_connected() {
            debug!("Not connected; achievement query fails immediately");
            self.emit(CoreEvent::Achievements(AchievementEvent::QueryFailed {
                message: "not connected".to_string(),
            }));
            self.notifier.achievements_update_failed();
            return;
        }

        self.request_catalog(CatalogPurpose::Query);
    }

    fn request_catalog(&mut self, purpose: CatalogPurpose) {
        let slot = match purpose {
            CatalogPurpose::Descriptors => &mut self.descriptor_fetch,
            CatalogPurpose::Query => &mut self.query_fetch,
        };

        if !slot.begin() {
            debug!(?purpose, "Catalog fetch already in flight; queued a repeat");
            return;
        }

        let service = Arc::clone(&self.service);
        let inbox = self.inbox.clone();
        tokio::spawn(async move {
            let result = service.load_achievements().await;
            if let Some(tx) = inbox.upgrade() {
                let _ = tx.send(Message::CatalogLoaded { purpose, result });
            }
        });
    }

    fn handle_catalog(&mut self, purpose: CatalogPurpose, result: PortResult<AchievementBuffer>) {
        match purpose {
            CatalogPurpose::Descriptors => {
                match result {
                    Ok(buffer) => {
                        self.descriptors.rebuild(buffer.entries());
                        drop(buffer);
                        info!(count = self.descriptors.len(), "Achievement descriptors cached");
                        self.emit(CoreEvent::Achievements(AchievementEvent::CatalogCached {
                            count: self.descriptors.len(),
                        }));
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to load achievement catalog; keeping previous descriptors");
                    }
                }

                if self.descriptor_fetch.finish() && self.machine.is_connected() {
                    self.request_catalog(CatalogPurpose::Descriptors);
                }
            }
            CatalogPurpose::Query => {
                match result {
                    Ok(buffer) => {
                        let report = progress_report(buffer.entries());
                        drop(buffer);
                        debug!(count = report.len(), "Delivering achievement progress");
                        self.emit(CoreEvent::Achievements(AchievementEvent::Queried {
                            count: report.len(),
                        }));
                        self.notifier.achievements_updated(report);
                    }
                    Err(e) => {
                        warn!(error = %e, "Achievement query failed");
                        self.emit(CoreEvent::Achievements(AchievementEvent::QueryFailed {
                            message: e.to_string(),
                        }));
                        self.notifier.achievements_update_failed();
                    }
                }

                if self.query_fetch.finish() {
                    self.query_achievements();
                }
            }
        }
    }

    fn reset_achievements(&mut self) {
        let Some(resetter) = self.resetter.clone() else {
            warn!("Achievement reset needs an HttpClient and a TokenProvider; skipping");
            self.query_achievements();
            return;
        };

        self.emit(CoreEvent::Achievements(AchievementEvent::ResetRequested));

        let inbox = self.inbox.clone();
        let event_bus = self.event_bus.clone();
        tokio::spawn(async move {
            if let Err(e) = resetter.reset().await {
                warn!(error = %e, "Achievement reset failed");
                let _ = event_bus.emit(CoreEvent::Achievements(AchievementEvent::ResetFailed {
                    message: e.to_string(),
                }));
            }
            if let Some(tx) = inbox.upgrade() {
                let _ = tx.send(Message::ResetFinished);
            }
        });
    }

    fn emit(&self, event: CoreEvent) {
        let _ = self.event_bus.emit(event);
    }
}

/// Fire-and-forget port call; failures are logged only.
fn spawn_port_call<F>(operation: &'static str, call: F)
where
    F: Future<Output = PortResult<()>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = call.await {
            warn!(operation, error = %e, "Games service call failed");
        }
    });
}
