//! # Ad Controller
//!
//! Single-owner actor for the banner slot. Engine requests and host load
//! callbacks are serialized through one channel; the controller task is the
//! only caller of the [`AdSurface`] port, so every surface mutation happens
//! in one context and in request order.

use crate::slot::{AdAction, AdSlotState};
use crate::{AdError, Result};
use bridge_traits::{AdGravity, AdSize, AdSurface};
use core_runtime::events::{AdEvent, CoreEvent, EventBus};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

#[derive(Debug)]
enum Message {
    Show { unit_id: String, gravity: AdGravity },
    Hide,
    Close,
    LoadSucceeded,
    LoadFailed { code: i32 },
    Snapshot(oneshot::Sender<AdSlotState>),
    Shutdown,
}

/// Cloneable entry point to a running [`AdController`].
#[derive(Debug, Clone)]
pub struct AdHandle {
    tx: mpsc::UnboundedSender<Message>,
}

impl AdHandle {
    fn send(&self, message: Message) -> Result<()> {
        self.tx.send(message).map_err(|_| AdError::ControllerStopped)
    }

    /// Show the banner, anchored to the bottom edge if `bottom` is set.
    pub fn show_ad(&self, unit_id: impl Into<String>, bottom: bool) -> Result<()> {
        self.send(Message::Show {
            unit_id: unit_id.into(),
            gravity: AdGravity::from_bottom_flag(bottom),
        })
    }

    pub fn hide_ad(&self) -> Result<()> {
        self.send(Message::Hide)
    }

    pub fn close_ad(&self) -> Result<()> {
        self.send(Message::Close)
    }

    pub fn on_load_succeeded(&self) -> Result<()> {
        self.send(Message::LoadSucceeded)
    }

    pub fn on_load_failed(&self, code: i32) -> Result<()> {
        self.send(Message::LoadFailed { code })
    }

    /// Current slot flags, after every earlier message has been handled.
    pub async fn snapshot(&self) -> Result<AdSlotState> {
        let (reply, rx) = oneshot::channel();
        self.send(Message::Snapshot(reply))?;
        rx.await.map_err(|_| AdError::ControllerStopped)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(Message::Shutdown)
    }
}

/// Banner slot actor.
pub struct AdController {
    surface: Arc<dyn AdSurface>,
    ad_size: AdSize,
    event_bus: EventBus,
    slot: AdSlotState,
}

impl AdController {
    pub fn spawn(
        surface: Arc<dyn AdSurface>,
        ad_size: AdSize,
        event_bus: EventBus,
        runtime: &Handle,
    ) -> (AdHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            surface,
            ad_size,
            event_bus,
            slot: AdSlotState::new(),
        };

        let task = runtime.spawn(controller.run(rx));
        (AdHandle { tx }, task)
    }

    async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<Message>) {
        debug!(ad_size = ?self.ad_size, "Ad controller started");

        while let Some(message) = inbox.recv().await {
            match message {
                Message::Snapshot(reply) => {
                    let _ = reply.send(self.slot.clone());
                }
                Message::Shutdown => break,
                other => self.handle(other),
            }
        }

        debug!("Ad controller stopped");
    }

    #[instrument(skip(self))]
    fn handle(&mut self, message: Message) {
        let actions = match message {
            Message::Show { unit_id, gravity } => self.slot.request_show(&unit_id, gravity),
            Message::Hide => {
                if !self.slot.initialized {
                    debug!("Ad slot not initialized; ignoring hide");
                }
                self.slot.request_hide()
            }
            Message::Close => self.slot.request_close(),
            Message::LoadSucceeded => {
                self.emit(AdEvent::Loaded);
                self.slot.load_succeeded()
            }
            Message::LoadFailed { code } => {
                info!(code, "Ad failed to load");
                self.emit(AdEvent::LoadFailed { code });
                self.slot.load_failed()
            }
            Message::Snapshot(_) | Message::Shutdown => Vec::new(),
        };

        self.apply(actions);
    }

    fn apply(&mut self, actions: Vec<AdAction>) {
        for action in actions {
            match action {
                AdAction::Create { unit_id } => {
                    if let Err(e) = self.surface.create(&unit_id, self.ad_size) {
                        warn!(error = %e, %unit_id, "Failed to create ad surface");
                        self.slot.creation_failed();
                        return;
                    }
                    info!(%unit_id, "Ad surface created");
                    self.emit(AdEvent::Initialized { unit_id });
                }
                AdAction::Load => {
                    self.emit(AdEvent::LoadRequested);
                    if let Err(e) = self.surface.load() {
                        warn!(error = %e, "Ad load request was rejected");
                        let follow_up = self.slot.load_failed();
                        self.apply(follow_up);
                    }
                }
                AdAction::Show(gravity) => {
                    self.surface.show(gravity);
                    self.emit(AdEvent::Shown {
                        bottom: gravity == AdGravity::Bottom,
                    });
                }
                AdAction::Hide => {
                    self.surface.hide();
                    self.emit(AdEvent::Hidden);
                }
            }
        }
    }

    fn emit(&self, event: AdEvent) {
        let _ = self.event_bus.emit(CoreEvent::Ad(event));
    }
}
