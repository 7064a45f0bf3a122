//! Integration tests for the ad controller actor

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{AdGravity, AdSize, AdSurface, BridgeError};
use core_ads::{AdController, AdError, AdHandle};
use core_runtime::events::{AdEvent, CoreEvent, EventBus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;

#[derive(Debug, Clone, PartialEq)]
enum SurfaceCall {
    Create(String, AdSize),
    Load,
    Show(AdGravity),
    Hide,
}

#[derive(Default)]
struct RecordingSurface {
    calls: Mutex<Vec<SurfaceCall>>,
    fail_create: AtomicBool,
    fail_load: AtomicBool,
}

impl RecordingSurface {
    fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, call: &SurfaceCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }
}

impl AdSurface for RecordingSurface {
    fn create(&self, unit_id: &str, size: AdSize) -> BridgeResult<()> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed("no window".to_string()));
        }
        self.calls
            .lock()
            .unwrap()
            .push(SurfaceCall::Create(unit_id.to_string(), size));
        Ok(())
    }

    fn load(&self) -> BridgeResult<()> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(BridgeError::NotAvailable("ads sdk".to_string()));
        }
        self.calls.lock().unwrap().push(SurfaceCall::Load);
        Ok(())
    }

    fn show(&self, gravity: AdGravity) {
        self.calls.lock().unwrap().push(SurfaceCall::Show(gravity));
    }

    fn hide(&self) {
        self.calls.lock().unwrap().push(SurfaceCall::Hide);
    }
}

fn start(surface: Arc<RecordingSurface>) -> (AdHandle, EventBus) {
    let bus = EventBus::new(64);
    let (ads, _task) = AdController::spawn(surface, AdSize::BANNER, bus.clone(), &Handle::current());
    (ads, bus)
}

#[tokio::test]
async fn test_show_creates_and_loads_once() {
    let surface = Arc::new(RecordingSurface::default());
    let (ads, _bus) = start(Arc::clone(&surface));

    ads.show_ad("unit1", false).unwrap();
    ads.show_ad("unit1", false).unwrap();
    let state = ads.snapshot().await.unwrap();

    assert_eq!(
        surface.calls(),
        vec![
            SurfaceCall::Create("unit1".to_string(), AdSize::BANNER),
            SurfaceCall::Load
        ]
    );
    assert!(state.initialized);
    assert!(state.requested);
    assert!(!state.shown);
}

#[tokio::test]
async fn test_loaded_ad_is_shown_then_hidden_without_reload() {
    let surface = Arc::new(RecordingSurface::default());
    let (ads, _bus) = start(Arc::clone(&surface));

    ads.show_ad("unit1", false).unwrap();
    ads.on_load_succeeded().unwrap();
    ads.hide_ad().unwrap();
    ads.show_ad("unit1", false).unwrap();
    let state = ads.snapshot().await.unwrap();

    assert_eq!(
        surface.calls(),
        vec![
            SurfaceCall::Create("unit1".to_string(), AdSize::BANNER),
            SurfaceCall::Load,
            SurfaceCall::Show(AdGravity::Top),
            SurfaceCall::Hide,
            SurfaceCall::Show(AdGravity::Top),
        ]
    );
    assert!(state.shown);
    assert!(state.available);
}

#[tokio::test]
async fn test_bottom_flag_anchors_to_bottom() {
    let surface = Arc::new(RecordingSurface::default());
    let (ads, _bus) = start(Arc::clone(&surface));

    ads.show_ad("unit1", true).unwrap();
    ads.on_load_succeeded().unwrap();
    ads.snapshot().await.unwrap();

    assert_eq!(surface.count(&SurfaceCall::Show(AdGravity::Bottom)), 1);
}

#[tokio::test]
async fn test_hide_and_close_before_show_touch_nothing() {
    let surface = Arc::new(RecordingSurface::default());
    let (ads, _bus) = start(Arc::clone(&surface));

    ads.hide_ad().unwrap();
    ads.close_ad().unwrap();
    let state = ads.snapshot().await.unwrap();

    assert!(surface.calls().is_empty());
    assert!(!state.initialized);
}

#[tokio::test]
async fn test_close_keeps_loaded_ad() {
    let surface = Arc::new(RecordingSurface::default());
    let (ads, _bus) = start(Arc::clone(&surface));

    ads.show_ad("unit1", false).unwrap();
    ads.on_load_succeeded().unwrap();
    ads.close_ad().unwrap();
    let state = ads.snapshot().await.unwrap();

    assert!(!state.shown);
    assert!(state.available);
    assert_eq!(surface.count(&SurfaceCall::Load), 1);
}

#[tokio::test]
async fn test_failed_load_retries_on_next_show() {
    let surface = Arc::new(RecordingSurface::default());
    let (ads, _bus) = start(Arc::clone(&surface));

    ads.show_ad("unit1", false).unwrap();
    ads.on_load_failed(3).unwrap();
    let after_failure = ads.snapshot().await.unwrap();
    assert_eq!(surface.count(&SurfaceCall::Load), 1);
    assert!(!after_failure.requested);

    ads.show_ad("unit1", false).unwrap();
    ads.snapshot().await.unwrap();
    assert_eq!(surface.count(&SurfaceCall::Load), 2);
}

#[tokio::test]
async fn test_rejected_load_clears_request() {
    let surface = Arc::new(RecordingSurface::default());
    surface.fail_load.store(true, Ordering::SeqCst);
    let (ads, _bus) = start(Arc::clone(&surface));

    ads.show_ad("unit1", false).unwrap();
    let state = ads.snapshot().await.unwrap();

    assert!(state.initialized);
    assert!(!state.requested);
    assert!(!state.shown);
}

#[tokio::test]
async fn test_failed_creation_allows_retry() {
    let surface = Arc::new(RecordingSurface::default());
    surface.fail_create.store(true, Ordering::SeqCst);
    let (ads, _bus) = start(Arc::clone(&surface));

    ads.show_ad("unit1", false).unwrap();
    let state = ads.snapshot().await.unwrap();
    assert!(!state.initialized);
    assert!(surface.calls().is_empty());

    surface.fail_create.store(false, Ordering::SeqCst);
    ads.show_ad("unit1", false).unwrap();
    ads.snapshot().await.unwrap();
    assert_eq!(
        surface.calls(),
        vec![
            SurfaceCall::Create("unit1".to_string(), AdSize::BANNER),
            SurfaceCall::Load
        ]
    );
}

#[tokio::test]
async fn test_emits_ad_events_in_order() {
    let surface = Arc::new(RecordingSurface::default());
    let (ads, bus) = start(Arc::clone(&surface));
    let mut events = bus.subscribe();

    ads.show_ad("unit1", true).unwrap();
    ads.on_load_succeeded().unwrap();
    ads.hide_ad().unwrap();
    ads.snapshot().await.unwrap();

    let mut received = Vec::new();
    while let Ok(CoreEvent::Ad(event)) = events.try_recv() {
        received.push(event);
    }

    assert_eq!(
        received,
        vec![
            AdEvent::Initialized {
                unit_id: "unit1".to_string()
            },
            AdEvent::LoadRequested,
            AdEvent::Loaded,
            AdEvent::Shown { bottom: true },
            AdEvent::Hidden,
        ]
    );
}

#[tokio::test]
async fn test_handle_fails_after_shutdown() {
    let surface = Arc::new(RecordingSurface::default());
    let bus = EventBus::new(8);
    let (ads, task) = AdController::spawn(surface, AdSize::BANNER, bus, &Handle::current());

    ads.shutdown().unwrap();
    task.await.unwrap();

    assert!(matches!(ads.show_ad("unit1", false), Err(AdError::ControllerStopped)));
    assert!(matches!(ads.snapshot().await, Err(AdError::ControllerStopped)));
}
