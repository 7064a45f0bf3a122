//! End-to-end tests for the platform bridge façade

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    AchievementBuffer, AchievementProgress, AchievementState, AdGravity, AdSize, AdSurface,
    ConnectionFailure, EngineNotifier, GamesService, LifecycleChangeStream, LifecycleObserver,
    LifecycleState, RemoteAchievement, ResolutionToken, ServiceAvailability, RESULT_OK,
};
use core_games::ConnectionState;
use core_runtime::config::{BridgeConfig, BridgeConfigBuilder};
use core_runtime::events::{AdEvent, ConnectionEvent, CoreEvent};
use core_service::{CoreError, PlatformBridge};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Default)]
struct FakeGames {
    calls: Mutex<Vec<String>>,
}

impl FakeGames {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }
}

#[async_trait]
impl GamesService for FakeGames {
    fn availability(&self) -> ServiceAvailability {
        ServiceAvailability::Available
    }

    fn connect(&self) -> BridgeResult<()> {
        self.record("connect");
        Ok(())
    }

    fn disconnect(&self) {
        self.record("disconnect");
    }

    fn start_resolution(&self, _failure: &ConnectionFailure) -> BridgeResult<()> {
        self.record("start_resolution");
        Ok(())
    }

    fn show_error_surface(&self, _error_code: i32) -> BridgeResult<()> {
        self.record("show_error_surface");
        Ok(())
    }

    fn show_leaderboard(&self, leaderboard_id: &str) -> BridgeResult<()> {
        self.record(format!("show_leaderboard:{}", leaderboard_id));
        Ok(())
    }

    fn show_achievements(&self) -> BridgeResult<()> {
        self.record("show_achievements");
        Ok(())
    }

    async fn load_achievements(&self) -> BridgeResult<AchievementBuffer> {
        self.record("load_achievements");
        Ok(AchievementBuffer::new(vec![
            RemoteAchievement::standard("ach_first_win", AchievementState::Unlocked),
            RemoteAchievement::incremental("ach_collect_100", AchievementState::Revealed, 25, 100),
        ]))
    }

    async fn set_steps(&self, achievement_id: &str, steps: u32) -> BridgeResult<()> {
        self.record(format!("set_steps:{}:{}", achievement_id, steps));
        Ok(())
    }

    async fn unlock(&self, achievement_id: &str) -> BridgeResult<()> {
        self.record(format!("unlock:{}", achievement_id));
        Ok(())
    }

    async fn submit_score(&self, leaderboard_id: &str, value: i64) -> BridgeResult<()> {
        self.record(format!("submit_score:{}:{}", leaderboard_id, value));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingNotifier {
    completed: Mutex<Vec<i32>>,
    updated: Mutex<Vec<Vec<AchievementProgress>>>,
    failed: Mutex<usize>,
}

impl EngineNotifier for RecordingNotifier {
    fn connection_completed(&self, result_code: i32) {
        self.completed.lock().unwrap().push(result_code);
    }

    fn achievements_updated(&self, achievements: Vec<AchievementProgress>) {
        self.updated.lock().unwrap().push(achievements);
    }

    fn achievements_update_failed(&self) {
        *self.failed.lock().unwrap() += 1;
    }
}

#[derive(Default)]
struct RecordingSurface {
    calls: Mutex<Vec<String>>,
}

impl AdSurface for RecordingSurface {
    fn create(&self, unit_id: &str, size: AdSize) -> BridgeResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("create:{}:{}x{}", unit_id, size.width_dp, size.height_dp));
        Ok(())
    }

    fn load(&self) -> BridgeResult<()> {
        self.calls.lock().unwrap().push("load".to_string());
        Ok(())
    }

    fn show(&self, gravity: AdGravity) {
        self.calls.lock().unwrap().push(format!("show:{:?}", gravity));
    }

    fn hide(&self) {
        self.calls.lock().unwrap().push("hide".to_string());
    }
}

struct ChannelObserver {
    receiver: Mutex<Option<mpsc::UnboundedReceiver<LifecycleState>>>,
}

struct ChannelStream(mpsc::UnboundedReceiver<LifecycleState>);

#[async_trait]
impl LifecycleChangeStream for ChannelStream {
    async fn next(&mut self) -> Option<LifecycleState> {
        self.0.recv().await
    }
}

#[async_trait]
impl LifecycleObserver for ChannelObserver {
    async fn get_state(&self) -> BridgeResult<LifecycleState> {
        Ok(LifecycleState::Foreground)
    }

    async fn subscribe_changes(&self) -> BridgeResult<Box<dyn LifecycleChangeStream>> {
        let receiver = self.receiver.lock().unwrap().take().ok_or_else(|| {
            bridge_traits::BridgeError::OperationFailed("already subscribed".to_string())
        })?;
        Ok(Box::new(ChannelStream(receiver)))
    }
}

struct Harness {
    bridge: PlatformBridge,
    games: Arc<FakeGames>,
    notifier: Arc<RecordingNotifier>,
}

fn start(configure: impl FnOnce(BridgeConfigBuilder) -> BridgeConfigBuilder) -> Harness {
    let games = Arc::new(FakeGames::default());
    let notifier = Arc::new(RecordingNotifier::default());

    let builder = BridgeConfig::builder()
        .games_service(games.clone())
        .engine_notifier(notifier.clone());
    let config = configure(builder).build().unwrap();

    Harness {
        bridge: PlatformBridge::start(config).unwrap(),
        games,
        notifier,
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}

async fn connect(harness: &Harness) {
    harness.bridge.connect().unwrap();
    harness.bridge.on_connected().unwrap();
    wait_until(|| harness.games.count("load_achievements") >= 1).await;
    let games = harness.bridge.clone();
    for _ in 0..200 {
        let snapshot = games.games_snapshot().await.unwrap();
        if snapshot.cached_descriptors == 2 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("descriptors never cached");
}

#[test]
fn test_start_outside_runtime_is_capability_missing() {
    let config = BridgeConfig::builder()
        .games_service(Arc::new(FakeGames::default()))
        .engine_notifier(Arc::new(RecordingNotifier::default()))
        .build()
        .unwrap();

    let err = PlatformBridge::start(config).unwrap_err();
    assert!(matches!(
        err,
        CoreError::Runtime(core_runtime::Error::CapabilityMissing { .. })
    ));
}

#[tokio::test]
async fn test_connect_notifies_engine_and_caches_descriptors() {
    let harness = start(|b| b);
    connect(&harness).await;

    let snapshot = harness.bridge.games_snapshot().await.unwrap();
    assert_eq!(snapshot.state, ConnectionState::Connected);
    assert!(snapshot.has_ever_connected);
    assert_eq!(*harness.notifier.completed.lock().unwrap(), vec![RESULT_OK]);
}

#[tokio::test]
async fn test_progress_and_leaderboard_commands_reach_service() {
    let harness = start(|b| b);
    connect(&harness).await;

    harness
        .bridge
        .write_achievement_progress("ach_collect_100", 50.0)
        .unwrap();
    harness
        .bridge
        .write_achievement_progress("ach_first_win", 100.0)
        .unwrap();
    harness.bridge.write_leaderboard_value("lb_score", 1200).unwrap();
    harness.bridge.show_leaderboard("lb_score").unwrap();
    harness.bridge.show_achievements_ui().unwrap();

    wait_until(|| {
        harness.games.count("set_steps:ach_collect_100:50") == 1
            && harness.games.count("unlock:ach_first_win") == 1
            && harness.games.count("submit_score:lb_score:1200") == 1
    })
    .await;
    assert_eq!(harness.games.count("show_leaderboard:lb_score"), 1);
    assert_eq!(harness.games.count("show_achievements"), 1);
}

#[tokio::test]
async fn test_query_delivers_percentages() {
    let harness = start(|b| b);
    connect(&harness).await;

    harness.bridge.query_achievements().unwrap();
    wait_until(|| !harness.notifier.updated.lock().unwrap().is_empty()).await;

    let updates = harness.notifier.updated.lock().unwrap().clone();
    assert_eq!(
        updates[0],
        vec![
            AchievementProgress::new("ach_first_win", 100.0),
            AchievementProgress::new("ach_collect_100", 25.0),
        ]
    );
}

#[tokio::test]
async fn test_query_while_disconnected_fails_immediately() {
    let harness = start(|b| b);

    harness.bridge.query_achievements().unwrap();
    harness.bridge.games_snapshot().await.unwrap();

    assert_eq!(*harness.notifier.failed.lock().unwrap(), 1);
    assert_eq!(harness.games.count("load_achievements"), 0);
}

#[tokio::test]
async fn test_reset_without_http_ports_still_requeries() {
    let harness = start(|b| b);
    connect(&harness).await;

    harness.bridge.reset_achievements().unwrap();
    wait_until(|| harness.notifier.updated.lock().unwrap().len() == 1).await;
}

#[tokio::test]
async fn test_resolution_flow_through_facade() {
    let harness = start(|b| b);

    harness.bridge.connect().unwrap();
    harness
        .bridge
        .on_connection_failed(ConnectionFailure::with_resolution(
            4,
            ResolutionToken::new("sign-in"),
        ))
        .unwrap();
    harness
        .bridge
        .on_connection_failed(ConnectionFailure::without_resolution(7))
        .unwrap();
    let resolving = harness.bridge.games_snapshot().await.unwrap();
    assert!(resolving.resolving);
    assert_eq!(harness.games.count("start_resolution"), 1);
    assert_eq!(harness.games.count("show_error_surface"), 0);

    harness.bridge.on_resolution_finished(RESULT_OK).unwrap();
    let reconnecting = harness.bridge.games_snapshot().await.unwrap();
    assert!(!reconnecting.resolving);
    assert_eq!(reconnecting.state, ConnectionState::Connecting);
    assert_eq!(harness.games.count("connect"), 2);
}

#[tokio::test]
async fn test_lifecycle_calls_resume_and_disconnect() {
    let harness = start(|b| b);

    harness.bridge.on_lifecycle(LifecycleState::Foreground).unwrap();
    harness.bridge.games_snapshot().await.unwrap();
    assert_eq!(harness.games.count("connect"), 0);

    connect(&harness).await;
    harness.bridge.on_lifecycle(LifecycleState::Background).unwrap();
    let background = harness.bridge.games_snapshot().await.unwrap();
    assert_eq!(background.state, ConnectionState::Disconnected);
    assert_eq!(harness.games.count("disconnect"), 1);

    harness.bridge.on_lifecycle(LifecycleState::Foreground).unwrap();
    let foreground = harness.bridge.games_snapshot().await.unwrap();
    assert_eq!(foreground.state, ConnectionState::Connecting);
    assert_eq!(harness.games.count("connect"), 2);
}

#[tokio::test]
async fn test_lifecycle_observer_stream_is_followed() {
    let (tx, rx) = mpsc::unbounded_channel();
    let observer = Arc::new(ChannelObserver {
        receiver: Mutex::new(Some(rx)),
    });
    let harness = start(move |b| b.lifecycle_observer(observer));
    connect(&harness).await;

    tx.send(LifecycleState::Background).unwrap();
    wait_until(|| harness.games.count("disconnect") == 1).await;

    tx.send(LifecycleState::Foreground).unwrap();
    wait_until(|| harness.games.count("connect") == 2).await;

    harness.bridge.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_ad_commands_drive_surface() {
    let surface = Arc::new(RecordingSurface::default());
    let configured = surface.clone();
    let harness = start(move |b| b.ad_surface(configured));
    let mut events = harness.bridge.events().filter(|e| matches!(e, CoreEvent::Ad(_)));

    harness.bridge.show_ad("unit1", true).unwrap();
    harness.bridge.on_ad_loaded().unwrap();
    harness.bridge.hide_ad().unwrap();
    let slot = harness.bridge.ad_snapshot().await.unwrap().unwrap();

    assert!(slot.available);
    assert!(!slot.shown);
    assert_eq!(
        *surface.calls.lock().unwrap(),
        vec![
            "create:unit1:320x50".to_string(),
            "load".to_string(),
            "show:Bottom".to_string(),
            "hide".to_string(),
        ]
    );

    let first = events.recv().await.unwrap();
    assert_eq!(
        first,
        CoreEvent::Ad(AdEvent::Initialized {
            unit_id: "unit1".to_string()
        })
    );
}

#[tokio::test]
async fn test_ad_commands_without_surface_are_ignored() {
    let harness = start(|b| b);

    harness.bridge.show_ad("unit1", false).unwrap();
    harness.bridge.on_ad_loaded().unwrap();
    harness.bridge.close_ad().unwrap();

    assert!(harness.bridge.ad_snapshot().await.unwrap().is_none());
}

#[tokio::test]
async fn test_events_report_connection_transitions() {
    let harness = start(|b| b);
    let mut events = harness
        .bridge
        .events()
        .filter(|e| matches!(e, CoreEvent::Connection(_)));

    harness.bridge.connect().unwrap();
    harness.bridge.on_connected().unwrap();

    assert_eq!(
        events.recv().await.unwrap(),
        CoreEvent::Connection(ConnectionEvent::Connecting)
    );
    assert_eq!(
        events.recv().await.unwrap(),
        CoreEvent::Connection(ConnectionEvent::Connected)
    );
}

#[tokio::test]
async fn test_commands_fail_after_shutdown() {
    let surface = Arc::new(RecordingSurface::default());
    let harness = start(move |b| b.ad_surface(surface));

    harness.bridge.shutdown().await.unwrap();

    assert!(matches!(harness.bridge.connect(), Err(CoreError::BridgeStopped)));
    assert!(matches!(
        harness.bridge.show_ad("unit1", false),
        Err(CoreError::BridgeStopped)
    ));
    assert!(matches!(
        harness.bridge.games_snapshot().await,
        Err(CoreError::BridgeStopped)
    ));
}
