//! Monitor lifecycle against in-memory streams.

mod harness;

use std::sync::Arc;
use std::time::Duration;

use harness::recording_notifier::RecordingNotifier;
use tierwatch::application::Monitor;
use tierwatch::domain::{AlertEngine, TierId, TierTable};
use tierwatch::error::{Error, Result};
use tierwatch::port::NotifierRegistry;
use tierwatch::testkit::clock::ManualClock;
use tierwatch::testkit::domain::{disconnect_event, tick_event};
use tierwatch::testkit::stream::{channel_stream, ScriptedStream};

fn monitor() -> (Monitor, ManualClock, RecordingNotifier) {
    let clock = ManualClock::at_epoch();
    let recorder = RecordingNotifier::new();
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(recorder.clone()));

    let monitor = Monitor::new(
        AlertEngine::new(Arc::new(TierTable::standard())),
        Arc::new(clock.clone()),
        Arc::new(registry),
        "XPLUSDT",
    );
    (monitor, clock, recorder)
}

/// Poll until `cond` holds or two seconds pass.
async fn eventually(cond: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

/// Give the consumer task a chance to drain queued events.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

#[tokio::test]
async fn start_subscribes_lowercase_symbol_and_alerts() {
    let (mut monitor, _clock, recorder) = monitor();
    let (stream, handle) = channel_stream(16);

    monitor.start(Box::new(stream)).await.expect("start");

    assert!(monitor.is_running());
    assert_eq!(handle.connect_count(), 1);
    assert_eq!(handle.subscribed_symbols(), vec!["xplusdt".to_string()]);

    handle.send(tick_event("xplusdt", "1.05", 1)).await;
    eventually(|| recorder.len() == 1).await;

    let alerts = recorder.alerts();
    assert_eq!(alerts[0].symbol, "xplusdt");
    assert_eq!(alerts[0].tier, "level1");
    assert_eq!(alerts[0].remaining, 2);

    let stats = monitor.stop().await.expect("was running");
    assert_eq!(stats.ticks, 1);
    assert_eq!(stats.alerts, 1);
}

#[tokio::test]
async fn second_start_is_ignored() {
    let (mut monitor, _clock, _recorder) = monitor();
    let (stream, handle) = channel_stream(16);
    let (other, other_handle) = channel_stream(16);

    monitor.start(Box::new(stream)).await.expect("start");
    monitor.start(Box::new(other)).await.expect("second start is a no-op");

    assert_eq!(handle.connect_count(), 1);
    assert_eq!(other_handle.connect_count(), 0);
    assert!(other_handle.is_dropped());
    assert!(!handle.is_dropped());

    monitor.stop().await;
}

#[tokio::test]
async fn stop_without_start_is_a_no_op() {
    let (mut monitor, _clock, _recorder) = monitor();
    assert!(monitor.stop().await.is_none());
    assert!(monitor.engine().is_some());
}

#[tokio::test]
async fn stop_closes_the_stream_and_returns_the_engine() {
    let (mut monitor, _clock, _recorder) = monitor();
    let (stream, handle) = channel_stream(16);

    monitor.start(Box::new(stream)).await.expect("start");
    assert!(monitor.engine().is_none());

    monitor.stop().await.expect("was running");

    assert!(handle.is_dropped());
    assert!(!monitor.is_running());
    assert!(monitor.engine().is_some());
    assert!(monitor.stop().await.is_none());
}

#[tokio::test]
async fn connect_failure_is_startup_error() {
    let (mut monitor, _clock, recorder) = monitor();
    let stream = ScriptedStream::new()
        .with_connect_results(vec![Err(Error::Connection("refused".into()))]);

    let result: Result<()> = monitor.start(Box::new(stream)).await;

    assert!(matches!(result, Err(Error::Startup(_))));
    assert!(!monitor.is_running());
    assert!(monitor.engine().is_some());
    assert_eq!(recorder.len(), 0);
}

#[tokio::test]
async fn subscribe_failure_is_startup_error() {
    let (mut monitor, _clock, _recorder) = monitor();
    let stream = ScriptedStream::new()
        .with_subscribe_results(vec![Err(Error::Connection("not connected".into()))]);
    let (connects, subscribes) = stream.counts();

    let result = monitor.start(Box::new(stream)).await;

    assert!(matches!(result, Err(Error::Startup(_))));
    assert_eq!(connects.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(subscribes.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cooldown_follows_the_injected_clock() {
    let (mut monitor, clock, recorder) = monitor();
    let (stream, handle) = channel_stream(16);
    monitor.start(Box::new(stream)).await.expect("start");

    handle.send(tick_event("xplusdt", "1.0", 0)).await;
    eventually(|| recorder.len() == 1).await;

    clock.set_secs(3);
    handle.send(tick_event("xplusdt", "1.1", 3)).await;
    settle().await;
    assert_eq!(recorder.len(), 1);

    clock.set_secs(10);
    handle.send(tick_event("xplusdt", "1.2", 10)).await;
    eventually(|| recorder.len() == 2).await;

    let stats = monitor.stop().await.expect("was running");
    assert_eq!(stats.alerts, 2);
    assert_eq!(stats.suppressed, 1);
    assert_eq!(recorder.alerts()[1].remaining, 1);
}

#[tokio::test]
async fn invalid_and_foreign_ticks_do_not_alert() {
    let (mut monitor, _clock, recorder) = monitor();
    let (stream, handle) = channel_stream(16);
    monitor.start(Box::new(stream)).await.expect("start");

    handle.send(tick_event("xplusdt", "abc", 1)).await;
    handle.send(tick_event("xplusdt", "-1.0", 2)).await;
    handle.send(tick_event("btcusdt", "1.0", 3)).await;
    handle.send(disconnect_event("network blip")).await;
    handle.send(tick_event("xplusdt", "1.0", 4)).await;
    eventually(|| recorder.len() == 1).await;

    let stats = monitor.stop().await.expect("was running");
    assert_eq!(stats.rejected, 2);
    assert_eq!(stats.ignored, 1);
    assert_eq!(stats.ticks, 1);
}

#[tokio::test]
async fn budgets_survive_restart() {
    let (mut monitor, clock, recorder) = monitor();

    let (stream, handle) = channel_stream(16);
    monitor.start(Box::new(stream)).await.expect("start");
    handle.send(tick_event("xplusdt", "1.0", 0)).await;
    eventually(|| recorder.len() == 1).await;
    monitor.stop().await.expect("was running");

    let remaining = monitor.engine().map(|e| e.state().remaining(TierId(0)));
    assert_eq!(remaining, Some(2));

    clock.set_secs(60);
    let (stream, handle) = channel_stream(16);
    monitor.start(Box::new(stream)).await.expect("restart");
    handle.send(tick_event("xplusdt", "1.0", 60)).await;
    eventually(|| recorder.len() == 2).await;

    assert_eq!(recorder.alerts()[1].remaining, 1);
    monitor.stop().await;
}

#[tokio::test]
async fn ended_stream_allows_a_fresh_start() {
    let (mut monitor, _clock, _recorder) = monitor();
    let (stream, handle) = channel_stream(16);
    monitor.start(Box::new(stream)).await.expect("start");

    handle.close().await;
    eventually(|| handle.is_dropped()).await;
    eventually(|| !monitor.is_running()).await;

    let (stream, second) = channel_stream(16);
    monitor.start(Box::new(stream)).await.expect("restart");
    assert_eq!(second.connect_count(), 1);
    assert!(monitor.is_running());
    monitor.stop().await;
}

#[tokio::test]
async fn stop_after_stream_ended_returns_none_and_keeps_state() {
    let (mut monitor, _clock, recorder) = monitor();
    let (stream, handle) = channel_stream(16);
    monitor.start(Box::new(stream)).await.expect("start");

    handle.send(tick_event("xplusdt", "1.0", 0)).await;
    eventually(|| recorder.len() == 1).await;
    handle.close().await;
    eventually(|| !monitor.is_running()).await;

    assert!(monitor.stop().await.is_none());
    let remaining = monitor.engine().map(|e| e.state().remaining(TierId(0)));
    assert_eq!(remaining, Some(2));
    assert!(monitor.stop().await.is_none());
}
