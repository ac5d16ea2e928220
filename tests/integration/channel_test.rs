//! Integration tests for the realtime channel lifecycle.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use claimdesk_core::config::AppConfig;
use claimdesk_realtime::{
    ChannelState, Identity, RealtimeChannel, RealtimeMetrics, ReconnectPolicy, ServerEvent,
};

use helpers::{ScriptedConnector, TestApp, settle};

#[tokio::test(start_paused = true)]
async fn test_reconnects_stop_at_max_retries() {
    let connector = ScriptedConnector::new();
    let metrics = Arc::new(RealtimeMetrics::new());
    let (tx, _rx) = mpsc::channel(16);

    let policy = ReconnectPolicy {
        base: Duration::from_secs(1),
        cap: Duration::from_secs(30),
        max_retries: 5,
    };
    let guard = RealtimeChannel::new(
        connector.clone(),
        "ws://localhost:5000/ws",
        policy,
        metrics.clone(),
    )
    .spawn(tx);

    let mut state = guard.watch_state();
    state.wait_for(|s| *s == ChannelState::GaveUp).await.unwrap();

    // first connect plus five reconnects, nothing afterwards
    assert_eq!(connector.attempts(), 6);
    tokio::time::sleep(Duration::from_secs(3600)).await;
    assert_eq!(connector.attempts(), 6);
    assert_eq!(guard.state(), ChannelState::GaveUp);
    assert_eq!(metrics.snapshot().reconnects, 5);

    let gaps: Vec<u64> = connector.gaps().iter().map(|d| d.as_secs()).collect();
    assert_eq!(gaps, vec![1, 2, 4, 8, 16]);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_delay_is_capped() {
    let connector = ScriptedConnector::new();
    let (tx, _rx) = mpsc::channel(16);

    let policy = ReconnectPolicy {
        base: Duration::from_secs(1),
        cap: Duration::from_secs(5),
        max_retries: 5,
    };
    let guard = RealtimeChannel::new(
        connector.clone(),
        "ws://test/ws",
        policy,
        Arc::new(RealtimeMetrics::new()),
    )
    .spawn(tx);
    guard
        .watch_state()
        .wait_for(|s| s.is_final())
        .await
        .unwrap();

    let gaps: Vec<u64> = connector.gaps().iter().map(|d| d.as_secs()).collect();
    assert_eq!(gaps, vec![1, 2, 4, 5, 5]);
}

#[tokio::test(start_paused = true)]
async fn test_events_flow_and_close_triggers_reconnect() {
    let connector = ScriptedConnector::new();
    let server = connector.accept();
    let second = connector.accept();
    let (tx, mut rx) = mpsc::channel(16);

    let guard = RealtimeChannel::new(
        connector.clone(),
        "ws://test/ws",
        ReconnectPolicy::default(),
        Arc::new(RealtimeMetrics::new()),
    )
    .spawn(tx);

    server.send(r#"{"type":"TICKETS_UPDATE"}"#);
    assert_eq!(rx.recv().await, Some(ServerEvent::TicketsUpdate));
    assert_eq!(guard.state(), ChannelState::Open);

    drop(server);
    second.send(r#"{"type":"TASK_UPDATE","ticketId":"t1"}"#);
    assert!(matches!(rx.recv().await, Some(ServerEvent::TaskUpdate { .. })));
    assert_eq!(connector.attempts(), 2);
    assert_eq!(connector.gaps(), vec![Duration::from_secs(1)]);
}

#[tokio::test(start_paused = true)]
async fn test_no_identity_means_no_connection() {
    let app = TestApp::new();
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert_eq!(app.connector.attempts(), 0);
    assert!(app.engine.channel_state().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_login_connects_and_authenticates() {
    let app = TestApp::new();
    let _server = app.connector.accept();

    app.login("u1").await;

    assert_eq!(app.engine.channel_state().await, Some(ChannelState::Open));
    assert_eq!(app.connector.urls(), vec!["ws://localhost:5000/ws".to_string()]);
    assert_eq!(
        app.connector.sent(),
        vec![r#"{"type":"auth","userId":"u1"}"#.to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn test_auth_frame_can_be_disabled() {
    let mut config = AppConfig::default();
    config.realtime.send_auth_frame = false;
    let app = TestApp::with_config(config);
    let _server = app.connector.accept();

    app.login("u1").await;

    assert_eq!(app.engine.channel_state().await, Some(ChannelState::Open));
    assert!(app.connector.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_logout_cancels_pending_reconnect() {
    let app = TestApp::new();
    app.login("u1").await;

    // first connect refused, a reconnect is pending
    assert_eq!(app.connector.attempts(), 1);
    let mut state = app.engine.watch_channel().await.unwrap();

    app.engine.set_identity(None).await.unwrap();
    assert_eq!(*state.borrow_and_update(), ChannelState::Closed);

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(app.connector.attempts(), 1);
    assert!(app.center.current_user().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_identity_change_reconnects_as_new_user() {
    let app = TestApp::new();
    let _first = app.connector.accept();
    let _second = app.connector.accept();

    app.login("alice").await;
    app.engine
        .set_identity(Some(Identity::new("alice")))
        .await
        .unwrap();
    assert_eq!(app.connector.attempts(), 1);

    app.login("bob").await;
    settle().await;

    assert_eq!(app.connector.attempts(), 2);
    assert_eq!(
        app.connector.sent(),
        vec![
            r#"{"type":"auth","userId":"alice"}"#.to_string(),
            r#"{"type":"auth","userId":"bob"}"#.to_string(),
        ]
    );
    assert_eq!(app.center.current_user().unwrap().as_str(), "bob");
}

#[tokio::test(start_paused = true)]
async fn test_reopen_after_drop_resynchronises() {
    let app = TestApp::new();
    let first = app.connector.accept();
    let _second = app.connector.accept();
    app.login("u1").await;
    let reads = app.api.read_count();

    // ticket list appears while the socket is down
    app.api.upsert_ticket(helpers::ticket("t1", "u1"));
    drop(first);
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(app.connector.attempts(), 2);
    assert!(app.api.read_count() > reads);
    assert_eq!(app.center.tracked_tickets().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_frames_are_counted_and_skipped() {
    let app = TestApp::new();
    let server = app.connector.accept();
    app.login("u1").await;

    server.send("not json");
    server.send(r#"{"type":"notification"}"#);
    server.send(r#"{"type":"notification","message":"Payment received","notificationType":"success"}"#);
    settle().await;

    let snapshot = app.engine.metrics().snapshot();
    assert_eq!(snapshot.messages_received, 3);
    assert_eq!(snapshot.malformed_messages, 2);
    assert_eq!(app.engine.channel_state().await, Some(ChannelState::Open));
    assert_eq!(app.center.toasts().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_same_user_login_after_give_up_starts_over() {
    let mut config = AppConfig::default();
    config.realtime.max_retries = 2;
    let app = TestApp::with_config(config);
    app.login("u1").await;

    let mut state = app.engine.watch_channel().await.unwrap();
    state.wait_for(|s| *s == ChannelState::GaveUp).await.unwrap();
    assert_eq!(app.connector.attempts(), 3);

    let _server = app.connector.accept();
    app.login("u1").await;

    assert_eq!(app.connector.attempts(), 4);
    assert_eq!(app.engine.channel_state().await, Some(ChannelState::Open));
    assert_eq!(app.center.current_user().unwrap().as_str(), "u1");
}
