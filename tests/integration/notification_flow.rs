//! Integration tests for unseen-task reconciliation and popup presentation.

mod helpers;

use std::time::Duration;

use chrono::Utc;

use claimdesk_core::types::{TaskId, TicketId};
use claimdesk_entity::TaskStatus;
use claimdesk_realtime::{CloseReason, Invalidation, UiEvent};

use helpers::{TestApp, drain, settle, shown, task, ticket};

#[tokio::test(start_paused = true)]
async fn test_no_tickets_means_no_popup() {
    let app = TestApp::new();
    let mut events = app.center.subscribe();

    app.login("u1").await;
    tokio::time::sleep(Duration::from_secs(600)).await;

    assert_eq!(app.center.unseen_count(), 0);
    assert!(!app.center.has_unseen());
    assert!(shown(&drain(&mut events)).is_empty());
    // idle poller: only the first ticket list request
    assert_eq!(app.api.read_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_single_unseen_task_pops_up_then_expires_as_seen() {
    let app = TestApp::new();
    app.api.upsert_ticket(ticket("t1", "u1"));
    app.api.upsert_task(task("a", "t1", Utc::now(), TaskStatus::Pending));
    let mut events = app.center.subscribe();

    app.login("u1").await;
    assert_eq!(app.center.showing().unwrap().id, TaskId::new("a"));
    assert_eq!(app.center.unseen_count(), 1);

    tokio::time::sleep(Duration::from_secs(19)).await;
    assert!(app.center.showing().is_some());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(app.center.showing().is_none());
    assert!(app.center.is_seen(&TaskId::new("a")));
    assert_eq!(app.persisted_seen("u1"), vec!["a".to_string()]);
    assert_eq!(app.center.unseen_count(), 0);

    let events = drain(&mut events);
    assert!(events.contains(&UiEvent::PopupClosed {
        task_id: TaskId::new("a"),
        reason: CloseReason::Expired,
    }));
}

#[tokio::test(start_paused = true)]
async fn test_newest_task_is_selected_for_popup() {
    let app = TestApp::new();
    let t0 = Utc::now();
    let t1 = t0 + chrono::Duration::minutes(10);
    app.api.upsert_ticket(ticket("t1", "u1"));
    app.api.upsert_task(task("A", "t1", t0, TaskStatus::Pending));
    app.api.upsert_task(task("B", "t1", t1, TaskStatus::InProgress));

    app.login("u1").await;

    assert_eq!(app.center.showing().unwrap().id, TaskId::new("B"));
    let unseen: Vec<TaskId> = app.center.unseen_tasks().into_iter().map(|t| t.id).collect();
    assert_eq!(unseen, vec![TaskId::new("B"), TaskId::new("A")]);
}

#[tokio::test(start_paused = true)]
async fn test_push_notification_invalidates_owning_ticket_and_queues_toast() {
    let app = TestApp::new();
    let server = app.connector.accept();
    app.api.upsert_ticket(ticket("T1", "u1"));
    app.api.upsert_task(task("X", "T1", Utc::now(), TaskStatus::Pending));
    app.login("u1").await;
    let mut events = app.center.subscribe();

    // staff adds a task; the push arrives while the channel is open
    app.api.upsert_task(task("Y", "T1", Utc::now(), TaskStatus::Pending));
    server.send(r#"{"type":"notification","message":"Task updated","taskId":"X"}"#);
    settle().await;

    let events = drain(&mut events);
    assert!(events.contains(&UiEvent::Invalidated(Invalidation::TicketTasks(TicketId::new("T1")))));
    let toasts = app.center.toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].message, "Task updated");
    assert_eq!(toasts[0].task_id, Some(TaskId::new("X")));

    // the refetch picked up the new task
    assert_eq!(app.center.ticket_of(&TaskId::new("Y")), Some(TicketId::new("T1")));
}

#[tokio::test(start_paused = true)]
async fn test_manual_dismiss_marks_seen_and_cancels_timer() {
    let app = TestApp::new();
    app.api.upsert_ticket(ticket("t1", "u1"));
    app.api.upsert_task(task("a", "t1", Utc::now(), TaskStatus::Pending));
    let mut events = app.center.subscribe();
    app.login("u1").await;

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(app.center.dismiss().unwrap(), Some(TaskId::new("a")));
    assert!(app.center.showing().is_none());
    assert!(app.center.is_seen(&TaskId::new("a")));

    tokio::time::sleep(Duration::from_secs(60)).await;

    let closes: Vec<CloseReason> = drain(&mut events)
        .into_iter()
        .filter_map(|e| match e {
            UiEvent::PopupClosed { reason, .. } => Some(reason),
            _ => None,
        })
        .collect();
    assert_eq!(closes, vec![CloseReason::Dismissed]);
    assert_eq!(app.persisted_seen("u1"), vec!["a".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_view_returns_task_and_marks_seen() {
    let app = TestApp::new();
    app.api.upsert_ticket(ticket("t1", "u1"));
    app.api.upsert_task(task("a", "t1", Utc::now(), TaskStatus::Pending));
    app.login("u1").await;

    let viewed = app.center.view().unwrap().unwrap();
    assert_eq!(viewed.id, TaskId::new("a"));
    assert!(app.center.is_seen(&TaskId::new("a")));
    assert_eq!(app.center.view().unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn test_seen_task_never_reappears_until_cleared() {
    let app = TestApp::new();
    app.api.upsert_ticket(ticket("t1", "u1"));
    app.api.upsert_task(task("a", "t1", Utc::now(), TaskStatus::Pending));
    app.login("u1").await;
    app.center.mark_seen(&TaskId::new("a")).unwrap();

    // further updates via poll and push
    let mut changed = task("a", "t1", Utc::now(), TaskStatus::InProgress);
    changed.updated_at = Some(Utc::now());
    app.api.upsert_task(changed);
    app.engine.invalidations().publish(Invalidation::TicketList);
    settle().await;
    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(app.center.unseen_count(), 0);

    // a new login reloads the record from durable storage
    app.engine.set_identity(None).await.unwrap();
    app.login("u1").await;
    assert!(app.center.is_seen(&TaskId::new("a")));
    assert_eq!(app.center.unseen_count(), 0);

    app.center.clear_seen().unwrap();
    assert_eq!(app.center.unseen_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_at_most_one_popup_and_session_suppression() {
    let app = TestApp::new();
    app.api.upsert_ticket(ticket("t1", "u1"));
    app.api.upsert_task(task("a", "t1", Utc::now(), TaskStatus::Pending));
    app.api.upsert_task(task("b", "t1", Utc::now(), TaskStatus::Pending));
    let mut events = app.center.subscribe();
    app.login("u1").await;

    // more tasks arrive while a popup is up
    app.api.upsert_task(task("c", "t1", Utc::now(), TaskStatus::Pending));
    app.engine.invalidations().publish(Invalidation::TicketTasks(TicketId::new("t1")));
    settle().await;
    assert_eq!(shown(&drain(&mut events)).len(), 1);
    assert_eq!(app.center.unseen_count(), 3);

    app.center.dismiss().unwrap();
    assert_eq!(app.center.unseen_count(), 2);

    // still the same session: badge grows, no second popup
    app.api.upsert_task(task("d", "t1", Utc::now(), TaskStatus::Pending));
    tokio::time::sleep(Duration::from_secs(121)).await;
    let later = drain(&mut events);
    assert!(shown(&later).is_empty());
    assert!(later.contains(&UiEvent::UnseenCountChanged { count: 3 }));
    assert!(app.center.showing().is_none());

    // a new login session may show one popup again
    app.engine.set_identity(None).await.unwrap();
    app.login("u1").await;
    assert!(app.center.showing().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_failed_poll_reports_load_failure() {
    let app = TestApp::new();
    app.api.upsert_ticket(ticket("t1", "u1"));
    app.api.set_offline(true);
    let mut events = app.center.subscribe();

    app.login("u1").await;

    let events = drain(&mut events);
    assert!(events.iter().any(|e| matches!(e, UiEvent::LoadFailed { .. })));
    assert_eq!(app.center.unseen_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_seen_records_are_kept_per_account() {
    let app = TestApp::new();
    app.api.upsert_ticket(ticket("t1", "alice"));
    app.api.upsert_task(task("a", "t1", Utc::now(), TaskStatus::Pending));

    app.login("alice").await;
    app.center.dismiss().unwrap();

    app.login("bob").await;
    assert!(!app.center.is_seen(&TaskId::new("a")));
    assert_eq!(app.persisted_seen("alice"), vec!["a".to_string()]);
    assert!(app.persisted_seen("bob").is_empty());
}
