//! Integration tests for ticket and task status transitions.

mod helpers;

use std::sync::Arc;

use claimdesk_client::{InMemoryTicketApi, LifecycleService};
use claimdesk_core::config::{AppConfig, TransitionPolicy};
use claimdesk_core::types::{TaskId, TicketId, UserId};
use claimdesk_entity::{TaskDraft, TaskStatus, TicketStatus};

use helpers::{TestApp, settle, ticket};

fn service(policy: TransitionPolicy) -> (Arc<InMemoryTicketApi>, LifecycleService) {
    let api = Arc::new(InMemoryTicketApi::new());
    api.upsert_ticket(ticket("t1", "owner"));
    let service = LifecycleService::new(api.clone(), policy);
    (api, service)
}

#[tokio::test]
async fn test_ticket_walks_its_lifecycle_once() {
    let (api, service) = service(TransitionPolicy::Strict);
    let id = TicketId::new("t1");

    for target in ["processing", "processing", "completed", "completed"] {
        service.transition_ticket(&id, target).await.unwrap();
    }

    let err = service.transition_ticket(&id, "new").await.unwrap_err();
    assert!(err.is_validation());
    assert!(err.message.contains("terminal"));
    assert_eq!(api.write_count(), 2);
}

#[tokio::test]
async fn test_out_of_domain_targets_are_rejected_before_any_call() {
    let (api, service) = service(TransitionPolicy::Lenient);

    for raw in ["closed", "", "Processing", "in progress"] {
        let err = service
            .transition_ticket(&TicketId::new("t1"), raw)
            .await
            .unwrap_err();
        assert!(err.is_validation(), "{raw:?} should be rejected");
    }
    let err = service
        .transition_task(&TaskId::new("missing"), "done")
        .await
        .unwrap_err();
    assert!(err.is_validation());

    assert_eq!(api.read_count(), 0);
    assert_eq!(api.write_count(), 0);
}

#[tokio::test]
async fn test_unknown_entity_is_not_found() {
    let (_api, service) = service(TransitionPolicy::Strict);

    let err = service
        .transition_task(&TaskId::new("missing"), "completed")
        .await
        .unwrap_err();
    assert!(!err.is_validation());
    assert_eq!(err.kind, claimdesk_core::error::ErrorKind::NotFound);
}

#[tokio::test]
async fn test_policy_follows_configuration() {
    let mut config = AppConfig::default();
    assert_eq!(config.api.transition_policy, TransitionPolicy::Strict);
    config.api.transition_policy = TransitionPolicy::Lenient;

    let (_api, service) = service(config.api.transition_policy);
    let id = TicketId::new("t1");
    service.transition_ticket(&id, "rejected").await.unwrap();
    let reopened = service.transition_ticket(&id, "new").await.unwrap();
    assert_eq!(reopened.status, TicketStatus::New);
}

#[tokio::test]
async fn test_task_drafts_are_checked_and_assigned() {
    let (api, service) = service(TransitionPolicy::Strict);
    let ticket_id = TicketId::new("t1");

    let err = service
        .create_task(&ticket_id, TaskDraft::new(""))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(api.read_count(), 0);

    let own = service
        .create_task(&ticket_id, TaskDraft::new("Upload photos"))
        .await
        .unwrap();
    assert_eq!(own.assignee_id, Some(UserId::new("owner")));

    let delegated = service
        .create_task(
            &ticket_id,
            TaskDraft::new("Assess damage").assign_to(UserId::new("adjuster")),
        )
        .await
        .unwrap();
    assert_eq!(delegated.assignee_id, Some(UserId::new("adjuster")));
    assert_eq!(delegated.status, TaskStatus::Pending);
}

#[tokio::test(start_paused = true)]
async fn test_created_task_reaches_the_owner_as_a_popup() {
    let app = TestApp::new();
    let server = app.connector.accept();
    app.api.upsert_ticket(ticket("t1", "u1"));
    app.login("u1").await;
    assert!(app.center.showing().is_none());

    let staff = LifecycleService::new(app.api.clone(), TransitionPolicy::Strict);
    let task = staff
        .create_task(&TicketId::new("t1"), TaskDraft::new("Sign the claim form"))
        .await
        .unwrap();
    server.send(&format!(
        r#"{{"type":"TASK_UPDATE","taskId":"{}","ticketId":"t1"}}"#,
        task.id
    ));
    settle().await;

    assert_eq!(app.center.showing().unwrap().id, task.id);

    // completing it later refreshes the cached snapshot
    staff.transition_task(&task.id, "completed").await.unwrap();
    server.send(&format!(
        r#"{{"type":"TASK_UPDATE","taskId":"{}","ticketId":"t1"}}"#,
        task.id
    ));
    settle().await;

    let cached = app
        .center
        .unseen_tasks()
        .into_iter()
        .find(|t| t.id == task.id)
        .unwrap();
    assert_eq!(cached.status, TaskStatus::Completed);
}
