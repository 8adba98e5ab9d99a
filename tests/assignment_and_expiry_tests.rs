//! Integration tests for operator assignment and the auto-expiry sweeper:
//! backpressure, the conditional claim under contention, and expiry
//! discipline.

mod common;

use common::TicketFactory;
use kiosk_core::config::QueueConfig;
use kiosk_core::error::QueueError;
use kiosk_core::models::{TicketPriority, TicketStatus};
use kiosk_core::queue::{QueueEngine, QueueQuery};
use kiosk_core::store::InMemoryTicketStore;
use std::sync::Arc;
use tokio_test::assert_ok;
use uuid::Uuid;

fn engine_with_store() -> (Arc<InMemoryTicketStore>, Arc<QueueEngine>) {
    let store = Arc::new(InMemoryTicketStore::new());
    let engine = Arc::new(QueueEngine::new(store.clone(), QueueConfig::default()));
    (store, engine)
}

#[tokio::test]
async fn operator_at_limit_gets_no_ticket() {
    // Concurrency limit 2: an operator holding two called tickets gets
    // nothing even though the queue is non-empty
    let (store, engine) = engine_with_store();
    let tenant = Uuid::new_v4();
    let operator = Uuid::new_v4();

    for id in [1, 2] {
        store.insert(
            TicketFactory::new(id, tenant)
                .status(TicketStatus::Called)
                .assigned_to(operator)
                .queued_minutes_ago(10)
                .build(),
        );
    }
    store.insert(TicketFactory::new(3, tenant).queued_minutes_ago(5).build());

    let next = engine.next_ticket(tenant, operator).await.unwrap();
    assert!(next.is_none());

    // A different operator is offered the waiting ticket
    let other = engine.next_ticket(tenant, Uuid::new_v4()).await.unwrap();
    assert_eq!(other.unwrap().ticket_id, 3);
}

#[tokio::test]
async fn completed_work_frees_the_operator() {
    let (store, engine) = engine_with_store();
    let tenant = Uuid::new_v4();
    let operator = Uuid::new_v4();

    store.insert(
        TicketFactory::new(1, tenant)
            .status(TicketStatus::Completed)
            .assigned_to(operator)
            .queued_minutes_ago(60)
            .build(),
    );
    store.insert(TicketFactory::new(2, tenant).queued_minutes_ago(5).build());

    // Terminal tickets do not count against the limit
    let next = engine.next_ticket(tenant, operator).await.unwrap();
    assert_eq!(next.unwrap().ticket_id, 2);
}

#[tokio::test]
async fn escalated_ticket_is_offered_before_older_normal() {
    let (store, engine) = engine_with_store();
    let tenant = Uuid::new_v4();

    store.insert(TicketFactory::new(1, tenant).queued_minutes_ago(40).build());
    store.insert(TicketFactory::new(2, tenant).queued_minutes_ago(50).build());
    store.insert(
        TicketFactory::new(3, tenant)
            .queued_minutes_ago(10)
            .priority(TicketPriority::High)
            .build(),
    );

    // A read pass escalates ticket 2 (50 > 45) and persists it
    engine.list_queue(tenant, &QueueQuery::default()).await.unwrap();

    let first = engine.next_ticket(tenant, Uuid::new_v4()).await.unwrap().unwrap();
    // Ticket 2 is both High and older than ticket 3
    assert_eq!(first.ticket_id, 2);
    assert_eq!(first.priority, TicketPriority::High);
}

#[tokio::test]
async fn concurrent_claims_have_exactly_one_winner() {
    let (store, engine) = engine_with_store();
    let tenant = Uuid::new_v4();
    store.insert(TicketFactory::new(1, tenant).queued_minutes_ago(5).build());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = engine.clone();
        let operator = Uuid::new_v4();
        handles.push(tokio::spawn(async move {
            engine.assign_ticket(1, operator).await.unwrap()
        }));
    }

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
    assert!(store.get(1).unwrap().assigned_operator_id.is_some());
}

#[tokio::test]
async fn operator_at_limit_cannot_assign_either() {
    let (store, engine) = engine_with_store();
    let tenant = Uuid::new_v4();
    let operator = Uuid::new_v4();

    for id in [1, 2] {
        store.insert(
            TicketFactory::new(id, tenant)
                .status(TicketStatus::InProgress)
                .assigned_to(operator)
                .queued_minutes_ago(20)
                .build(),
        );
    }
    store.insert(TicketFactory::new(3, tenant).queued_minutes_ago(5).build());

    assert!(!engine.assign_ticket(3, operator).await.unwrap());
    assert_eq!(store.get(3).unwrap().assigned_operator_id, None);
}

#[tokio::test]
async fn assigning_a_missing_ticket_is_not_found() {
    let (_, engine) = engine_with_store();
    let result = engine.assign_ticket(404, Uuid::new_v4()).await;
    assert!(matches!(
        result,
        Err(QueueError::TicketNotFound { ticket_id: 404 })
    ));
}

#[tokio::test]
async fn expiry_sweeps_only_stale_queued_tickets() {
    let (store, engine) = engine_with_store();
    let tenant = Uuid::new_v4();

    // Default threshold is 120 minutes
    store.insert(TicketFactory::new(1, tenant).queued_minutes_ago(200).build());
    store.insert(TicketFactory::new(2, tenant).queued_minutes_ago(30).build());
    store.insert(
        TicketFactory::new(3, tenant)
            .status(TicketStatus::Called)
            .queued_minutes_ago(200)
            .build(),
    );

    let expired = assert_ok!(engine.expire_stale(tenant).await);
    assert_eq!(expired, 1);

    let swept = store.get(1).unwrap();
    assert_eq!(swept.status, TicketStatus::Expired);
    assert!(swept.expired_at.is_some());
    assert_eq!(swept.queue_position, None);

    assert_eq!(store.get(2).unwrap().status, TicketStatus::InQueue);
    assert_eq!(store.get(3).unwrap().status, TicketStatus::Called);
}

#[tokio::test]
async fn disabled_expiry_never_transitions() {
    let store = Arc::new(InMemoryTicketStore::new());
    let mut config = QueueConfig::default();
    config.auto_expire_enabled = false;
    let engine = QueueEngine::new(store.clone(), config);

    let tenant = Uuid::new_v4();
    store.insert(TicketFactory::new(1, tenant).queued_minutes_ago(500).build());

    assert_eq!(engine.expire_stale(tenant).await.unwrap(), 0);
    assert_eq!(store.get(1).unwrap().status, TicketStatus::InQueue);
}

#[tokio::test]
async fn expiry_is_tenant_scoped() {
    let (store, engine) = engine_with_store();
    let tenant_a = Uuid::new_v4();
    let tenant_b = Uuid::new_v4();

    store.insert(TicketFactory::new(1, tenant_a).queued_minutes_ago(300).build());
    store.insert(TicketFactory::new(2, tenant_b).queued_minutes_ago(300).build());

    assert_eq!(engine.expire_stale(tenant_a).await.unwrap(), 1);
    assert_eq!(store.get(2).unwrap().status, TicketStatus::InQueue);
}
