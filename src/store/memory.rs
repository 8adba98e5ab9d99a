//! # In-Memory Ticket Store
//!
//! A lock-protected `TicketStore` with the same contract as the Postgres
//! store, including the conditional claim. Used by the test suite and by
//! embedded deployments that do not persist tickets.

use crate::error::Result;
use crate::models::ticket::{Ticket, TicketPriority, TicketStatus};
use crate::store::{QueueFilter, TicketStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory ticket store
#[derive(Debug, Default)]
pub struct InMemoryTicketStore {
    tickets: RwLock<HashMap<i64, Ticket>>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a ticket (test setup; the engine itself never
    /// creates tickets)
    pub fn insert(&self, ticket: Ticket) {
        self.tickets.write().insert(ticket.ticket_id, ticket);
    }

    /// Snapshot a single ticket for assertions
    pub fn get(&self, ticket_id: i64) -> Option<Ticket> {
        self.tickets.read().get(&ticket_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.tickets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.read().is_empty()
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn active_tickets(&self, tenant_id: Uuid, filter: &QueueFilter) -> Result<Vec<Ticket>> {
        let tickets = self.tickets.read();
        let mut matching: Vec<Ticket> = tickets
            .values()
            .filter(|t| t.tenant_id == tenant_id && filter.matches(t))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            a.queued_at
                .cmp(&b.queued_at)
                .then(a.ticket_id.cmp(&b.ticket_id))
        });
        Ok(matching)
    }

    async fn find_ticket(&self, ticket_id: i64) -> Result<Option<Ticket>> {
        Ok(self.tickets.read().get(&ticket_id).cloned())
    }

    async fn save_priority(&self, ticket_id: i64, priority: TicketPriority) -> Result<()> {
        if let Some(ticket) = self.tickets.write().get_mut(&ticket_id) {
            ticket.priority = priority;
        }
        Ok(())
    }

    async fn save_queue_slot(
        &self,
        ticket_id: i64,
        position: Option<i32>,
        estimated_wait_minutes: Option<i32>,
    ) -> Result<()> {
        if let Some(ticket) = self.tickets.write().get_mut(&ticket_id) {
            ticket.queue_position = position;
            ticket.estimated_wait_minutes = estimated_wait_minutes;
        }
        Ok(())
    }

    async fn claim_ticket(&self, ticket_id: i64, operator_id: Uuid) -> Result<bool> {
        let mut tickets = self.tickets.write();
        match tickets.get_mut(&ticket_id) {
            Some(ticket) if ticket.assigned_operator_id.is_none() => {
                ticket.assigned_operator_id = Some(operator_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn operator_active_count(&self, tenant_id: Uuid, operator_id: Uuid) -> Result<i64> {
        let count = self
            .tickets
            .read()
            .values()
            .filter(|t| {
                t.tenant_id == tenant_id
                    && t.assigned_operator_id == Some(operator_id)
                    && crate::constants::status_groups::OPERATOR_ACTIVE_STATUSES
                        .contains(&t.status)
            })
            .count();
        Ok(count as i64)
    }

    async fn expire_queued_before(&self, tenant_id: Uuid, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut tickets = self.tickets.write();
        let now = Utc::now();
        let mut expired = 0u64;
        for ticket in tickets.values_mut() {
            if ticket.tenant_id == tenant_id
                && ticket.status == TicketStatus::InQueue
                && ticket.queued_at < cutoff
            {
                ticket.status = TicketStatus::Expired;
                ticket.expired_at = Some(now);
                ticket.queue_position = None;
                ticket.estimated_wait_minutes = None;
                expired += 1;
            }
        }
        Ok(expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ticket(id: i64, tenant_id: Uuid, queued_at: DateTime<Utc>) -> Ticket {
        Ticket {
            ticket_id: id,
            tenant_id,
            ticket_number: format!("A-{id:03}"),
            status: TicketStatus::InQueue,
            priority: TicketPriority::Normal,
            queue_position: None,
            estimated_wait_minutes: None,
            assigned_operator_id: None,
            queued_at,
            called_at: None,
            started_at: None,
            completed_at: None,
            cancelled_at: None,
            expired_at: None,
            print_attempts: 0,
            reactivation_count: 0,
            services: vec![],
            created_at: queued_at,
        }
    }

    #[tokio::test]
    async fn test_snapshot_is_tenant_scoped_and_ordered() {
        let store = InMemoryTicketStore::new();
        let tenant = Uuid::new_v4();
        let other = Uuid::new_v4();
        let now = Utc::now();

        store.insert(ticket(2, tenant, now));
        store.insert(ticket(1, tenant, now - Duration::minutes(5)));
        store.insert(ticket(3, other, now - Duration::minutes(10)));

        let snapshot = store
            .active_tickets(tenant, &QueueFilter::default())
            .await
            .unwrap();
        let ids: Vec<i64> = snapshot.iter().map(|t| t.ticket_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_claim_is_first_writer_wins() {
        let store = InMemoryTicketStore::new();
        let tenant = Uuid::new_v4();
        store.insert(ticket(7, tenant, Utc::now()));

        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        assert!(store.claim_ticket(7, first).await.unwrap());
        assert!(!store.claim_ticket(7, second).await.unwrap());
        assert_eq!(store.get(7).unwrap().assigned_operator_id, Some(first));
    }

    #[tokio::test]
    async fn test_expiry_ignores_other_statuses() {
        let store = InMemoryTicketStore::new();
        let tenant = Uuid::new_v4();
        let old = Utc::now() - Duration::minutes(300);

        store.insert(ticket(1, tenant, old));
        let mut called = ticket(2, tenant, old);
        called.status = TicketStatus::Called;
        store.insert(called);

        let expired = store
            .expire_queued_before(tenant, Utc::now() - Duration::minutes(120))
            .await
            .unwrap();
        assert_eq!(expired, 1);
        assert_eq!(store.get(1).unwrap().status, TicketStatus::Expired);
        assert!(store.get(1).unwrap().expired_at.is_some());
        assert_eq!(store.get(2).unwrap().status, TicketStatus::Called);
    }
}
