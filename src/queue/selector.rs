//! # Queue Selector
//!
//! Loads a tenant's active ticket snapshot, brings every ticket's priority
//! up to date, and orders the snapshot under the requested sort policy.
//!
//! Priority recomputation persists deltas ticket by ticket. A persistence
//! failure on one ticket is logged and skipped; the remaining tickets in
//! the pass are unaffected.

use crate::config::QueueConfig;
use crate::constants::{events, status_groups};
use crate::error::Result;
use crate::models::ticket::{Ticket, TicketStatus};
use crate::queue::priority::compute_priority;
use crate::queue::types::{QueueQuery, SortOrder};
use crate::store::{QueueFilter, TicketStore};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Snapshot loader and orderer for the queue read path
pub struct QueueSelector {
    store: Arc<dyn TicketStore>,
    config: QueueConfig,
}

impl QueueSelector {
    pub fn new(store: Arc<dyn TicketStore>, config: QueueConfig) -> Self {
        Self { store, config }
    }

    /// Load, recompute, and order a tenant's snapshot.
    ///
    /// An unknown tenant yields an empty list, not an error.
    #[instrument(skip(self, query), fields(sort_order = %query.sort_order))]
    pub async fn load_queue(&self, tenant_id: Uuid, query: &QueueQuery) -> Result<Vec<Ticket>> {
        let mut statuses: Vec<TicketStatus> = status_groups::WAITING_TICKET_STATUSES.to_vec();
        if query.include_called {
            statuses.push(TicketStatus::Called);
        }
        if query.include_in_progress {
            statuses.push(TicketStatus::InProgress);
        }
        if query.include_paid {
            statuses.push(TicketStatus::Paid);
        }

        let filter = QueueFilter {
            statuses,
            service_id: query.service_id,
            // Priority is filtered after recomputation so that tickets
            // escalating in this very pass are matched by it.
            priority: None,
        };

        let mut tickets = self.store.active_tickets(tenant_id, &filter).await?;
        self.recompute_priorities(tenant_id, &mut tickets).await;

        if let Some(priority) = query.priority {
            tickets.retain(|t| t.priority == priority);
        }

        sort_snapshot(&mut tickets, query.sort_order);
        debug!(
            tenant_id = %tenant_id,
            count = tickets.len(),
            "Ordered queue snapshot"
        );
        Ok(tickets)
    }

    /// Apply the escalation rule to every loaded ticket and persist deltas.
    async fn recompute_priorities(&self, tenant_id: Uuid, tickets: &mut [Ticket]) {
        let now = Utc::now();
        for ticket in tickets.iter_mut() {
            let recomputed = compute_priority(
                ticket.status,
                ticket.priority,
                ticket.waiting_minutes(now),
                self.config.critical_waiting_minutes,
            );
            if recomputed == ticket.priority {
                continue;
            }

            debug!(
                event = events::TICKET_PRIORITY_ESCALATED,
                tenant_id = %tenant_id,
                ticket_id = ticket.ticket_id,
                from = %ticket.priority,
                to = %recomputed,
                "Ticket priority escalated"
            );
            // The pass continues with the recomputed value even when the
            // write fails; the next pass will retry the persist.
            ticket.priority = recomputed;
            if let Err(e) = self.store.save_priority(ticket.ticket_id, recomputed).await {
                warn!(
                    ticket_id = ticket.ticket_id,
                    "Failed to persist recomputed priority, skipping: {e}"
                );
            }
        }
    }
}

/// Order a snapshot in place under a sort policy.
///
/// Every policy has a total, deterministic order: ties fall through to
/// `queued_at` and finally ticket creation order.
pub fn sort_snapshot(tickets: &mut [Ticket], sort_order: SortOrder) {
    match sort_order {
        SortOrder::Fifo | SortOrder::WaitingTime => {
            tickets.sort_by(|a, b| {
                a.queued_at
                    .cmp(&b.queued_at)
                    .then(a.ticket_id.cmp(&b.ticket_id))
            });
        }
        SortOrder::Priority => {
            tickets.sort_by(|a, b| {
                a.priority
                    .rank()
                    .cmp(&b.priority.rank())
                    .then(a.queued_at.cmp(&b.queued_at))
                    .then(a.ticket_id.cmp(&b.ticket_id))
            });
        }
        SortOrder::Service => {
            tickets.sort_by(|a, b| {
                a.effective_service_name()
                    .cmp(b.effective_service_name())
                    .then(a.queued_at.cmp(&b.queued_at))
                    .then(a.ticket_id.cmp(&b.ticket_id))
            });
        }
    }
}
