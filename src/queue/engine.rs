//! # Queue Engine
//!
//! Facade wiring the selector, estimator, health monitor, allocator, and
//! sweeper into the five operations the transport layer consumes. One
//! engine is constructed per service instance with an injected ticket
//! store; it holds no queue state of its own.
//!
//! ## Concurrency
//!
//! A queue read recomputes and persists priorities, positions, and ETAs.
//! Two concurrent passes over the same tenant would race on those rows, so
//! recompute-and-persist is serialized per tenant through a lock registry.
//! Reads for different tenants proceed independently. Assignment does not
//! take the tenant lock; it relies on the store's conditional claim.

use crate::config::QueueConfig;
use crate::constants::events;
use crate::error::Result;
use crate::models::ticket::{Ticket, TicketStatus};
use crate::queue::allocator::OperatorAllocator;
use crate::queue::estimator::WaitEstimator;
use crate::queue::expiry::ExpirySweeper;
use crate::queue::health::{QueueHealthMonitor, QueueStatistics};
use crate::queue::selector::QueueSelector;
use crate::queue::types::{QueueListing, QueueQuery};
use crate::store::{QueueFilter, TicketStore};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Queue prioritization and assignment engine for one ticket store
pub struct QueueEngine {
    store: Arc<dyn TicketStore>,
    selector: QueueSelector,
    estimator: WaitEstimator,
    monitor: QueueHealthMonitor,
    allocator: OperatorAllocator,
    sweeper: ExpirySweeper,
    recompute_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl QueueEngine {
    pub fn new(store: Arc<dyn TicketStore>, config: QueueConfig) -> Self {
        Self {
            selector: QueueSelector::new(store.clone(), config.clone()),
            estimator: WaitEstimator::new(config.clone()),
            monitor: QueueHealthMonitor::new(config.clone()),
            allocator: OperatorAllocator::new(store.clone(), config.clone()),
            sweeper: ExpirySweeper::new(store.clone(), config),
            store,
            recompute_locks: DashMap::new(),
        }
    }

    /// List a tenant's queue under a sort policy, with breakdowns and an
    /// aggregate wait estimate.
    #[instrument(skip(self, query))]
    pub async fn list_queue(&self, tenant_id: Uuid, query: &QueueQuery) -> Result<QueueListing> {
        let tickets = self.read_pass(tenant_id, query).await?;
        let stats = self.monitor.build(&tickets, Utc::now());

        Ok(QueueListing {
            total: tickets.len(),
            by_status: stats.by_status,
            by_priority: stats.by_priority,
            by_service: stats.by_service,
            queue_stats: stats.waiting,
            estimated_total_time: stats.waiting.estimated_total_minutes,
            tickets,
        })
    }

    /// Aggregate queue health for a tenant's full active snapshot
    #[instrument(skip(self))]
    pub async fn statistics(&self, tenant_id: Uuid) -> Result<QueueStatistics> {
        let tickets = self.read_pass(tenant_id, &QueueQuery::default()).await?;
        Ok(self.monitor.build(&tickets, Utc::now()))
    }

    /// Next eligible ticket for an operator, or `None` under backpressure
    pub async fn next_ticket(
        &self,
        tenant_id: Uuid,
        operator_id: Uuid,
    ) -> Result<Option<Ticket>> {
        self.allocator.next_ticket(tenant_id, operator_id).await
    }

    /// Conditionally assign a ticket to an operator
    pub async fn assign_ticket(&self, ticket_id: i64, operator_id: Uuid) -> Result<bool> {
        self.allocator.assign(ticket_id, operator_id).await
    }

    /// Expire stale queued tickets for a tenant
    pub async fn expire_stale(&self, tenant_id: Uuid) -> Result<u64> {
        self.sweeper.expire_stale(tenant_id).await
    }

    /// One serialized recompute pass: load + prioritize + order + annotate
    /// + persist deltas.
    async fn read_pass(&self, tenant_id: Uuid, query: &QueueQuery) -> Result<Vec<Ticket>> {
        let lock = self
            .recompute_locks
            .entry(tenant_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        let mut tickets = self.selector.load_queue(tenant_id, query).await?;

        let in_progress: Vec<Ticket> = if query.include_in_progress {
            tickets
                .iter()
                .filter(|t| t.status == TicketStatus::InProgress)
                .cloned()
                .collect()
        } else {
            // The listing excludes them, but the ETA bump still needs to
            // know which stations are busy.
            self.store
                .active_tickets(
                    tenant_id,
                    &QueueFilter::with_statuses(&[TicketStatus::InProgress]),
                )
                .await?
        };

        let prior: Vec<(i64, Option<i32>, Option<i32>)> = tickets
            .iter()
            .map(|t| (t.ticket_id, t.queue_position, t.estimated_wait_minutes))
            .collect();

        self.estimator.annotate(&mut tickets, &in_progress);
        self.persist_slots(&tickets, &prior).await;

        debug!(
            event = events::QUEUE_RECOMPUTED,
            tenant_id = %tenant_id,
            count = tickets.len(),
            "Queue recomputation pass complete"
        );
        Ok(tickets)
    }

    /// Persist position/ETA deltas; a failure on one ticket is logged and
    /// skipped so the rest of the pass still lands.
    async fn persist_slots(&self, tickets: &[Ticket], prior: &[(i64, Option<i32>, Option<i32>)]) {
        for (ticket, &(_, prior_position, prior_eta)) in tickets.iter().zip(prior) {
            if ticket.queue_position == prior_position
                && ticket.estimated_wait_minutes == prior_eta
            {
                continue;
            }

            debug!(
                event = events::TICKET_POSITION_ASSIGNED,
                ticket_id = ticket.ticket_id,
                position = ticket.queue_position,
                estimated_wait_minutes = ticket.estimated_wait_minutes,
                "Persisting queue slot"
            );
            if let Err(e) = self
                .store
                .save_queue_slot(
                    ticket.ticket_id,
                    ticket.queue_position,
                    ticket.estimated_wait_minutes,
                )
                .await
            {
                warn!(
                    ticket_id = ticket.ticket_id,
                    "Failed to persist queue slot, skipping: {e}"
                );
            }
        }
    }
}
