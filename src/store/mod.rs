//! # Ticket Store
//!
//! The data collaborator the queue engine consumes. The engine holds an
//! injected `Arc<dyn TicketStore>` and never touches persistence directly,
//! so a single construction site decides whether tickets live in Postgres
//! or in memory.
//!
//! The contract encodes the engine's concurrency requirements:
//!
//! - `active_tickets` is one consistent tenant-scoped read; callers never
//!   mix rows from two reads inside one computation.
//! - `claim_ticket` is a conditional update (compare-and-swap on
//!   "currently unassigned"), never read-then-write, so at most one
//!   operator ever claims a given ticket.
//! - `expire_queued_before` is a bulk transition that only touches
//!   `InQueue` rows.

pub mod memory;
pub mod pg;

pub use memory::InMemoryTicketStore;
pub use pg::PgTicketStore;

use crate::error::Result;
use crate::models::ticket::{Ticket, TicketPriority, TicketStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Row filter for tenant-scoped snapshot reads
#[derive(Debug, Clone, Default)]
pub struct QueueFilter {
    /// Statuses to include; empty means no status restriction
    pub statuses: Vec<TicketStatus>,
    /// Restrict to tickets whose effective service matches
    pub service_id: Option<Uuid>,
    /// Restrict to tickets at exactly this priority
    pub priority: Option<TicketPriority>,
}

impl QueueFilter {
    pub fn with_statuses(statuses: &[TicketStatus]) -> Self {
        Self {
            statuses: statuses.to_vec(),
            ..Self::default()
        }
    }

    /// Whether a ticket passes this filter (tenant scoping is the store's
    /// responsibility, not the filter's)
    pub fn matches(&self, ticket: &Ticket) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&ticket.status) {
            return false;
        }
        if let Some(service_id) = self.service_id {
            if ticket
                .effective_service()
                .map(|s| s.service_id)
                != Some(service_id)
            {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if ticket.priority != priority {
                return false;
            }
        }
        true
    }
}

/// Ticket/operator data collaborator consumed by the engine
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// One consistent, tenant-scoped snapshot of matching tickets,
    /// ordered by `queued_at` ascending (ties by ticket id).
    /// An unknown tenant yields an empty list, not an error.
    async fn active_tickets(&self, tenant_id: Uuid, filter: &QueueFilter) -> Result<Vec<Ticket>>;

    /// Fetch a single ticket by id, across tenants
    async fn find_ticket(&self, ticket_id: i64) -> Result<Option<Ticket>>;

    /// Persist a recomputed priority
    async fn save_priority(&self, ticket_id: i64, priority: TicketPriority) -> Result<()>;

    /// Persist a recomputed queue position and ETA (`None` clears both)
    async fn save_queue_slot(
        &self,
        ticket_id: i64,
        position: Option<i32>,
        estimated_wait_minutes: Option<i32>,
    ) -> Result<()>;

    /// Conditionally assign the ticket to an operator. Returns `false`
    /// when the ticket was already assigned (a lost race, not an error).
    async fn claim_ticket(&self, ticket_id: i64, operator_id: Uuid) -> Result<bool>;

    /// Count of tickets the operator currently holds in {Called, InProgress}
    async fn operator_active_count(&self, tenant_id: Uuid, operator_id: Uuid) -> Result<i64>;

    /// Transition `InQueue` tickets queued before `cutoff` to `Expired`,
    /// stamping `expired_at`. Returns the number of tickets transitioned.
    async fn expire_queued_before(&self, tenant_id: Uuid, cutoff: DateTime<Utc>) -> Result<u64>;
}
