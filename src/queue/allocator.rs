//! # Operator Assignment Allocator
//!
//! Hands the next eligible ticket to an operator and performs the claim.
//!
//! Two outcomes here are deliberately not errors: an operator at the
//! concurrency limit gets `None` (backpressure), and a claim that another
//! operator won first returns `false`. Only a missing ticket or a store
//! failure surfaces as an error.

use crate::config::QueueConfig;
use crate::constants::events;
use crate::error::{QueueError, Result};
use crate::logging::log_ticket_operation;
use crate::models::ticket::Ticket;
use crate::store::{QueueFilter, TicketStore};
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Concurrency-limited ticket allocator for operators
pub struct OperatorAllocator {
    store: Arc<dyn TicketStore>,
    config: QueueConfig,
}

impl OperatorAllocator {
    pub fn new(store: Arc<dyn TicketStore>, config: QueueConfig) -> Self {
        Self { store, config }
    }

    /// Select the next ticket for an operator: highest priority first,
    /// FIFO within a priority, unassigned tickets only.
    ///
    /// Returns `None` when the operator is at its concurrency limit or
    /// the queue holds no eligible ticket.
    #[instrument(skip(self))]
    pub async fn next_ticket(
        &self,
        tenant_id: Uuid,
        operator_id: Uuid,
    ) -> Result<Option<Ticket>> {
        let held = self
            .store
            .operator_active_count(tenant_id, operator_id)
            .await?;
        if held >= self.config.operator_concurrent_limit {
            debug!(
                tenant_id = %tenant_id,
                operator_id = %operator_id,
                held,
                limit = self.config.operator_concurrent_limit,
                "Operator at concurrency limit, no ticket offered"
            );
            return Ok(None);
        }

        let filter = QueueFilter::with_statuses(&[crate::models::TicketStatus::InQueue]);
        let tickets = self.store.active_tickets(tenant_id, &filter).await?;

        let next = tickets
            .into_iter()
            .filter(|t| t.assigned_operator_id.is_none())
            .min_by_key(|t| (t.priority.rank(), t.queued_at, t.ticket_id));

        Ok(next)
    }

    /// Conditionally assign a ticket to an operator.
    ///
    /// `Ok(true)` on success; `Ok(false)` when another operator claimed it
    /// first or the caller is at its concurrency limit; `TicketNotFound`
    /// when the ticket does not exist.
    #[instrument(skip(self))]
    pub async fn assign(&self, ticket_id: i64, operator_id: Uuid) -> Result<bool> {
        let ticket = self
            .store
            .find_ticket(ticket_id)
            .await?
            .ok_or(QueueError::TicketNotFound { ticket_id })?;

        let held = self
            .store
            .operator_active_count(ticket.tenant_id, operator_id)
            .await?;
        if held >= self.config.operator_concurrent_limit {
            debug!(
                ticket_id,
                operator_id = %operator_id,
                held,
                limit = self.config.operator_concurrent_limit,
                "Operator at concurrency limit, assignment refused"
            );
            return Ok(false);
        }

        let claimed = self.store.claim_ticket(ticket_id, operator_id).await?;
        if claimed {
            log_ticket_operation(
                events::TICKET_ASSIGNED,
                ticket.tenant_id,
                Some(ticket_id),
                Some(operator_id),
                None,
            );
        } else {
            warn!(
                event = events::TICKET_ASSIGNMENT_LOST,
                ticket_id,
                operator_id = %operator_id,
                "Ticket no longer available for assignment"
            );
        }

        Ok(claimed)
    }
}
