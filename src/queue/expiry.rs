//! # Auto-Expiry Sweeper
//!
//! Transitions abandoned, long-waiting queued tickets to `Expired`. Runs
//! on demand or from a periodic trigger owned by the embedding service;
//! the sweeper itself holds no timer.

use crate::config::QueueConfig;
use crate::constants::events;
use crate::error::Result;
use crate::store::TicketStore;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Configuration-gated sweeper for stale queued tickets
pub struct ExpirySweeper {
    store: Arc<dyn TicketStore>,
    config: QueueConfig,
}

impl ExpirySweeper {
    pub fn new(store: Arc<dyn TicketStore>, config: QueueConfig) -> Self {
        Self { store, config }
    }

    /// Expire `InQueue` tickets older than the configured threshold.
    ///
    /// Returns the number of tickets transitioned; 0 when expiry is
    /// disabled. Tickets in any other status are never touched.
    #[instrument(skip(self))]
    pub async fn expire_stale(&self, tenant_id: Uuid) -> Result<u64> {
        if !self.config.auto_expire_enabled {
            debug!(tenant_id = %tenant_id, "Auto-expiry disabled, skipping sweep");
            return Ok(0);
        }

        let cutoff = Utc::now() - Duration::minutes(self.config.auto_expire_minutes);
        let expired = self.store.expire_queued_before(tenant_id, cutoff).await?;

        if expired > 0 {
            info!(
                event = events::TICKET_EXPIRED,
                tenant_id = %tenant_id,
                expired,
                threshold_minutes = self.config.auto_expire_minutes,
                "Expired stale queued tickets"
            );
        }

        Ok(expired)
    }
}
