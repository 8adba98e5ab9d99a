//! # Postgres Ticket Store
//!
//! Production `TicketStore` backed by sqlx. Queries are runtime-bound so
//! the crate builds without a live database; rows come back as internal
//! `FromRow` structs and are assembled into domain tickets.
//!
//! Assignment is a single conditional UPDATE guarded on
//! `assigned_operator_id IS NULL`: the row either flips to the caller or
//! reports zero affected rows, so concurrent claims cannot double-book.

use crate::constants::status_groups;
use crate::error::{QueueError, Result};
use crate::models::ticket::{ServiceRequest, Ticket, TicketPriority, TicketStatus};
use crate::store::{QueueFilter, TicketStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// Postgres-backed ticket store
#[derive(Debug, Clone)]
pub struct PgTicketStore {
    pool: PgPool,
}

impl PgTicketStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load requested services for a set of tickets, keyed by ticket id
    async fn services_for(
        &self,
        ticket_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<ServiceRequest>>> {
        if ticket_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, ServiceRow>(
            r#"
            SELECT ticket_id, service_id, name, duration_minutes, equipment_count
            FROM kiosk_ticket_services
            WHERE ticket_id = ANY($1)
            ORDER BY ticket_id, sort_order
            "#,
        )
        .bind(ticket_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut services: HashMap<i64, Vec<ServiceRequest>> = HashMap::new();
        for row in rows {
            services.entry(row.ticket_id).or_default().push(ServiceRequest {
                service_id: row.service_id,
                name: row.name,
                duration_minutes: row.duration_minutes,
                equipment_count: row.equipment_count,
            });
        }
        Ok(services)
    }

    async fn assemble(&self, rows: Vec<TicketRow>) -> Result<Vec<Ticket>> {
        let ids: Vec<i64> = rows.iter().map(|r| r.ticket_id).collect();
        let mut services = self.services_for(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let ticket_services = services.remove(&row.ticket_id).unwrap_or_default();
                row.into_ticket(ticket_services)
            })
            .collect()
    }
}

#[async_trait]
impl TicketStore for PgTicketStore {
    #[instrument(skip(self, filter))]
    async fn active_tickets(&self, tenant_id: Uuid, filter: &QueueFilter) -> Result<Vec<Ticket>> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT ticket_id, tenant_id, ticket_number, status, priority, queue_position, \
             estimated_wait_minutes, assigned_operator_id, queued_at, called_at, started_at, \
             completed_at, cancelled_at, expired_at, print_attempts, reactivation_count, \
             created_at FROM kiosk_tickets WHERE tenant_id = ",
        );
        query.push_bind(tenant_id);

        if !filter.statuses.is_empty() {
            let statuses: Vec<String> =
                filter.statuses.iter().map(ToString::to_string).collect();
            query.push(" AND status = ANY(");
            query.push_bind(statuses);
            query.push(")");
        }

        if let Some(priority) = filter.priority {
            query.push(" AND priority = ");
            query.push_bind(priority.to_string());
        }

        if let Some(service_id) = filter.service_id {
            // Filter on the effective (first requested) service
            query.push(
                " AND (SELECT s.service_id FROM kiosk_ticket_services s \
                 WHERE s.ticket_id = kiosk_tickets.ticket_id \
                 ORDER BY s.sort_order LIMIT 1) = ",
            );
            query.push_bind(service_id);
        }

        query.push(" ORDER BY queued_at ASC, ticket_id ASC LIMIT ");
        query.push_bind(crate::constants::system::MAX_SNAPSHOT_SIZE as i64);

        let rows: Vec<TicketRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(tenant_id = %tenant_id, "Failed to load ticket snapshot: {e}");
                QueueError::Database(e)
            })?;

        debug!(tenant_id = %tenant_id, count = rows.len(), "Loaded ticket snapshot");
        self.assemble(rows).await
    }

    #[instrument(skip(self))]
    async fn find_ticket(&self, ticket_id: i64) -> Result<Option<Ticket>> {
        let row = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT ticket_id, tenant_id, ticket_number, status, priority, queue_position,
                   estimated_wait_minutes, assigned_operator_id, queued_at, called_at,
                   started_at, completed_at, cancelled_at, expired_at, print_attempts,
                   reactivation_count, created_at
            FROM kiosk_tickets
            WHERE ticket_id = $1
            "#,
        )
        .bind(ticket_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.assemble(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn save_priority(&self, ticket_id: i64, priority: TicketPriority) -> Result<()> {
        sqlx::query("UPDATE kiosk_tickets SET priority = $2 WHERE ticket_id = $1")
            .bind(ticket_id)
            .bind(priority.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_queue_slot(
        &self,
        ticket_id: i64,
        position: Option<i32>,
        estimated_wait_minutes: Option<i32>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE kiosk_tickets SET queue_position = $2, estimated_wait_minutes = $3 \
             WHERE ticket_id = $1",
        )
        .bind(ticket_id)
        .bind(position)
        .bind(estimated_wait_minutes)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn claim_ticket(&self, ticket_id: i64, operator_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE kiosk_tickets SET assigned_operator_id = $2 \
             WHERE ticket_id = $1 AND assigned_operator_id IS NULL",
        )
        .bind(ticket_id)
        .bind(operator_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(ticket_id, "Failed to claim ticket: {e}");
            QueueError::Database(e)
        })?;

        Ok(result.rows_affected() == 1)
    }

    async fn operator_active_count(&self, tenant_id: Uuid, operator_id: Uuid) -> Result<i64> {
        let statuses: Vec<String> = status_groups::OPERATOR_ACTIVE_STATUSES
            .iter()
            .map(ToString::to_string)
            .collect();

        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM kiosk_tickets \
             WHERE tenant_id = $1 AND assigned_operator_id = $2 AND status = ANY($3)",
        )
        .bind(tenant_id)
        .bind(operator_id)
        .bind(statuses)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    #[instrument(skip(self))]
    async fn expire_queued_before(&self, tenant_id: Uuid, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE kiosk_tickets \
             SET status = $3, expired_at = NOW(), queue_position = NULL, \
                 estimated_wait_minutes = NULL \
             WHERE tenant_id = $1 AND status = $4 AND queued_at < $2",
        )
        .bind(tenant_id)
        .bind(cutoff)
        .bind(TicketStatus::Expired.to_string())
        .bind(TicketStatus::InQueue.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Internal struct for ticket query results
#[derive(sqlx::FromRow)]
struct TicketRow {
    ticket_id: i64,
    tenant_id: Uuid,
    ticket_number: String,
    status: String,
    priority: String,
    queue_position: Option<i32>,
    estimated_wait_minutes: Option<i32>,
    assigned_operator_id: Option<Uuid>,
    queued_at: DateTime<Utc>,
    called_at: Option<DateTime<Utc>>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    expired_at: Option<DateTime<Utc>>,
    print_attempts: i32,
    reactivation_count: i32,
    created_at: DateTime<Utc>,
}

impl TicketRow {
    fn into_ticket(self, services: Vec<ServiceRequest>) -> Result<Ticket> {
        let status = TicketStatus::from_str(&self.status)
            .map_err(|e| QueueError::Database(sqlx::Error::Decode(e.into())))?;
        let priority = TicketPriority::from_str(&self.priority)
            .map_err(|e| QueueError::Database(sqlx::Error::Decode(e.into())))?;

        Ok(Ticket {
            ticket_id: self.ticket_id,
            tenant_id: self.tenant_id,
            ticket_number: self.ticket_number,
            status,
            priority,
            queue_position: self.queue_position,
            estimated_wait_minutes: self.estimated_wait_minutes,
            assigned_operator_id: self.assigned_operator_id,
            queued_at: self.queued_at,
            called_at: self.called_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
            cancelled_at: self.cancelled_at,
            expired_at: self.expired_at,
            print_attempts: self.print_attempts,
            reactivation_count: self.reactivation_count,
            services,
            created_at: self.created_at,
        })
    }
}

/// Internal struct for service query results
#[derive(sqlx::FromRow)]
struct ServiceRow {
    ticket_id: i64,
    service_id: Uuid,
    name: String,
    duration_minutes: Option<i64>,
    equipment_count: Option<i32>,
}
