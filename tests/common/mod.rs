//! Shared factories for integration tests.
#![allow(dead_code)] // not every test binary uses every factory method

use chrono::{DateTime, Duration, Utc};
use kiosk_core::models::{ServiceRequest, Ticket, TicketPriority, TicketStatus};
use uuid::Uuid;

/// Fluent test factory for tickets
pub struct TicketFactory {
    ticket: Ticket,
}

impl TicketFactory {
    pub fn new(ticket_id: i64, tenant_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            ticket: Ticket {
                ticket_id,
                tenant_id,
                ticket_number: format!("A-{ticket_id:03}"),
                status: TicketStatus::InQueue,
                priority: TicketPriority::Normal,
                queue_position: None,
                estimated_wait_minutes: None,
                assigned_operator_id: None,
                queued_at: now,
                called_at: None,
                started_at: None,
                completed_at: None,
                cancelled_at: None,
                expired_at: None,
                print_attempts: 0,
                reactivation_count: 0,
                services: Vec::new(),
                created_at: now,
            },
        }
    }

    pub fn status(mut self, status: TicketStatus) -> Self {
        self.ticket.status = status;
        self
    }

    pub fn priority(mut self, priority: TicketPriority) -> Self {
        self.ticket.priority = priority;
        self
    }

    pub fn queued_minutes_ago(mut self, minutes: i64) -> Self {
        let queued_at: DateTime<Utc> = Utc::now() - Duration::minutes(minutes);
        self.ticket.queued_at = queued_at;
        self.ticket.created_at = queued_at;
        self
    }

    pub fn assigned_to(mut self, operator_id: Uuid) -> Self {
        self.ticket.assigned_operator_id = Some(operator_id);
        self
    }

    pub fn service(mut self, service: ServiceRequest) -> Self {
        self.ticket.services.push(service);
        self
    }

    pub fn build(self) -> Ticket {
        self.ticket
    }
}

/// A fully specified service request
pub fn service(service_id: Uuid, name: &str, duration: i64, equipment: i32) -> ServiceRequest {
    ServiceRequest {
        service_id,
        name: name.to_string(),
        duration_minutes: Some(duration),
        equipment_count: Some(equipment),
    }
}
