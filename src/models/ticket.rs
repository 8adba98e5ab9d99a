//! # Ticket Model
//!
//! The central entity of the queue engine: a customer's paid service
//! request tracked through its queue lifecycle.
//!
//! ## Overview
//!
//! Tickets are created by an external payment-confirmation step and enter
//! this engine's scope at `InQueue`. The engine mutates `priority`,
//! `queue_position`, `estimated_wait_minutes`, `assigned_operator_id`, and
//! (for expiry) `status`/`expired_at`; it never creates or deletes tickets.
//!
//! Statuses and priorities are closed enums with exhaustive matching so an
//! unrecognized value is a compile-time impossibility rather than a silent
//! fall-through to a default ordering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Ticket lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Waiting in the queue for an operator
    InQueue,
    /// Payment captured, not yet queued for service
    Paid,
    /// Called to a station; position pinned at 0
    Called,
    /// Service underway; no longer tracked for position or ETA
    InProgress,
    /// Service finished
    Completed,
    /// Cancelled before service
    Cancelled,
    /// Abandoned and auto-expired by the sweeper
    Expired,
    /// Receipt printing failed; escalated until reissued
    PrintError,
}

impl TicketStatus {
    /// Terminal states admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Expired)
    }

    /// States that belong to the active queue snapshot
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::InQueue | Self::Called | Self::InProgress | Self::PrintError
        )
    }

    /// States in which a ticket is still waiting for an operator
    pub fn is_waiting(&self) -> bool {
        matches!(self, Self::InQueue | Self::PrintError)
    }

    /// States that carry a meaningful queue position
    pub fn holds_position(&self) -> bool {
        matches!(self, Self::InQueue | Self::Called)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InQueue => write!(f, "in_queue"),
            Self::Paid => write!(f, "paid"),
            Self::Called => write!(f, "called"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Expired => write!(f, "expired"),
            Self::PrintError => write!(f, "print_error"),
        }
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_queue" => Ok(Self::InQueue),
            "paid" => Ok(Self::Paid),
            "called" => Ok(Self::Called),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "expired" => Ok(Self::Expired),
            "print_error" => Ok(Self::PrintError),
            _ => Err(format!("Invalid ticket status: {s}")),
        }
    }
}

/// Escalation levels affecting ordering and visibility
///
/// The engine escalates `Normal -> High` automatically and never lowers a
/// priority back. `Low` is reserved for manual override upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    High,
    Normal,
    Low,
}

impl TicketPriority {
    /// Sort rank: lower sorts first
    pub fn rank(&self) -> i32 {
        match self {
            Self::High => 1,
            Self::Normal => 2,
            Self::Low => 3,
        }
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Normal => write!(f, "normal"),
            Self::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for TicketPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Self::High),
            "normal" => Ok(Self::Normal),
            "low" => Ok(Self::Low),
            _ => Err(format!("Invalid ticket priority: {s}")),
        }
    }
}

impl Default for TicketPriority {
    fn default() -> Self {
        Self::Normal
    }
}

/// A service requested on a ticket, with the capacity metadata the wait
/// estimator needs.
///
/// `duration_minutes` and `equipment_count` are optional: a tenant can
/// sell a service before back-office metadata is filled in, and the
/// estimator substitutes configured defaults rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub service_id: Uuid,
    pub name: String,
    pub duration_minutes: Option<i64>,
    pub equipment_count: Option<i32>,
}

/// A customer's service request tracked through queue lifecycle states.
///
/// All operations on tickets are tenant-scoped; cross-tenant leakage is a
/// correctness bug, not a policy preference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: i64,
    pub tenant_id: Uuid,
    /// Human-facing number printed on the receipt; carried, never parsed
    pub ticket_number: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub queue_position: Option<i32>,
    pub estimated_wait_minutes: Option<i32>,
    pub assigned_operator_id: Option<Uuid>,
    pub queued_at: DateTime<Utc>,
    pub called_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub expired_at: Option<DateTime<Utc>>,
    pub print_attempts: i32,
    pub reactivation_count: i32,
    pub services: Vec<ServiceRequest>,
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    /// Minutes elapsed since this ticket was queued, as of `now`
    pub fn waiting_minutes(&self, now: DateTime<Utc>) -> i64 {
        (now - self.queued_at).num_minutes().max(0)
    }

    /// The service that drives ordering, ETA, and aggregation for this
    /// ticket: the first one requested.
    pub fn effective_service(&self) -> Option<&ServiceRequest> {
        self.services.first()
    }

    /// Name of the effective service, or a placeholder for tickets sold
    /// without service metadata.
    pub fn effective_service_name(&self) -> &str {
        self.effective_service()
            .map(|s| s.name.as_str())
            .unwrap_or(crate::constants::system::UNKNOWN_SERVICE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_round_trip() {
        let all = [
            TicketStatus::InQueue,
            TicketStatus::Paid,
            TicketStatus::Called,
            TicketStatus::InProgress,
            TicketStatus::Completed,
            TicketStatus::Cancelled,
            TicketStatus::Expired,
            TicketStatus::PrintError,
        ];
        for status in all {
            let parsed = TicketStatus::from_str(&status.to_string()).unwrap();
            assert_eq!(parsed, status);
        }
        assert!(TicketStatus::from_str("queued").is_err());
    }

    #[test]
    fn test_status_predicates() {
        assert!(TicketStatus::Completed.is_terminal());
        assert!(TicketStatus::Expired.is_terminal());
        assert!(!TicketStatus::InQueue.is_terminal());

        assert!(TicketStatus::PrintError.is_active());
        assert!(TicketStatus::PrintError.is_waiting());
        assert!(!TicketStatus::Called.is_waiting());

        assert!(TicketStatus::Called.holds_position());
        assert!(!TicketStatus::InProgress.holds_position());
    }

    #[test]
    fn test_priority_rank_ordering() {
        assert!(TicketPriority::High.rank() < TicketPriority::Normal.rank());
        assert!(TicketPriority::Normal.rank() < TicketPriority::Low.rank());
        assert_eq!(TicketPriority::default(), TicketPriority::Normal);
    }

    #[test]
    fn test_priority_round_trip() {
        for priority in [
            TicketPriority::High,
            TicketPriority::Normal,
            TicketPriority::Low,
        ] {
            assert_eq!(
                TicketPriority::from_str(&priority.to_string()).unwrap(),
                priority
            );
        }
    }
}
