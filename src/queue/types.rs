//! # Queue Types
//!
//! Shared request/response types of the queue read path.

use crate::models::ticket::{Ticket, TicketPriority};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Sort policies for queue listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Ascending queued_at; ties by ticket creation order
    Fifo,
    /// Ascending priority rank; ties by queued_at
    Priority,
    /// Ascending effective service name; ties by queued_at
    Service,
    /// Alias ordering of Fifo kept for listing endpoints that surface
    /// waiting time rather than arrival order
    WaitingTime,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::Fifo
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fifo => write!(f, "fifo"),
            Self::Priority => write!(f, "priority"),
            Self::Service => write!(f, "service"),
            Self::WaitingTime => write!(f, "waiting_time"),
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fifo" => Ok(Self::Fifo),
            "priority" => Ok(Self::Priority),
            "service" => Ok(Self::Service),
            "waiting_time" => Ok(Self::WaitingTime),
            _ => Err(format!("Invalid sort order: {s}")),
        }
    }
}

/// Parameters of a queue read
///
/// Defaults match the kiosk display: waiting tickets plus the ones already
/// called or on a station; paid-but-unqueued tickets only on request.
#[derive(Debug, Clone)]
pub struct QueueQuery {
    pub sort_order: SortOrder,
    pub service_id: Option<Uuid>,
    pub priority: Option<TicketPriority>,
    pub include_called: bool,
    pub include_in_progress: bool,
    pub include_paid: bool,
}

impl Default for QueueQuery {
    fn default() -> Self {
        Self {
            sort_order: SortOrder::Fifo,
            service_id: None,
            priority: None,
            include_called: true,
            include_in_progress: true,
            include_paid: false,
        }
    }
}

impl QueueQuery {
    pub fn sorted_by(sort_order: SortOrder) -> Self {
        Self {
            sort_order,
            ..Self::default()
        }
    }
}

/// Fixed-shape per-status totals for the active snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub in_queue: i64,
    pub called: i64,
    pub in_progress: i64,
    pub print_error: i64,
}

/// Fixed-shape per-priority totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCounts {
    pub high: i64,
    pub normal: i64,
    pub low: i64,
}

/// Fixed-shape per-service totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCounts {
    pub total: i64,
    pub in_queue: i64,
    pub called: i64,
    pub in_progress: i64,
}

/// Waiting-time summary over the in-queue subset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingStats {
    pub average_minutes: i64,
    pub longest_minutes: i64,
    pub estimated_total_minutes: i64,
}

/// Result of a queue listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueListing {
    pub tickets: Vec<Ticket>,
    pub total: usize,
    pub by_status: StatusCounts,
    pub by_priority: PriorityCounts,
    pub by_service: HashMap<String, ServiceCounts>,
    pub queue_stats: WaitingStats,
    pub estimated_total_time: i64,
}
