//! # System Constants
//!
//! Core constants, enums, and status groupings that define the operational
//! boundaries of the kiosk queue engine.
//!
//! Status groupings live here rather than inline in queries so that stores
//! and components agree on exactly which statuses mean "active", "holding
//! an operator", and "terminal".

// Re-export model enums for convenience
pub use crate::models::ticket::{TicketPriority, TicketStatus};

/// Lifecycle events emitted through structured logging
pub mod events {
    // Ticket lifecycle events
    pub const TICKET_PRIORITY_ESCALATED: &str = "ticket.priority_escalated";
    pub const TICKET_POSITION_ASSIGNED: &str = "ticket.position_assigned";
    pub const TICKET_ASSIGNED: &str = "ticket.assigned";
    pub const TICKET_ASSIGNMENT_LOST: &str = "ticket.assignment_lost";
    pub const TICKET_EXPIRED: &str = "ticket.expired";

    // Queue-level events
    pub const QUEUE_RECOMPUTED: &str = "queue.recomputed";
    pub const QUEUE_HEALTH_EVALUATED: &str = "queue.health_evaluated";
}

/// System-wide constants
pub mod system {
    /// Version compatibility marker
    pub const KIOSK_CORE_VERSION: &str = "0.1.0";

    /// Placeholder service name for tickets sold without service metadata
    pub const UNKNOWN_SERVICE: &str = "unknown";

    /// Upper bound on tickets considered in a single tenant pass
    pub const MAX_SNAPSHOT_SIZE: usize = 10_000;
}

/// Status groupings for validation and logic
pub mod status_groups {
    use super::TicketStatus;

    /// Statuses that form the active queue snapshot
    pub const ACTIVE_TICKET_STATUSES: &[TicketStatus] = &[
        TicketStatus::InQueue,
        TicketStatus::Called,
        TicketStatus::InProgress,
        TicketStatus::PrintError,
    ];

    /// Statuses in which a ticket is still waiting for an operator.
    /// Print errors stay in the waiting set so they remain visible (and
    /// escalated) until the receipt is reissued.
    pub const WAITING_TICKET_STATUSES: &[TicketStatus] =
        &[TicketStatus::InQueue, TicketStatus::PrintError];

    /// Statuses that count against an operator's concurrency limit
    pub const OPERATOR_ACTIVE_STATUSES: &[TicketStatus] =
        &[TicketStatus::Called, TicketStatus::InProgress];

    /// Statuses that carry a meaningful queue position
    pub const POSITIONED_STATUSES: &[TicketStatus] =
        &[TicketStatus::InQueue, TicketStatus::Called];

    /// Terminal statuses; no further transitions allowed
    pub const TERMINAL_TICKET_STATUSES: &[TicketStatus] = &[
        TicketStatus::Completed,
        TicketStatus::Cancelled,
        TicketStatus::Expired,
    ];
}
