//! # Priority Calculator
//!
//! Pure escalation rule for ticket priority. Deterministic and idempotent;
//! callers persist any delta.
//!
//! Priority only ever moves up here. Once a ticket reaches `High` it stays
//! there until a lifecycle transition outside this engine resets it, and
//! `Low` is a manual override the calculator leaves untouched unless an
//! escalation condition fires.

use crate::models::ticket::{TicketPriority, TicketStatus};

/// Compute the priority a ticket should hold right now.
///
/// - A print failure escalates unconditionally: the customer is standing
///   at the kiosk without a receipt.
/// - Waiting beyond the critical threshold escalates.
/// - Otherwise the current priority is returned unchanged.
pub fn compute_priority(
    status: TicketStatus,
    current: TicketPriority,
    waiting_minutes: i64,
    critical_waiting_minutes: i64,
) -> TicketPriority {
    match status {
        TicketStatus::PrintError => TicketPriority::High,
        TicketStatus::InQueue
        | TicketStatus::Paid
        | TicketStatus::Called
        | TicketStatus::InProgress
        | TicketStatus::Completed
        | TicketStatus::Cancelled
        | TicketStatus::Expired => {
            if waiting_minutes > critical_waiting_minutes {
                TicketPriority::High
            } else {
                current
            }
        }
    }
}
