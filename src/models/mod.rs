pub mod ticket;

// Re-export core models for easy access
pub use ticket::{ServiceRequest, Ticket, TicketPriority, TicketStatus};
