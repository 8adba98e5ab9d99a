#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Kiosk Core Rust
//!
//! Queue prioritization and assignment engine for self-service kiosks
//! selling time-boxed, equipment-limited services across multiple tenants.
//!
//! ## Overview
//!
//! Customers receive a ticket after payment. This crate owns everything
//! that happens to that ticket between the queue and the operator:
//!
//! - **Priority escalation**: print failures and over-threshold waits
//!   escalate a ticket to high priority; priority never auto-de-escalates.
//! - **Queue ordering**: FIFO, priority, service, and waiting-time sort
//!   policies with deterministic tie-breaks.
//! - **Position & ETA**: 1-based contiguous positions over the waiting
//!   subset and a capacity-aware wait heuristic.
//! - **Queue health**: typed status/priority/service breakdowns and a
//!   three-level verdict with recommendations.
//! - **Operator assignment**: concurrency-limited next-ticket selection
//!   and a conditional claim that makes double-booking impossible.
//! - **Auto-expiry**: abandoned queued tickets transition to expired.
//!
//! Transport, authentication, payment capture, and printer control are
//! external collaborators; the engine consumes a [`store::TicketStore`]
//! and exposes plain async operations upward.
//!
//! ## Module Organization
//!
//! - [`models`] - Ticket entity and its closed status/priority enums
//! - [`store`] - Ticket store collaborator (Postgres and in-memory)
//! - [`queue`] - Prioritization, estimation, health, allocation, expiry
//! - [`config`] - Engine configuration
//! - [`constants`] - Events, system constants, status groupings
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging initialization
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kiosk_core::config::QueueConfig;
//! use kiosk_core::queue::{QueueEngine, QueueQuery};
//! use kiosk_core::store::PgTicketStore;
//! use std::sync::Arc;
//!
//! # async fn example(pool: sqlx::PgPool, tenant_id: uuid::Uuid) -> kiosk_core::Result<()> {
//! let store = Arc::new(PgTicketStore::new(pool));
//! let engine = QueueEngine::new(store, QueueConfig::from_env()?);
//!
//! let listing = engine.list_queue(tenant_id, &QueueQuery::default()).await?;
//! println!("{} tickets waiting", listing.by_status.in_queue);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod queue;
pub mod store;

pub use config::QueueConfig;
pub use error::{QueueError, Result};
pub use models::{ServiceRequest, Ticket, TicketPriority, TicketStatus};
pub use queue::{
    HealthVerdict, QueueEngine, QueueListing, QueueQuery, QueueStatistics, SortOrder,
};
pub use store::{InMemoryTicketStore, PgTicketStore, QueueFilter, TicketStore};
