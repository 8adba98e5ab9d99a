//! # Queue Prioritization & Assignment
//!
//! The algorithmic core: priority escalation, snapshot ordering, position
//! and wait estimation, health aggregation, operator allocation, and
//! stale-ticket expiry, composed by the [`engine::QueueEngine`] facade.

pub mod allocator;
pub mod engine;
pub mod estimator;
pub mod expiry;
pub mod health;
pub mod priority;
pub mod selector;
pub mod types;

pub use allocator::OperatorAllocator;
pub use engine::QueueEngine;
pub use estimator::WaitEstimator;
pub use expiry::ExpirySweeper;
pub use health::{HealthVerdict, QueueHealthMonitor, QueueStatistics};
pub use selector::QueueSelector;
pub use types::{
    PriorityCounts, QueueListing, QueueQuery, ServiceCounts, SortOrder, StatusCounts, WaitingStats,
};
