//! # Queue Health Monitor
//!
//! Aggregates an active snapshot into typed status/priority/service
//! breakdowns, a waiting-time summary, and a three-level health verdict
//! with deterministic recommendations.
//!
//! The per-service map is a fixed-shape counts structure rather than a
//! status-keyed dictionary, so a dashboard consuming it cannot be
//! surprised by a missing key.

use crate::config::QueueConfig;
use crate::constants::events;
use crate::models::ticket::{Ticket, TicketPriority, TicketStatus};
use crate::queue::types::{PriorityCounts, ServiceCounts, StatusCounts, WaitingStats};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Health verdict over a tenant's queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthVerdict {
    Healthy,
    Warning,
    Critical,
}

impl HealthVerdict {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    pub fn needs_attention(&self) -> bool {
        matches!(self, Self::Warning | Self::Critical)
    }
}

impl fmt::Display for HealthVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Aggregate statistics and health report for a tenant's queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueStatistics {
    pub total_active: i64,
    pub by_status: StatusCounts,
    pub by_priority: PriorityCounts,
    pub by_service: HashMap<String, ServiceCounts>,
    pub waiting: WaitingStats,
    pub health: HealthVerdict,
    pub recommendations: Vec<String>,
}

/// Snapshot aggregator for statistics endpoints
pub struct QueueHealthMonitor {
    config: QueueConfig,
}

impl QueueHealthMonitor {
    pub fn new(config: QueueConfig) -> Self {
        Self { config }
    }

    /// Build statistics from an annotated active snapshot
    pub fn build(&self, tickets: &[Ticket], now: DateTime<Utc>) -> QueueStatistics {
        let mut by_status = StatusCounts::default();
        let mut by_priority = PriorityCounts::default();
        let mut by_service: HashMap<String, ServiceCounts> = HashMap::new();

        let mut waiting_total = 0i64;
        let mut waiting_count = 0i64;
        let mut longest_minutes = 0i64;
        let mut estimated_total_minutes = 0i64;
        let mut beyond_critical = 0i64;

        for ticket in tickets {
            match ticket.status {
                TicketStatus::InQueue => by_status.in_queue += 1,
                TicketStatus::Called => by_status.called += 1,
                TicketStatus::InProgress => by_status.in_progress += 1,
                TicketStatus::PrintError => by_status.print_error += 1,
                TicketStatus::Paid
                | TicketStatus::Completed
                | TicketStatus::Cancelled
                | TicketStatus::Expired => {}
            }

            match ticket.priority {
                TicketPriority::High => by_priority.high += 1,
                TicketPriority::Normal => by_priority.normal += 1,
                TicketPriority::Low => by_priority.low += 1,
            }

            // Every requested service sees this ticket in its totals so
            // equipment dashboards reflect all demand.
            for service in &ticket.services {
                let counts = by_service.entry(service.name.clone()).or_default();
                counts.total += 1;
                match ticket.status {
                    TicketStatus::InQueue => counts.in_queue += 1,
                    TicketStatus::Called => counts.called += 1,
                    TicketStatus::InProgress => counts.in_progress += 1,
                    TicketStatus::Paid
                    | TicketStatus::PrintError
                    | TicketStatus::Completed
                    | TicketStatus::Cancelled
                    | TicketStatus::Expired => {}
                }
            }

            if ticket.status == TicketStatus::InQueue {
                let age = ticket.waiting_minutes(now);
                waiting_total += age;
                waiting_count += 1;
                longest_minutes = longest_minutes.max(age);
                estimated_total_minutes += i64::from(ticket.estimated_wait_minutes.unwrap_or(0));
                if age > self.config.critical_waiting_minutes {
                    beyond_critical += 1;
                }
            }
        }

        let average_minutes = if waiting_count > 0 {
            waiting_total / waiting_count
        } else {
            0
        };

        let waiting = WaitingStats {
            average_minutes,
            longest_minutes,
            estimated_total_minutes,
        };

        let health = self.verdict(average_minutes, by_priority.high);
        let recommendations =
            self.recommendations(health, by_priority.high, beyond_critical);

        debug!(
            event = events::QUEUE_HEALTH_EVALUATED,
            verdict = %health,
            active = tickets.len(),
            average_wait = average_minutes,
            "Evaluated queue health"
        );

        QueueStatistics {
            total_active: tickets.len() as i64,
            by_status,
            by_priority,
            by_service,
            waiting,
            health,
            recommendations,
        }
    }

    fn verdict(&self, average_wait_minutes: i64, high_count: i64) -> HealthVerdict {
        if average_wait_minutes <= self.config.normal_waiting_minutes && high_count == 0 {
            HealthVerdict::Healthy
        } else if average_wait_minutes <= self.config.warning_waiting_minutes && high_count <= 2 {
            HealthVerdict::Warning
        } else {
            HealthVerdict::Critical
        }
    }

    fn recommendations(
        &self,
        health: HealthVerdict,
        high_count: i64,
        beyond_critical: i64,
    ) -> Vec<String> {
        let mut recommendations = Vec::new();

        if high_count > 0 {
            recommendations.push(format!(
                "{high_count} high-priority ticket(s) need attention"
            ));
        }
        if beyond_critical > 0 {
            recommendations.push(format!(
                "{beyond_critical} ticket(s) have been waiting longer than {} minutes",
                self.config.critical_waiting_minutes
            ));
        }
        if health.needs_attention() {
            recommendations.push("Consider adding operators to reduce waiting times".to_string());
        }
        if recommendations.is_empty() {
            recommendations.push("Queue is operating normally".to_string());
        }

        recommendations
    }
}
