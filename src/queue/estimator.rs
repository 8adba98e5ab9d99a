//! # Position & ETA Estimator
//!
//! Assigns queue positions and estimated wait minutes to an ordered
//! snapshot, in place. Positions are 1-based over the `InQueue` subset in
//! snapshot order; called tickets pin to position 0 with a zero ETA;
//! everything else carries neither.
//!
//! The ETA model is a deliberate heuristic, not a scheduler: it divides
//! the tickets ahead by the service's parallel capacity, multiplies by the
//! service duration, and adds half a duration when a station is already
//! busy with the same service.

use crate::config::QueueConfig;
use crate::models::ticket::{Ticket, TicketStatus};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// Capacity-aware wait estimator
pub struct WaitEstimator {
    config: QueueConfig,
}

impl WaitEstimator {
    pub fn new(config: QueueConfig) -> Self {
        Self { config }
    }

    /// Annotate an ordered snapshot with positions and ETAs.
    ///
    /// `in_progress` is the current in-progress subset, supplied
    /// separately so exclusion flags on the listing cannot distort the
    /// same-service bump.
    pub fn annotate(&self, tickets: &mut [Ticket], in_progress: &[Ticket]) {
        let busy_services = count_by_effective_service(in_progress);

        let mut position = 0i32;
        for ticket in tickets.iter_mut() {
            match ticket.status {
                TicketStatus::InQueue => {
                    position += 1;
                    ticket.queue_position = Some(position);
                    ticket.estimated_wait_minutes =
                        Some(self.estimate(ticket, position, &busy_services));
                }
                TicketStatus::Called => {
                    ticket.queue_position = Some(0);
                    ticket.estimated_wait_minutes = Some(0);
                }
                TicketStatus::InProgress
                | TicketStatus::Paid
                | TicketStatus::PrintError
                | TicketStatus::Completed
                | TicketStatus::Cancelled
                | TicketStatus::Expired => {
                    ticket.queue_position = None;
                    ticket.estimated_wait_minutes = None;
                }
            }
        }
    }

    /// Resolve service metadata (with configured fallbacks) and estimate
    fn estimate(
        &self,
        ticket: &Ticket,
        position: i32,
        busy_services: &HashMap<Option<Uuid>, i64>,
    ) -> i32 {
        let service = ticket.effective_service();

        let duration_minutes = match service.and_then(|s| s.duration_minutes) {
            Some(minutes) => minutes,
            None => {
                let fallback = self.config.duration_for(ticket.effective_service_name());
                debug!(
                    ticket_id = ticket.ticket_id,
                    service = ticket.effective_service_name(),
                    fallback_minutes = fallback,
                    "Service duration metadata missing, using configured duration"
                );
                fallback
            }
        };

        let parallel_capacity = service
            .and_then(|s| s.equipment_count)
            .unwrap_or(self.config.service_parallel_limit)
            .min(self.config.service_parallel_limit)
            .max(1);

        let service_key = service.map(|s| s.service_id);
        let same_service_busy = busy_services.get(&service_key).copied().unwrap_or(0) > 0;

        eta_minutes(position, duration_minutes, parallel_capacity, same_service_busy)
    }
}

/// The ETA heuristic itself, on resolved inputs
pub fn eta_minutes(
    position: i32,
    duration_minutes: i64,
    parallel_capacity: i32,
    same_service_in_progress: bool,
) -> i32 {
    let positions_ahead = i64::from((position - 1).max(0));
    let base = (positions_ahead / i64::from(parallel_capacity.max(1))) * duration_minutes;
    let bump = if same_service_in_progress {
        duration_minutes / 2
    } else {
        0
    };
    (base + bump).max(1) as i32
}

fn count_by_effective_service(tickets: &[Ticket]) -> HashMap<Option<Uuid>, i64> {
    let mut counts: HashMap<Option<Uuid>, i64> = HashMap::new();
    for ticket in tickets {
        if ticket.status == TicketStatus::InProgress {
            let key = ticket.effective_service().map(|s| s.service_id);
            *counts.entry(key).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ticket::{ServiceRequest, TicketPriority};
    use chrono::Utc;
    use proptest::prelude::*;

    fn ticket(id: i64, status: TicketStatus, service_id: Uuid, duration: Option<i64>) -> Ticket {
        let now = Utc::now();
        Ticket {
            ticket_id: id,
            tenant_id: Uuid::nil(),
            ticket_number: format!("A-{id:03}"),
            status,
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
            services: vec![ServiceRequest {
                service_id,
                name: "sauna".to_string(),
                duration_minutes: duration,
                equipment_count: Some(3),
            }],
            created_at: now,
        }
    }

    #[test]
    fn test_four_tickets_three_stations() {
        // duration 10, equipment 3, tenant limit 3: the fourth ticket
        // waits one full cycle
        let estimator = WaitEstimator::new(QueueConfig::default());
        let service_id = Uuid::new_v4();
        let mut tickets: Vec<Ticket> = (1..=4)
            .map(|id| ticket(id, TicketStatus::InQueue, service_id, Some(10)))
            .collect();

        estimator.annotate(&mut tickets, &[]);

        let positions: Vec<i32> = tickets.iter().map(|t| t.queue_position.unwrap()).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
        assert_eq!(tickets[0].estimated_wait_minutes, Some(1));
        assert_eq!(tickets[3].estimated_wait_minutes, Some(10));
    }

    #[test]
    fn test_called_pins_to_zero() {
        let estimator = WaitEstimator::new(QueueConfig::default());
        let service_id = Uuid::new_v4();
        let mut tickets = vec![ticket(1, TicketStatus::Called, service_id, Some(10))];

        estimator.annotate(&mut tickets, &[]);
        assert_eq!(tickets[0].queue_position, Some(0));
        assert_eq!(tickets[0].estimated_wait_minutes, Some(0));
    }

    #[test]
    fn test_in_progress_carries_neither() {
        let estimator = WaitEstimator::new(QueueConfig::default());
        let service_id = Uuid::new_v4();
        let mut tickets = vec![ticket(1, TicketStatus::InProgress, service_id, Some(10))];
        tickets[0].queue_position = Some(3);
        tickets[0].estimated_wait_minutes = Some(30);

        estimator.annotate(&mut tickets, &[]);
        assert_eq!(tickets[0].queue_position, None);
        assert_eq!(tickets[0].estimated_wait_minutes, None);
    }

    #[test]
    fn test_same_service_in_progress_adds_half_duration() {
        let estimator = WaitEstimator::new(QueueConfig::default());
        let service_id = Uuid::new_v4();
        let mut tickets = vec![ticket(1, TicketStatus::InQueue, service_id, Some(10))];
        let busy = vec![ticket(9, TicketStatus::InProgress, service_id, Some(10))];

        estimator.annotate(&mut tickets, &busy);
        // base 0 for position 1, plus 10/2
        assert_eq!(tickets[0].estimated_wait_minutes, Some(5));
    }

    #[test]
    fn test_other_service_in_progress_does_not_bump() {
        let estimator = WaitEstimator::new(QueueConfig::default());
        let service_id = Uuid::new_v4();
        let mut tickets = vec![ticket(1, TicketStatus::InQueue, service_id, Some(10))];
        let busy = vec![ticket(9, TicketStatus::InProgress, Uuid::new_v4(), Some(10))];

        estimator.annotate(&mut tickets, &busy);
        assert_eq!(tickets[0].estimated_wait_minutes, Some(1));
    }

    #[test]
    fn test_missing_duration_uses_configured_fallback() {
        let mut config = QueueConfig::default();
        config.service_durations.insert("sauna".to_string(), 40);
        let estimator = WaitEstimator::new(config);
        let service_id = Uuid::new_v4();

        let mut tickets = vec![
            ticket(1, TicketStatus::InQueue, service_id, None),
            ticket(2, TicketStatus::InQueue, service_id, None),
            ticket(3, TicketStatus::InQueue, service_id, None),
            ticket(4, TicketStatus::InQueue, service_id, None),
        ];
        estimator.annotate(&mut tickets, &[]);
        // equipment 3 with fallback duration 40: fourth ticket waits 40
        assert_eq!(tickets[3].estimated_wait_minutes, Some(40));
    }

    #[test]
    fn test_eta_floor_is_one_minute() {
        assert_eq!(eta_minutes(1, 10, 3, false), 1);
        assert_eq!(eta_minutes(1, 0, 3, false), 1);
    }

    proptest! {
        #[test]
        fn test_eta_non_decreasing_in_position(
            duration in 1i64..=180,
            capacity in 1i32..=8,
            position in 1i32..=200,
            busy in proptest::bool::ANY,
        ) {
            let at_p = eta_minutes(position, duration, capacity, busy);
            let at_next = eta_minutes(position + 1, duration, capacity, busy);
            prop_assert!(at_next >= at_p);
        }
    }
}
