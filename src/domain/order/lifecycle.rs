use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use uuid::Uuid;

use super::errors::{OrderError, TransitionRejection};
use super::value_objects::{status_label, MilestoneDates, Order, OrderStatus};

// ============================================================================
// Order Lifecycle - status transitions and timeline edits
// ============================================================================
//
// Rules:
// - Cancelled is terminal: no transition leaves it, not even to itself
// - Any other status may move to any different status, Cancelled included
// - Milestone dates are editable only while the order is not cancelled
//
// Everything here is pure. Callers persist through the record store and
// refetch; the patched copies returned below are never authoritative.
//
// ============================================================================

/// Where an order sits on the progress indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Cancelled,
    Step(u8),
    /// Status id is not in the catalogue
    Unknown(Uuid),
}

impl Progress {
    /// Indicator value: -1 when cancelled, 0 for unknown ids.
    pub fn step(self) -> i8 {
        match self {
            Progress::Cancelled => -1,
            Progress::Step(rank) => rank as i8,
            Progress::Unknown(_) => 0,
        }
    }
}

pub fn progress(status_id: Uuid) -> Progress {
    match OrderStatus::from_id(status_id) {
        Some(status) => match status.rank() {
            Some(rank) => Progress::Step(rank),
            None => Progress::Cancelled,
        },
        None => {
            tracing::warn!(
                status_id = %status_id,
                "Status id not in catalogue, showing initial step"
            );
            Progress::Unknown(status_id)
        }
    }
}

pub fn progress_step(status_id: Uuid) -> i8 {
    progress(status_id).step()
}

pub fn can_transition(current_status_id: Uuid, target: OrderStatus) -> bool {
    check_transition(current_status_id, target).is_ok()
}

/// Same rule as [`can_transition`], reporting why a move is refused.
pub fn check_transition(current_status_id: Uuid, target: OrderStatus) -> Result<(), OrderError> {
    let reason = if current_status_id == OrderStatus::Cancelled.id() {
        Some(TransitionRejection::Terminal)
    } else if current_status_id == target.id() {
        Some(TransitionRejection::Unchanged)
    } else {
        None
    };

    match reason {
        Some(reason) => Err(OrderError::InvalidTransition {
            from: status_label(current_status_id),
            to: target,
            reason,
        }),
        None => Ok(()),
    }
}

/// Statuses an operator may pick from the current one, in catalogue order
pub fn allowed_targets(current_status_id: Uuid) -> Vec<OrderStatus> {
    OrderStatus::ALL
        .into_iter()
        .filter(|target| can_transition(current_status_id, *target))
        .collect()
}

pub fn apply_status_update(order: &Order, target: OrderStatus) -> Result<Order, OrderError> {
    check_transition(order.status_id, target)?;

    Ok(Order {
        status_id: target.id(),
        ..order.clone()
    })
}

pub fn can_edit_timeline(order: &Order) -> bool {
    !order.is_cancelled()
}

/// Replace all three milestones; `None` fields clear the milestone.
pub fn apply_timeline_update(order: &Order, dates: MilestoneDates) -> Result<Order, OrderError> {
    if !can_edit_timeline(order) {
        return Err(OrderError::TimelineLocked);
    }

    Ok(Order {
        order_approved_at: dates.order_approved_at,
        order_delivered_carrier_date: dates.order_delivered_carrier_date,
        order_delivered_customer_date: dates.order_delivered_customer_date,
        ..order.clone()
    })
}

// ============================================================================
// Timestamp normalization
// ============================================================================

const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Normalize an editor value to a UTC instant.
///
/// Empty input clears the milestone. Full RFC 3339 instants are kept as they
/// are; minute or second granularity local values are read in `offset`.
pub fn parse_milestone(
    input: &str,
    offset: FixedOffset,
) -> Result<Option<DateTime<Utc>>, OrderError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Ok(Some(instant.with_timezone(&Utc)));
    }

    for format in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return offset
                .from_local_datetime(&naive)
                .single()
                .map(|local| Some(local.with_timezone(&Utc)))
                .ok_or_else(|| OrderError::InvalidTimestamp(input.to_string()));
        }
    }

    Err(OrderError::InvalidTimestamp(input.to_string()))
}

impl MilestoneDates {
    /// Build a milestone set from the three editor fields
    pub fn parse(
        approved_at: &str,
        carrier_date: &str,
        customer_date: &str,
        offset: FixedOffset,
    ) -> Result<Self, OrderError> {
        Ok(Self {
            order_approved_at: parse_milestone(approved_at, offset)?,
            order_delivered_carrier_date: parse_milestone(carrier_date, offset)?,
            order_delivered_customer_date: parse_milestone(customer_date, offset)?,
        })
    }
}
