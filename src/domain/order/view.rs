use super::lifecycle::{allowed_targets, can_edit_timeline, progress, Progress};
use super::pricing::{OrderSummary, PricingPolicy};
use super::value_objects::{status_label, Order, OrderStatus, StatusTone};

/// Everything an order screen needs, derived from one canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderView {
    pub order: Order,
    pub status: Option<OrderStatus>,
    pub status_label: String,
    pub tone: StatusTone,
    pub progress: Progress,
    pub timeline_editable: bool,
    pub allowed_targets: Vec<OrderStatus>,
    pub summary: OrderSummary,
}

impl OrderView {
    pub fn build(order: Order, pricing: &dyn PricingPolicy) -> Self {
        let status = order.status();

        Self {
            status,
            status_label: status_label(order.status_id),
            tone: status.map(OrderStatus::tone).unwrap_or(StatusTone::Info),
            progress: progress(order.status_id),
            timeline_editable: can_edit_timeline(&order),
            allowed_targets: allowed_targets(order.status_id),
            summary: OrderSummary::compute(&order, pricing),
            order,
        }
    }

    pub fn progress_step(&self) -> i8 {
        self.progress.step()
    }
}
