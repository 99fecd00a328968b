use super::value_objects::{MilestoneDates, OrderStatus};

// ============================================================================
// Order Commands - Represent operator intent
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum OrderCommand {
    UpdateStatus { target: OrderStatus },
    /// Same rule as moving to Cancelled, kept apart for the confirm dialog
    Cancel,
    UpdateTimeline { dates: MilestoneDates },
}

impl OrderCommand {
    pub fn name(&self) -> &'static str {
        match self {
            OrderCommand::UpdateStatus { .. } => "update_status",
            OrderCommand::Cancel => "cancel",
            OrderCommand::UpdateTimeline { .. } => "update_timeline",
        }
    }
}
