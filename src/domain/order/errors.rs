use std::fmt;

use uuid::Uuid;

use super::value_objects::OrderStatus;
use crate::store::StoreError;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

/// Why a status change was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionRejection {
    /// The order is cancelled; nothing leaves that status.
    Terminal,
    /// The target equals the current status.
    Unchanged,
}

impl fmt::Display for TransitionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionRejection::Terminal => f.write_str("order is cancelled"),
            TransitionRejection::Unchanged => f.write_str("status is unchanged"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderError {
    #[error("Cannot move order from {from} to {to}: {reason}")]
    InvalidTransition {
        from: String,
        to: OrderStatus,
        reason: TransitionRejection,
    },

    #[error("Order timeline is locked because the order is cancelled")]
    TimelineLocked,

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

// ============================================================================
// Command Errors - validation or store failures seen by the shell
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderCommandError {
    #[error(transparent)]
    Rejected(#[from] OrderError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Order {order_id} changed since it was loaded; reload before editing")]
    StaleOrder { order_id: Uuid },
}

impl OrderCommandError {
    /// Label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            OrderCommandError::Rejected(_) => "rejected",
            OrderCommandError::Store(_) => "store_error",
            OrderCommandError::StaleOrder { .. } => "stale",
        }
    }
}
