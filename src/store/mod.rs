// ============================================================================
// Record Store - boundary to the back-office REST API
// ============================================================================
//
// The record store is the single source of truth. Writes return nothing;
// callers refetch to see the canonical state.
//
// - http.rs   - reqwest-backed client for the admin API
// - memory.rs - in-process store for tests and offline runs
//
// ============================================================================

mod http;
mod memory;

pub use http::HttpRecordStore;
pub use memory::MemoryRecordStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::category::CategoryNode;
use crate::domain::order::{MilestoneDates, Order};
use crate::utils::IsTransient;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Store rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl IsTransient for StoreError {
    fn is_transient(&self) -> bool {
        match self {
            StoreError::Transport(_) | StoreError::Unavailable(_) => true,
            StoreError::Rejected { status, .. } => *status >= 500,
            StoreError::NotFound(_) | StoreError::Decode(_) => false,
        }
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn fetch_order(&self, id: Uuid) -> Result<Order, StoreError>;

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;

    async fn update_order_status(&self, order_id: Uuid, status_id: Uuid) -> Result<(), StoreError>;

    async fn update_order_timeline(
        &self,
        order_id: Uuid,
        dates: &MilestoneDates,
    ) -> Result<(), StoreError>;

    /// Nested category forest
    async fn fetch_category_forest(&self) -> Result<Vec<CategoryNode>, StoreError>;

    async fn delete_category(&self, id: Uuid) -> Result<(), StoreError>;
}
