use crate::store::StoreError;

// ============================================================================
// Category Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CategoryCommandError {
    #[error(transparent)]
    Store(#[from] StoreError),
}
