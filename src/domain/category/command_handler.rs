use std::sync::Arc;

use uuid::Uuid;

use super::errors::CategoryCommandError;
use super::flatten::flatten;
use super::query::filter_roots;
use super::value_objects::FlatCategory;
use crate::store::RecordStore;

// ============================================================================
// Category Command Handler
// ============================================================================
//
// Orchestrates: Store -> (search) -> Flatten -> rows for the tree grid
//
// ============================================================================

pub struct CategoryCommandHandler {
    store: Arc<dyn RecordStore>,
}

impl CategoryCommandHandler {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Fetch the forest and flatten it, optionally keeping only matching roots
    pub async fn load_rows(&self, search: Option<&str>) -> Result<Vec<FlatCategory>, CategoryCommandError> {
        let forest = self.store.fetch_category_forest().await?;

        let forest = match search {
            Some(term) => filter_roots(&forest, term),
            None => forest,
        };

        let rows = flatten(&forest, None);
        tracing::debug!(roots = forest.len(), rows = rows.len(), "Flattened category forest");
        Ok(rows)
    }

    /// Delete a category, then reload the rows from the store
    pub async fn delete(
        &self,
        id: Uuid,
        search: Option<&str>,
    ) -> Result<Vec<FlatCategory>, CategoryCommandError> {
        if let Err(error) = self.store.delete_category(id).await {
            tracing::error!(category_id = %id, error = %error, "Category delete failed");
            return Err(error.into());
        }

        tracing::info!(category_id = %id, "Category deleted");
        self.load_rows(search).await
    }
}
