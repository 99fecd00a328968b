use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Category Value Objects
// ============================================================================

/// Category in nested form, as returned by the API.
///
/// Children are owned, so a node can never be its own ancestor.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    pub id: Uuid,
    pub category_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub active: bool,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub children: Vec<CategoryNode>,
}

/// One row of the flattened tree grid
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlatCategory {
    pub id: Uuid,
    pub category_name: String,
    pub description: String,
    pub parent_id: Option<Uuid>,
    pub active: bool,
}
