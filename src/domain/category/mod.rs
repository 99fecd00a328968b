// ============================================================================
// Category Domain - hierarchy materialization for the tree grid
// ============================================================================
//
// - Value objects (CategoryNode, FlatCategory)
// - Flattening and rebuilding of the category forest
// - Root search
// - Command handler (fetch -> flatten, delete -> refetch)
//
// ============================================================================

pub mod value_objects;
pub mod flatten;
pub mod query;
pub mod errors;
pub mod command_handler;

pub use value_objects::*;
pub use flatten::*;
pub use query::*;
pub use errors::*;
pub use command_handler::*;
