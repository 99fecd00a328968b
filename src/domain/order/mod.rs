// ============================================================================
// Order Domain - fulfillment lifecycle for the back office
// ============================================================================
//
// - Value objects (OrderStatus catalogue, Order, OrderItem, MilestoneDates)
// - Lifecycle rules (transitions, timeline lock, progress step)
// - Pricing (subtotal, injectable tax/shipping policy)
// - Commands, errors, list filter and screen view
// - Command handler (validate -> write -> refetch)
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod lifecycle;
pub mod pricing;
pub mod commands;
pub mod query;
pub mod view;
pub mod command_handler;

pub use value_objects::*;
pub use errors::*;
pub use lifecycle::*;
pub use pricing::*;
pub use commands::*;
pub use query::*;
pub use view::*;
pub use command_handler::*;
