// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Pure rules live next to the command handler that drives them against the
// record store. Nothing in the rule modules performs I/O.
//
// ============================================================================

pub mod order;
pub mod category;
