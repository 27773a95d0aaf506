//! Router Module Index
//!
//! Splits the routing table by concern. Both routers share `AppState` and are
//! merged in `create_router`.

/// Operational routes: liveness.
pub mod public;

/// Marketplace routes under `/api`. Identity travels in the request itself
/// (`userId` + `role`) and is checked by the handlers.
pub mod api;
