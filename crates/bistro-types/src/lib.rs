//! Common types module for the bistro ordering system.
//!
//! This module defines the core data types and structures used throughout
//! the ordering backend. It provides a centralized location for shared types
//! to ensure consistency across all components.

/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Cart line items and their snapshot-pricing rules.
pub mod cart;
/// Menu catalog record types.
pub mod catalog;
/// Domain error taxonomy shared by all services.
pub mod error;
/// Principal, user, and role types for request identity.
pub mod identity;
/// Order and order-item records, status, and patch shapes.
pub mod order;

// Re-export all types for convenient access
pub use api::*;
pub use cart::*;
pub use catalog::*;
pub use error::*;
pub use identity::*;
pub use order::*;
