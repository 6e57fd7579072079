//! # orders-core: Pure Domain Logic for the Orders Store
//!
//! This crate holds the order and position types together with the rules
//! that keep them consistent. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Orders Store Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Caller / orders-demo                         │   │
//! │  │    open repository ──► add / update / delete ──► complete       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ orders-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │   types   │  │   stats   │  │ validation│                  │   │
//! │  │   │   Order   │  │   mean    │  │   rules   │                  │   │
//! │  │   │ Position  │  │  min/max  │  │  checks   │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • PURE FUNCTIONS                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 orders-db (Database Layer)                      │   │
//! │  │          unit-of-work, repositories, schema setup               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Order, Position)
//! - [`stats`] - Mean / min / max helpers for aggregate queries
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use orders_core::{Order, Position};
//!
//! let order = Order::new(1).with_positions(vec![
//!     Position::new("KX888", "t-shirts_l_s", 1500, 10.0),
//!     Position::new("KZ999", "shorts", 1500, 10.0),
//! ]);
//!
//! // Aggregates are derived from the positions, never set directly
//! assert_eq!(order.qty(), 3000);
//! assert_eq!(order.qtyc(), 30000.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod stats;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::ValidationError;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a position name (`Position.name VARCHAR(5)`).
pub const MAX_POSITION_NAME_LEN: usize = 5;

/// Maximum length of a position subclass (`Position.subclass VARCHAR(50)`).
pub const MAX_SUBCLASS_LEN: usize = 50;
