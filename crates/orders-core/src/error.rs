//! # Error Types
//!
//! Domain-specific error types for orders-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  orders-core errors (this file)                                        │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  orders-db errors (separate crate)                                     │
//! │  ├── StoreError       - Categorized storage failure (the cause)        │
//! │  └── RepositoryError  - What callers see (context + causes)            │
//! │                                                                         │
//! │  Flow: ValidationError → StoreError → RepositoryError → Caller         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before an order reaches the store, so a rejected order never
/// leaves half-written rows behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long for its column.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid value (e.g., a non-finite cost price).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., two positions with the same name in one order).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::TooLong {
            field: "name".to_string(),
            max: 5,
        };
        assert_eq!(err.to_string(), "name must be at most 5 characters");

        let err = ValidationError::Duplicate {
            field: "position name".to_string(),
            value: "KX888".to_string(),
        };
        assert_eq!(err.to_string(), "position name 'KX888' already exists");
    }
}
