//! # Validation Module
//!
//! Input validation for orders and positions.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE (before any statement runs)                      │
//! │  ├── name present, at most 5 characters                                │
//! │  ├── subclass at most 50 characters                                    │
//! │  ├── cost price finite                                                 │
//! │  └── position names unique within the order                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── PRIMARY KEY (name, position_id)                                   │
//! │  └── Foreign key Position.position_id → Orders.id                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQLite does not enforce `VARCHAR(n)` lengths, so the length checks only
//! happen here.
//!
//! ## Usage
//! ```rust
//! use orders_core::validation::validate_position_name;
//!
//! assert!(validate_position_name("KX888").is_ok());
//! assert!(validate_position_name("KX8889").is_err());
//! ```

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::{Order, Position};
use crate::{MAX_POSITION_NAME_LEN, MAX_SUBCLASS_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a position name.
///
/// ## Rules
/// - Must not be empty
/// - At most 5 characters
pub fn validate_position_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_POSITION_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_POSITION_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a subclass. Empty is allowed.
pub fn validate_subclass(subclass: &str) -> ValidationResult<()> {
    if subclass.chars().count() > MAX_SUBCLASS_LEN {
        return Err(ValidationError::TooLong {
            field: "subclass".to_string(),
            max: MAX_SUBCLASS_LEN,
        });
    }

    Ok(())
}

/// Validates a unit cost. SQLite stores NaN as NULL, which the
/// `NOT NULL` constraint would reject later with a less useful message.
pub fn validate_costprice(costprice: f64) -> ValidationResult<()> {
    if !costprice.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "costprice".to_string(),
            reason: format!("must be a finite number, got {costprice}"),
        });
    }

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates every field of a position.
pub fn validate_position(position: &Position) -> ValidationResult<()> {
    validate_position_name(&position.name)?;
    validate_subclass(&position.subclass)?;
    validate_costprice(position.costprice)?;
    Ok(())
}

/// Validates an order and all of its positions.
///
/// ## Rules
/// - Every position is valid
/// - No two positions share a name (the store keys positions by
///   `(name, order id)`)
pub fn validate_order(order: &Order) -> ValidationResult<()> {
    let mut seen = HashSet::with_capacity(order.positions().len());

    for position in order.positions() {
        validate_position(position)?;

        if !seen.insert(position.name.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "position name".to_string(),
                value: position.name.clone(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_position_name() {
        assert!(validate_position_name("KX888").is_ok());
        assert!(validate_position_name("A").is_ok());

        assert!(matches!(
            validate_position_name(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_position_name("   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_position_name("KX8888"),
            Err(ValidationError::TooLong { max: 5, .. })
        ));
    }

    #[test]
    fn test_validate_subclass() {
        assert!(validate_subclass("").is_ok());
        assert!(validate_subclass("t-shirts_l_s").is_ok());
        assert!(validate_subclass(&"s".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_costprice() {
        assert!(validate_costprice(10.2).is_ok());
        assert!(validate_costprice(0.0).is_ok());
        assert!(validate_costprice(f64::NAN).is_err());
        assert!(validate_costprice(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_order_rejects_duplicate_names() {
        let order = Order::new(1).with_positions(vec![
            Position::new("KX888", "a", 1, 1.0),
            Position::new("KX888", "b", 2, 2.0),
        ]);

        assert_eq!(
            validate_order(&order),
            Err(ValidationError::Duplicate {
                field: "position name".to_string(),
                value: "KX888".to_string(),
            })
        );
    }

    #[test]
    fn test_validate_order_accepts_empty_and_distinct() {
        assert!(validate_order(&Order::new(1)).is_ok());

        let order = Order::new(2).with_positions(vec![
            Position::new("KY985", "t-shirts_s_s", 1000, 5.0),
            Position::new("KY988", "t-shirts_s_s", 1000, 5.0),
        ]);
        assert!(validate_order(&order).is_ok());
    }
}
