//! # Domain Types
//!
//! Core domain types of the orders store.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐        owns        ┌─────────────────────┐    │
//! │  │       Order         │ ─────────────────► │      Position       │    │
//! │  │  ─────────────────  │      0..n          │  ─────────────────  │    │
//! │  │  id (i64, PK)       │                    │  name (≤5 chars)    │    │
//! │  │  date (NaiveDate)   │                    │  subclass           │    │
//! │  │  qty  = Σ qty       │                    │  qty (i64)          │    │
//! │  │  qtyc = Σ qty*cost  │                    │  costprice (f64)    │    │
//! │  └─────────────────────┘                    └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Derived Aggregates
//! `qty` and `qtyc` are recomputed every time the position list changes.
//! There is no setter for either of them.

use std::fmt;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

// =============================================================================
// Position
// =============================================================================

/// A single line item of an order, identified within the order by `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Position {
    /// Short identifier, unique within one order.
    pub name: String,

    /// Descriptive category.
    pub subclass: String,

    /// Number of units.
    pub qty: i64,

    /// Unit cost.
    pub costprice: f64,
}

impl Position {
    /// Creates a new position.
    pub fn new(name: impl Into<String>, subclass: impl Into<String>, qty: i64, costprice: f64) -> Self {
        Position {
            name: name.into(),
            subclass: subclass.into(),
            qty,
            costprice,
        }
    }

    /// Total cost of this line (`qty * costprice`).
    #[inline]
    pub fn line_cost(&self) -> f64 {
        self.qty as f64 * self.costprice
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Position(name='{}', subclass='{}', qty='{}', costprice='{}')>",
            self.name, self.subclass, self.qty, self.costprice
        )
    }
}

// =============================================================================
// Order
// =============================================================================

/// An order header owning a list of positions.
///
/// ## Construction
/// ```rust
/// use chrono::NaiveDate;
/// use orders_core::{Order, Position};
///
/// let order = Order::new(2)
///     .with_date(NaiveDate::from_ymd_opt(2016, 1, 18).unwrap())
///     .with_positions(vec![Position::new("ZA965", "jackets", 300, 102.5)]);
///
/// assert_eq!(order.qty(), 300);
/// assert_eq!(order.qtyc(), 30750.0);
/// ```
///
/// Deserializing ignores any `qty` / `qtyc` in the input and recomputes
/// them from the positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "OrderData")]
pub struct Order {
    id: i64,
    date: NaiveDate,
    positions: Vec<Position>,
    qty: i64,
    qtyc: f64,
}

impl Order {
    /// Creates an empty order dated today.
    ///
    /// Every order gets its own position list; nothing is shared between
    /// instances.
    pub fn new(id: i64) -> Self {
        Order {
            id,
            date: Local::now().date_naive(),
            positions: Vec::new(),
            qty: 0,
            qtyc: 0.0,
        }
    }

    /// Sets the order date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Replaces the positions and recomputes the aggregates.
    pub fn with_positions(mut self, positions: Vec<Position>) -> Self {
        self.positions = positions;
        self.recompute();
        self
    }

    /// Appends one position and recomputes the aggregates.
    pub fn push_position(&mut self, position: Position) {
        self.positions.push(position);
        self.recompute();
    }

    /// Rebuilds an order from a stored header and its stored positions.
    ///
    /// The header's `qty` and `qtyc` are taken as persisted rather than
    /// recomputed. Use [`Order::totals_consistent`] to check them.
    pub fn restore(id: i64, date: NaiveDate, qty: i64, qtyc: f64, positions: Vec<Position>) -> Self {
        Order {
            id,
            date,
            positions,
            qty,
            qtyc,
        }
    }

    #[inline]
    pub fn id(&self) -> i64 {
        self.id
    }

    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[inline]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Sum of position quantities.
    #[inline]
    pub fn qty(&self) -> i64 {
        self.qty
    }

    /// Sum of `qty * costprice` over all positions.
    #[inline]
    pub fn qtyc(&self) -> f64 {
        self.qtyc
    }

    /// Whether the aggregates agree with the positions.
    pub fn totals_consistent(&self) -> bool {
        let (qty, qtyc) = totals(&self.positions);
        qty == self.qty && (qtyc - self.qtyc).abs() < 1e-6
    }

    fn recompute(&mut self) {
        let (qty, qtyc) = totals(&self.positions);
        self.qty = qty;
        self.qtyc = qtyc;
    }
}

/// Wire form of an [`Order`]: everything but the aggregates.
#[derive(Deserialize)]
struct OrderData {
    id: i64,
    date: NaiveDate,
    #[serde(default)]
    positions: Vec<Position>,
}

impl From<OrderData> for Order {
    fn from(data: OrderData) -> Self {
        Order::new(data.id)
            .with_date(data.date)
            .with_positions(data.positions)
    }
}

/// Quantities saturate at `i64::MAX` instead of overflowing.
fn totals(positions: &[Position]) -> (i64, f64) {
    positions.iter().fold((0i64, 0.0), |(qty, qtyc), p| {
        (qty.saturating_add(p.qty), qtyc + p.line_cost())
    })
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Order(id='{}', date='{}', qty='{}', qtyc='{}', items='[",
            self.id, self.date, self.qty, self.qtyc
        )?;
        for (i, position) in self.positions.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{position}")?;
        }
        write!(f, "]')>")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
