//! Cost rules shared by the server and the optimistic client patches.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Price of a master-crafted item: base cost raised by 25%, rounded up to
/// the nearest 5 credits.
///
/// `ceil(base * 1.25 / 5) * 5` reduces to `ceil(base / 4) * 5`.
///
/// ```
/// use gangbook_domain::value_objects::master_crafted_cost;
///
/// assert_eq!(master_crafted_cost(100), 125);
/// assert_eq!(master_crafted_cost(30), 40);
/// assert_eq!(master_crafted_cost(0), 0);
/// ```
pub fn master_crafted_cost(base_cost: i64) -> i64 {
    if base_cost <= 0 {
        return base_cost;
    }
    ((base_cost + 3) / 4) * 5
}

/// Purchase price for a piece of equipment.
pub fn purchase_price(base_cost: i64, master_crafted: bool) -> i64 {
    if master_crafted {
        master_crafted_cost(base_cost)
    } else {
        base_cost
    }
}

/// Reject negative credit amounts (sell values, prices, refunds).
pub fn ensure_non_negative(field: &'static str, value: i64) -> Result<i64, DomainError> {
    if value < 0 {
        return Err(DomainError::validation(format!(
            "{} cannot be negative (got {})",
            field, value
        )));
    }
    Ok(value)
}

/// Components of a fighter's effective total cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub base: i64,
    pub equipment: i64,
    pub effects: i64,
    pub skills: i64,
    pub adjustment: i64,
}

impl CostBreakdown {
    pub fn total(&self) -> i64 {
        self.base + self.equipment + self.effects + self.skills + self.adjustment
    }
}
