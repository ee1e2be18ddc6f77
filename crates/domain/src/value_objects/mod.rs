//! Value objects shared across entities.

mod fighter_state;
mod pricing;
mod stat;

pub use fighter_state::{FighterState, RatingShift, StatusAction};
pub use pricing::{
    ensure_non_negative, master_crafted_cost, purchase_price, CostBreakdown,
};
pub use stat::{ModifierSign, Stat};
