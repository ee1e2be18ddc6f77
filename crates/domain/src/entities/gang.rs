//! Gang entity - owner of fighters and the shared resource pools.

use serde::{Deserialize, Serialize};

use crate::ids::GangId;

/// A gang.
///
/// `rating` is maintained incrementally through [`GangDelta`]s; nothing
/// recomputes it from the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gang {
    pub id: GangId,
    pub name: String,
    pub credits: i64,
    pub rating: i64,
    pub meat: i64,
}

impl Gang {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: GangId::new(),
            name: name.into(),
            credits: 0,
            rating: 0,
            meat: 0,
        }
    }

    pub fn with_id(mut self, id: GangId) -> Self {
        self.id = id;
        self
    }

    pub fn with_credits(mut self, credits: i64) -> Self {
        self.credits = credits;
        self
    }

    pub fn with_rating(mut self, rating: i64) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_meat(mut self, meat: i64) -> Self {
        self.meat = meat;
        self
    }

    pub fn apply(&mut self, delta: GangDelta) {
        self.credits += delta.credits;
        self.rating += delta.rating;
        self.meat += delta.meat;
    }
}

/// Signed change to a gang's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GangDelta {
    pub credits: i64,
    pub rating: i64,
    pub meat: i64,
}

impl GangDelta {
    pub fn rating(rating: i64) -> Self {
        Self {
            rating,
            ..Self::default()
        }
    }

    pub fn credits(credits: i64) -> Self {
        Self {
            credits,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.credits == 0 && self.rating == 0 && self.meat == 0
    }
}

impl std::ops::Neg for GangDelta {
    type Output = GangDelta;

    fn neg(self) -> Self::Output {
        GangDelta {
            credits: -self.credits,
            rating: -self.rating,
            meat: -self.meat,
        }
    }
}

impl std::ops::Add for GangDelta {
    type Output = GangDelta;

    fn add(self, rhs: Self) -> Self::Output {
        GangDelta {
            credits: self.credits + rhs.credits,
            rating: self.rating + rhs.rating,
            meat: self.meat + rhs.meat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_adds_every_counter() {
        let mut gang = Gang::new("Goliaths").with_credits(100).with_rating(900).with_meat(2);
        gang.apply(GangDelta {
            credits: 30,
            rating: -120,
            meat: -1,
        });
        assert_eq!((gang.credits, gang.rating, gang.meat), (130, 780, 1));
    }

    #[test]
    fn deltas_sum() {
        let total = GangDelta::rating(10) + GangDelta::credits(-5);
        assert_eq!(total, GangDelta { credits: -5, rating: 10, meat: 0 });
        assert!(GangDelta::default().is_empty());
    }

    #[test]
    fn negated_delta_undoes_apply() {
        let mut gang = Gang::new("Orlocks").with_credits(50).with_rating(400).with_meat(1);
        let delta = GangDelta {
            credits: -20,
            rating: 35,
            meat: -1,
        };
        gang.apply(delta);
        gang.apply(-delta);
        assert_eq!((gang.credits, gang.rating, gang.meat), (50, 400, 1));
    }
}
