//! Fighter effects - named stat adjustments made of one or more modifiers.

use serde::{Deserialize, Serialize};

use crate::ids::{
    EffectTypeId, FighterEffectId, FighterEffectModifierId, FighterEquipmentId, FighterId, UserId,
};
use crate::value_objects::{ModifierSign, Stat};

/// Where an effect came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectCategory {
    /// Manual stat adjustment chosen on the fighter's effects screen
    User,
    /// Purchased characteristic increase
    Advancement,
    /// Granted by a piece of equipment
    Equipment,
    Injury,
}

impl EffectCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Advancement => "advancement",
            Self::Equipment => "equipment",
            Self::Injury => "injury",
        }
    }
}

impl std::str::FromStr for EffectCategory {
    type Err = crate::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "advancement" => Ok(Self::Advancement),
            "equipment" => Ok(Self::Equipment),
            "injury" => Ok(Self::Injury),
            other => Err(crate::DomainError::parse(format!(
                "Unknown effect category: {}",
                other
            ))),
        }
    }
}

/// One `(stat, value)` pair owned by an effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterEffectModifier {
    pub id: FighterEffectModifierId,
    pub effect_id: FighterEffectId,
    pub stat: Stat,
    pub value: i32,
}

/// A named modifier instance attached to a fighter.
///
/// # Invariants
///
/// - After a consolidation pass an effect always has at least one modifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterEffect {
    pub id: FighterEffectId,
    pub fighter_id: FighterId,
    pub name: String,
    pub category: EffectCategory,
    pub fighter_equipment_id: Option<FighterEquipmentId>,
    pub effect_type_id: Option<EffectTypeId>,
    /// Added to the fighter's cost (advancements)
    pub credits_increase: i64,
    /// XP spent on the effect, refunded on undo
    pub xp_cost: i64,
    /// User who created the effect
    pub user_id: Option<UserId>,
    pub modifiers: Vec<FighterEffectModifier>,
}

impl FighterEffect {
    pub fn new(fighter_id: FighterId, name: impl Into<String>, category: EffectCategory) -> Self {
        Self {
            id: FighterEffectId::new(),
            fighter_id,
            name: name.into(),
            category,
            fighter_equipment_id: None,
            effect_type_id: None,
            credits_increase: 0,
            xp_cost: 0,
            user_id: None,
            modifiers: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: FighterEffectId) -> Self {
        self.id = id;
        for modifier in &mut self.modifiers {
            modifier.effect_id = id;
        }
        self
    }

    /// Add a modifier row with a fresh id.
    pub fn with_modifier(mut self, stat: Stat, value: i32) -> Self {
        self.modifiers.push(FighterEffectModifier {
            id: FighterEffectModifierId::new(),
            effect_id: self.id,
            stat,
            value,
        });
        self
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_costs(mut self, xp_cost: i64, credits_increase: i64) -> Self {
        self.xp_cost = xp_cost;
        self.credits_increase = credits_increase;
        self
    }

    /// Build the effect the consolidator creates for a leftover delta.
    pub fn from_effect_type(
        fighter_id: FighterId,
        effect_type: &EffectType,
        value: i32,
        user_id: Option<UserId>,
    ) -> Self {
        let mut effect = Self::new(fighter_id, effect_type.name.clone(), EffectCategory::User)
            .with_modifier(effect_type.stat, value);
        effect.effect_type_id = Some(effect_type.id);
        effect.user_id = user_id;
        effect
    }
}

/// Sum of every modifier for `stat` across `effects`.
pub fn stat_total(effects: &[FighterEffect], stat: Stat) -> i32 {
    effects
        .iter()
        .flat_map(|e| e.modifiers.iter())
        .filter(|m| m.stat == stat)
        .fold(0i32, |total, m| total.saturating_add(m.value))
}

/// Catalogue definition for a user stat adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectType {
    pub id: EffectTypeId,
    pub name: String,
    pub stat: Stat,
    pub sign: ModifierSign,
}

impl EffectType {
    pub fn new(name: impl Into<String>, stat: Stat, sign: ModifierSign) -> Self {
        Self {
            id: EffectTypeId::new(),
            name: name.into(),
            stat,
            sign,
        }
    }

    /// Default catalogue: one increase and one decrease per stat.
    pub fn default_catalogue() -> Vec<EffectType> {
        Stat::all()
            .into_iter()
            .flat_map(|stat| {
                [
                    EffectType::new(format!("{} increase", stat.short_name()), stat, ModifierSign::Positive),
                    EffectType::new(format!("{} decrease", stat.short_name()), stat, ModifierSign::Negative),
                ]
            })
            .collect()
    }
}
