//! Gangbook domain.
//!
//! Pure types and rules for gang rosters: fighters and their lifecycle,
//! gangs and their resource pools, effects, equipment, advancements, and
//! the effect-modifier consolidator. No I/O lives here; the engine and the
//! client both build on these rules so the optimistic client computes the
//! same numbers as the server.

extern crate self as gangbook_domain;

pub mod consolidation;
pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use consolidation::{plan_stat_changes, ModifierCreate, ModifierPlan, ModifierUpdate};

pub use entities::{
    stat_total, AdvancementCost, AdvancementRef, DetailsChange, EffectCategory, EffectType,
    EquipmentCatalogItem, Fighter, FighterDetailsPatch, FighterEffect, FighterEffectModifier,
    FighterEquipment, FighterSkill, Gang, GangDelta, StatusChange,
};

pub use error::DomainError;

pub use ids::{
    EffectTypeId, EquipmentId, FighterEffectId, FighterEffectModifierId, FighterEquipmentId,
    FighterId, FighterSkillId, GangId, SkillId, UserId,
};

pub use value_objects::{
    ensure_non_negative, master_crafted_cost, purchase_price, CostBreakdown, FighterState,
    ModifierSign, RatingShift, Stat, StatusAction,
};
