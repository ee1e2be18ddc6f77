//! Domain entities.

mod effect;
mod equipment;
mod fighter;
mod gang;
mod skill;

pub use effect::{stat_total, EffectCategory, EffectType, FighterEffect, FighterEffectModifier};
pub use equipment::{EquipmentCatalogItem, FighterEquipment};
pub use fighter::{DetailsChange, Fighter, FighterDetailsPatch, StatusChange};
pub use gang::{Gang, GangDelta};
pub use skill::{AdvancementCost, AdvancementRef, FighterSkill};
