//! Repository port traits for database access.
//!
//! One trait per aggregate. Gang counters are only changed through
//! [`GangRepo::adjust`] so adapters can apply them as single atomic
//! increments.

use async_trait::async_trait;
use gangbook_domain::*;

use super::error::RepoError;

// =============================================================================
// Roster
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FighterRepo: Send + Sync {
    async fn get(&self, id: FighterId) -> Result<Option<Fighter>, RepoError>;
    /// Insert or replace the full fighter row.
    async fn save(&self, fighter: &Fighter) -> Result<(), RepoError>;
    /// Delete the fighter with its equipment, effects and skills.
    async fn delete(&self, id: FighterId) -> Result<(), RepoError>;
    async fn list_in_gang(&self, gang_id: GangId) -> Result<Vec<Fighter>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GangRepo: Send + Sync {
    async fn get(&self, id: GangId) -> Result<Option<Gang>, RepoError>;
    async fn save(&self, gang: &Gang) -> Result<(), RepoError>;
    /// Atomically add `delta` to the gang's counters and return the new row.
    async fn adjust(&self, id: GangId, delta: GangDelta) -> Result<Gang, RepoError>;
}

// =============================================================================
// Effects
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EffectRepo: Send + Sync {
    async fn get(&self, id: FighterEffectId) -> Result<Option<FighterEffect>, RepoError>;
    /// All effects of a fighter, each with its modifiers.
    async fn list_for_fighter(&self, fighter_id: FighterId) -> Result<Vec<FighterEffect>, RepoError>;
    /// Insert an effect together with its modifiers.
    async fn create(&self, effect: &FighterEffect) -> Result<(), RepoError>;
    async fn update_modifier(
        &self,
        id: FighterEffectModifierId,
        value: i32,
    ) -> Result<(), RepoError>;
    async fn delete_modifiers(&self, ids: &[FighterEffectModifierId]) -> Result<(), RepoError>;
    /// Delete effects (and any modifiers they still own).
    async fn delete_effects(&self, ids: &[FighterEffectId]) -> Result<(), RepoError>;
    /// Delete every effect granted by the given equipment rows.
    async fn delete_for_equipment(&self, ids: &[FighterEquipmentId]) -> Result<(), RepoError>;
    async fn list_effect_types(&self) -> Result<Vec<EffectType>, RepoError>;
}

// =============================================================================
// Equipment & skills
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EquipmentRepo: Send + Sync {
    async fn get(&self, id: FighterEquipmentId) -> Result<Option<FighterEquipment>, RepoError>;
    async fn list_for_fighter(&self, fighter_id: FighterId) -> Result<Vec<FighterEquipment>, RepoError>;
    /// Insert or replace one row.
    async fn save(&self, equipment: &FighterEquipment) -> Result<(), RepoError>;
    async fn delete(&self, ids: &[FighterEquipmentId]) -> Result<(), RepoError>;
    async fn get_catalog_item(&self, id: EquipmentId) -> Result<Option<EquipmentCatalogItem>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SkillRepo: Send + Sync {
    async fn get(&self, id: FighterSkillId) -> Result<Option<FighterSkill>, RepoError>;
    async fn list_for_fighter(&self, fighter_id: FighterId) -> Result<Vec<FighterSkill>, RepoError>;
    async fn create(&self, skill: &FighterSkill) -> Result<(), RepoError>;
    async fn delete(&self, id: FighterSkillId) -> Result<(), RepoError>;
}
