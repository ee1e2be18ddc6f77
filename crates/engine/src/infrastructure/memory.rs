//! In-memory store implementing every repository port.
//!
//! Backs `STORE=memory` and the end-to-end tests. One lock guards all
//! tables, so each port call is atomic just like a single SQL statement.

use std::collections::HashMap;

use async_trait::async_trait;
use gangbook_domain::*;
use tokio::sync::RwLock;

use crate::infrastructure::ports::{
    AuditEntry, AuditLogPort, EffectRepo, EquipmentRepo, FighterRepo, GangRepo, ImageStoragePort,
    RepoError, SkillRepo, StorageError,
};

#[derive(Default)]
struct Tables {
    gangs: HashMap<GangId, Gang>,
    fighters: HashMap<FighterId, Fighter>,
    /// Insertion order is kept so listings are stable.
    effects: Vec<FighterEffect>,
    effect_types: Vec<EffectType>,
    equipment: Vec<FighterEquipment>,
    catalog: HashMap<EquipmentId, EquipmentCatalogItem>,
    skills: Vec<FighterSkill>,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the default effect-type catalogue.
    pub async fn with_default_catalogue() -> Self {
        let store = Self::new();
        store.insert_effect_types(EffectType::default_catalogue()).await;
        store
    }

    pub async fn insert_gang(&self, gang: Gang) {
        self.tables.write().await.gangs.insert(gang.id, gang);
    }

    pub async fn insert_fighter(&self, fighter: Fighter) {
        self.tables.write().await.fighters.insert(fighter.id, fighter);
    }

    pub async fn insert_effect(&self, effect: FighterEffect) {
        self.tables.write().await.effects.push(effect);
    }

    pub async fn insert_effect_types(&self, types: Vec<EffectType>) {
        self.tables.write().await.effect_types.extend(types);
    }

    pub async fn insert_equipment(&self, equipment: FighterEquipment) {
        self.tables.write().await.equipment.push(equipment);
    }

    pub async fn insert_catalog_item(&self, item: EquipmentCatalogItem) {
        self.tables.write().await.catalog.insert(item.id, item);
    }

    pub async fn insert_skill(&self, skill: FighterSkill) {
        self.tables.write().await.skills.push(skill);
    }
}

#[async_trait]
impl FighterRepo for InMemoryStore {
    async fn get(&self, id: FighterId) -> Result<Option<Fighter>, RepoError> {
        Ok(self.tables.read().await.fighters.get(&id).cloned())
    }

    async fn save(&self, fighter: &Fighter) -> Result<(), RepoError> {
        self.tables
            .write()
            .await
            .fighters
            .insert(fighter.id, fighter.clone());
        Ok(())
    }

    async fn delete(&self, id: FighterId) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.fighters.remove(&id).is_none() {
            return Err(RepoError::not_found("Fighter", id));
        }
        tables.equipment.retain(|e| e.fighter_id != Some(id));
        tables.effects.retain(|e| e.fighter_id != id);
        tables.skills.retain(|s| s.fighter_id != id);
        Ok(())
    }

    async fn list_in_gang(&self, gang_id: GangId) -> Result<Vec<Fighter>, RepoError> {
        let tables = self.tables.read().await;
        let mut fighters: Vec<Fighter> = tables
            .fighters
            .values()
            .filter(|f| f.gang_id == gang_id)
            .cloned()
            .collect();
        fighters.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(fighters)
    }
}

#[async_trait]
impl GangRepo for InMemoryStore {
    async fn get(&self, id: GangId) -> Result<Option<Gang>, RepoError> {
        Ok(self.tables.read().await.gangs.get(&id).cloned())
    }

    async fn save(&self, gang: &Gang) -> Result<(), RepoError> {
        self.tables.write().await.gangs.insert(gang.id, gang.clone());
        Ok(())
    }

    async fn adjust(&self, id: GangId, delta: GangDelta) -> Result<Gang, RepoError> {
        let mut tables = self.tables.write().await;
        let gang = tables
            .gangs
            .get_mut(&id)
            .ok_or_else(|| RepoError::not_found("Gang", id))?;
        gang.apply(delta);
        Ok(gang.clone())
    }
}

#[async_trait]
impl EffectRepo for InMemoryStore {
    async fn get(&self, id: FighterEffectId) -> Result<Option<FighterEffect>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.effects.iter().find(|e| e.id == id).cloned())
    }

    async fn list_for_fighter(&self, fighter_id: FighterId) -> Result<Vec<FighterEffect>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .effects
            .iter()
            .filter(|e| e.fighter_id == fighter_id)
            .cloned()
            .collect())
    }

    async fn create(&self, effect: &FighterEffect) -> Result<(), RepoError> {
        self.tables.write().await.effects.push(effect.clone());
        Ok(())
    }

    async fn update_modifier(
        &self,
        id: FighterEffectModifierId,
        value: i32,
    ) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let modifier = tables
            .effects
            .iter_mut()
            .flat_map(|e| e.modifiers.iter_mut())
            .find(|m| m.id == id)
            .ok_or_else(|| RepoError::not_found("FighterEffectModifier", id))?;
        modifier.value = value;
        Ok(())
    }

    async fn delete_modifiers(&self, ids: &[FighterEffectModifierId]) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        for effect in tables.effects.iter_mut() {
            effect.modifiers.retain(|m| !ids.contains(&m.id));
        }
        Ok(())
    }

    async fn delete_effects(&self, ids: &[FighterEffectId]) -> Result<(), RepoError> {
        self.tables
            .write()
            .await
            .effects
            .retain(|e| !ids.contains(&e.id));
        Ok(())
    }

    async fn delete_for_equipment(&self, ids: &[FighterEquipmentId]) -> Result<(), RepoError> {
        self.tables.write().await.effects.retain(|e| {
            e.fighter_equipment_id
                .map_or(true, |equipment_id| !ids.contains(&equipment_id))
        });
        Ok(())
    }

    async fn list_effect_types(&self) -> Result<Vec<EffectType>, RepoError> {
        Ok(self.tables.read().await.effect_types.clone())
    }
}

#[async_trait]
impl EquipmentRepo for InMemoryStore {
    async fn get(&self, id: FighterEquipmentId) -> Result<Option<FighterEquipment>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.equipment.iter().find(|e| e.id == id).cloned())
    }

    async fn list_for_fighter(&self, fighter_id: FighterId) -> Result<Vec<FighterEquipment>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .equipment
            .iter()
            .filter(|e| e.fighter_id == Some(fighter_id))
            .cloned()
            .collect())
    }

    async fn save(&self, equipment: &FighterEquipment) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        match tables.equipment.iter_mut().find(|e| e.id == equipment.id) {
            Some(existing) => *existing = equipment.clone(),
            None => tables.equipment.push(equipment.clone()),
        }
        Ok(())
    }

    async fn delete(&self, ids: &[FighterEquipmentId]) -> Result<(), RepoError> {
        self.tables
            .write()
            .await
            .equipment
            .retain(|e| !ids.contains(&e.id));
        Ok(())
    }

    async fn get_catalog_item(&self, id: EquipmentId) -> Result<Option<EquipmentCatalogItem>, RepoError> {
        Ok(self.tables.read().await.catalog.get(&id).cloned())
    }
}

#[async_trait]
impl SkillRepo for InMemoryStore {
    async fn get(&self, id: FighterSkillId) -> Result<Option<FighterSkill>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.skills.iter().find(|s| s.id == id).cloned())
    }

    async fn list_for_fighter(&self, fighter_id: FighterId) -> Result<Vec<FighterSkill>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .skills
            .iter()
            .filter(|s| s.fighter_id == fighter_id)
            .cloned()
            .collect())
    }

    async fn create(&self, skill: &FighterSkill) -> Result<(), RepoError> {
        self.tables.write().await.skills.push(skill.clone());
        Ok(())
    }

    async fn delete(&self, id: FighterSkillId) -> Result<(), RepoError> {
        self.tables.write().await.skills.retain(|s| s.id != id);
        Ok(())
    }
}

// =============================================================================
// Audit log & image storage
// =============================================================================

/// Audit log kept in a vector.
#[derive(Default)]
pub struct InMemoryAuditLog {
    entries: RwLock<Vec<AuditEntry>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl AuditLogPort for InMemoryAuditLog {
    async fn record(&self, entry: &AuditEntry) -> Result<(), RepoError> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }
}

/// Object store keyed by path-like strings.
#[derive(Default)]
pub struct InMemoryImageStorage {
    objects: RwLock<Vec<String>>,
}

impl InMemoryImageStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, key: impl Into<String>) {
        self.objects.write().await.push(key.into());
    }

    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.clone()
    }
}

#[async_trait]
impl ImageStoragePort for InMemoryImageStorage {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let objects = self.objects.read().await;
        Ok(objects
            .iter()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StorageError> {
        self.objects.write().await.retain(|key| !keys.contains(key));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn adjust_applies_all_counters() {
        let store = InMemoryStore::new();
        let gang = Gang::new("Orlocks").with_credits(100).with_rating(500).with_meat(2);
        let gang_id = gang.id;
        store.insert_gang(gang).await;

        let updated = store
            .adjust(
                gang_id,
                GangDelta {
                    credits: -20,
                    rating: 35,
                    meat: -1,
                },
            )
            .await
            .unwrap();

        assert_eq!((updated.credits, updated.rating, updated.meat), (80, 535, 1));
    }

    #[tokio::test]
    async fn adjust_unknown_gang_is_not_found() {
        let store = InMemoryStore::new();
        let result = store.adjust(GangId::new(), GangDelta::credits(5)).await;
        assert!(matches!(result, Err(e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn fighter_delete_cascades() {
        let store = InMemoryStore::new();
        let gang = Gang::new("Eschers");
        let fighter = Fighter::new(gang.id, "Kyra", 65);
        let fighter_id = fighter.id;
        let item = EquipmentCatalogItem::new("Stub gun", 5);
        store
            .insert_equipment(FighterEquipment::purchased(gang.id, fighter_id, &item, false, None))
            .await;
        store
            .insert_effect(
                FighterEffect::new(fighter_id, "Scar", EffectCategory::Injury)
                    .with_modifier(Stat::Toughness, -1),
            )
            .await;
        store.insert_fighter(fighter).await;

        FighterRepo::delete(&store, fighter_id).await.unwrap();

        assert!(FighterRepo::get(&store, fighter_id).await.unwrap().is_none());
        assert!(EquipmentRepo::list_for_fighter(&store, fighter_id).await.unwrap().is_empty());
        assert!(EffectRepo::list_for_fighter(&store, fighter_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn image_listing_filters_prefix() {
        let images = InMemoryImageStorage::new();
        images.put("fighters/g1/f1/portrait.png").await;
        images.put("fighters/g1/f2/portrait.png").await;

        let keys = images.list("fighters/g1/f1").await.unwrap();
        assert_eq!(keys, vec!["fighters/g1/f1/portrait.png".to_string()]);

        images.delete(&keys).await.unwrap();
        assert_eq!(images.keys().await.len(), 1);
    }
}
