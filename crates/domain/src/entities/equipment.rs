//! Equipment owned by a gang, either carried by a fighter or in the stash.

use serde::{Deserialize, Serialize};

use crate::ids::{EquipmentId, FighterEquipmentId, FighterId, GangId};
use crate::value_objects::purchase_price;

/// Catalogue row for a purchasable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentCatalogItem {
    pub id: EquipmentId,
    pub name: String,
    pub base_cost: i64,
}

impl EquipmentCatalogItem {
    pub fn new(name: impl Into<String>, base_cost: i64) -> Self {
        Self {
            id: EquipmentId::new(),
            name: name.into(),
            base_cost,
        }
    }
}

/// A purchased or granted item instance.
///
/// `fighter_id = None` means the item sits in the gang stash and does not
/// count toward anyone's cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterEquipment {
    pub id: FighterEquipmentId,
    pub gang_id: GangId,
    pub fighter_id: Option<FighterId>,
    pub equipment_id: EquipmentId,
    pub name: String,
    pub cost: i64,
    pub master_crafted: bool,
    /// Item this one is mounted on (one level only)
    pub target_equipment_id: Option<FighterEquipmentId>,
}

impl FighterEquipment {
    /// Instance bought from the catalogue for `fighter_id`.
    ///
    /// `cost_override` replaces the catalogue base cost (trading-post deals)
    /// before the master-crafted markup is applied.
    pub fn purchased(
        gang_id: GangId,
        fighter_id: FighterId,
        item: &EquipmentCatalogItem,
        master_crafted: bool,
        cost_override: Option<i64>,
    ) -> Self {
        let base = cost_override.unwrap_or(item.base_cost);
        Self {
            id: FighterEquipmentId::new(),
            gang_id,
            fighter_id: Some(fighter_id),
            equipment_id: item.id,
            name: item.name.clone(),
            cost: purchase_price(base, master_crafted),
            master_crafted,
            target_equipment_id: None,
        }
    }

    pub fn is_stashed(&self) -> bool {
        self.fighter_id.is_none()
    }

    /// Items carried by the fighter, excluding the stash.
    pub fn carried_by(items: &[FighterEquipment], fighter_id: FighterId) -> impl Iterator<Item = &FighterEquipment> {
        items.iter().filter(move |e| e.fighter_id == Some(fighter_id))
    }

    /// The item itself plus everything mounted on it.
    pub fn with_mounted<'a>(
        items: &'a [FighterEquipment],
        id: FighterEquipmentId,
    ) -> Vec<&'a FighterEquipment> {
        items
            .iter()
            .filter(|e| e.id == id || e.target_equipment_id == Some(id))
            .collect()
    }
}
