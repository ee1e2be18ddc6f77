//! SQLite equipment repository and catalogue.

use async_trait::async_trait;
use gangbook_domain::*;
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;

use super::{get_col, parse_col, parse_opt_col, placeholders};
use crate::infrastructure::ports::{EquipmentRepo, RepoError};

const COLUMNS: &str = "id, gang_id, fighter_id, equipment_id, name, cost, master_crafted, \
    target_equipment_id";

pub struct SqliteEquipmentRepo {
    pool: SqlitePool,
}

impl SqliteEquipmentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add or replace a catalogue row.
    pub async fn upsert_catalog_item(&self, item: &EquipmentCatalogItem) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO equipment_catalog (id, name, base_cost) VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET name = excluded.name, base_cost = excluded.base_cost
            "#,
        )
        .bind(item.id.to_string())
        .bind(&item.name)
        .bind(item.base_cost)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("upsert_catalog_item", e))?;
        Ok(())
    }
}

fn row_to_equipment(row: &SqliteRow) -> Result<FighterEquipment, RepoError> {
    Ok(FighterEquipment {
        id: parse_col(row, "id")?,
        gang_id: parse_col(row, "gang_id")?,
        fighter_id: parse_opt_col(row, "fighter_id")?,
        equipment_id: parse_col(row, "equipment_id")?,
        name: get_col(row, "name")?,
        cost: get_col(row, "cost")?,
        master_crafted: get_col(row, "master_crafted")?,
        target_equipment_id: parse_opt_col(row, "target_equipment_id")?,
    })
}

#[async_trait]
impl EquipmentRepo for SqliteEquipmentRepo {
    async fn get(&self, id: FighterEquipmentId) -> Result<Option<FighterEquipment>, RepoError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM fighter_equipment WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_equipment", e))?;
        row.as_ref().map(row_to_equipment).transpose()
    }

    async fn list_for_fighter(&self, fighter_id: FighterId) -> Result<Vec<FighterEquipment>, RepoError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM fighter_equipment WHERE fighter_id = ? ORDER BY rowid"
        ))
        .bind(fighter_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("list_equipment", e))?;
        rows.iter().map(row_to_equipment).collect()
    }

    async fn save(&self, equipment: &FighterEquipment) -> Result<(), RepoError> {
        sqlx::query(&format!(
            r#"
            INSERT INTO fighter_equipment ({COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                fighter_id = excluded.fighter_id,
                name = excluded.name,
                cost = excluded.cost,
                master_crafted = excluded.master_crafted,
                target_equipment_id = excluded.target_equipment_id
            "#
        ))
        .bind(equipment.id.to_string())
        .bind(equipment.gang_id.to_string())
        .bind(equipment.fighter_id.map(|id| id.to_string()))
        .bind(equipment.equipment_id.to_string())
        .bind(&equipment.name)
        .bind(equipment.cost)
        .bind(equipment.master_crafted)
        .bind(equipment.target_equipment_id.map(|id| id.to_string()))
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("save_equipment", e))?;
        Ok(())
    }

    async fn delete(&self, ids: &[FighterEquipmentId]) -> Result<(), RepoError> {
        if ids.is_empty() {
            return Ok(());
        }
        let sql = format!(
            "DELETE FROM fighter_equipment WHERE id IN ({})",
            placeholders(ids.len())
        );
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id.to_string());
        }
        query
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("delete_equipment", e))?;
        Ok(())
    }

    async fn get_catalog_item(&self, id: EquipmentId) -> Result<Option<EquipmentCatalogItem>, RepoError> {
        let row = sqlx::query("SELECT id, name, base_cost FROM equipment_catalog WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_catalog_item", e))?;
        row.map(|row| {
            Ok(EquipmentCatalogItem {
                id: parse_col(&row, "id")?,
                name: get_col(&row, "name")?,
                base_cost: get_col(&row, "base_cost")?,
            })
        })
        .transpose()
    }
}
