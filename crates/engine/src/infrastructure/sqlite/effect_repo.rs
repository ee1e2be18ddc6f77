//! SQLite effect repository (effects, their modifiers, effect types).

use std::collections::HashMap;

use async_trait::async_trait;
use gangbook_domain::*;
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;

use super::{get_col, parse_col, parse_opt_col, placeholders};
use crate::infrastructure::ports::{EffectRepo, RepoError};

const EFFECT_COLUMNS: &str = "id, fighter_id, name, category, fighter_equipment_id, \
    effect_type_id, credits_increase, xp_cost, user_id";

pub struct SqliteEffectRepo {
    pool: SqlitePool,
}

impl SqliteEffectRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Attach modifiers to already-loaded effects, preserving insertion order.
    async fn load_modifiers(&self, effects: &mut [FighterEffect]) -> Result<(), RepoError> {
        if effects.is_empty() {
            return Ok(());
        }
        let sql = format!(
            "SELECT id, effect_id, stat, value FROM fighter_effect_modifiers \
             WHERE effect_id IN ({}) ORDER BY rowid",
            placeholders(effects.len())
        );
        let mut query = sqlx::query(&sql);
        for effect in effects.iter() {
            query = query.bind(effect.id.to_string());
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("list_modifiers", e))?;

        let index: HashMap<FighterEffectId, usize> = effects
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id, i))
            .collect();
        for row in &rows {
            let modifier = row_to_modifier(row)?;
            if let Some(&i) = index.get(&modifier.effect_id) {
                effects[i].modifiers.push(modifier);
            }
        }
        Ok(())
    }

    async fn delete_where_in(
        &self,
        operation: &'static str,
        table: &str,
        column: &str,
        ids: Vec<String>,
    ) -> Result<(), RepoError> {
        if ids.is_empty() {
            return Ok(());
        }
        let sql = format!(
            "DELETE FROM {table} WHERE {column} IN ({})",
            placeholders(ids.len())
        );
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }
        query
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database(operation, e))?;
        Ok(())
    }
}

fn row_to_effect(row: &SqliteRow) -> Result<FighterEffect, RepoError> {
    Ok(FighterEffect {
        id: parse_col(row, "id")?,
        fighter_id: parse_col(row, "fighter_id")?,
        name: get_col(row, "name")?,
        category: parse_col(row, "category")?,
        fighter_equipment_id: parse_opt_col(row, "fighter_equipment_id")?,
        effect_type_id: parse_opt_col(row, "effect_type_id")?,
        credits_increase: get_col(row, "credits_increase")?,
        xp_cost: get_col(row, "xp_cost")?,
        user_id: parse_opt_col(row, "user_id")?,
        modifiers: Vec::new(),
    })
}

fn row_to_modifier(row: &SqliteRow) -> Result<FighterEffectModifier, RepoError> {
    Ok(FighterEffectModifier {
        id: parse_col(row, "id")?,
        effect_id: parse_col(row, "effect_id")?,
        stat: parse_col(row, "stat")?,
        value: get_col(row, "value")?,
    })
}

fn row_to_effect_type(row: &SqliteRow) -> Result<EffectType, RepoError> {
    let sign: i64 = get_col(row, "sign")?;
    let sign = i32::try_from(sign)
        .ok()
        .and_then(ModifierSign::of)
        .ok_or_else(|| RepoError::serialization(format!("effect type sign: {sign}")))?;
    Ok(EffectType {
        id: parse_col(row, "id")?,
        name: get_col(row, "name")?,
        stat: parse_col(row, "stat")?,
        sign,
    })
}

fn sign_to_db(sign: ModifierSign) -> i64 {
    match sign {
        ModifierSign::Positive => 1,
        ModifierSign::Negative => -1,
    }
}

impl SqliteEffectRepo {
    /// Seed the effect-type catalogue. Existing rows are left alone.
    pub async fn insert_effect_types(&self, types: &[EffectType]) -> Result<(), RepoError> {
        for effect_type in types {
            sqlx::query(
                "INSERT OR IGNORE INTO effect_types (id, name, stat, sign) VALUES (?, ?, ?, ?)",
            )
            .bind(effect_type.id.to_string())
            .bind(&effect_type.name)
            .bind(effect_type.stat.as_str())
            .bind(sign_to_db(effect_type.sign))
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("insert_effect_type", e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl EffectRepo for SqliteEffectRepo {
    async fn get(&self, id: FighterEffectId) -> Result<Option<FighterEffect>, RepoError> {
        let row = sqlx::query(&format!(
            "SELECT {EFFECT_COLUMNS} FROM fighter_effects WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("get_effect", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut effects = vec![row_to_effect(&row)?];
        self.load_modifiers(&mut effects).await?;
        Ok(effects.pop())
    }

    async fn list_for_fighter(&self, fighter_id: FighterId) -> Result<Vec<FighterEffect>, RepoError> {
        let rows = sqlx::query(&format!(
            "SELECT {EFFECT_COLUMNS} FROM fighter_effects WHERE fighter_id = ? ORDER BY rowid"
        ))
        .bind(fighter_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("list_effects", e))?;

        let mut effects = rows
            .iter()
            .map(row_to_effect)
            .collect::<Result<Vec<_>, _>>()?;
        self.load_modifiers(&mut effects).await?;
        Ok(effects)
    }

    async fn create(&self, effect: &FighterEffect) -> Result<(), RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("create_effect", e))?;

        sqlx::query(&format!(
            "INSERT INTO fighter_effects ({EFFECT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(effect.id.to_string())
        .bind(effect.fighter_id.to_string())
        .bind(&effect.name)
        .bind(effect.category.as_str())
        .bind(effect.fighter_equipment_id.map(|id| id.to_string()))
        .bind(effect.effect_type_id.map(|id| id.to_string()))
        .bind(effect.credits_increase)
        .bind(effect.xp_cost)
        .bind(effect.user_id.map(|id| id.to_string()))
        .execute(&mut *tx)
        .await
        .map_err(|e| RepoError::database("create_effect", e))?;

        for modifier in &effect.modifiers {
            sqlx::query(
                "INSERT INTO fighter_effect_modifiers (id, effect_id, stat, value) VALUES (?, ?, ?, ?)",
            )
            .bind(modifier.id.to_string())
            .bind(effect.id.to_string())
            .bind(modifier.stat.as_str())
            .bind(modifier.value)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::database("create_modifier", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepoError::database("create_effect", e))
    }

    async fn update_modifier(
        &self,
        id: FighterEffectModifierId,
        value: i32,
    ) -> Result<(), RepoError> {
        let result = sqlx::query("UPDATE fighter_effect_modifiers SET value = ? WHERE id = ?")
            .bind(value)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("update_modifier", e))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("FighterEffectModifier", id));
        }
        Ok(())
    }

    async fn delete_modifiers(&self, ids: &[FighterEffectModifierId]) -> Result<(), RepoError> {
        let ids = ids.iter().map(ToString::to_string).collect();
        self.delete_where_in("delete_modifiers", "fighter_effect_modifiers", "id", ids)
            .await
    }

    async fn delete_effects(&self, ids: &[FighterEffectId]) -> Result<(), RepoError> {
        let ids = ids.iter().map(ToString::to_string).collect();
        self.delete_where_in("delete_effects", "fighter_effects", "id", ids)
            .await
    }

    async fn delete_for_equipment(&self, ids: &[FighterEquipmentId]) -> Result<(), RepoError> {
        let ids = ids.iter().map(ToString::to_string).collect();
        self.delete_where_in(
            "delete_equipment_effects",
            "fighter_effects",
            "fighter_equipment_id",
            ids,
        )
        .await
    }

    async fn list_effect_types(&self) -> Result<Vec<EffectType>, RepoError> {
        let rows = sqlx::query("SELECT id, name, stat, sign FROM effect_types ORDER BY rowid")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("list_effect_types", e))?;
        rows.iter().map(row_to_effect_type).collect()
    }
}
