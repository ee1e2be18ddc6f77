//! SQLite skill repository.

use async_trait::async_trait;
use gangbook_domain::{FighterId, FighterSkill, FighterSkillId};
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;

use super::{get_col, parse_col};
use crate::infrastructure::ports::{RepoError, SkillRepo};

pub struct SqliteSkillRepo {
    pool: SqlitePool,
}

impl SqliteSkillRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_skill(row: &SqliteRow) -> Result<FighterSkill, RepoError> {
    Ok(FighterSkill {
        id: parse_col(row, "id")?,
        fighter_id: parse_col(row, "fighter_id")?,
        skill_id: parse_col(row, "skill_id")?,
        name: get_col(row, "name")?,
        xp_cost: get_col(row, "xp_cost")?,
        credits_increase: get_col(row, "credits_increase")?,
    })
}

#[async_trait]
impl SkillRepo for SqliteSkillRepo {
    async fn get(&self, id: FighterSkillId) -> Result<Option<FighterSkill>, RepoError> {
        let row = sqlx::query(
            "SELECT id, fighter_id, skill_id, name, xp_cost, credits_increase \
             FROM fighter_skills WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("get_skill", e))?;
        row.as_ref().map(row_to_skill).transpose()
    }

    async fn list_for_fighter(&self, fighter_id: FighterId) -> Result<Vec<FighterSkill>, RepoError> {
        let rows = sqlx::query(
            "SELECT id, fighter_id, skill_id, name, xp_cost, credits_increase \
             FROM fighter_skills WHERE fighter_id = ? ORDER BY rowid",
        )
        .bind(fighter_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("list_skills", e))?;
        rows.iter().map(row_to_skill).collect()
    }

    async fn create(&self, skill: &FighterSkill) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO fighter_skills (id, fighter_id, skill_id, name, xp_cost, credits_increase) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(skill.id.to_string())
        .bind(skill.fighter_id.to_string())
        .bind(skill.skill_id.to_string())
        .bind(&skill.name)
        .bind(skill.xp_cost)
        .bind(skill.credits_increase)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("create_skill", e))?;
        Ok(())
    }

    async fn delete(&self, id: FighterSkillId) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM fighter_skills WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("delete_skill", e))?;
        Ok(())
    }
}
