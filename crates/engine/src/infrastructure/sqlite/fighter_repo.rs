//! SQLite fighter repository.

use async_trait::async_trait;
use gangbook_domain::{Fighter, FighterId, GangId};
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;

use super::{get_col, parse_col, parse_opt_col};
use crate::infrastructure::ports::{FighterRepo, RepoError};

const COLUMNS: &str = "id, gang_id, name, label, notes, fighter_class, fighter_type, \
    fighter_sub_type, base_cost, cost_adjustment, xp, kills, state, captured, recovery, \
    beast_owner_id";

pub struct SqliteFighterRepo {
    pool: SqlitePool,
}

impl SqliteFighterRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_fighter(row: &SqliteRow) -> Result<Fighter, RepoError> {
    let kills: i64 = get_col(row, "kills")?;
    Ok(Fighter {
        id: parse_col(row, "id")?,
        gang_id: parse_col(row, "gang_id")?,
        name: get_col(row, "name")?,
        label: get_col(row, "label")?,
        notes: get_col(row, "notes")?,
        fighter_class: get_col(row, "fighter_class")?,
        fighter_type: get_col(row, "fighter_type")?,
        fighter_sub_type: get_col(row, "fighter_sub_type")?,
        base_cost: get_col(row, "base_cost")?,
        cost_adjustment: get_col(row, "cost_adjustment")?,
        xp: get_col(row, "xp")?,
        kills: u32::try_from(kills)
            .map_err(|_| RepoError::serialization(format!("kills out of range: {kills}")))?,
        state: parse_col(row, "state")?,
        captured: get_col(row, "captured")?,
        recovery: get_col(row, "recovery")?,
        beast_owner_id: parse_opt_col(row, "beast_owner_id")?,
    })
}

#[async_trait]
impl FighterRepo for SqliteFighterRepo {
    async fn get(&self, id: FighterId) -> Result<Option<Fighter>, RepoError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM fighters WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_fighter", e))?;
        row.as_ref().map(row_to_fighter).transpose()
    }

    async fn save(&self, fighter: &Fighter) -> Result<(), RepoError> {
        sqlx::query(&format!(
            r#"
            INSERT INTO fighters ({COLUMNS})
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                label = excluded.label,
                notes = excluded.notes,
                fighter_class = excluded.fighter_class,
                fighter_type = excluded.fighter_type,
                fighter_sub_type = excluded.fighter_sub_type,
                base_cost = excluded.base_cost,
                cost_adjustment = excluded.cost_adjustment,
                xp = excluded.xp,
                kills = excluded.kills,
                state = excluded.state,
                captured = excluded.captured,
                recovery = excluded.recovery,
                beast_owner_id = excluded.beast_owner_id
            "#
        ))
        .bind(fighter.id.to_string())
        .bind(fighter.gang_id.to_string())
        .bind(&fighter.name)
        .bind(&fighter.label)
        .bind(&fighter.notes)
        .bind(&fighter.fighter_class)
        .bind(&fighter.fighter_type)
        .bind(&fighter.fighter_sub_type)
        .bind(fighter.base_cost)
        .bind(fighter.cost_adjustment)
        .bind(fighter.xp)
        .bind(i64::from(fighter.kills))
        .bind(fighter.state.as_str())
        .bind(fighter.captured)
        .bind(fighter.recovery)
        .bind(fighter.beast_owner_id.map(|id| id.to_string()))
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("save_fighter", e))?;
        Ok(())
    }

    async fn delete(&self, id: FighterId) -> Result<(), RepoError> {
        // Equipment, effects (and their modifiers) and skills cascade
        let result = sqlx::query("DELETE FROM fighters WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("delete_fighter", e))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Fighter", id));
        }
        Ok(())
    }

    async fn list_in_gang(&self, gang_id: GangId) -> Result<Vec<Fighter>, RepoError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM fighters WHERE gang_id = ? ORDER BY name"
        ))
        .bind(gang_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("list_fighters", e))?;
        rows.iter().map(row_to_fighter).collect()
    }
}
