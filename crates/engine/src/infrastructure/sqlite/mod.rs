//! SQLite persistence.
//!
//! Ids are stored as TEXT uuids, enums as their snake_case names. Gang
//! counters are changed with `UPDATE ... SET x = x + ?` so concurrent
//! deltas never lose each other.

mod audit_log;
mod effect_repo;
mod equipment_repo;
mod fighter_repo;
mod gang_repo;
mod skill_repo;

use std::fmt::Display;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::infrastructure::ports::RepoError;

pub use audit_log::SqliteAuditLog;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS gangs (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        credits INTEGER NOT NULL DEFAULT 0,
        rating INTEGER NOT NULL DEFAULT 0,
        meat INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS fighters (
        id TEXT PRIMARY KEY,
        gang_id TEXT NOT NULL REFERENCES gangs(id),
        name TEXT NOT NULL,
        label TEXT,
        notes TEXT,
        fighter_class TEXT,
        fighter_type TEXT,
        fighter_sub_type TEXT,
        base_cost INTEGER NOT NULL DEFAULT 0,
        cost_adjustment INTEGER NOT NULL DEFAULT 0,
        xp INTEGER NOT NULL DEFAULT 0,
        kills INTEGER NOT NULL DEFAULT 0,
        state TEXT NOT NULL DEFAULT 'active',
        captured INTEGER NOT NULL DEFAULT 0,
        recovery INTEGER NOT NULL DEFAULT 0,
        beast_owner_id TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS effect_types (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        stat TEXT NOT NULL,
        sign INTEGER NOT NULL,
        UNIQUE (stat, sign)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS fighter_effects (
        id TEXT PRIMARY KEY,
        fighter_id TEXT NOT NULL REFERENCES fighters(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        category TEXT NOT NULL,
        fighter_equipment_id TEXT,
        effect_type_id TEXT,
        credits_increase INTEGER NOT NULL DEFAULT 0,
        xp_cost INTEGER NOT NULL DEFAULT 0,
        user_id TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS fighter_effect_modifiers (
        id TEXT PRIMARY KEY,
        effect_id TEXT NOT NULL REFERENCES fighter_effects(id) ON DELETE CASCADE,
        stat TEXT NOT NULL,
        value INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS equipment_catalog (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        base_cost INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS fighter_equipment (
        id TEXT PRIMARY KEY,
        gang_id TEXT NOT NULL REFERENCES gangs(id),
        fighter_id TEXT REFERENCES fighters(id) ON DELETE CASCADE,
        equipment_id TEXT NOT NULL,
        name TEXT NOT NULL,
        cost INTEGER NOT NULL,
        master_crafted INTEGER NOT NULL DEFAULT 0,
        target_equipment_id TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS fighter_skills (
        id TEXT PRIMARY KEY,
        fighter_id TEXT NOT NULL REFERENCES fighters(id) ON DELETE CASCADE,
        skill_id TEXT NOT NULL,
        name TEXT NOT NULL,
        xp_cost INTEGER NOT NULL DEFAULT 0,
        credits_increase INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS audit_log (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        gang_id TEXT NOT NULL,
        fighter_id TEXT NOT NULL,
        fighter_name TEXT NOT NULL,
        action TEXT NOT NULL,
        old_value TEXT,
        new_value TEXT,
        user_id TEXT,
        recorded_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS fighters_gang ON fighters(gang_id)",
    "CREATE INDEX IF NOT EXISTS effects_fighter ON fighter_effects(fighter_id)",
    "CREATE INDEX IF NOT EXISTS modifiers_effect ON fighter_effect_modifiers(effect_id)",
    "CREATE INDEX IF NOT EXISTS equipment_fighter ON fighter_equipment(fighter_id)",
    "CREATE INDEX IF NOT EXISTS skills_fighter ON fighter_skills(fighter_id)",
];

/// Connection pool plus one repository per aggregate.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect and create the schema if needed.
    pub async fn connect(url: &str) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(url)
            .await
            .map_err(|e| RepoError::database("connect", e))?;
        let store = Self { pool };
        store.ensure_schema().await?;
        tracing::info!(url = %url, "SQLite store ready");
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), RepoError> {
        // sqlx enables foreign keys on every pooled connection by default
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| RepoError::database("schema", e))?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn fighters(&self) -> fighter_repo::SqliteFighterRepo {
        fighter_repo::SqliteFighterRepo::new(self.pool.clone())
    }

    pub fn gangs(&self) -> gang_repo::SqliteGangRepo {
        gang_repo::SqliteGangRepo::new(self.pool.clone())
    }

    pub fn effects(&self) -> effect_repo::SqliteEffectRepo {
        effect_repo::SqliteEffectRepo::new(self.pool.clone())
    }

    pub fn equipment(&self) -> equipment_repo::SqliteEquipmentRepo {
        equipment_repo::SqliteEquipmentRepo::new(self.pool.clone())
    }

    pub fn skills(&self) -> skill_repo::SqliteSkillRepo {
        skill_repo::SqliteSkillRepo::new(self.pool.clone())
    }

    pub fn audit_log(&self) -> SqliteAuditLog {
        SqliteAuditLog::new(self.pool.clone())
    }
}

// =============================================================================
// Row helpers
// =============================================================================

/// Read a TEXT column and parse it.
fn parse_col<T>(row: &SqliteRow, column: &str) -> Result<T, RepoError>
where
    T: FromStr,
    T::Err: Display,
{
    let raw: String = row
        .try_get(column)
        .map_err(|e| RepoError::serialization(format!("{column}: {e}")))?;
    raw.parse()
        .map_err(|e: T::Err| RepoError::serialization(format!("{column}: {e}")))
}

/// Read a nullable TEXT column and parse it.
fn parse_opt_col<T>(row: &SqliteRow, column: &str) -> Result<Option<T>, RepoError>
where
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = row
        .try_get(column)
        .map_err(|e| RepoError::serialization(format!("{column}: {e}")))?;
    raw.map(|s| {
        s.parse()
            .map_err(|e: T::Err| RepoError::serialization(format!("{column}: {e}")))
    })
    .transpose()
}

fn get_col<'r, T>(row: &'r SqliteRow, column: &str) -> Result<T, RepoError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column)
        .map_err(|e| RepoError::serialization(format!("{column}: {e}")))
}

/// `?, ?, ?` for an IN clause of `n` binds.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
