//! SQLite audit log.

use async_trait::async_trait;
use gangbook_domain::GangId;
use sqlx::{Row, SqlitePool};

use crate::infrastructure::ports::{AuditEntry, AuditLogPort, RepoError};

pub struct SqliteAuditLog {
    pool: SqlitePool,
}

impl SqliteAuditLog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Action names logged for a gang, oldest first.
    pub async fn actions_for_gang(&self, gang_id: GangId) -> Result<Vec<String>, RepoError> {
        let rows = sqlx::query("SELECT action FROM audit_log WHERE gang_id = ? ORDER BY id")
            .bind(gang_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("list_audit", e))?;
        Ok(rows.iter().map(|row| row.get("action")).collect())
    }
}

#[async_trait]
impl AuditLogPort for SqliteAuditLog {
    async fn record(&self, entry: &AuditEntry) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO audit_log
                (gang_id, fighter_id, fighter_name, action, old_value, new_value, user_id, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.gang_id.to_string())
        .bind(entry.fighter_id.to_string())
        .bind(&entry.fighter_name)
        .bind(entry.action.as_str())
        .bind(&entry.old_value)
        .bind(&entry.new_value)
        .bind(entry.user_id.map(|id| id.to_string()))
        .bind(entry.recorded_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("record_audit", e))?;
        Ok(())
    }
}
