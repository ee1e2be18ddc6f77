//! SQLite gang repository.

use async_trait::async_trait;
use gangbook_domain::{Gang, GangDelta, GangId};
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;

use super::{get_col, parse_col};
use crate::infrastructure::ports::{GangRepo, RepoError};

pub struct SqliteGangRepo {
    pool: SqlitePool,
}

impl SqliteGangRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_gang(row: &SqliteRow) -> Result<Gang, RepoError> {
    Ok(Gang {
        id: parse_col(row, "id")?,
        name: get_col(row, "name")?,
        credits: get_col(row, "credits")?,
        rating: get_col(row, "rating")?,
        meat: get_col(row, "meat")?,
    })
}

#[async_trait]
impl GangRepo for SqliteGangRepo {
    async fn get(&self, id: GangId) -> Result<Option<Gang>, RepoError> {
        let row = sqlx::query("SELECT id, name, credits, rating, meat FROM gangs WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_gang", e))?;
        row.as_ref().map(row_to_gang).transpose()
    }

    async fn save(&self, gang: &Gang) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO gangs (id, name, credits, rating, meat)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                credits = excluded.credits,
                rating = excluded.rating,
                meat = excluded.meat
            "#,
        )
        .bind(gang.id.to_string())
        .bind(&gang.name)
        .bind(gang.credits)
        .bind(gang.rating)
        .bind(gang.meat)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("save_gang", e))?;
        Ok(())
    }

    async fn adjust(&self, id: GangId, delta: GangDelta) -> Result<Gang, RepoError> {
        let row = sqlx::query(
            r#"
            UPDATE gangs
            SET credits = credits + ?, rating = rating + ?, meat = meat + ?
            WHERE id = ?
            RETURNING id, name, credits, rating, meat
            "#,
        )
        .bind(delta.credits)
        .bind(delta.rating)
        .bind(delta.meat)
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("adjust_gang", e))?
        .ok_or_else(|| RepoError::not_found("Gang", id))?;
        row_to_gang(&row)
    }
}
