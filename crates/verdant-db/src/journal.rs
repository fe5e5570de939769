//! Journal repository implementation.
//!
//! Entries list newest-first with a `before` timestamp cursor: the query
//! fetches one row past the requested limit to decide whether another page
//! exists, and the last returned entry's timestamp becomes the next cursor.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use verdant_core::{
    CreateJournalRequest, Error, JournalEntry, JournalPage, JournalPatch, JournalRepository,
    ListJournalRequest, Result,
};

const JOURNAL_COLUMNS: &str = "id, plant_id, body, photo_url, created_at";

/// Bounds applied to requested page sizes.
pub const MIN_PAGE_SIZE: i64 = 1;
pub const MAX_PAGE_SIZE: i64 = 50;

/// Clamp a requested page size into the supported range.
pub fn clamp_page_size(limit: i64) -> i64 {
    limit.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
}

/// PostgreSQL implementation of JournalRepository.
#[derive(Clone)]
pub struct PgJournalRepository {
    pool: Pool<Postgres>,
}

impl PgJournalRepository {
    /// Create a new PgJournalRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JournalRepository for PgJournalRepository {
    async fn list(&self, req: ListJournalRequest) -> Result<JournalPage> {
        let limit = clamp_page_size(req.limit);

        // Fetch limit + 1 to detect whether another page exists.
        let mut entries = if let Some(before) = req.before {
            sqlx::query_as::<_, JournalEntry>(&format!(
                "SELECT {JOURNAL_COLUMNS} FROM journal
                 WHERE plant_id = $1 AND created_at < $2
                 ORDER BY created_at DESC
                 LIMIT $3"
            ))
            .bind(req.plant_id)
            .bind(before)
            .bind(limit + 1)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?
        } else {
            sqlx::query_as::<_, JournalEntry>(&format!(
                "SELECT {JOURNAL_COLUMNS} FROM journal
                 WHERE plant_id = $1
                 ORDER BY created_at DESC
                 LIMIT $2"
            ))
            .bind(req.plant_id)
            .bind(limit + 1)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?
        };

        let has_more = entries.len() as i64 > limit;
        entries.truncate(limit as usize);
        let next_cursor = if has_more {
            entries.last().map(|e| e.created_at)
        } else {
            None
        };

        Ok(JournalPage {
            entries,
            next_cursor,
        })
    }

    async fn insert(&self, req: CreateJournalRequest) -> Result<JournalEntry> {
        let entry = sqlx::query_as::<_, JournalEntry>(&format!(
            "INSERT INTO journal (plant_id, body, photo_url)
             VALUES ($1, $2, $3)
             RETURNING {JOURNAL_COLUMNS}"
        ))
        .bind(req.plant_id)
        .bind(&req.body)
        .bind(&req.photo_url)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(entry)
    }

    async fn fetch_with_owner(&self, id: Uuid) -> Result<Option<(JournalEntry, Uuid)>> {
        use sqlx::Row;

        let row = sqlx::query(
            "SELECT j.id, j.plant_id, j.body, j.photo_url, j.created_at, p.owner_id
             FROM journal j
             JOIN plants p ON p.id = j.plant_id
             WHERE j.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|row| {
            let entry = JournalEntry {
                id: row.get("id"),
                plant_id: row.get("plant_id"),
                body: row.get("body"),
                photo_url: row.get("photo_url"),
                created_at: row.get("created_at"),
            };
            (entry, row.get("owner_id"))
        }))
    }

    async fn update(&self, id: Uuid, patch: JournalPatch) -> Result<JournalEntry> {
        let entry = sqlx::query_as::<_, JournalEntry>(&format!(
            "UPDATE journal SET
                body = COALESCE($1, body),
                photo_url = CASE WHEN $2 THEN $3 ELSE photo_url END
             WHERE id = $4
             RETURNING {JOURNAL_COLUMNS}"
        ))
        .bind(&patch.body)
        .bind(patch.photo_url.is_some())
        .bind(patch.photo_url.flatten())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        entry.ok_or_else(|| Error::NotFound(format!("journal entry {}", id)))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM journal WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("journal entry {}", id)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_page_size_bounds() {
        assert_eq!(clamp_page_size(0), 1);
        assert_eq!(clamp_page_size(-5), 1);
        assert_eq!(clamp_page_size(10), 10);
        assert_eq!(clamp_page_size(50), 50);
        assert_eq!(clamp_page_size(500), 50);
    }
}
