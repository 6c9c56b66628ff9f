use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// One user's score + summary record for one calendar date. At most one row
/// exists per (user_id, date), enforced by the uq_user_date constraint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DayEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub score: i32,
    pub summary: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Inclusive bounds for listing; an absent field leaves that side unbounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryFilter {
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub min_score: Option<i32>,
    pub max_score: Option<i32>,
}

const COLUMNS: &str = "id, user_id, date, score, summary, created_at, updated_at";

impl DayEntry {
    pub async fn find_by_date(
        db: &PgPool,
        user_id: Uuid,
        date: Date,
    ) -> Result<Option<DayEntry>, sqlx::Error> {
        sqlx::query_as::<_, DayEntry>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM day_entries
            WHERE user_id = $1 AND date = $2
            "#,
        ))
        .bind(user_id)
        .bind(date)
        .fetch_optional(db)
        .await
    }

    /// All of one user's entries matching the filter, newest date first.
    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        filter: &EntryFilter,
    ) -> Result<Vec<DayEntry>, sqlx::Error> {
        sqlx::query_as::<_, DayEntry>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM day_entries
            WHERE user_id = $1
              AND ($2::date IS NULL OR date >= $2)
              AND ($3::date IS NULL OR date <= $3)
              AND ($4::int IS NULL OR score >= $4)
              AND ($5::int IS NULL OR score <= $5)
            ORDER BY date DESC
            "#,
        ))
        .bind(user_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.min_score)
        .bind(filter.max_score)
        .fetch_all(db)
        .await
    }

    pub async fn insert(
        db: &PgPool,
        user_id: Uuid,
        date: Date,
        score: i32,
        summary: &str,
    ) -> Result<DayEntry, sqlx::Error> {
        sqlx::query_as::<_, DayEntry>(&format!(
            r#"
            INSERT INTO day_entries (user_id, date, score, summary)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(date)
        .bind(score)
        .bind(summary)
        .fetch_one(db)
        .await
    }

    /// Partial update; a NULL bind keeps the stored value. updated_at is
    /// refreshed on every successful call.
    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        date: Date,
        score: Option<i32>,
        summary: Option<&str>,
    ) -> Result<Option<DayEntry>, sqlx::Error> {
        sqlx::query_as::<_, DayEntry>(&format!(
            r#"
            UPDATE day_entries
            SET score = COALESCE($3, score),
                summary = COALESCE($4, summary),
                updated_at = now()
            WHERE user_id = $1 AND date = $2
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(date)
        .bind(score)
        .bind(summary)
        .fetch_optional(db)
        .await
    }

    /// Create-or-replace keyed on (user_id, date), in one statement so a
    /// concurrent save for the same day cannot produce two rows.
    pub async fn upsert(
        db: &PgPool,
        user_id: Uuid,
        date: Date,
        score: i32,
        summary: &str,
    ) -> Result<DayEntry, sqlx::Error> {
        sqlx::query_as::<_, DayEntry>(&format!(
            r#"
            INSERT INTO day_entries (user_id, date, score, summary)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT ON CONSTRAINT uq_user_date
            DO UPDATE SET score = EXCLUDED.score,
                          summary = EXCLUDED.summary,
                          updated_at = now()
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(date)
        .bind(score)
        .bind(summary)
        .fetch_one(db)
        .await
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, date: Date) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM day_entries WHERE user_id = $1 AND date = $2")
            .bind(user_id)
            .bind(date)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}
