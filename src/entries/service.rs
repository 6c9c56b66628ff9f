use sqlx::PgPool;
use time::Date;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    entries::repo::{DayEntry, EntryFilter},
    error::AppError,
};

pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 10;
pub const MAX_SUMMARY_LEN: usize = 200;

pub fn validate_score(score: i32) -> Result<(), AppError> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(AppError::validation("Score must be between 0 and 10"));
    }
    Ok(())
}

/// Trims the summary and enforces 1..=200 chars on the result.
pub fn validate_summary(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_SUMMARY_LEN {
        return Err(AppError::validation("Summary must be 1-200 characters"));
    }
    Ok(trimmed.to_string())
}

/// Score bounds arriving as list filters are validated at the boundary.
pub fn validate_score_filter(
    min_score: Option<i32>,
    max_score: Option<i32>,
) -> Result<(), AppError> {
    for score in [min_score, max_score].into_iter().flatten() {
        validate_score(score)?;
    }
    Ok(())
}

pub async fn list_entries(
    db: &PgPool,
    user_id: Uuid,
    filter: &EntryFilter,
) -> Result<Vec<DayEntry>, AppError> {
    Ok(DayEntry::list_by_user(db, user_id, filter).await?)
}

pub async fn get_entry(db: &PgPool, user_id: Uuid, date: Date) -> Result<DayEntry, AppError> {
    DayEntry::find_by_date(db, user_id, date)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No entry found for {date}")))
}

/// Strict create: an existing entry for the date is a Conflict, whether it is
/// seen by the pre-check or by losing the race at the unique constraint.
pub async fn create_entry(
    db: &PgPool,
    user_id: Uuid,
    date: Date,
    score: i32,
    summary: &str,
) -> Result<DayEntry, AppError> {
    validate_score(score)?;
    let summary = validate_summary(summary)?;

    if DayEntry::find_by_date(db, user_id, date).await?.is_some() {
        return Err(AppError::conflict(format!(
            "Entry already exists for {date}. Use PUT to update."
        )));
    }

    let entry = match DayEntry::insert(db, user_id, date, score, &summary).await {
        Ok(e) => e,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            warn!(user_id = %user_id, %date, "concurrent create lost the race");
            return Err(AppError::conflict(format!(
                "Entry already exists for {date}. Use PUT to update."
            )));
        }
        Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
            return Err(AppError::unauthorized("User not found"));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user_id, %date, score, "entry created");
    Ok(entry)
}

/// Partial update; each field is replaced only when supplied. Not-Found when
/// the user has no entry for the date.
pub async fn update_entry(
    db: &PgPool,
    user_id: Uuid,
    date: Date,
    score: Option<i32>,
    summary: Option<&str>,
) -> Result<DayEntry, AppError> {
    if let Some(score) = score {
        validate_score(score)?;
    }
    let summary = summary.map(validate_summary).transpose()?;

    let entry = DayEntry::update(db, user_id, date, score, summary.as_deref())
        .await?
        .ok_or_else(|| AppError::not_found(format!("No entry found for {date}")))?;

    info!(user_id = %user_id, %date, "entry updated");
    Ok(entry)
}

/// Create-or-update used by the day-editing surface, which does not know
/// ahead of time whether the day is already filled in.
pub async fn upsert_entry(
    db: &PgPool,
    user_id: Uuid,
    date: Date,
    score: i32,
    summary: &str,
) -> Result<DayEntry, AppError> {
    validate_score(score)?;
    let summary = validate_summary(summary)?;

    let entry = match DayEntry::upsert(db, user_id, date, score, &summary).await {
        Ok(e) => e,
        Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
            return Err(AppError::unauthorized("User not found"));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user_id, %date, score, "entry saved");
    Ok(entry)
}

/// Strict delete for the API surface: Not-Found when absent.
pub async fn delete_entry(db: &PgPool, user_id: Uuid, date: Date) -> Result<(), AppError> {
    let removed = DayEntry::delete(db, user_id, date).await?;
    if removed == 0 {
        return Err(AppError::not_found(format!("No entry found for {date}")));
    }
    info!(user_id = %user_id, %date, "entry deleted");
    Ok(())
}

/// Lenient delete for the interactive surface: removing an absent entry is a
/// no-op. The asymmetry with [`delete_entry`] is intentional.
pub async fn delete_entry_if_present(
    db: &PgPool,
    user_id: Uuid,
    date: Date,
) -> Result<bool, AppError> {
    let removed = DayEntry::delete(db, user_id, date).await?;
    if removed > 0 {
        info!(user_id = %user_id, %date, "entry deleted");
    }
    Ok(removed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_bounds_are_inclusive() {
        assert!(validate_score(0).is_ok());
        assert!(validate_score(10).is_ok());
        assert!(validate_score(-1).is_err());
        assert!(validate_score(11).is_err());
    }

    #[test]
    fn summary_is_trimmed() {
        assert_eq!(validate_summary("  a good day  ").unwrap(), "a good day");
    }

    #[test]
    fn whitespace_only_summary_is_rejected() {
        assert!(validate_summary("   ").is_err());
        assert!(validate_summary("").is_err());
    }

    #[test]
    fn summary_length_limit_applies_after_trim() {
        let exactly = "x".repeat(200);
        assert!(validate_summary(&exactly).is_ok());
        let padded = format!("  {exactly}  ");
        assert!(validate_summary(&padded).is_ok());
        let too_long = "x".repeat(201);
        assert!(validate_summary(&too_long).is_err());
    }

    #[test]
    fn score_filter_bounds_are_checked() {
        assert!(validate_score_filter(None, None).is_ok());
        assert!(validate_score_filter(Some(0), Some(10)).is_ok());
        assert!(validate_score_filter(Some(-1), None).is_err());
        assert!(validate_score_filter(None, Some(11)).is_err());
    }
}
