use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::entries::repo::DayEntry;

#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub date: Date,
    pub score: i32,
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEntryRequest {
    pub score: Option<i32>,
    pub summary: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListEntriesParams {
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub min_score: Option<i32>,
    pub max_score: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub id: Uuid,
    pub date: Date,
    pub score: i32,
    pub summary: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<DayEntry> for EntryResponse {
    fn from(entry: DayEntry) -> Self {
        Self {
            id: entry.id,
            date: entry.date,
            score: entry.score,
            summary: entry.summary,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EntryListResponse {
    pub entries: Vec<EntryResponse>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn dates_parse_from_iso_strings() {
        let req: CreateEntryRequest =
            serde_json::from_str(r#"{"date":"2026-08-01","score":7,"summary":"ok"}"#).unwrap();
        assert_eq!(req.date, date!(2026 - 08 - 01));
        assert_eq!(req.score, 7);
    }

    #[test]
    fn update_fields_are_optional() {
        let req: UpdateEntryRequest = serde_json::from_str(r#"{"score":3}"#).unwrap();
        assert_eq!(req.score, Some(3));
        assert!(req.summary.is_none());
    }
}
