use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::Date;
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    entries::{
        dto::{
            CreateEntryRequest, EntryListResponse, EntryResponse, ListEntriesParams,
            UpdateEntryRequest,
        },
        repo::EntryFilter,
        service,
    },
    error::AppError,
    state::AppState,
};

pub fn entry_routes() -> Router<AppState> {
    Router::new()
        .route("/entries", get(list_entries).post(create_entry))
        .route(
            "/entries/:date",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
}

#[instrument(skip(state))]
async fn list_entries(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<ListEntriesParams>,
) -> Result<Json<EntryListResponse>, AppError> {
    service::validate_score_filter(params.min_score, params.max_score)?;

    let filter = EntryFilter {
        start_date: params.start_date,
        end_date: params.end_date,
        min_score: params.min_score,
        max_score: params.max_score,
    };
    let entries = service::list_entries(&state.db, user_id, &filter).await?;
    let total = entries.len();
    Ok(Json(EntryListResponse {
        entries: entries.into_iter().map(Into::into).collect(),
        total,
    }))
}

#[instrument(skip(state))]
async fn get_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<Date>,
) -> Result<Json<EntryResponse>, AppError> {
    let entry = service::get_entry(&state.db, user_id, date).await?;
    Ok(Json(entry.into()))
}

#[instrument(skip(state, payload))]
async fn create_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateEntryRequest>,
) -> Result<(StatusCode, Json<EntryResponse>), AppError> {
    let entry = service::create_entry(
        &state.db,
        user_id,
        payload.date,
        payload.score,
        &payload.summary,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(entry.into())))
}

#[instrument(skip(state, payload))]
async fn update_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<Date>,
    Json(payload): Json<UpdateEntryRequest>,
) -> Result<Json<EntryResponse>, AppError> {
    let entry = service::update_entry(
        &state.db,
        user_id,
        date,
        payload.score,
        payload.summary.as_deref(),
    )
    .await?;
    Ok(Json(entry.into()))
}

#[instrument(skip(state))]
async fn delete_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<Date>,
) -> Result<StatusCode, AppError> {
    service::delete_entry(&state.db, user_id, date).await?;
    Ok(StatusCode::NO_CONTENT)
}
