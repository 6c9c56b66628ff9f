use std::collections::HashMap;

use axum::{
    extract::{FromRef, Path, Query, State},
    http::{header, HeaderName, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use time::{Date, Month, OffsetDateTime};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::{
        extractors::{clear_session_cookie, session_cookie, AuthUser, MaybeAuthUser},
        jwt::JwtKeys,
        repo::User,
        service as auth_service,
    },
    calendar::{day_slot, month_grid, month_name},
    entries::{
        repo::{DayEntry, EntryFilter},
        service as entry_service,
    },
    error::AppError,
    pages::templates::{
        render, CalendarPage, DayCellPartial, EntryFormPartial, LoginPage, RegisterPage,
        SettingsPage,
    },
    state::AppState,
};

const HX_TRIGGER: HeaderName = HeaderName::from_static("hx-trigger");

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/login", get(login_page).post(login_submit))
        .route("/register", get(register_page).post(register_submit))
        .route("/logout", get(logout))
        .route("/calendar", get(calendar_page))
        .route(
            "/calendar/day/:date",
            get(day_form).post(save_day).delete(delete_day),
        )
        .route("/settings", get(settings_page))
        .route("/settings/delete-account", post(delete_account_submit))
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct RegisterForm {
    email: String,
    password: String,
    password_confirm: String,
}

#[derive(Debug, Default, Deserialize)]
struct CalendarParams {
    year: Option<i32>,
    month: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct DayForm {
    score: i32,
    summary: String,
}

fn login_redirect_with_cookie(state: &AppState, user_id: Uuid) -> Result<Response, AppError> {
    let keys = JwtKeys::from_ref(state);
    let token = keys.sign(user_id)?;
    let cookie = session_cookie(&token, keys.ttl.as_secs(), !state.config.debug);
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/calendar")).into_response())
}

/// Home: authenticated visitors land on the calendar, everyone else on the
/// login page.
#[instrument(skip_all)]
async fn home(MaybeAuthUser(user): MaybeAuthUser) -> Redirect {
    if user.is_some() {
        Redirect::to("/calendar")
    } else {
        Redirect::to("/login")
    }
}

#[instrument(skip_all)]
async fn login_page(MaybeAuthUser(user): MaybeAuthUser) -> Result<Response, AppError> {
    if user.is_some() {
        return Ok(Redirect::to("/calendar").into_response());
    }
    Ok(render(&LoginPage { error: None })?.into_response())
}

#[instrument(skip_all)]
async fn login_submit(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match auth_service::authenticate_user(&state.db, &form.email, &form.password).await {
        Ok(user) => login_redirect_with_cookie(&state, user.id),
        Err(err @ (AppError::Unauthorized(_) | AppError::Validation(_))) => {
            let page = LoginPage {
                error: Some("Invalid email or password".into()),
            };
            Ok((err.status(), render(&page)?).into_response())
        }
        Err(err) => Err(err),
    }
}

#[instrument(skip_all)]
async fn register_page(MaybeAuthUser(user): MaybeAuthUser) -> Result<Response, AppError> {
    if user.is_some() {
        return Ok(Redirect::to("/calendar").into_response());
    }
    Ok(render(&RegisterPage { error: None })?.into_response())
}

#[instrument(skip_all)]
async fn register_submit(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let failure = |status: StatusCode, msg: String| -> Result<Response, AppError> {
        let page = RegisterPage { error: Some(msg) };
        Ok((status, render(&page)?).into_response())
    };

    if form.password != form.password_confirm {
        return failure(StatusCode::BAD_REQUEST, "Passwords do not match".into());
    }

    match auth_service::register_user(&state.db, &form.email, &form.password).await {
        Ok(user) => login_redirect_with_cookie(&state, user.id),
        Err(err @ (AppError::Conflict(_) | AppError::Validation(_))) => {
            let status = err.status();
            failure(status, err.to_string())
        }
        Err(err) => Err(err),
    }
}

#[instrument(skip_all)]
async fn logout() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to("/login"),
    )
}

#[instrument(skip(state))]
async fn calendar_page(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<CalendarParams>,
) -> Result<Html<String>, AppError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("User not found"))?;

    let today = OffsetDateTime::now_utc().date();
    // Out-of-range navigation falls back to the current month
    let month = params
        .month
        .and_then(|m| Month::try_from(m).ok())
        .unwrap_or_else(|| today.month());
    let year = params
        .year
        .filter(|y| (2000..=2100).contains(y))
        .unwrap_or_else(|| today.year());

    let first_day = Date::from_calendar_date(year, month, 1).map_err(anyhow::Error::from)?;
    let last_day = Date::from_calendar_date(year, month, time::util::days_in_year_month(year, month))
        .map_err(anyhow::Error::from)?;

    let filter = EntryFilter {
        start_date: Some(first_day),
        end_date: Some(last_day),
        ..Default::default()
    };
    let entries: HashMap<Date, DayEntry> =
        entry_service::list_entries(&state.db, user_id, &filter)
            .await?
            .into_iter()
            .map(|e| (e.date, e))
            .collect();

    let weeks = month_grid(year, month, &entries, today)?;

    let (prev_year, prev_month) = match month {
        Month::January => (year - 1, Month::December),
        _ => (year, month.previous()),
    };
    let (next_year, next_month) = match month {
        Month::December => (year + 1, Month::January),
        _ => (year, month.next()),
    };

    render(&CalendarPage {
        email: user.email,
        weeks,
        year,
        month_name: month_name(month),
        prev_year,
        prev_month: prev_month as u8,
        next_year,
        next_month: next_month as u8,
    })
}

/// Entry form partial for the day modal (HTMX).
#[instrument(skip(state))]
async fn day_form(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<Date>,
) -> Result<Html<String>, AppError> {
    let entry = DayEntry::find_by_date(&state.db, user_id, date).await?;
    let today = OffsetDateTime::now_utc().date();
    render(&EntryFormPartial {
        date,
        entry,
        error: None,
        is_future: date > today,
    })
}

/// Save-or-update for the day modal: the editing surface does not know
/// whether the day is already filled in, so this is the upsert path.
#[instrument(skip(state, form))]
async fn save_day(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<Date>,
    Form(form): Form<DayForm>,
) -> Result<Response, AppError> {
    let today = OffsetDateTime::now_utc().date();
    match entry_service::upsert_entry(&state.db, user_id, date, form.score, &form.summary).await {
        Ok(entry) => {
            let cell = DayCellPartial {
                slot: day_slot(date, Some(entry), today),
            };
            Ok((
                [(HX_TRIGGER, "closeModal")],
                render(&cell)?,
            )
                .into_response())
        }
        Err(err @ AppError::Validation(_)) => {
            let entry = DayEntry::find_by_date(&state.db, user_id, date).await?;
            let partial = EntryFormPartial {
                date,
                entry,
                error: Some(err.to_string()),
                is_future: date > today,
            };
            Ok((StatusCode::BAD_REQUEST, render(&partial)?).into_response())
        }
        Err(err) => Err(err),
    }
}

/// Interactive delete: removing an absent entry is a silent no-op, unlike
/// the strict API delete.
#[instrument(skip(state))]
async fn delete_day(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<Date>,
) -> Result<Response, AppError> {
    entry_service::delete_entry_if_present(&state.db, user_id, date).await?;
    let today = OffsetDateTime::now_utc().date();
    let cell = DayCellPartial {
        slot: day_slot(date, None, today),
    };
    Ok(([(HX_TRIGGER, "closeModal")], render(&cell)?).into_response())
}

#[instrument(skip(state))]
async fn settings_page(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Html<String>, AppError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("User not found"))?;
    render(&SettingsPage { email: user.email })
}

#[instrument(skip(state))]
async fn delete_account_submit(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Response, AppError> {
    auth_service::delete_account(&state.db, user_id).await?;
    Ok((
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to("/login"),
    )
        .into_response())
}
