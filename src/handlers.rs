use crate::calendar::{month_grid, CalendarGrid, ViewPeriod};
use crate::collection::view_response;
use crate::errors::AppError;
use crate::models::{
    CalendarQuery, ClearMonthResponse, HabitListResponse, HabitStatsResponse, HabitSummary,
    NewHabitRequest, PeriodQuery, ToggleRequest, ToggleResponse, ViewRequest, ViewResponse,
};
use crate::state::AppState;
use crate::stats::build_habit_stats;
use crate::storage::{export_json, now_millis, parse_state, EXPORT_FILE_NAME};
use crate::ui::render_index;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect},
    Form, Json,
};
use chrono::{Local, NaiveDate};
use tracing::info;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let data = state.data.lock().await;
    Html(render_index(&data, today()))
}

pub async fn list_habits(State(state): State<AppState>) -> Json<HabitListResponse> {
    let data = state.data.lock().await;
    Json(data.listing())
}

pub async fn create_habit(
    State(state): State<AppState>,
    Json(payload): Json<NewHabitRequest>,
) -> Result<Json<HabitSummary>, AppError> {
    Ok(Json(apply_add(&state, &payload.name).await?))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HabitListResponse>, AppError> {
    Ok(Json(apply_remove(&state, &id).await?))
}

pub async fn select_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HabitListResponse>, AppError> {
    Ok(Json(apply_select(&state, &id).await?))
}

pub async fn toggle_day(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, AppError> {
    Ok(Json(apply_toggle(&state, &id, payload.date).await?))
}

pub async fn mark_today(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ToggleResponse>, AppError> {
    Ok(Json(apply_mark_today(&state, &id).await?))
}

pub async fn clear_month(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ClearMonthResponse>, AppError> {
    Ok(Json(apply_clear_month(&state, &id).await?))
}

pub async fn habit_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<HabitStatsResponse>, AppError> {
    let data = state.data.lock().await;
    let period = requested_period(query.year, query.month, data.view())?;
    let habit = data.habit(&id).ok_or_else(|| AppError::unknown_habit(&id))?;
    Ok(Json(build_habit_stats(habit, period)))
}

pub async fn calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarGrid>, AppError> {
    let data = state.data.lock().await;
    let period = requested_period(query.year, query.month, data.view())?;
    let habit = match query.habit.as_deref() {
        Some(id) => Some(data.habit(id).ok_or_else(|| AppError::unknown_habit(id))?),
        None => data.selected(),
    };
    Ok(Json(month_grid(period, habit, today())))
}

pub async fn get_view(State(state): State<AppState>) -> Json<ViewResponse> {
    let data = state.data.lock().await;
    Json(view_response(data.view()))
}

pub async fn set_view(
    State(state): State<AppState>,
    Json(payload): Json<ViewRequest>,
) -> Result<Json<ViewResponse>, AppError> {
    let period = ViewPeriod::new(payload.year, payload.month)
        .ok_or_else(|| AppError::bad_request("month must be between 0 and 11"))?;
    state
        .update(|data| {
            data.set_view(period);
            Ok(())
        })
        .await?;
    Ok(Json(view_response(period)))
}

pub async fn previous_month(State(state): State<AppState>) -> Result<Json<ViewResponse>, AppError> {
    let period = state.update(|data| Ok(data.show_previous_month())).await?;
    Ok(Json(view_response(period)))
}

pub async fn next_month(State(state): State<AppState>) -> Result<Json<ViewResponse>, AppError> {
    let period = state.update(|data| Ok(data.show_next_month())).await?;
    Ok(Json(view_response(period)))
}

pub async fn export(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let data = state.data.lock().await;
    let body = export_json(&data)?;
    let headers = [
        (header::CONTENT_TYPE, "application/json".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
        ),
    ];
    Ok((headers, body))
}

pub async fn import(State(state): State<AppState>, body: Bytes) -> Result<Json<HabitListResponse>, AppError> {
    let imported = parse_state(&body, now_millis(), ViewPeriod::current())?;
    let count = imported.habits.len();
    let listing = state
        .update(|data| {
            *data = imported;
            Ok(data.listing())
        })
        .await?;
    info!("imported {count} habits");
    Ok(Json(listing))
}

pub async fn clear_all(State(state): State<AppState>) -> Result<Json<HabitListResponse>, AppError> {
    let listing = state
        .update(|data| {
            data.clear();
            Ok(data.listing())
        })
        .await?;
    info!("cleared all habits");
    Ok(Json(listing))
}

pub async fn add_habit_form(
    State(state): State<AppState>,
    Form(payload): Form<NewHabitRequest>,
) -> Result<Redirect, AppError> {
    if !payload.name.trim().is_empty() {
        apply_add(&state, &payload.name).await?;
    }
    Ok(Redirect::to("/"))
}

pub async fn select_habit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    apply_select(&state, &id).await?;
    Ok(Redirect::to("/"))
}

pub async fn delete_habit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    apply_remove(&state, &id).await?;
    Ok(Redirect::to("/"))
}

pub async fn toggle_day_form(
    State(state): State<AppState>,
    Path((id, date)): Path<(String, NaiveDate)>,
) -> Result<Redirect, AppError> {
    apply_toggle(&state, &id, date).await?;
    Ok(Redirect::to("/"))
}

pub async fn mark_today_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    apply_mark_today(&state, &id).await?;
    Ok(Redirect::to("/"))
}

pub async fn clear_month_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    apply_clear_month(&state, &id).await?;
    Ok(Redirect::to("/"))
}

pub async fn previous_month_form(State(state): State<AppState>) -> Result<Redirect, AppError> {
    state.update(|data| Ok(data.show_previous_month())).await?;
    Ok(Redirect::to("/"))
}

pub async fn next_month_form(State(state): State<AppState>) -> Result<Redirect, AppError> {
    state.update(|data| Ok(data.show_next_month())).await?;
    Ok(Redirect::to("/"))
}

async fn apply_add(state: &AppState, name: &str) -> Result<HabitSummary, AppError> {
    let summary = state
        .update(|data| {
            data.add_habit(name, now_millis())
                .map(HabitSummary::from)
                .ok_or_else(|| AppError::bad_request("habit name must not be empty"))
        })
        .await?;
    info!("added habit '{}' ({})", summary.name, summary.id);
    Ok(summary)
}

async fn apply_remove(state: &AppState, id: &str) -> Result<HabitListResponse, AppError> {
    let (removed, listing) = state
        .update(|data| {
            let removed = data.remove_habit(id).ok_or_else(|| AppError::unknown_habit(id))?;
            Ok((removed, data.listing()))
        })
        .await?;
    info!("removed habit '{}' ({})", removed.name, removed.id);
    Ok(listing)
}

async fn apply_select(state: &AppState, id: &str) -> Result<HabitListResponse, AppError> {
    state
        .update(|data| {
            if !data.select(id) {
                return Err(AppError::unknown_habit(id));
            }
            Ok(data.listing())
        })
        .await
}

async fn apply_toggle(state: &AppState, id: &str, date: NaiveDate) -> Result<ToggleResponse, AppError> {
    let completed = state
        .update(|data| {
            data.toggle_day(id, date, now_millis())
                .ok_or_else(|| AppError::unknown_habit(id))
        })
        .await?;
    Ok(ToggleResponse {
        id: id.to_string(),
        date,
        completed,
    })
}

async fn apply_mark_today(state: &AppState, id: &str) -> Result<ToggleResponse, AppError> {
    let date = today();
    state
        .update(|data| {
            if !data.mark_today(id, date, now_millis()) {
                return Err(AppError::unknown_habit(id));
            }
            Ok(())
        })
        .await?;
    Ok(ToggleResponse {
        id: id.to_string(),
        date,
        completed: true,
    })
}

async fn apply_clear_month(state: &AppState, id: &str) -> Result<ClearMonthResponse, AppError> {
    state
        .update(|data| {
            let removed = data
                .clear_month(id, now_millis())
                .ok_or_else(|| AppError::unknown_habit(id))?;
            let view = data.view();
            Ok(ClearMonthResponse {
                id: id.to_string(),
                year: view.year(),
                month: view.month(),
                removed,
            })
        })
        .await
}

fn requested_period(year: Option<i32>, month: Option<u32>, view: ViewPeriod) -> Result<ViewPeriod, AppError> {
    ViewPeriod::new(year.unwrap_or(view.year()), month.unwrap_or(view.month()))
        .ok_or_else(|| AppError::bad_request("month must be between 0 and 11"))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
