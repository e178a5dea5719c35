use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/habits", post(handlers::add_habit_form))
        .route("/habits/:id/select", post(handlers::select_habit_form))
        .route("/habits/:id/delete", post(handlers::delete_habit_form))
        .route("/habits/:id/toggle/:date", post(handlers::toggle_day_form))
        .route("/habits/:id/today", post(handlers::mark_today_form))
        .route("/habits/:id/clear-month", post(handlers::clear_month_form))
        .route("/view/prev", post(handlers::previous_month_form))
        .route("/view/next", post(handlers::next_month_form))
        .route("/api/habits", get(handlers::list_habits).post(handlers::create_habit))
        .route("/api/habits/:id", axum::routing::delete(handlers::delete_habit))
        .route("/api/habits/:id/select", post(handlers::select_habit))
        .route("/api/habits/:id/toggle", post(handlers::toggle_day))
        .route("/api/habits/:id/today", post(handlers::mark_today))
        .route("/api/habits/:id/clear-month", post(handlers::clear_month))
        .route("/api/habits/:id/stats", get(handlers::habit_stats))
        .route("/api/calendar", get(handlers::calendar))
        .route("/api/view", get(handlers::get_view).post(handlers::set_view))
        .route("/api/view/prev", post(handlers::previous_month))
        .route("/api/view/next", post(handlers::next_month))
        .route("/api/export", get(handlers::export))
        .route("/api/import", post(handlers::import))
        .route("/api/clear", post(handlers::clear_all))
        .with_state(state)
}
