use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/state", get(handlers::get_state))
        .route("/api/goal", put(handlers::put_goal))
        .route(
            "/api/entries/:date",
            get(handlers::get_entry)
                .put(handlers::put_entry)
                .delete(handlers::delete_entry),
        )
        .route("/api/status/:date", get(handlers::get_status))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/calendar/:year/:month", get(handlers::get_calendar))
        .route("/api/history", get(handlers::get_history))
        .route("/api/trend", get(handlers::get_trend))
        .route("/api/export", get(handlers::get_export))
        .route("/api/quote", get(handlers::get_quote))
        .route("/api/auth", post(handlers::post_auth))
        .route(
            "/api/notice",
            get(handlers::get_notice).delete(handlers::dismiss_notice),
        )
        .route("/api/events", get(handlers::events))
        .with_state(state)
}
