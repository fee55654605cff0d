use crate::controller::{self, parse_date};
use crate::dates::{date_key, local_today};
use crate::errors::{AppError, InputError};
use crate::export::export_csv;
use crate::models::{
    AppData, AuthEvent, AuthResponse, CalendarMonth, EntryRequest, EntryResponse, GoalRequest,
    HistoryItem, NoticeResponse, Quote, SaveResponse, StatusReport, SummaryResponse, TrendPoint,
};
use crate::quotes::random_quote;
use crate::state::AppState;
use crate::stats::{
    HISTORY_LIMIT, TREND_DAYS, calendar_month, history, status_for_date, status_report, summary,
    trend,
};
use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
};
use std::convert::Infallible;
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};

pub async fn get_state(State(state): State<AppState>) -> Json<AppData> {
    Json(state.data.lock().await.clone())
}

pub async fn put_goal(
    State(state): State<AppState>,
    Json(payload): Json<GoalRequest>,
) -> Result<Json<SummaryResponse>, AppError> {
    controller::set_goal(&state, payload.goal).await?;

    let data = state.data.lock().await;
    Ok(Json(summary(&data, local_today())))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<EntryResponse>, AppError> {
    let date = parse_date(&date)?;
    let data = state.data.lock().await;
    let entry = data.entry(date);

    Ok(Json(EntryResponse {
        date: date_key(date),
        logged: entry.is_some(),
        count: entry.map(|entry| entry.count).unwrap_or(0),
        notes: entry.map(|entry| entry.notes.clone()).unwrap_or_default(),
        status: status_for_date(&data, date),
    }))
}

pub async fn put_entry(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Json(payload): Json<EntryRequest>,
) -> Result<Json<SaveResponse>, AppError> {
    let date = parse_date(&date)?;
    let notes = payload.notes.unwrap_or_default();
    let saved = controller::save_entry(&state, date, payload.count, &notes).await?;

    Ok(Json(SaveResponse {
        entry: EntryResponse {
            date: date_key(saved.date),
            logged: true,
            count: saved.entry.count,
            notes: saved.entry.notes,
            status: saved.status,
        },
        celebrate: saved.celebrate,
    }))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<StatusCode, AppError> {
    let date = parse_date(&date)?;
    let (removed, _) = controller::delete_entry(&state, date).await?;

    if !removed {
        return Err(AppError::not_found(format!("nothing logged for {}", date_key(date))));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_status(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<StatusReport>, AppError> {
    let date = parse_date(&date)?;
    let data = state.data.lock().await;
    Ok(Json(status_report(&data, date)))
}

pub async fn get_stats(State(state): State<AppState>) -> Json<SummaryResponse> {
    let data = state.data.lock().await;
    Json(summary(&data, local_today()))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<CalendarMonth>, AppError> {
    let invalid = || InputError::InvalidMonth { year, month };
    if !(1..=12).contains(&month) {
        return Err(invalid().into());
    }
    let data = state.data.lock().await;
    let calendar = calendar_month(&data, year, month - 1, local_today()).ok_or_else(invalid)?;
    Ok(Json(calendar))
}

pub async fn get_history(State(state): State<AppState>) -> Json<Vec<HistoryItem>> {
    let data = state.data.lock().await;
    Json(history(&data, HISTORY_LIMIT))
}

pub async fn get_trend(State(state): State<AppState>) -> Json<Vec<TrendPoint>> {
    let data = state.data.lock().await;
    Json(trend(&data, local_today(), TREND_DAYS))
}

pub async fn get_export(State(state): State<AppState>) -> impl IntoResponse {
    let export = {
        let data = state.data.lock().await;
        export_csv(&data, local_today())
    };

    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.filename),
            ),
        ],
        export.body,
    )
}

pub async fn get_quote() -> Json<Quote> {
    Json(random_quote())
}

pub async fn post_auth(
    State(state): State<AppState>,
    Json(payload): Json<AuthEvent>,
) -> Result<Json<AuthResponse>, AppError> {
    let (_, pull) = controller::handle_auth_change(&state, payload.user).await?;
    Ok(Json(AuthResponse {
        user: state.sync.current_user().await,
        pull,
    }))
}

pub async fn get_notice(State(state): State<AppState>) -> Json<NoticeResponse> {
    Json(NoticeResponse {
        notice: state.notice.lock().await.clone(),
    })
}

pub async fn dismiss_notice(State(state): State<AppState>) -> StatusCode {
    state.take_notice().await;
    StatusCode::NO_CONTENT
}

pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.subscribe()).filter_map(|message| {
        let event = message.ok()?;
        Event::default()
            .event(event.name())
            .json_data(&event)
            .ok()
            .map(Ok)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
