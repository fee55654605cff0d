//! User-triggered operations on the shared state.
//!
//! Every mutation follows the same order: validate input, change a copy,
//! persist it locally, commit it to memory, notify subscribers, then hand the
//! snapshot to a background push.
//! Callers never wait on the network except for the pull that follows a
//! sign-in.

use crate::auth::AuthTransition;
use crate::dates::{date_key, parse_iso};
use crate::errors::{AppError, InputError};
use crate::models::{AppData, DayStatus, Entry, PullOutcome, User};
use crate::state::{AppState, ChangeOrigin, StateEvent};
use crate::stats::{celebration_milestone, status_for_date};
use crate::storage::persist_data;
use crate::sync::apply_remote;
use chrono::NaiveDate;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub const PULL_FAILED_NOTICE: &str = "Could not load cloud data; using local data.";
pub const PUSH_FAILED_NOTICE: &str =
    "Could not sync to cloud (you might be offline). Local data is still safe.";

/// A remote push running in the background, if one was started. Dropping it
/// leaves the push running.
#[derive(Debug)]
pub struct PendingPush(Option<JoinHandle<()>>);

impl PendingPush {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn is_scheduled(&self) -> bool {
        self.0.is_some()
    }

    pub async fn settled(self) {
        if let Some(handle) = self.0 {
            let _ = handle.await;
        }
    }
}

pub struct Saved {
    pub date: NaiveDate,
    pub entry: Entry,
    pub status: DayStatus,
    pub celebrate: Option<u32>,
    pub push: PendingPush,
}

pub fn parse_date(value: &str) -> Result<NaiveDate, InputError> {
    parse_iso(value.trim()).ok_or_else(|| InputError::InvalidDate(value.to_string()))
}

pub fn validate_count(value: f64) -> Result<i64, InputError> {
    whole_non_negative(value)
        .map(i64::from)
        .ok_or(InputError::InvalidCount)
}

pub fn validate_goal(value: f64) -> Result<u32, InputError> {
    whole_non_negative(value).ok_or(InputError::InvalidGoal)
}

fn whole_non_negative(value: f64) -> Option<u32> {
    let valid = value.is_finite()
        && value >= 0.0
        && value.fract() == 0.0
        && value <= f64::from(u32::MAX);
    valid.then_some(value as u32)
}

pub async fn set_goal(state: &AppState, goal: f64) -> Result<(u32, PendingPush), AppError> {
    let goal = validate_goal(goal)?;

    let snapshot = {
        let mut data = state.data.lock().await;
        let mut next = data.clone();
        next.set_goal(goal);
        persist_data(&state.data_path, &next).await?;
        *data = next.clone();
        next
    };

    state.emit(StateEvent::Changed {
        origin: ChangeOrigin::Local,
    });
    Ok((goal, schedule_push(state, snapshot).await))
}

pub async fn save_entry(
    state: &AppState,
    date: NaiveDate,
    count: f64,
    notes: &str,
) -> Result<Saved, AppError> {
    let count = validate_count(count)?;

    let (entry, status, celebrate, snapshot) = {
        let mut data = state.data.lock().await;
        let mut next = data.clone();
        let entry = next.set_entry(date, count, notes).clone();
        persist_data(&state.data_path, &next).await?;
        *data = next.clone();

        let celebrate = celebration_milestone(&next, date);
        (entry, status_for_date(&next, date), celebrate, next)
    };

    state.emit(StateEvent::Changed {
        origin: ChangeOrigin::Local,
    });
    if let Some(streak) = celebrate {
        info!(date = %date, streak, "zero streak milestone reached");
        state.emit(StateEvent::Celebrate {
            date: date_key(date),
            streak,
        });
    }

    Ok(Saved {
        date,
        entry,
        status,
        celebrate,
        push: schedule_push(state, snapshot).await,
    })
}

/// Returns `false` (and touches nothing) when the date had no entry.
pub async fn delete_entry(
    state: &AppState,
    date: NaiveDate,
) -> Result<(bool, PendingPush), AppError> {
    let snapshot = {
        let mut data = state.data.lock().await;
        let mut next = data.clone();
        if !next.delete_entry(date) {
            return Ok((false, PendingPush::none()));
        }
        persist_data(&state.data_path, &next).await?;
        *data = next.clone();
        next
    };

    state.emit(StateEvent::Changed {
        origin: ChangeOrigin::Local,
    });
    Ok((true, schedule_push(state, snapshot).await))
}

/// Feeds an auth provider callback into the core. A transition into a
/// signed-in user pulls the remote copy before returning. If that pull cannot
/// be stored locally the previous session is restored, so the same callback
/// can be retried.
pub async fn handle_auth_change(
    state: &AppState,
    next: Option<User>,
) -> Result<(AuthTransition, Option<PullOutcome>), AppError> {
    if next.as_ref().is_some_and(|user| user.uid.trim().is_empty()) {
        return Err(InputError::MissingUserId.into());
    }

    let previous = state.sync.current_user().await;
    let transition = state.sync.transition(next).await;
    let outcome = match &transition {
        AuthTransition::SignedIn(user) => {
            info!(uid = %user.uid, "signed in, pulling remote state");
            match pull_remote(state, user).await {
                Ok(outcome) => Some(outcome),
                Err(err) => {
                    warn!(uid = %user.uid, "sign-in pull failed, keeping previous session");
                    state.sync.restore(previous).await;
                    return Err(err);
                }
            }
        }
        AuthTransition::SignedOut => {
            info!("signed out, continuing with local data");
            None
        }
        AuthTransition::Unchanged => None,
    };
    Ok((transition, outcome))
}

/// Remote wins: an existing document replaces local goal and entries. A
/// missing one is created from local state.
pub async fn pull_remote(state: &AppState, user: &User) -> Result<PullOutcome, AppError> {
    let outcome = match state.sync.fetch(user).await {
        Ok(Some(document)) => {
            let mut data = state.data.lock().await;
            let mut next = data.clone();
            let changed = apply_remote(&mut next, &document);
            persist_data(&state.data_path, &next).await?;
            *data = next;
            info!(uid = %user.uid, changed, "applied remote state");
            PullOutcome::Applied
        }
        Ok(None) => {
            let snapshot = state.data.lock().await.clone();
            match state.sync.seed(user, &snapshot).await {
                Ok(()) => {
                    info!(uid = %user.uid, "created remote copy from local state");
                    PullOutcome::Seeded
                }
                Err(err) => {
                    warn!(uid = %user.uid, "failed to create remote state: {err}");
                    state.set_notice(PUSH_FAILED_NOTICE).await;
                    PullOutcome::Failed
                }
            }
        }
        Err(err) => {
            warn!(uid = %user.uid, "failed to load remote state: {err}");
            state.set_notice(PULL_FAILED_NOTICE).await;
            PullOutcome::Failed
        }
    };

    state.emit(StateEvent::Changed {
        origin: ChangeOrigin::Remote,
    });
    Ok(outcome)
}

async fn schedule_push(state: &AppState, snapshot: AppData) -> PendingPush {
    let Some(user) = state.sync.current_user().await else {
        return PendingPush::none();
    };

    let state = state.clone();
    PendingPush(Some(tokio::spawn(async move {
        if let Err(err) = state.sync.push(Some(&user), &snapshot).await {
            warn!(uid = %user.uid, "failed to push state: {err}");
            state.set_notice(PUSH_FAILED_NOTICE).await;
        }
    })))
}
