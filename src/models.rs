use crate::dates::date_key;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const NOTES_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Entry {
    pub count: u32,
    pub notes: String,
}

impl Entry {
    pub fn new(count: i64, notes: &str) -> Self {
        Self {
            count: count.clamp(0, i64::from(u32::MAX)) as u32,
            notes: notes.trim().chars().take(NOTES_MAX_CHARS).collect(),
        }
    }
}

/// The persisted document, locally and remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct AppData {
    pub goal: u32,
    pub entries: BTreeMap<String, Entry>,
}

impl AppData {
    pub fn entry(&self, date: NaiveDate) -> Option<&Entry> {
        self.entries.get(&date_key(date))
    }

    pub fn count(&self, date: NaiveDate) -> u32 {
        self.entry(date).map(|entry| entry.count).unwrap_or(0)
    }

    pub fn notes(&self, date: NaiveDate) -> &str {
        self.entry(date).map(|entry| entry.notes.as_str()).unwrap_or("")
    }

    /// Writes a normalized entry, replacing whatever was stored for `date`.
    /// Negative counts are floored at zero.
    pub fn set_entry(&mut self, date: NaiveDate, count: i64, notes: &str) -> &Entry {
        let key = date_key(date);
        self.entries.insert(key.clone(), Entry::new(count, notes));
        &self.entries[&key]
    }

    pub fn delete_entry(&mut self, date: NaiveDate) -> bool {
        self.entries.remove(&date_key(date)).is_some()
    }

    pub fn set_goal(&mut self, goal: u32) {
        self.goal = goal;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Empty,
    Under,
    Equal,
    Over,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    pub goal: f64,
}

#[derive(Debug, Deserialize)]
pub struct EntryRequest {
    pub count: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AuthEvent {
    pub user: Option<User>,
}

/// How a sign-in's remote pull ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullOutcome {
    Applied,
    Seeded,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: Option<User>,
    pub pull: Option<PullOutcome>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub date: String,
    pub status: DayStatus,
    pub count: Option<u32>,
    pub goal: u32,
    pub label: String,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryResponse {
    pub date: String,
    pub logged: bool,
    pub count: u32,
    pub notes: String,
    pub status: DayStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveResponse {
    pub entry: EntryResponse,
    pub celebrate: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyStats {
    pub total: u64,
    pub logged_days: u8,
    pub average: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub milestone: u32,
    pub unlocked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub date: String,
    pub goal: u32,
    pub streak: u32,
    pub zero_streak: u32,
    pub weekly: WeeklyStats,
    pub badges: Vec<Badge>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarDay {
    pub day: u32,
    pub date: String,
    pub status: DayStatus,
    pub count: Option<u32>,
    pub is_today: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRef {
    pub year: i32,
    /// 1-12
    pub month: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
    pub previous: MonthRef,
    pub next: MonthRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItem {
    pub date: String,
    pub count: u32,
    pub notes: String,
    pub status: DayStatus,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub label: String,
    pub count: u32,
    pub status: DayStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeResponse {
    pub notice: Option<String>,
}
