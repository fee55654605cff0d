use crate::dates::{date_key, days_in_month, first_weekday_offset, iso_of, shift_month};
use crate::models::{
    AppData, Badge, CalendarDay, CalendarMonth, DayStatus, HistoryItem, MonthRef, StatusReport,
    SummaryResponse, TrendPoint, WeeklyStats,
};
use chrono::{Datelike, Duration, NaiveDate};

pub const LOOKBACK_DAYS: u32 = 365;
pub const BADGE_MILESTONES: [u32; 5] = [1, 3, 7, 14, 30];
pub const CELEBRATION_MILESTONES: [u32; 10] = [1, 3, 7, 14, 21, 30, 60, 90, 100, 365];
pub const HISTORY_LIMIT: usize = 30;
pub const TREND_DAYS: u32 = 14;

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// Consecutive days at or under goal, ending today. An unlogged today is a
/// grace day and the walk starts from yesterday instead.
pub fn calculate_streak(data: &AppData, today: NaiveDate) -> u32 {
    let mut streak = 0;

    if let Some(entry) = data.entry(today) {
        if entry.count > data.goal {
            return 0;
        }
        streak += 1;
    }

    let mut check = today - Duration::days(1);
    for _ in 0..LOOKBACK_DAYS {
        match data.entry(check) {
            Some(entry) if entry.count <= data.goal => {
                streak += 1;
                check -= Duration::days(1);
            }
            _ => break,
        }
    }
    streak
}

/// Consecutive days ending at `end` with a logged count of exactly zero.
pub fn calculate_zero_streak(data: &AppData, end: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut check = end;
    for _ in 0..LOOKBACK_DAYS {
        match data.entry(check) {
            Some(entry) if entry.count == 0 => {
                streak += 1;
                check -= Duration::days(1);
            }
            _ => break,
        }
    }
    streak
}

/// Totals over the trailing seven days. Only logged days (zeros included)
/// count toward the average's denominator.
pub fn calculate_weekly_stats(data: &AppData, today: NaiveDate) -> WeeklyStats {
    let mut total = 0u64;
    let mut logged_days = 0u8;
    for offset in 0..7 {
        if let Some(entry) = data.entry(today - Duration::days(offset)) {
            total = total.saturating_add(u64::from(entry.count));
            logged_days += 1;
        }
    }

    let average = if logged_days == 0 {
        "0.0".to_string()
    } else {
        format!("{:.1}", total as f64 / f64::from(logged_days))
    };

    WeeklyStats {
        total,
        logged_days,
        average,
    }
}

pub fn classify(count: Option<u32>, goal: u32) -> DayStatus {
    match count {
        None => DayStatus::Empty,
        Some(0) if goal == 0 => DayStatus::Under,
        Some(count) if count < goal => DayStatus::Under,
        Some(count) if count == goal => DayStatus::Equal,
        Some(_) => DayStatus::Over,
    }
}

pub fn status_label(count: Option<u32>, goal: u32) -> &'static str {
    match (classify(count, goal), count) {
        (DayStatus::Empty, _) => "no data",
        (DayStatus::Under, Some(0)) if goal == 0 => "on track",
        (DayStatus::Under, _) => "under",
        (DayStatus::Equal, _) => "at goal",
        (DayStatus::Over, _) => "over",
    }
}

pub fn status_for_date(data: &AppData, date: NaiveDate) -> DayStatus {
    classify(data.entry(date).map(|entry| entry.count), data.goal)
}

pub fn status_report(data: &AppData, date: NaiveDate) -> StatusReport {
    let key = date_key(date);
    let goal = data.goal;
    let count = data.entry(date).map(|entry| entry.count);
    let status = classify(count, goal);

    let (title, message) = match (status, count) {
        (DayStatus::Empty, _) | (_, None) => (
            "No data for this date yet".to_string(),
            "Add how many drinks you had to see how it compares to your goal.".to_string(),
        ),
        (DayStatus::Under, Some(0)) if goal == 0 => (
            "On track".to_string(),
            format!("You logged 0 drinks for {key}. Your goal is 0, you're fully on track."),
        ),
        (DayStatus::Under, Some(count)) => (
            "Under your goal".to_string(),
            format!(
                "You had {count} drink(s) on {key}. Your goal is {goal}, so you are under by {}.",
                goal - count
            ),
        ),
        (DayStatus::Equal, Some(count)) => (
            "Exactly at your goal".to_string(),
            format!("You had {count} drink(s) on {key}, which matches your goal of {goal}."),
        ),
        (DayStatus::Over, Some(count)) => (
            "Over your goal".to_string(),
            format!(
                "You had {count} drink(s) on {key}. Your goal is {goal}, so you're over by {}.",
                count - goal
            ),
        ),
    };

    StatusReport {
        date: key,
        status,
        count,
        goal,
        label: status_label(count, goal).to_string(),
        title,
        message,
    }
}

pub fn badges(data: &AppData, today: NaiveDate) -> Vec<Badge> {
    let zero_streak = calculate_zero_streak(data, today);
    BADGE_MILESTONES
        .iter()
        .map(|&milestone| Badge {
            milestone,
            unlocked: zero_streak >= milestone,
        })
        .collect()
}

/// The milestone reached by saving a zero for `date`, if any.
pub fn celebration_milestone(data: &AppData, date: NaiveDate) -> Option<u32> {
    if data.entry(date)?.count != 0 {
        return None;
    }
    let streak = calculate_zero_streak(data, date);
    CELEBRATION_MILESTONES.contains(&streak).then_some(streak)
}

pub fn summary(data: &AppData, today: NaiveDate) -> SummaryResponse {
    SummaryResponse {
        date: date_key(today),
        goal: data.goal,
        streak: calculate_streak(data, today),
        zero_streak: calculate_zero_streak(data, today),
        weekly: calculate_weekly_stats(data, today),
        badges: badges(data, today),
    }
}

/// One month of calendar cells for a Sunday-first grid. `month_index` is
/// zero-based. `None` when the month or its neighbours cannot be represented.
pub fn calendar_month(
    data: &AppData,
    year: i32,
    month_index: u32,
    today: NaiveDate,
) -> Option<CalendarMonth> {
    let today_key = date_key(today);
    let days = (1..=days_in_month(year, month_index)?)
        .map(|day| {
            let date = iso_of(year, month_index, day);
            let count = data.entries.get(&date).map(|entry| entry.count);
            CalendarDay {
                day,
                is_today: date == today_key,
                status: classify(count, data.goal),
                count,
                date,
            }
        })
        .collect();

    let month_ref = |delta: i32| {
        shift_month(year, month_index, delta).map(|(year, month_index)| MonthRef {
            year,
            month: month_index + 1,
        })
    };

    Some(CalendarMonth {
        year,
        month: month_index + 1,
        label: format!("{} {year}", MONTH_NAMES[month_index as usize % 12]),
        leading_blanks: first_weekday_offset(year, month_index),
        days,
        previous: month_ref(-1)?,
        next: month_ref(1)?,
    })
}

pub fn history(data: &AppData, limit: usize) -> Vec<HistoryItem> {
    data.entries
        .iter()
        .rev()
        .take(limit)
        .map(|(date, entry)| HistoryItem {
            date: date.clone(),
            count: entry.count,
            notes: entry.notes.clone(),
            status: classify(Some(entry.count), data.goal),
            label: status_label(Some(entry.count), data.goal).to_string(),
        })
        .collect()
}

/// Daily counts for the trailing `days`, oldest first.
pub fn trend(data: &AppData, today: NaiveDate, days: u32) -> Vec<TrendPoint> {
    (0..days)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(i64::from(offset));
            let count = data.entry(date).map(|entry| entry.count);
            TrendPoint {
                date: date_key(date),
                label: format!("{:02}", date.day()),
                count: count.unwrap_or(0),
                status: classify(count, data.goal),
            }
        })
        .collect()
}
