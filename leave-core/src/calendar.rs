use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::date_keys::{days_in_month, is_weekday, month_name};
use crate::pending::PendingBuffer;
use crate::{LeaveType, TeamData};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day: u32,
    pub weekday: Weekday,
    pub is_weekend: bool,
    pub leave: Option<LeaveType>,
    /// The shown leave comes from an unsaved edit.
    pub pending: bool,
    pub holidays: Vec<String>,
    pub special_dates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthCalendar {
    pub member: String,
    pub year: i32,
    pub month: u32,
    pub month_name: &'static str,
    pub color: Option<&'static str>,
    pub days: Vec<CalendarDay>,
    pub committed_days: f64,
    /// Leave days including unsaved edits.
    pub effective_days: f64,
}

/// One member's month as the calendar shows it: committed leave overlaid with pending
/// edits for that member-month, plus holidays, birthdays and work anniversaries.
pub fn month_view(
    data: &TeamData,
    pending: &PendingBuffer,
    member: &str,
    year: i32,
    month: u32,
) -> MonthCalendar {
    let committed = data.leave().month_for(member, year, month);
    let selection = pending
        .selection()
        .filter(|s| s.member == member && s.year == year && s.month == month);

    let days: Vec<CalendarDay> = (1..=days_in_month(year, month))
        .filter_map(|day| {
            let date = NaiveDate::from_ymd_opt(year, month, day)?;
            let stored = committed.and_then(|m| m.get(day));
            let edit = selection.and_then(|s| s.edit(day));

            Some(CalendarDay {
                date,
                day,
                weekday: date.weekday(),
                is_weekend: !is_weekday(date),
                leave: edit.unwrap_or(stored),
                pending: edit.is_some(),
                holidays: data.holiday_labels(date),
                special_dates: data
                    .special_dates_on(date)
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
            })
        })
        .collect();

    let effective_days: f64 = days
        .iter()
        .filter_map(|d| d.leave)
        .map(LeaveType::weight)
        .sum();
    let committed_days = committed.map_or(0.0, |m| m.iter().map(|(_, t)| t.weight()).sum());

    MonthCalendar {
        member: member.to_string(),
        year,
        month,
        month_name: month_name(month),
        color: data.member_color(member),
        days,
        committed_days,
        effective_days,
    }
}
