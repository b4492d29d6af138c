use std::cmp::Ordering;

use chrono::{Datelike, NaiveDate, Weekday};
use itertools::Itertools;
use serde::Serialize;
use strum::Display;

use crate::date_keys::is_weekday;

use super::{average_instance_length, round_half_up, Analytics, LeaveInstance};

/// Where a member stands against the whole roster for a year.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ranking {
    /// 1-based; members with equal totals share a rank.
    pub rank: usize,
    pub team_size: usize,
    pub percentile: i64,
    pub member_total: f64,
    /// Average over the whole roster, the ranked member included.
    pub team_average: f64,
    pub difference: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum PredictabilityLevel {
    High,
    Medium,
    Low,
}

/// How regular a member's leave pattern is. Each component is scored 0-10.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Predictability {
    /// Fewer, longer blocks score higher.
    pub clustering: f64,
    /// Even spread across quarters scores higher.
    pub seasonal_consistency: f64,
    pub monthly_spread: f64,
    pub score: f64,
    pub level: PredictabilityLevel,
}

const NEUTRAL_SCORE: f64 = 5.0;

impl Predictability {
    pub fn from_pattern(
        total_days: f64,
        instances: &[LeaveInstance],
        quarterly: &[f64; 4],
        months_with_leave: usize,
    ) -> Self {
        let (clustering, seasonal_consistency, monthly_spread) = if total_days <= 0.0 {
            (NEUTRAL_SCORE, NEUTRAL_SCORE, NEUTRAL_SCORE)
        } else {
            (
                (average_instance_length(instances) * 2.0).min(10.0),
                (10.0 - variance(quarterly) / 2.0).max(0.0),
                match months_with_leave {
                    6..=9 => 8.0,
                    4..=11 => 6.0,
                    _ => 3.0,
                },
            )
        };

        let score = (clustering + seasonal_consistency + monthly_spread) / 3.0;
        let level = if score >= 7.0 {
            PredictabilityLevel::High
        } else if score >= 4.0 {
            PredictabilityLevel::Medium
        } else {
            PredictabilityLevel::Low
        };

        Self {
            clustering,
            seasonal_consistency,
            monthly_spread,
            score,
            level,
        }
    }
}

/// Population variance.
fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberInsights {
    pub ranking: Option<Ranking>,
    /// Longest run of weekdays without leave, in weekdays.
    pub work_streak: u32,
    /// Percentage of leave days falling on a Friday or Monday.
    pub weekend_proximity: u32,
    /// Mean number of days between two leave instances.
    pub recovery_days: u32,
    pub predictability: Predictability,
}

impl Analytics<'_> {
    /// Ranks `member` by annual leave among the roster. `None` for an empty roster.
    pub fn ranking(&self, member: &str, year: i32) -> Option<Ranking> {
        let roster = self.data.members();
        if roster.is_empty() {
            return None;
        }

        let totals: Vec<f64> = roster
            .iter()
            .map(|m| self.member_year_total(m, year))
            .sorted_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal))
            .collect();

        let team_size = totals.len();
        let member_total = self.member_year_total(member, year);
        let rank = totals
            .iter()
            .position(|total| *total <= member_total)
            .map_or(team_size, |index| index + 1);

        let percentile =
            round_half_up((1.0 - (rank - 1) as f64 / team_size as f64) * 100.0) as i64;
        let team_average = totals.iter().sum::<f64>() / team_size as f64;

        Some(Ranking {
            rank,
            team_size,
            percentile,
            member_total,
            team_average,
            difference: member_total - team_average,
        })
    }

    /// Longest run of weekdays without any leave, from January 1 up to today or the end
    /// of the year, whichever is earlier.
    pub fn work_streak(&self, member: &str, year: i32) -> u32 {
        let (Some(start), Some(end_of_year)) = (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) else {
            return 0;
        };
        let end = end_of_year.min(self.today);

        let mut longest = 0;
        let mut current = 0;
        for date in start.iter_days().take_while(|date| *date <= end) {
            if !is_weekday(date) {
                continue;
            }
            if self.leave_on(member, date) {
                longest = longest.max(current);
                current = 0;
            } else {
                current += 1;
            }
        }
        longest.max(current)
    }

    /// Share of leave days, of any type, falling on a Friday or a Monday, as a rounded
    /// percentage. 0 without leave.
    pub fn weekend_proximity(&self, member: &str, year: i32) -> u32 {
        let dates = self.leave_dates(member, year);
        if dates.is_empty() {
            return 0;
        }

        let adjacent = dates
            .iter()
            .filter(|date| matches!(date.weekday(), Weekday::Fri | Weekday::Mon))
            .count();
        round_half_up(adjacent as f64 * 100.0 / dates.len() as f64) as u32
    }

    /// Mean gap in days between consecutive leave instances of the year, rounded.
    /// Instances are grouped per month, so back-to-back leave across a month boundary has a
    /// gap of zero and is left out. 0 with fewer than two instances.
    pub fn recovery_pattern(&self, member: &str, year: i32) -> u32 {
        let spans: Vec<(NaiveDate, NaiveDate)> = self
            .member_year(member, year)
            .instances
            .into_iter()
            .filter_map(|(month, run)| {
                Some((
                    NaiveDate::from_ymd_opt(year, month, run.start_day)?,
                    NaiveDate::from_ymd_opt(year, month, run.end_day)?,
                ))
            })
            .collect();

        let gaps: Vec<i64> = spans
            .iter()
            .tuple_windows()
            .map(|((_, previous_end), (next_start, _))| (*next_start - *previous_end).num_days() - 1)
            .filter(|gap| *gap > 0)
            .collect();

        if gaps.is_empty() {
            return 0;
        }
        round_half_up(gaps.iter().sum::<i64>() as f64 / gaps.len() as f64) as u32
    }

    fn leave_on(&self, member: &str, date: NaiveDate) -> bool {
        self.member_month(member, date.year(), date.month())
            .and_then(|map| map.get(date.day()))
            .is_some()
    }

    fn leave_dates(&self, member: &str, year: i32) -> Vec<NaiveDate> {
        (1..=12)
            .filter_map(|month| Some((month, self.member_month(member, year, month)?)))
            .flat_map(|(month, map)| {
                map.days()
                    .filter_map(move |day| NaiveDate::from_ymd_opt(year, month, day))
            })
            .collect()
    }
}
