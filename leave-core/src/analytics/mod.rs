//! Leave aggregation engine.
//!
//! Everything here is a pure fold over a [`TeamData`] snapshot: the same snapshot and the
//! same `today` always give the same metrics. Missing members, months or days count as no
//! leave; nothing in the engine fails.

mod annual;
mod comparison;
mod counting;
mod insights;
mod monthly;

pub use annual::*;
pub use comparison::*;
pub use counting::*;
pub use insights::*;
pub use monthly::*;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::{MonthLeaveMap, TeamData};

#[derive(Error, Debug, PartialEq)]
pub enum PeriodError {
    #[error("year must have four digits, got {0}")]
    InvalidYear(i32),
    #[error("month index must be between 0 and 11, got {0}")]
    InvalidMonthIndex(u32),
    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),
}

/// The stretch of time a dashboard covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Period {
    Year { year: i32 },
    /// `month` is 1-based.
    Month { year: i32, month: u32 },
}

impl Period {
    pub fn year(year: i32) -> Result<Self, PeriodError> {
        check_year(year)?;
        Ok(Period::Year { year })
    }

    pub fn month(year: i32, month: u32) -> Result<Self, PeriodError> {
        check_year(year)?;
        if !(1..=12).contains(&month) {
            return Err(PeriodError::InvalidMonth(month));
        }
        Ok(Period::Month { year, month })
    }

    /// Builds a period from a 0-based month index, as month pickers hand it out.
    pub fn from_index(year: i32, month_index: Option<u32>) -> Result<Self, PeriodError> {
        match month_index {
            None => Self::year(year),
            Some(index) if index < 12 => Self::month(year, index + 1),
            Some(index) => Err(PeriodError::InvalidMonthIndex(index)),
        }
    }
}

fn check_year(year: i32) -> Result<(), PeriodError> {
    if (1000..=9999).contains(&year) {
        Ok(())
    } else {
        Err(PeriodError::InvalidYear(year))
    }
}

/// Whose leave the metrics are about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "member", rename_all = "camelCase")]
pub enum Scope {
    Team,
    Member(String),
}

impl Scope {
    pub fn member(name: impl Into<String>) -> Self {
        Scope::Member(name.into())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum Metrics {
    Annual(AnnualMetrics),
    Monthly(MonthlyMetrics),
}

/// Read-only view over a team snapshot, pinned to a reference date for year-to-date and
/// streak calculations.
#[derive(Debug, Clone, Copy)]
pub struct Analytics<'a> {
    data: &'a TeamData,
    today: NaiveDate,
}

impl<'a> Analytics<'a> {
    pub fn new(data: &'a TeamData, today: NaiveDate) -> Self {
        Self { data, today }
    }

    pub fn metrics(&self, period: Period, scope: &Scope) -> Metrics {
        match period {
            Period::Year { year } => Metrics::Annual(self.annual(year, scope)),
            Period::Month { year, month } => Metrics::Monthly(self.monthly(year, month, scope)),
        }
    }

    /// Roster members covered by `scope`. A member outside the roster covers nobody.
    pub fn scoped_members(&self, scope: &Scope) -> Vec<&'a str> {
        match scope {
            Scope::Team => self.data.members().iter().map(String::as_str).collect(),
            Scope::Member(name) => self
                .data
                .members()
                .iter()
                .find(|m| *m == name)
                .map(String::as_str)
                .into_iter()
                .collect(),
        }
    }

    /// Committed leave of a roster member in one month.
    pub fn member_month(&self, member: &str, year: i32, month: u32) -> Option<&'a MonthLeaveMap> {
        if !self.data.has_member(member) {
            return None;
        }
        self.data.leave().month_for(member, year, month)
    }

    pub fn member_month_total(&self, member: &str, year: i32, month: u32) -> f64 {
        calculate_leave_days(self.member_month(member, year, month))
    }

    pub fn member_year_total(&self, member: &str, year: i32) -> f64 {
        self.member_total_through(member, year, 12)
    }

    /// Leave of `member` from January through `last_month` of `year`.
    pub fn member_total_through(&self, member: &str, year: i32, last_month: u32) -> f64 {
        (1..=last_month)
            .map(|month| self.member_month_total(member, year, month))
            .sum()
    }
}

/// Rounds halves towards positive infinity (`-2.5` → `-2`, `2.5` → `3`).
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
