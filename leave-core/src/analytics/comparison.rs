use chrono::Datelike;
use serde::Serialize;
use strum::Display;

use super::{round_half_up, Analytics, Scope};

/// Changes within this many percent either way count as stable.
const TREND_THRESHOLD_PERCENT: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

/// Year-to-date leave against the same months of the previous year.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YtdComparison {
    pub year: i32,
    /// Last month (1-based) included on both sides.
    pub through_month: u32,
    pub current: f64,
    pub previous: f64,
    pub percentage: i64,
    pub trend: Trend,
}

impl YtdComparison {
    pub fn between(year: i32, through_month: u32, current: f64, previous: f64) -> Self {
        let percentage = if previous == 0.0 {
            if current > 0.0 {
                100
            } else {
                0
            }
        } else {
            round_half_up((current - previous) / previous * 100.0) as i64
        };

        let trend = if percentage > TREND_THRESHOLD_PERCENT {
            Trend::Increasing
        } else if percentage < -TREND_THRESHOLD_PERCENT {
            Trend::Decreasing
        } else {
            Trend::Stable
        };

        Self {
            year,
            through_month,
            current,
            previous,
            percentage,
            trend,
        }
    }
}

impl Analytics<'_> {
    /// Compares `year` with the year before over the months up to today's month when `year`
    /// is the current year, over the full year otherwise.
    pub fn ytd_comparison(&self, year: i32, scope: &Scope) -> YtdComparison {
        let through_month = if year == self.today.year() {
            self.today.month()
        } else {
            12
        };

        let members = self.scoped_members(scope);
        let total = |year: i32| -> f64 {
            members
                .iter()
                .map(|member| self.member_total_through(member, year, through_month))
                .sum()
        };

        YtdComparison::between(year, through_month, total(year), total(year - 1))
    }
}
