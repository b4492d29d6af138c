use serde::Serialize;
use tracing::debug;

use crate::date_keys::month_name;

use super::{
    calculate_leave_days, leave_instances, Analytics, DurationBuckets, LeaveInstance,
    MemberInsights, Predictability, Scope, YtdComparison,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTotal {
    pub month: u32,
    pub name: &'static str,
    pub total_days: f64,
}

/// Per-member line of a dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberStats {
    pub name: String,
    pub color: Option<&'static str>,
    pub total_days: f64,
    pub instances: usize,
    pub months_with_leave: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualMetrics {
    pub year: i32,
    pub scope: Scope,
    pub total_days: f64,
    /// Twelve entries, January first.
    pub monthly: Vec<MonthTotal>,
    pub quarterly: [f64; 4],
    /// First month with the highest total; `None` for a year without leave.
    pub peak_month: Option<MonthTotal>,
    pub members: Vec<MemberStats>,
    pub average_per_member: f64,
    pub instance_count: usize,
    pub average_instance_length: f64,
    pub duration_buckets: DurationBuckets,
    pub ytd: YtdComparison,
    /// Only filled in for a single-member scope.
    pub insights: Option<MemberInsights>,
}

impl AnnualMetrics {
    pub fn member(&self, name: &str) -> Option<&MemberStats> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Monthly series and leave instances of one member over a year, the raw material for the
/// annual rollup and the member insights.
#[derive(Debug, Default)]
pub(super) struct MemberYear {
    pub monthly: [f64; 12],
    /// Instances with the month (1-based) they belong to, chronological.
    pub instances: Vec<(u32, LeaveInstance)>,
}

impl MemberYear {
    pub fn total(&self) -> f64 {
        self.monthly.iter().sum()
    }

    pub fn quarterly(&self) -> [f64; 4] {
        quarterly(&self.monthly)
    }

    pub fn months_with_leave(&self) -> usize {
        self.monthly.iter().filter(|days| **days > 0.0).count()
    }

    pub fn runs(&self) -> Vec<LeaveInstance> {
        self.instances.iter().map(|(_, run)| *run).collect()
    }
}

impl Analytics<'_> {
    pub(super) fn member_year(&self, member: &str, year: i32) -> MemberYear {
        let mut monthly = [0.0; 12];
        let mut instances = Vec::new();

        for (index, month) in (1..=12).enumerate() {
            let map = self.member_month(member, year, month);
            monthly[index] = calculate_leave_days(map);
            instances.extend(leave_instances(map).into_iter().map(|run| (month, run)));
        }

        MemberYear { monthly, instances }
    }

    /// Year dashboard for the team or a single member.
    pub fn annual(&self, year: i32, scope: &Scope) -> AnnualMetrics {
        let members = self.scoped_members(scope);

        let mut monthly = [0.0; 12];
        let mut runs: Vec<LeaveInstance> = Vec::new();
        let mut member_stats = Vec::with_capacity(members.len());
        let mut member_years = Vec::with_capacity(members.len());

        for member in &members {
            let member_year = self.member_year(member, year);
            for (total, days) in monthly.iter_mut().zip(member_year.monthly) {
                *total += days;
            }
            runs.extend(member_year.runs());

            member_stats.push(MemberStats {
                name: member.to_string(),
                color: self.data.member_color(member),
                total_days: member_year.total(),
                instances: member_year.instances.len(),
                months_with_leave: member_year.months_with_leave(),
            });
            member_years.push(member_year);
        }

        let monthly_totals: Vec<MonthTotal> = (1..=12)
            .zip(monthly)
            .map(|(month, total_days)| MonthTotal {
                month,
                name: month_name(month),
                total_days,
            })
            .collect();

        let total_days: f64 = member_stats.iter().map(|m| m.total_days).sum();
        let average_per_member = if members.is_empty() {
            0.0
        } else {
            total_days / members.len() as f64
        };

        let insights = match scope {
            Scope::Member(name) => {
                let empty = MemberYear::default();
                let member_year = member_years.first().unwrap_or(&empty);
                Some(self.member_insights(name, year, member_year))
            }
            Scope::Team => None,
        };

        debug!(year, ?scope, total_days, "computed annual metrics");

        AnnualMetrics {
            year,
            scope: scope.clone(),
            total_days,
            peak_month: peak_month(&monthly_totals),
            monthly: monthly_totals,
            quarterly: quarterly(&monthly),
            members: member_stats,
            average_per_member,
            instance_count: runs.len(),
            average_instance_length: super::average_instance_length(&runs),
            duration_buckets: DurationBuckets::from_instances(&runs),
            ytd: self.ytd_comparison(year, scope),
            insights,
        }
    }

    fn member_insights(&self, member: &str, year: i32, member_year: &MemberYear) -> MemberInsights {
        MemberInsights {
            ranking: self.ranking(member, year),
            work_streak: self.work_streak(member, year),
            weekend_proximity: self.weekend_proximity(member, year),
            recovery_days: self.recovery_pattern(member, year),
            predictability: Predictability::from_pattern(
                member_year.total(),
                &member_year.runs(),
                &member_year.quarterly(),
                member_year.months_with_leave(),
            ),
        }
    }
}

pub(super) fn quarterly(monthly: &[f64; 12]) -> [f64; 4] {
    let mut quarters = [0.0; 4];
    for (index, days) in monthly.iter().enumerate() {
        quarters[index / 3] += days;
    }
    quarters
}

/// The first month whose total beats every earlier one; ties keep the earlier month.
fn peak_month(months: &[MonthTotal]) -> Option<MonthTotal> {
    let mut peak: Option<&MonthTotal> = None;
    for month in months {
        if month.total_days > peak.map_or(0.0, |p| p.total_days) {
            peak = Some(month);
        }
    }
    peak.cloned()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{LeaveType, TeamData};

    fn team() -> TeamData {
        let mut data = TeamData::with_members(["Alice", "Bob", "Carol"]);
        let leave = data.leave_mut();
        leave.set_day("Alice", 2024, 2, 5, Some(LeaveType::Full));
        leave.set_day("Alice", 2024, 2, 6, Some(LeaveType::Full));
        leave.set_day("Alice", 2024, 7, 1, Some(LeaveType::Morning));
        leave.set_day("Bob", 2024, 7, 15, Some(LeaveType::Full));
        leave.set_day("Bob", 2024, 7, 16, Some(LeaveType::Afternoon));
        leave.set_day("Bob", 2023, 7, 16, Some(LeaveType::Full));
        data
    }

    fn analytics(data: &TeamData) -> Analytics<'_> {
        Analytics::new(data, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap())
    }

    #[test]
    fn team_rollup_sums_members() {
        let data = team();
        let metrics = analytics(&data).annual(2024, &Scope::Team);

        assert_eq!(metrics.total_days, 4.0);
        assert_eq!(metrics.monthly[1].total_days, 2.0);
        assert_eq!(metrics.monthly[6].total_days, 2.0);
        assert_eq!(metrics.quarterly, [2.0, 0.0, 2.0, 0.0]);
        assert_eq!(metrics.member("Alice").unwrap().total_days, 2.5);
        assert_eq!(metrics.member("Bob").unwrap().total_days, 1.5);
        assert_eq!(metrics.member("Carol").unwrap().total_days, 0.0);
        assert_eq!(metrics.instance_count, 3);
        assert!(metrics.insights.is_none());
    }

    #[test]
    fn peak_ties_keep_the_earlier_month() {
        let data = team();
        let metrics = analytics(&data).annual(2024, &Scope::Team);

        let peak = metrics.peak_month.unwrap();
        assert_eq!(peak.name, "February");
        assert_eq!(peak.total_days, 2.0);
    }

    #[test]
    fn empty_year_has_no_peak() {
        let data = team();
        let metrics = analytics(&data).annual(2022, &Scope::Team);

        assert_eq!(metrics.total_days, 0.0);
        assert!(metrics.peak_month.is_none());
    }

    #[test]
    fn member_scope_only_counts_that_member() {
        let data = team();
        let metrics = analytics(&data).annual(2024, &Scope::member("Bob"));

        assert_eq!(metrics.total_days, 1.5);
        assert_eq!(metrics.members.len(), 1);
        assert_eq!(metrics.average_per_member, 1.5);
        assert_eq!(metrics.peak_month.unwrap().name, "July");
        assert!(metrics.insights.is_some());
    }

    #[test]
    fn unknown_member_gets_zeroes_not_errors() {
        let data = team();
        let metrics = analytics(&data).annual(2024, &Scope::member("Zed"));

        assert_eq!(metrics.total_days, 0.0);
        assert!(metrics.members.is_empty());
        let insights = metrics.insights.unwrap();
        assert_eq!(insights.weekend_proximity, 0);
        assert_eq!(insights.recovery_days, 0);
    }

    #[test]
    fn member_colors_follow_roster() {
        let data = team();
        let metrics = analytics(&data).annual(2024, &Scope::Team);
        assert_eq!(
            metrics.member("Bob").unwrap().color,
            Some(crate::MEMBER_PALETTE[1])
        );
    }
}
