use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::date_keys::{days_in_month, is_weekday, month_name};

use super::{
    average_instance_length, calculate_leave_days, leave_instances, Analytics, DurationBuckets,
    MemberStats, Scope,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusiestDay {
    pub day: u32,
    pub absent: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyMetrics {
    pub year: i32,
    pub month: u32,
    pub month_name: &'static str,
    pub scope: Scope,
    pub total_days: f64,
    pub members: Vec<MemberStats>,
    pub members_on_leave: usize,
    pub instance_count: usize,
    pub average_instance_length: f64,
    pub duration_buckets: DurationBuckets,
    /// Weekdays that are not public or custom holidays.
    pub working_days: u32,
    /// Working days on which nobody in scope is absent.
    pub zero_leave_working_days: u32,
    pub busiest_day: Option<BusiestDay>,
}

impl MonthlyMetrics {
    pub fn member(&self, name: &str) -> Option<&MemberStats> {
        self.members.iter().find(|m| m.name == name)
    }
}

impl Analytics<'_> {
    /// Month dashboard for the team or a single member. `month` is 1-based.
    pub fn monthly(&self, year: i32, month: u32, scope: &Scope) -> MonthlyMetrics {
        let members = self.scoped_members(scope);
        let maps: Vec<_> = members
            .iter()
            .map(|member| self.member_month(member, year, month))
            .collect();

        let mut runs = Vec::new();
        let member_stats: Vec<MemberStats> = members
            .iter()
            .zip(&maps)
            .map(|(member, map)| {
                let member_runs = leave_instances(*map);
                let total_days = calculate_leave_days(*map);
                let stats = MemberStats {
                    name: member.to_string(),
                    color: self.data.member_color(member),
                    total_days,
                    instances: member_runs.len(),
                    months_with_leave: usize::from(total_days > 0.0),
                };
                runs.extend(member_runs);
                stats
            })
            .collect();

        let absent_on = |day: u32| {
            maps.iter()
                .filter(|map| map.is_some_and(|m| m.get(day).is_some()))
                .count()
        };

        let mut working_days = 0;
        let mut zero_leave_working_days = 0;
        let mut busiest_day: Option<BusiestDay> = None;

        for day in 1..=days_in_month(year, month) {
            let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
                continue;
            };
            let absent = absent_on(day);

            if is_weekday(date) && !self.data.is_holiday(date) {
                working_days += 1;
                if absent == 0 {
                    zero_leave_working_days += 1;
                }
            }
            if absent > busiest_day.map_or(0, |b| b.absent) {
                busiest_day = Some(BusiestDay { day, absent });
            }
        }

        let total_days: f64 = member_stats.iter().map(|m| m.total_days).sum();
        debug!(year, month, ?scope, total_days, "computed monthly metrics");

        MonthlyMetrics {
            year,
            month,
            month_name: month_name(month),
            scope: scope.clone(),
            total_days,
            members_on_leave: member_stats.iter().filter(|m| m.total_days > 0.0).count(),
            members: member_stats,
            instance_count: runs.len(),
            average_instance_length: average_instance_length(&runs),
            duration_buckets: DurationBuckets::from_instances(&runs),
            working_days,
            zero_leave_working_days,
            busiest_day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LeaveType, PublicHoliday, TeamData};

    fn data() -> TeamData {
        let mut data = TeamData::with_members(["Alice", "Bob"]);
        let leave = data.leave_mut();
        // May 2024: the 1st is a Wednesday
        leave.set_day("Alice", 2024, 5, 2, Some(LeaveType::Full));
        leave.set_day("Alice", 2024, 5, 3, Some(LeaveType::Full));
        leave.set_day("Bob", 2024, 5, 3, Some(LeaveType::Morning));
        leave.set_day("Bob", 2024, 5, 20, Some(LeaveType::Full));
        data.add_public_holiday(
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            PublicHoliday::new("Labour Day", ""),
        )
        .unwrap();
        data
    }

    #[test]
    fn team_month() {
        let data = data();
        let analytics = Analytics::new(&data, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let metrics = analytics.monthly(2024, 5, &Scope::Team);

        assert_eq!(metrics.month_name, "May");
        assert_eq!(metrics.total_days, 3.5);
        assert_eq!(metrics.members_on_leave, 2);
        assert_eq!(metrics.member("Bob").unwrap().instances, 2);
        assert_eq!(metrics.instance_count, 3);
        // 23 weekdays minus the holiday
        assert_eq!(metrics.working_days, 22);
        assert_eq!(metrics.zero_leave_working_days, 19);
        assert_eq!(metrics.busiest_day, Some(BusiestDay { day: 3, absent: 2 }));
    }

    #[test]
    fn member_month() {
        let data = data();
        let analytics = Analytics::new(&data, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let metrics = analytics.monthly(2024, 5, &Scope::member("Alice"));

        assert_eq!(metrics.total_days, 2.0);
        assert_eq!(metrics.duration_buckets.two_to_three_days, 1);
        assert_eq!(metrics.zero_leave_working_days, 20);
        assert_eq!(metrics.busiest_day, Some(BusiestDay { day: 2, absent: 1 }));
    }

    #[test]
    fn quiet_month() {
        let data = data();
        let analytics = Analytics::new(&data, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let metrics = analytics.monthly(2024, 6, &Scope::Team);

        assert_eq!(metrics.total_days, 0.0);
        assert_eq!(metrics.members_on_leave, 0);
        assert!(metrics.busiest_day.is_none());
        assert_eq!(metrics.working_days, metrics.zero_leave_working_days);
    }
}
