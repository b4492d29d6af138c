//! Plain-text rendering of dashboards and month calendars.

use chrono::Weekday;
use leave_core::analytics::{
    AnnualMetrics, DurationBucket, DurationBuckets, MemberInsights, MemberStats, Metrics,
    MonthlyMetrics, Scope, Trend, YtdComparison,
};
use leave_core::calendar::MonthCalendar;
use leave_core::date_keys::ordinal;
use leave_core::LeaveType;
use strum::IntoEnumIterator;

const BAR_COLS: usize = 30;

pub fn render_metrics(metrics: &Metrics) -> String {
    match metrics {
        Metrics::Annual(annual) => render_annual(annual),
        Metrics::Monthly(monthly) => render_monthly(monthly),
    }
}

fn scope_label(scope: &Scope) -> &str {
    match scope {
        Scope::Team => "Team",
        Scope::Member(name) => name.as_str(),
    }
}

fn days(value: f64) -> String {
    format!("{value:.1}")
}

fn bar(value: f64, max: f64) -> String {
    if value <= 0.0 || max <= 0.0 {
        return "─".repeat(BAR_COLS);
    }
    let filled = ((value / max) * BAR_COLS as f64).round() as usize;
    let filled = filled.clamp(1, BAR_COLS);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_COLS - filled))
}

fn render_annual(m: &AnnualMetrics) -> String {
    let mut lines = vec![format!("Leave {} · {}", m.year, scope_label(&m.scope))];

    let peak = m
        .peak_month
        .as_ref()
        .map_or_else(|| "none".to_string(), |p| p.name.to_string());
    lines.push(format!(
        "Total: {} days · Avg per member: {} · Peak month: {}",
        days(m.total_days),
        days(m.average_per_member),
        peak
    ));
    lines.push(ytd_line(&m.ytd));
    lines.push(String::new());

    let max = m.monthly.iter().map(|t| t.total_days).fold(0.0_f64, f64::max);
    for total in &m.monthly {
        let short = total.name.get(..3).unwrap_or(total.name);
        lines.push(format!(
            "{short:<4} {} {:>5}",
            bar(total.total_days, max),
            days(total.total_days)
        ));
    }
    lines.push(format!(
        "Quarters: Q1 {} · Q2 {} · Q3 {} · Q4 {}",
        days(m.quarterly[0]),
        days(m.quarterly[1]),
        days(m.quarterly[2]),
        days(m.quarterly[3])
    ));
    lines.push(String::new());

    lines.extend(member_lines(&m.members));
    lines.push(format!(
        "Instances: {} · Avg length: {} days",
        m.instance_count,
        days(m.average_instance_length)
    ));
    lines.push(bucket_line(&m.duration_buckets));

    if let Some(insights) = &m.insights {
        lines.push(String::new());
        lines.extend(insight_lines(insights));
    }

    lines.join("\n")
}

fn render_monthly(m: &MonthlyMetrics) -> String {
    let mut lines = vec![
        format!("Leave {} {} · {}", m.month_name, m.year, scope_label(&m.scope)),
        format!(
            "Total: {} days · Members on leave: {} · Instances: {} · Avg length: {} days",
            days(m.total_days),
            m.members_on_leave,
            m.instance_count,
            days(m.average_instance_length)
        ),
        format!(
            "Working days: {} · Without absences: {}",
            m.working_days, m.zero_leave_working_days
        ),
    ];
    if let Some(busiest) = m.busiest_day {
        lines.push(format!(
            "Busiest day: {} {} ({} absent)",
            m.month_name,
            ordinal(busiest.day),
            busiest.absent
        ));
    }
    lines.push(String::new());
    lines.extend(member_lines(&m.members));
    lines.push(bucket_line(&m.duration_buckets));
    lines.join("\n")
}

fn ytd_line(ytd: &YtdComparison) -> String {
    let arrow = match ytd.trend {
        Trend::Increasing => "↑",
        Trend::Decreasing => "↓",
        Trend::Stable => "→",
    };
    format!(
        "Year to date: {} vs {} in {} ({:+}% {arrow} {})",
        days(ytd.current),
        days(ytd.previous),
        ytd.year - 1,
        ytd.percentage,
        ytd.trend
    )
}

fn member_lines(members: &[MemberStats]) -> Vec<String> {
    let width = members.iter().map(|m| m.name.chars().count()).max().unwrap_or(0);
    members
        .iter()
        .map(|m| {
            format!(
                "■ {:<width$}  {:>5} days  {} instances  {} months",
                m.name,
                days(m.total_days),
                m.instances,
                m.months_with_leave
            )
        })
        .collect()
}

fn bucket_line(buckets: &DurationBuckets) -> String {
    let parts: Vec<String> = DurationBucket::iter()
        .map(|bucket| format!("{bucket}: {}", buckets.get(bucket)))
        .collect();
    format!("Durations: {}", parts.join(" · "))
}

fn insight_lines(insights: &MemberInsights) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(r) = &insights.ranking {
        lines.push(format!(
            "Rank: {} of {} ({} percentile) · Team avg {} ({:+.1})",
            r.rank,
            r.team_size,
            ordinal(u32::try_from(r.percentile).unwrap_or(0)),
            days(r.team_average),
            r.difference
        ));
    }
    let p = &insights.predictability;
    lines.extend([
        format!("Longest work streak: {} weekdays", insights.work_streak),
        format!("Next to a weekend: {}%", insights.weekend_proximity),
        format!("Days between leaves: {}", insights.recovery_days),
        format!(
            "Predictability: {} ({:.1}/10; clustering {:.1}, seasons {:.1}, spread {:.1})",
            p.level, p.score, p.clustering, p.seasonal_consistency, p.monthly_spread
        ),
    ]);
    lines
}

fn leave_marker(leave: Option<LeaveType>) -> char {
    match leave {
        Some(LeaveType::Full) => 'F',
        Some(LeaveType::Morning) => 'M',
        Some(LeaveType::Afternoon) => 'A',
        None => ' ',
    }
}

/// Month grid, Monday first. Each cell is the day number followed by a leave marker
/// (F, M or A), `*` for an unsaved edit and `h` for a holiday.
pub fn render_calendar(calendar: &MonthCalendar) -> String {
    let mut lines = vec![
        format!(
            "{} · {} {}",
            calendar.member, calendar.month_name, calendar.year
        ),
        " Mo    Tu    We    Th    Fr    Sa    Su".to_string(),
    ];

    let offset = calendar
        .days
        .first()
        .map_or(0, |d| d.weekday.num_days_from_monday() as usize);
    let mut row = "      ".repeat(offset);
    for day in &calendar.days {
        let holiday = if day.holidays.is_empty() { ' ' } else { 'h' };
        let pending = if day.pending { '*' } else { ' ' };
        row.push_str(&format!(
            "{:>3}{}{}{}",
            day.day,
            leave_marker(day.leave),
            pending,
            holiday
        ));
        if day.weekday == Weekday::Sun {
            lines.push(row.trim_end().to_string());
            row = String::new();
        }
    }
    if !row.is_empty() {
        lines.push(row.trim_end().to_string());
    }

    let notes: Vec<String> = calendar
        .days
        .iter()
        .flat_map(|d| {
            d.holidays
                .iter()
                .chain(&d.special_dates)
                .map(move |note| format!("{:>3}  {note}", d.day))
        })
        .collect();
    if !notes.is_empty() {
        lines.push(String::new());
        lines.extend(notes);
    }

    lines.push(String::new());
    if calendar.effective_days == calendar.committed_days {
        lines.push(format!("Leave: {} days", days(calendar.committed_days)));
    } else {
        lines.push(format!(
            "Leave: {} days ({} with unsaved edits)",
            days(calendar.committed_days),
            days(calendar.effective_days)
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use leave_core::analytics::{Analytics, Period};
    use leave_core::calendar::month_view;
    use leave_core::pending::PendingBuffer;
    use leave_core::{PublicHoliday, TeamData};

    fn team() -> TeamData {
        let mut data = TeamData::with_members(["Alice", "Bob"]);
        let leave = data.leave_mut();
        for day in 4..=6 {
            leave.set_day("Alice", 2024, 3, day, Some(LeaveType::Full));
        }
        leave.set_day("Bob", 2024, 3, 5, Some(LeaveType::Morning));
        data.add_public_holiday(
            NaiveDate::from_ymd_opt(2024, 3, 29).unwrap(),
            PublicHoliday::new("Good Friday", "SE"),
        )
        .unwrap();
        data
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn bar_scales_to_max() {
        assert_eq!(bar(0.0, 5.0), "─".repeat(BAR_COLS));
        assert_eq!(bar(5.0, 5.0), "█".repeat(BAR_COLS));
        let half = bar(2.5, 5.0);
        assert_eq!(half.chars().filter(|c| *c == '█').count(), BAR_COLS / 2);
        assert_eq!(half.chars().count(), BAR_COLS);
    }

    #[test]
    fn annual_team_report() {
        let data = team();
        let analytics = Analytics::new(&data, today());
        let report = render_metrics(&analytics.metrics(Period::year(2024).unwrap(), &Scope::Team));

        assert!(report.starts_with("Leave 2024 · Team"));
        assert!(report.contains("Total: 3.5 days"));
        assert!(report.contains("Peak month: March"));
        assert!(report.contains("Quarters: Q1 3.5 · Q2 0.0 · Q3 0.0 · Q4 0.0"));
        assert!(report.contains("■ Alice    3.0 days  1 instances  1 months"));
        assert!(report.contains("Durations: 1 day: 1 · 2-3 days: 1 · 4-7 days: 0 · 8+ days: 0"));
        assert!(!report.contains("Rank:"));
    }

    #[test]
    fn member_report_includes_insights() {
        let data = team();
        let analytics = Analytics::new(&data, today());
        let report = render_metrics(
            &analytics.metrics(Period::year(2024).unwrap(), &Scope::member("Alice")),
        );

        assert!(report.starts_with("Leave 2024 · Alice"));
        assert!(report.contains("Rank: 1 of 2 (100th percentile)"));
        assert!(report.contains("Predictability:"));
    }

    #[test]
    fn monthly_report() {
        let data = team();
        let analytics = Analytics::new(&data, today());
        let report =
            render_metrics(&analytics.metrics(Period::month(2024, 3).unwrap(), &Scope::Team));

        assert!(report.starts_with("Leave March 2024 · Team"));
        assert!(report.contains("Members on leave: 2"));
        // 21 weekdays, one of them Good Friday
        assert!(report.contains("Working days: 20"));
        assert!(report.contains("Busiest day: March 5th (2 absent)"));
    }

    #[test]
    fn calendar_grid_and_notes() {
        let data = team();
        let mut pending = PendingBuffer::new();
        let now = chrono::Utc::now();
        pending.focus("Alice", 2024, 3, now);
        pending.set(data.leave(), 7, Some(LeaveType::Afternoon), now).unwrap();

        let text = render_calendar(&month_view(&data, &pending, "Alice", 2024, 3));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Alice · March 2024");
        // March 2024 starts on a Friday
        assert_eq!(lines[2].trim_start(), "1     2     3");
        assert!(lines[3].contains("  4F    5F    6F    7A*"));
        assert!(text.contains(" 29  Good Friday (SE)"));
        assert!(text.contains("Leave: 3.0 days (3.5 with unsaved edits)"));
    }

    #[test]
    fn member_lines_align_non_ascii_names() {
        let stats = |name: &str| MemberStats {
            name: name.to_string(),
            color: None,
            total_days: 1.0,
            instances: 1,
            months_with_leave: 1,
        };
        let lines = member_lines(&[stats("Åsa"), stats("Bob"), stats("Zoë")]);

        let columns: Vec<usize> = lines
            .iter()
            .map(|line| line.chars().position(|c| c == '1').unwrap())
            .collect();
        assert_eq!(columns, [9, 9, 9]);
    }
}
