use serde::Serialize;
use strum::{Display, EnumIter};

use crate::{LeaveStore, LeaveType, MonthLeaveMap};

/// Leave recorded for `member` on `day` of the month `month_key`.
pub fn leave_type_on_day(
    store: &LeaveStore,
    member: &str,
    month_key: &str,
    day: u32,
) -> Option<LeaveType> {
    store.month(member, month_key)?.get(day)
}

pub fn has_leave_on_day(store: &LeaveStore, member: &str, month_key: &str, day: u32) -> bool {
    leave_type_on_day(store, member, month_key, day).is_some()
}

/// Leave days in a month: full days count 1, half days 0.5. A missing month counts 0.
pub fn calculate_leave_days<'m>(map: impl Into<Option<&'m MonthLeaveMap>>) -> f64 {
    map.into()
        .map_or(0.0, |map| map.iter().map(|(_, t)| t.weight()).sum())
}

/// A maximal run of consecutive days off inside one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveInstance {
    pub start_day: u32,
    pub end_day: u32,
}

impl LeaveInstance {
    /// Number of calendar days in the run, half days included as whole days.
    pub fn len(&self) -> u32 {
        self.end_day - self.start_day + 1
    }
}

/// Splits a month's leave into runs of adjacent day numbers. Runs stop at the month
/// boundary: leave from the 31st into the 1st is two instances.
pub fn leave_instances<'m>(map: impl Into<Option<&'m MonthLeaveMap>>) -> Vec<LeaveInstance> {
    let Some(map) = map.into() else {
        return Vec::new();
    };

    let mut instances: Vec<LeaveInstance> = Vec::new();
    for day in map.days() {
        match instances.last_mut() {
            Some(run) if day == run.end_day + 1 => run.end_day = day,
            _ => instances.push(LeaveInstance {
                start_day: day,
                end_day: day,
            }),
        }
    }
    instances
}

pub fn instance_count<'m>(map: impl Into<Option<&'m MonthLeaveMap>>) -> usize {
    leave_instances(map).len()
}

/// Mean run length in days, 0 without runs.
pub fn average_instance_length(instances: &[LeaveInstance]) -> f64 {
    if instances.is_empty() {
        return 0.0;
    }
    let days: u32 = instances.iter().map(LeaveInstance::len).sum();
    f64::from(days) / instances.len() as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter)]
pub enum DurationBucket {
    #[strum(serialize = "1 day")]
    #[serde(rename = "1 day")]
    OneDay,
    #[strum(serialize = "2-3 days")]
    #[serde(rename = "2-3 days")]
    TwoToThreeDays,
    #[strum(serialize = "4-7 days")]
    #[serde(rename = "4-7 days")]
    FourToSevenDays,
    #[strum(serialize = "8+ days")]
    #[serde(rename = "8+ days")]
    EightPlusDays,
}

impl DurationBucket {
    pub fn classify(days: u32) -> Self {
        match days {
            0 | 1 => DurationBucket::OneDay,
            2..=3 => DurationBucket::TwoToThreeDays,
            4..=7 => DurationBucket::FourToSevenDays,
            _ => DurationBucket::EightPlusDays,
        }
    }
}

/// How many leave instances fall in each duration bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationBuckets {
    pub one_day: usize,
    pub two_to_three_days: usize,
    pub four_to_seven_days: usize,
    pub eight_plus_days: usize,
}

impl DurationBuckets {
    pub fn from_instances(instances: &[LeaveInstance]) -> Self {
        let mut buckets = Self::default();
        for instance in instances {
            buckets.record(instance.len());
        }
        buckets
    }

    pub fn record(&mut self, days: u32) {
        *self.slot(DurationBucket::classify(days)) += 1;
    }

    pub fn get(&self, bucket: DurationBucket) -> usize {
        match bucket {
            DurationBucket::OneDay => self.one_day,
            DurationBucket::TwoToThreeDays => self.two_to_three_days,
            DurationBucket::FourToSevenDays => self.four_to_seven_days,
            DurationBucket::EightPlusDays => self.eight_plus_days,
        }
    }

    pub fn total(&self) -> usize {
        self.one_day + self.two_to_three_days + self.four_to_seven_days + self.eight_plus_days
    }

    fn slot(&mut self, bucket: DurationBucket) -> &mut usize {
        match bucket {
            DurationBucket::OneDay => &mut self.one_day,
            DurationBucket::TwoToThreeDays => &mut self.two_to_three_days,
            DurationBucket::FourToSevenDays => &mut self.four_to_seven_days,
            DurationBucket::EightPlusDays => &mut self.eight_plus_days,
        }
    }
}
