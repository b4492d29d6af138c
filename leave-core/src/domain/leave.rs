use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use tracing::debug;

/// Kind of absence recorded for one member on one day. A day without an entry means the
/// member is present.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LeaveType {
    Full,
    Morning,
    Afternoon,
}

impl LeaveType {
    /// Contribution of one day of this type to leave totals.
    pub fn weight(self) -> f64 {
        match self {
            LeaveType::Full => 1.0,
            LeaveType::Morning | LeaveType::Afternoon => 0.5,
        }
    }

    /// Reads a stored leave value. Both `full` and `absent-full` spellings are understood;
    /// `present` and anything unknown mean no leave.
    pub fn from_stored(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let raw = raw.strip_prefix("absent-").unwrap_or(raw);
        LeaveType::from_str(raw).ok()
    }
}

/// Stored shape of one member-month, as found in persisted data.
///
/// Old data holds a flat list of day numbers where every listed day is a full day off;
/// newer data maps day numbers to a leave type.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawMonthLeave {
    Legacy(Vec<Value>),
    Days(BTreeMap<String, Value>),
}

impl RawMonthLeave {
    pub fn legacy(days: impl IntoIterator<Item = u32>) -> Self {
        RawMonthLeave::Legacy(days.into_iter().map(Value::from).collect())
    }

    /// Reads either stored shape out of a loose JSON value. Anything but a list or an
    /// object is `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Array(days) => Some(RawMonthLeave::Legacy(days)),
            Value::Object(days) => Some(RawMonthLeave::Days(days.into_iter().collect())),
            _ => None,
        }
    }
}

/// Leave of one member in one month: day of month → leave type. Only absences are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MonthLeaveMap(BTreeMap<u32, LeaveType>);

impl MonthLeaveMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalises a stored month into the canonical map. Entries that are not absences, or
    /// whose day does not exist in a month of `days_in_month` days, are dropped.
    pub fn from_raw(raw: RawMonthLeave, days_in_month: u32) -> Self {
        let in_range = |day: u32| (1..=days_in_month).contains(&day);

        let entries: Vec<(u32, LeaveType)> = match raw {
            RawMonthLeave::Legacy(days) => days
                .iter()
                .filter_map(|value| match value {
                    Value::Number(n) => n.as_u64().and_then(|d| u32::try_from(d).ok()),
                    Value::String(s) => s.trim().parse().ok(),
                    _ => None,
                })
                .map(|day| (day, LeaveType::Full))
                .collect(),
            RawMonthLeave::Days(days) => days
                .iter()
                .filter_map(|(day, value)| {
                    let day: u32 = day.trim().parse().ok()?;
                    let leave_type = value.as_str().and_then(LeaveType::from_stored)?;
                    Some((day, leave_type))
                })
                .collect(),
        };

        let map: Self = entries.into_iter().filter(|(day, _)| in_range(*day)).collect();
        debug!(days = map.len(), "normalised stored month");
        map
    }

    pub fn get(&self, day: u32) -> Option<LeaveType> {
        self.0.get(&day).copied()
    }

    /// Sets or clears a day. Returns true if the stored value changed.
    pub fn set(&mut self, day: u32, leave_type: Option<LeaveType>) -> bool {
        let previous = match leave_type {
            Some(leave_type) => self.0.insert(day, leave_type),
            None => self.0.remove(&day),
        };
        previous != leave_type
    }

    /// Day numbers with leave, ascending.
    pub fn days(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, LeaveType)> + '_ {
        self.0.iter().map(|(day, leave_type)| (*day, *leave_type))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(u32, LeaveType)> for MonthLeaveMap {
    fn from_iter<I: IntoIterator<Item = (u32, LeaveType)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
