use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::date_keys::{days_in_month, month_key, parse_month_key};

use super::{LeaveType, MonthLeaveMap, RawMonthLeave};

/// Committed leave for the whole team: member → month key (`YYYY-MM`) → day map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LeaveStore(BTreeMap<String, BTreeMap<String, MonthLeaveMap>>);

impl LeaveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the store from persisted data. Months with an unreadable key and months that
    /// end up empty after normalisation are skipped.
    pub fn from_raw(raw: BTreeMap<String, BTreeMap<String, RawMonthLeave>>) -> Self {
        let mut store = Self::new();

        for (member, months) in raw {
            for (key, raw_month) in months {
                let Ok((year, month)) = parse_month_key(&key) else {
                    debug!(%member, %key, "skipping month with invalid key");
                    continue;
                };

                let map = MonthLeaveMap::from_raw(raw_month, days_in_month(year, month));
                if map.is_empty() {
                    continue;
                }

                store
                    .0
                    .entry(member.clone())
                    .or_default()
                    .insert(month_key(year, month), map);
            }
        }

        store
    }

    pub fn month(&self, member: &str, month_key: &str) -> Option<&MonthLeaveMap> {
        self.0.get(member)?.get(month_key)
    }

    pub fn month_for(&self, member: &str, year: i32, month: u32) -> Option<&MonthLeaveMap> {
        self.month(member, &month_key(year, month))
    }

    /// Sets or clears one day. Days that do not exist in the month are ignored. Returns
    /// true if the store changed.
    pub fn set_day(
        &mut self,
        member: &str,
        year: i32,
        month: u32,
        day: u32,
        leave_type: Option<LeaveType>,
    ) -> bool {
        if !(1..=days_in_month(year, month)).contains(&day) {
            return false;
        }

        let key = month_key(year, month);
        let changed = match leave_type {
            Some(_) => self
                .0
                .entry(member.to_string())
                .or_default()
                .entry(key)
                .or_default()
                .set(day, leave_type),
            None => {
                let Some(months) = self.0.get_mut(member) else {
                    return false;
                };
                let changed = months.get_mut(&key).is_some_and(|map| map.set(day, None));
                months.retain(|_, map| !map.is_empty());
                changed
            }
        };

        self.0.retain(|_, months| !months.is_empty());
        changed
    }

    pub fn remove_member(&mut self, member: &str) -> bool {
        self.0.remove(member).is_some()
    }

    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// All stored months of a member, ordered by month key.
    pub fn months_of(&self, member: &str) -> impl Iterator<Item = (&str, &MonthLeaveMap)> {
        self.0
            .get(member)
            .into_iter()
            .flat_map(|months| months.iter().map(|(key, map)| (key.as_str(), map)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
