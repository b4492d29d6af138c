//! Unsaved calendar edits for one member-month.
//!
//! Clicks and right-clicks on calendar cells land here first and only reach the
//! [`LeaveStore`] on [`PendingBuffer::commit`]. Edits are dropped when the focused member or
//! month changes, or after [`PENDING_IDLE_TIMEOUT_SECS`] without activity.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::date_keys::days_in_month;
use crate::{LeaveStore, LeaveType};

pub const PENDING_IDLE_TIMEOUT_SECS: i64 = 5 * 60;

#[derive(Error, Debug, PartialEq)]
pub enum PendingError {
    #[error("no member and month selected")]
    NoSelection,
    #[error("day {0} does not exist in the selected month")]
    DayOutOfRange(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingSelection {
    pub member: String,
    pub year: i32,
    pub month: u32,
    /// Day → new value; `None` clears a committed day.
    edits: BTreeMap<u32, Option<LeaveType>>,
    last_activity: DateTime<Utc>,
}

impl PendingSelection {
    pub fn edits(&self) -> impl Iterator<Item = (u32, Option<LeaveType>)> + '_ {
        self.edits.iter().map(|(day, value)| (*day, *value))
    }

    pub fn edit(&self, day: u32) -> Option<Option<LeaveType>> {
        self.edits.get(&day).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    fn is_for(&self, member: &str, year: i32, month: u32) -> bool {
        self.member == member && self.year == year && self.month == month
    }
}

#[derive(Debug, Clone, Default)]
pub struct PendingBuffer {
    selection: Option<PendingSelection>,
}

impl PendingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Option<&PendingSelection> {
        self.selection.as_ref()
    }

    pub fn has_edits(&self) -> bool {
        self.selection.as_ref().is_some_and(|s| !s.is_empty())
    }

    /// Points the buffer at a member-month. Moving to another member or month drops the
    /// pending edits; returns true when that happened.
    pub fn focus(&mut self, member: &str, year: i32, month: u32, now: DateTime<Utc>) -> bool {
        self.expire(now);
        if let Some(selection) = &mut self.selection {
            if selection.is_for(member, year, month) {
                selection.last_activity = now;
                return false;
            }
        }

        let discarded = self.has_edits();
        if discarded {
            debug!(member, year, month, "focus changed, discarding pending edits");
        }
        self.selection = Some(PendingSelection {
            member: member.to_string(),
            year,
            month,
            edits: BTreeMap::new(),
            last_activity: now,
        });
        discarded
    }

    /// Drops the edits once the idle timeout has passed. Returns true if edits were dropped.
    pub fn expire(&mut self, now: DateTime<Utc>) -> bool {
        let Some(selection) = &mut self.selection else {
            return false;
        };
        if now - selection.last_activity < TimeDelta::seconds(PENDING_IDLE_TIMEOUT_SECS) {
            return false;
        }

        let had_edits = !selection.edits.is_empty();
        selection.edits.clear();
        if had_edits {
            debug!(member = %selection.member, "pending edits expired");
        }
        had_edits
    }

    /// Leave type shown for `day`: the pending edit if there is one, else committed data.
    pub fn effective(&self, store: &LeaveStore, day: u32) -> Option<LeaveType> {
        let selection = self.selection.as_ref()?;
        match selection.edit(day) {
            Some(value) => value,
            None => committed(store, selection, day),
        }
    }

    /// Left click: toggles a full day off.
    pub fn click(
        &mut self,
        store: &LeaveStore,
        day: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<LeaveType>, PendingError> {
        self.apply(store, day, now, |current| match current {
            Some(LeaveType::Full) => None,
            _ => Some(LeaveType::Full),
        })
    }

    /// Right click: cycles through morning, afternoon and no leave.
    pub fn right_click(
        &mut self,
        store: &LeaveStore,
        day: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<LeaveType>, PendingError> {
        self.apply(store, day, now, |current| match current {
            None | Some(LeaveType::Full) => Some(LeaveType::Morning),
            Some(LeaveType::Morning) => Some(LeaveType::Afternoon),
            Some(LeaveType::Afternoon) => None,
        })
    }

    /// Stages an explicit value for `day`.
    pub fn set(
        &mut self,
        store: &LeaveStore,
        day: u32,
        value: Option<LeaveType>,
        now: DateTime<Utc>,
    ) -> Result<Option<LeaveType>, PendingError> {
        self.apply(store, day, now, |_| value)
    }

    /// Writes the pending edits into `store` and clears them. Returns the number of days
    /// that changed. Edits idle past the timeout are dropped, not written.
    pub fn commit(&mut self, store: &mut LeaveStore, now: DateTime<Utc>) -> usize {
        self.expire(now);
        let Some(selection) = &mut self.selection else {
            return 0;
        };

        let edits = std::mem::take(&mut selection.edits);
        let changed = edits
            .into_iter()
            .filter(|(day, value)| {
                store.set_day(
                    &selection.member,
                    selection.year,
                    selection.month,
                    *day,
                    *value,
                )
            })
            .count();

        info!(
            member = %selection.member,
            year = selection.year,
            month = selection.month,
            changed,
            "committed pending edits"
        );
        changed
    }

    /// Drops the pending edits but keeps the focus. Returns true if there was anything to drop.
    pub fn discard(&mut self) -> bool {
        match &mut self.selection {
            Some(selection) if !selection.edits.is_empty() => {
                selection.edits.clear();
                true
            }
            _ => false,
        }
    }

    fn apply(
        &mut self,
        store: &LeaveStore,
        day: u32,
        now: DateTime<Utc>,
        next: impl FnOnce(Option<LeaveType>) -> Option<LeaveType>,
    ) -> Result<Option<LeaveType>, PendingError> {
        self.expire(now);
        let current = self.effective(store, day);

        let selection = self.selection.as_mut().ok_or(PendingError::NoSelection)?;
        if !(1..=days_in_month(selection.year, selection.month)).contains(&day) {
            return Err(PendingError::DayOutOfRange(day));
        }

        let value = next(current);
        if value == committed(store, selection, day) {
            selection.edits.remove(&day);
        } else {
            selection.edits.insert(day, value);
        }
        selection.last_activity = now;
        Ok(value)
    }
}

fn committed(store: &LeaveStore, selection: &PendingSelection, day: u32) -> Option<LeaveType> {
    store
        .month_for(&selection.member, selection.year, selection.month)
        .and_then(|map| map.get(day))
}
