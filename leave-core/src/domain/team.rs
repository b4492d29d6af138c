use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::date_keys::{parse_day_key, KeyError};

use super::{
    Anniversary, LeaveStore, MonthDay, PublicHoliday, RawMonthLeave, SpecialDate, SpecialDateKind,
};

/// Display colors handed out by roster position.
pub const MEMBER_PALETTE: [&str; 12] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
    "#9c755f", "#bab0ac", "#86bcb6", "#d37295",
];

#[derive(Error, Debug, PartialEq)]
pub enum AdminError {
    #[error("member name must not be empty")]
    EmptyName,
    #[error("member already exists: {0}")]
    DuplicateMember(String),
    #[error("member not found: {0}")]
    MemberNotFound(String),
    #[error("holiday name must not be empty")]
    EmptyHolidayName,
    #[error("no holiday on {0}")]
    HolidayNotFound(NaiveDate),
    #[error(transparent)]
    Key(#[from] KeyError),
}

/// Everything the tracker persists: the roster, committed leave and the shared calendars.
///
/// The roster is the only authority on which member names are valid. Leave, birthdays and
/// anniversaries stored for names outside the roster are kept but ignored by the analytics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTeamData", rename_all = "camelCase")]
pub struct TeamData {
    members: Vec<String>,
    leave_data: LeaveStore,
    public_holidays: BTreeMap<NaiveDate, Vec<PublicHoliday>>,
    custom_holidays: BTreeMap<NaiveDate, String>,
    birthdays: BTreeMap<String, MonthDay>,
    anniversaries: BTreeMap<String, Anniversary>,
}

impl TeamData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Team with the given roster and nothing else. Blank and repeated names are skipped.
    pub fn with_members<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut data = Self::new();
        for member in members {
            let _ = data.add_member(member.as_ref());
        }
        data
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn has_member(&self, member: &str) -> bool {
        self.members.iter().any(|m| m == member)
    }

    pub fn member_color(&self, member: &str) -> Option<&'static str> {
        self.members
            .iter()
            .position(|m| m == member)
            .map(|i| MEMBER_PALETTE[i % MEMBER_PALETTE.len()])
    }

    pub fn leave(&self) -> &LeaveStore {
        &self.leave_data
    }

    pub fn leave_mut(&mut self) -> &mut LeaveStore {
        &mut self.leave_data
    }

    pub fn add_member(&mut self, name: &str) -> Result<(), AdminError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AdminError::EmptyName);
        }
        if self.has_member(name) {
            return Err(AdminError::DuplicateMember(name.to_string()));
        }

        self.members.push(name.to_string());
        info!(member = name, "added team member");
        Ok(())
    }

    /// Removes a member together with their leave, birthday and anniversary.
    pub fn remove_member(&mut self, name: &str) -> Result<(), AdminError> {
        let position = self
            .members
            .iter()
            .position(|m| m == name)
            .ok_or_else(|| AdminError::MemberNotFound(name.to_string()))?;

        self.members.remove(position);
        self.leave_data.remove_member(name);
        self.birthdays.remove(name);
        self.anniversaries.remove(name);
        info!(member = name, "removed team member");
        Ok(())
    }

    pub fn set_birthday(&mut self, member: &str, month_day: &str) -> Result<(), AdminError> {
        self.ensure_member(member)?;
        let month_day = MonthDay::parse(month_day)?;
        self.birthdays.insert(member.to_string(), month_day);
        Ok(())
    }

    pub fn set_anniversary(
        &mut self,
        member: &str,
        start_year: i32,
        month_day: &str,
    ) -> Result<(), AdminError> {
        self.ensure_member(member)?;
        let month_day = MonthDay::parse(month_day)?;
        self.anniversaries.insert(
            member.to_string(),
            Anniversary {
                start_year,
                month_day,
            },
        );
        Ok(())
    }

    pub fn birthdays(&self) -> &BTreeMap<String, MonthDay> {
        &self.birthdays
    }

    pub fn anniversaries(&self) -> &BTreeMap<String, Anniversary> {
        &self.anniversaries
    }

    pub fn add_public_holiday(
        &mut self,
        date: NaiveDate,
        holiday: PublicHoliday,
    ) -> Result<(), AdminError> {
        if holiday.name.trim().is_empty() {
            return Err(AdminError::EmptyHolidayName);
        }
        let holidays = self.public_holidays.entry(date).or_default();
        if !holidays.contains(&holiday) {
            holidays.push(holiday);
        }
        Ok(())
    }

    pub fn add_custom_holiday(&mut self, date: NaiveDate, name: &str) -> Result<(), AdminError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AdminError::EmptyHolidayName);
        }
        self.custom_holidays.insert(date, name.to_string());
        Ok(())
    }

    /// Removes every public and custom holiday on `date`.
    pub fn remove_holiday(&mut self, date: NaiveDate) -> Result<(), AdminError> {
        let public = self.public_holidays.remove(&date).is_some();
        let custom = self.custom_holidays.remove(&date).is_some();
        if public || custom {
            Ok(())
        } else {
            Err(AdminError::HolidayNotFound(date))
        }
    }

    pub fn public_holidays_on(&self, date: NaiveDate) -> &[PublicHoliday] {
        self.public_holidays
            .get(&date)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn custom_holiday_on(&self, date: NaiveDate) -> Option<&str> {
        self.custom_holidays.get(&date).map(String::as_str)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.public_holidays.contains_key(&date) || self.custom_holidays.contains_key(&date)
    }

    /// Labels of every holiday on `date`, public ones first.
    pub fn holiday_labels(&self, date: NaiveDate) -> Vec<String> {
        self.public_holidays_on(date)
            .iter()
            .map(PublicHoliday::label)
            .chain(self.custom_holiday_on(date).map(str::to_string))
            .collect()
    }

    /// Birthdays and work anniversaries of roster members in the given month, by date.
    /// Anniversaries are listed from the first completed year onwards.
    pub fn special_dates_in(&self, year: i32, month: u32) -> Vec<SpecialDate> {
        let birthdays = self.birthdays.iter().filter_map(|(member, md)| {
            let date = md.in_year(year)?;
            Some(SpecialDate {
                date,
                member: member.clone(),
                kind: SpecialDateKind::Birthday,
            })
        });

        let anniversaries = self.anniversaries.iter().filter_map(|(member, anniversary)| {
            let years = anniversary.years_of_service(year);
            if years < 1 {
                return None;
            }
            let date = anniversary.month_day.in_year(year)?;
            Some(SpecialDate {
                date,
                member: member.clone(),
                kind: SpecialDateKind::Anniversary { years },
            })
        });

        let mut dates: Vec<SpecialDate> = birthdays
            .chain(anniversaries)
            .filter(|special| special.date.month() == month && self.has_member(&special.member))
            .collect();
        dates.sort();
        dates
    }

    pub fn special_dates_on(&self, date: NaiveDate) -> Vec<SpecialDate> {
        self.special_dates_in(date.year(), date.month())
            .into_iter()
            .filter(|special| special.date == date)
            .collect()
    }

    fn ensure_member(&self, member: &str) -> Result<(), AdminError> {
        if self.has_member(member) {
            Ok(())
        } else {
            Err(AdminError::MemberNotFound(member.to_string()))
        }
    }
}

/// Persisted shape of [`TeamData`]. Every section is read as loose JSON and converted
/// entry by entry, so one bad entry is skipped instead of making the file unreadable.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawTeamData {
    members: Value,
    leave_data: Value,
    public_holidays: Value,
    custom_holidays: Value,
    birthdays: Value,
    anniversaries: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnniversary {
    start_year: i32,
    month_day: String,
}

impl From<RawTeamData> for TeamData {
    fn from(raw: RawTeamData) -> Self {
        let members: Vec<String> = list(raw.members, "members")
            .into_iter()
            .filter_map(|value| text(value, "member"))
            .collect();
        let mut data = TeamData::with_members(members);

        let leave_data: BTreeMap<String, BTreeMap<String, RawMonthLeave>> =
            section(raw.leave_data, "leaveData")
                .into_iter()
                .map(|(member, months)| {
                    let months = section(months, "leave months")
                        .into_iter()
                        .filter_map(|(key, value)| {
                            let month = RawMonthLeave::from_value(value);
                            if month.is_none() {
                                debug!(%member, %key, "skipping unreadable leave month");
                            }
                            Some((key, month?))
                        })
                        .collect();
                    (member, months)
                })
                .collect();
        data.leave_data = LeaveStore::from_raw(leave_data);

        data.public_holidays = section(raw.public_holidays, "publicHolidays")
            .into_iter()
            .filter_map(|(key, value)| {
                let holidays: Vec<PublicHoliday> = list(value, "holiday list")
                    .into_iter()
                    .filter_map(|holiday| parsed(holiday, "public holiday"))
                    .collect();
                if holidays.is_empty() {
                    return None;
                }
                Some((dated(&key)?, holidays))
            })
            .collect();
        data.custom_holidays = section(raw.custom_holidays, "customHolidays")
            .into_iter()
            .filter_map(|(key, value)| Some((dated(&key)?, text(value, "custom holiday")?)))
            .collect();
        data.birthdays = section(raw.birthdays, "birthdays")
            .into_iter()
            .filter_map(|(member, value)| {
                let value = text(value, "birthday")?;
                Some((member, month_day(&value)?))
            })
            .collect();
        data.anniversaries = section(raw.anniversaries, "anniversaries")
            .into_iter()
            .filter_map(|(member, value)| {
                let value: RawAnniversary = parsed(value, "anniversary")?;
                let anniversary = Anniversary {
                    start_year: value.start_year,
                    month_day: month_day(&value.month_day)?,
                };
                Some((member, anniversary))
            })
            .collect();

        data
    }
}

/// Entries of a JSON object; a missing section is empty.
fn section(value: Value, what: &str) -> Map<String, Value> {
    match value {
        Value::Object(entries) => entries,
        Value::Null => Map::new(),
        _ => {
            debug!(what, "skipping section that is not an object");
            Map::new()
        }
    }
}

fn list(value: Value, what: &str) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        _ => {
            debug!(what, "skipping value that is not a list");
            Vec::new()
        }
    }
}

fn text(value: Value, what: &str) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        _ => {
            debug!(what, "skipping value that is not a string");
            None
        }
    }
}

fn parsed<T: DeserializeOwned>(value: Value, what: &str) -> Option<T> {
    serde_json::from_value(value)
        .map_err(|e| debug!(what, error = %e, "skipping unreadable entry"))
        .ok()
}

fn dated(key: &str) -> Option<NaiveDate> {
    parse_day_key(key)
        .map_err(|e| debug!(error = %e, "skipping holiday"))
        .ok()
}

fn month_day(value: &str) -> Option<MonthDay> {
    MonthDay::parse(value)
        .map_err(|e| debug!(error = %e, "skipping recurring date"))
        .ok()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::LeaveType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn add_member_validates_names() {
        let mut data = TeamData::new();
        assert_eq!(data.add_member("  "), Err(AdminError::EmptyName));
        assert_eq!(data.add_member(" Alice "), Ok(()));
        assert_eq!(
            data.add_member("Alice"),
            Err(AdminError::DuplicateMember("Alice".to_string()))
        );
        assert_eq!(data.members(), ["Alice"]);
    }

    #[test]
    fn colors_follow_roster_position() {
        let data = TeamData::with_members(["Alice", "Bob"]);
        assert_eq!(data.member_color("Alice"), Some(MEMBER_PALETTE[0]));
        assert_eq!(data.member_color("Bob"), Some(MEMBER_PALETTE[1]));
        assert_eq!(data.member_color("Carol"), None);
    }

    #[test]
    fn removing_a_member_cascades() {
        let mut data = TeamData::with_members(["Alice", "Bob"]);
        data.leave_mut()
            .set_day("Alice", 2024, 3, 10, Some(LeaveType::Full));
        data.set_birthday("Alice", "04-01").unwrap();
        data.set_anniversary("Alice", 2020, "06-15").unwrap();

        data.remove_member("Alice").unwrap();

        assert_eq!(data.members(), ["Bob"]);
        assert!(data.leave().is_empty());
        assert!(data.birthdays().is_empty());
        assert!(data.anniversaries().is_empty());
        assert_eq!(
            data.remove_member("Alice"),
            Err(AdminError::MemberNotFound("Alice".to_string()))
        );
    }

    #[test]
    fn holidays_can_be_added_and_removed() {
        let mut data = TeamData::new();
        let day = date(2024, 12, 25);
        data.add_public_holiday(day, PublicHoliday::new("Christmas Day", "UK"))
            .unwrap();
        data.add_custom_holiday(day, "Office closed").unwrap();

        assert!(data.is_holiday(day));
        assert_eq!(
            data.holiday_labels(day),
            vec!["Christmas Day (UK)".to_string(), "Office closed".to_string()]
        );

        data.remove_holiday(day).unwrap();
        assert!(!data.is_holiday(day));
        assert_eq!(
            data.remove_holiday(day),
            Err(AdminError::HolidayNotFound(day))
        );
        assert_eq!(
            data.add_custom_holiday(day, ""),
            Err(AdminError::EmptyHolidayName)
        );
    }

    #[test]
    fn special_dates_are_limited_to_the_roster_and_month() {
        let mut data = TeamData::with_members(["Alice", "Bob"]);
        data.set_birthday("Alice", "1990-05-20").unwrap();
        data.set_anniversary("Bob", 2019, "05-02").unwrap();
        data.set_anniversary("Alice", 2024, "05-10").unwrap();

        let dates = data.special_dates_in(2024, 5);
        let rendered: Vec<String> = dates.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec!["Bob's 5th work anniversary", "Alice's birthday"]
        );
        assert_eq!(data.special_dates_on(date(2024, 5, 20)).len(), 1);
        assert!(data.special_dates_in(2024, 6).is_empty());
    }

    #[test]
    fn loads_persisted_json_and_skips_bad_entries() {
        let data: TeamData = serde_json::from_value(json!({
            "members": ["Alice", "Bob", "Alice"],
            "leaveData": { "Alice": { "2024-03": [3, 4, 5] } },
            "publicHolidays": { "2024-12-25": [{ "name": "Christmas Day", "region": "UK" }], "bad": [] },
            "customHolidays": { "2024-07-01": "Team day" },
            "birthdays": { "Alice": "1990-05-20", "Bob": "nonsense" },
            "anniversaries": { "Bob": { "startYear": 2019, "monthDay": "05-02" } }
        }))
        .unwrap();

        assert_eq!(data.members(), ["Alice", "Bob"]);
        assert_eq!(
            data.leave().month("Alice", "2024-03").map(|m| m.len()),
            Some(3)
        );
        assert!(data.is_holiday(date(2024, 12, 25)));
        assert_eq!(data.custom_holiday_on(date(2024, 7, 1)), Some("Team day"));
        assert_eq!(data.birthdays().len(), 1);
        assert_eq!(data.anniversaries()["Bob"].start_year, 2019);
    }

    #[test]
    fn saves_canonical_form() {
        let data: TeamData = serde_json::from_value(json!({
            "members": ["Alice"],
            "leaveData": { "Alice": { "2024-03": [3] } },
            "birthdays": { "Alice": "1990-05-20" }
        }))
        .unwrap();

        let saved = serde_json::to_value(&data).unwrap();
        assert_eq!(saved["leaveData"]["Alice"]["2024-03"], json!({ "3": "full" }));
        assert_eq!(saved["birthdays"]["Alice"], json!("05-20"));

        let reloaded: TeamData = serde_json::from_value(saved).unwrap();
        assert_eq!(reloaded, data);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let data: TeamData = serde_json::from_value(json!({})).unwrap();
        assert_eq!(data, TeamData::new());
    }

    #[test]
    fn one_bad_month_does_not_hide_the_rest() {
        let data: TeamData = serde_json::from_value(json!({
            "members": ["Alice", "Bob", 7],
            "leaveData": {
                "Alice": { "2024-03": null, "2024-04": "full" },
                "Bob": { "2024-03": [4] },
                "Carol": 3
            },
            "publicHolidays": {
                "2024-12-25": [{ "region": "UK" }, { "name": "Christmas Day" }],
                "2024-12-26": "Boxing Day"
            },
            "customHolidays": { "2024-07-01": 5 },
            "birthdays": { "Alice": 12, "Bob": "07-14" },
            "anniversaries": { "Alice": "2019", "Bob": { "startYear": 2019, "monthDay": "05-02" } }
        }))
        .unwrap();

        assert_eq!(data.members(), ["Alice", "Bob"]);
        assert!(data.leave().month_for("Alice", 2024, 3).is_none());
        assert_eq!(
            data.leave().month_for("Bob", 2024, 3).and_then(|m| m.get(4)),
            Some(LeaveType::Full)
        );
        assert_eq!(data.holiday_labels(date(2024, 12, 25)), ["Christmas Day"]);
        assert!(!data.is_holiday(date(2024, 12, 26)));
        assert!(!data.is_holiday(date(2024, 7, 1)));
        assert_eq!(data.birthdays().keys().collect::<Vec<_>>(), ["Bob"]);
        assert_eq!(data.anniversaries().keys().collect::<Vec<_>>(), ["Bob"]);
    }
}
