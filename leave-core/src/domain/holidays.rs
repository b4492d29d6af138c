use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date_keys::{ordinal, parse_month_day, KeyError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicHoliday {
    pub name: String,
    #[serde(default)]
    pub region: String,
}

impl PublicHoliday {
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
        }
    }

    pub fn label(&self) -> String {
        if self.region.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.region)
        }
    }
}

/// A recurring calendar day, stored as `MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    pub fn parse(value: &str) -> Result<Self, KeyError> {
        let (month, day) = parse_month_day(value)?;
        Ok(Self { month, day })
    }

    /// The date this month-day falls on in `year`. Feb 29 has no date in common years.
    pub fn in_year(self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

impl From<MonthDay> for String {
    fn from(value: MonthDay) -> Self {
        value.to_string()
    }
}

/// Work anniversary of a member: the year they started and the recurring day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Anniversary {
    pub start_year: i32,
    pub month_day: MonthDay,
}

impl Anniversary {
    /// Completed years of service as of `year`; negative before the start year.
    pub fn years_of_service(&self, year: i32) -> i32 {
        year - self.start_year
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SpecialDateKind {
    Birthday,
    Anniversary { years: i32 },
}

/// A birthday or work anniversary landing on a concrete date.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SpecialDate {
    pub date: NaiveDate,
    pub member: String,
    #[serde(flatten)]
    pub kind: SpecialDateKind,
}

impl fmt::Display for SpecialDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SpecialDateKind::Birthday => write!(f, "{}'s birthday", self.member),
            SpecialDateKind::Anniversary { years } => write!(
                f,
                "{}'s {} work anniversary",
                self.member,
                ordinal(years.unsigned_abs())
            ),
        }
    }
}
