//! Calendar key helpers shared by the store, the calendar view and the analytics engine.
//!
//! Month keys look like `2024-03`, day keys like `2024-03-10`. Months are 1-based here, the
//! same convention as [`chrono::Datelike::month`].

use chrono::{Datelike, Month, NaiveDate, Weekday};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum KeyError {
    #[error("'{0}' is not a valid month key: expected YYYY-MM")]
    InvalidMonthKey(String),
    #[error("'{0}' is not a valid day key: expected YYYY-MM-DD")]
    InvalidDayKey(String),
    #[error("'{0}' is not a valid month-day: expected MM-DD")]
    InvalidMonthDay(String),
}

pub fn month_key(year: i32, month: u32) -> String {
    format!("{year:04}-{month:02}")
}

pub fn month_key_for(date: NaiveDate) -> String {
    month_key(date.year(), date.month())
}

pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses a `YYYY-MM` key into `(year, month)`.
pub fn parse_month_key(key: &str) -> Result<(i32, u32), KeyError> {
    let invalid = || KeyError::InvalidMonthKey(key.to_string());

    let (year, month) = key.split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || month.len() != 2 {
        return Err(invalid());
    }

    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }

    Ok((year, month))
}

pub fn parse_day_key(key: &str) -> Result<NaiveDate, KeyError> {
    if key.len() != 10 {
        return Err(KeyError::InvalidDayKey(key.to_string()));
    }
    NaiveDate::parse_from_str(key, "%Y-%m-%d").map_err(|_| KeyError::InvalidDayKey(key.to_string()))
}

/// Parses a recurring `MM-DD` value. A full `YYYY-MM-DD` date is accepted too, the year is
/// ignored.
pub fn parse_month_day(value: &str) -> Result<(u32, u32), KeyError> {
    let invalid = || KeyError::InvalidMonthDay(value.to_string());

    let month_day = match value.len() {
        5 => value,
        10 => parse_day_key(value).map(|_| &value[5..]).map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };

    let (month, day) = month_day.split_once('-').ok_or_else(invalid)?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let day: u32 = day.parse().map_err(|_| invalid())?;

    // 2000 is a leap year, so 02-29 is accepted
    NaiveDate::from_ymd_opt(2000, month, day).ok_or_else(invalid)?;

    Ok((month, day))
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(next_year, next_month, 1),
    ) {
        (Some(start), Some(end)) => (end - start).num_days() as u32,
        _ => 0,
    }
}

pub fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map_or("", |m| m.name())
}

pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// English ordinal: 1st, 2nd, 3rd, 4th, 11th, 12th, 13th, 21st, ...
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_and_day_keys_are_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(month_key_for(date), "2024-03");
        assert_eq!(day_key(date), "2024-03-07");
        assert_eq!(month_key(987, 12), "0987-12");
    }

    #[test]
    fn month_key_parses_back() {
        assert_eq!(parse_month_key("2024-11"), Ok((2024, 11)));
        assert_eq!(
            parse_month_key("2024-13"),
            Err(KeyError::InvalidMonthKey("2024-13".to_string()))
        );
        assert!(parse_month_key("24-01").is_err());
        assert!(parse_month_key("2024/01").is_err());
    }

    #[test]
    fn day_key_rejects_impossible_dates() {
        assert!(parse_day_key("2024-02-29").is_ok());
        assert!(parse_day_key("2023-02-29").is_err());
        assert!(parse_day_key("2023-2-1").is_err());
    }

    #[test]
    fn month_day_accepts_both_forms() {
        assert_eq!(parse_month_day("02-29"), Ok((2, 29)));
        assert_eq!(parse_month_day("1990-07-15"), Ok((7, 15)));
        assert!(parse_month_day("13-01").is_err());
        assert!(parse_month_day("04-31").is_err());
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2023, 12), 31);
        assert_eq!(days_in_month(2023, 4), 30);
        assert_eq!(days_in_month(2023, 13), 0);
    }

    #[test]
    fn ordinals() {
        let rendered: Vec<String> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 23, 101, 111]
            .into_iter()
            .map(ordinal)
            .collect();
        assert_eq!(
            rendered,
            ["1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "23rd", "101st", "111th"]
        );
    }

    #[test]
    fn month_names() {
        assert_eq!(month_name(3), "March");
        assert_eq!(month_name(0), "");
    }
}
