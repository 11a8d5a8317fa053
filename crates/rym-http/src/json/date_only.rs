//! Calendar dates without a time component, written as `yyyy-MM-dd`.
//!
//! Use [`DateOnly`] as a field type, or annotate a plain `NaiveDate` field
//! with `#[serde(with = "rym_http::json::date_only")]`.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Textual form of a date-only value
pub const DATE_ONLY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateOnly(pub NaiveDate);

impl DateOnly {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(DateOnly)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for DateOnly {
    fn from(date: NaiveDate) -> Self {
        DateOnly(date)
    }
}

impl fmt::Display for DateOnly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_ONLY_FORMAT))
    }
}

impl FromStr for DateOnly {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, DATE_ONLY_FORMAT).map(DateOnly)
    }
}

impl Serialize for DateOnly {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for DateOnly {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize(deserializer).map(DateOnly)
    }
}

pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&date.format(DATE_ONLY_FORMAT))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let text = String::deserialize(deserializer)?;
    NaiveDate::parse_from_str(&text, DATE_ONLY_FORMAT).map_err(|e| {
        serde::de::Error::custom(format!(
            "invalid date '{}', expected yyyy-MM-dd: {}",
            text, e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Appointment {
        #[serde(with = "super")]
        day: NaiveDate,
        confirmed_on: Option<DateOnly>,
    }

    #[test]
    fn test_serializes_as_plain_date() {
        let appointment = Appointment {
            day: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            confirmed_on: DateOnly::from_ymd(2024, 12, 31),
        };
        let json = serde_json::to_string(&appointment).unwrap();
        assert_eq!(json, r#"{"day":"2024-03-09","confirmed_on":"2024-12-31"}"#);
    }

    #[test]
    fn test_deserializes_plain_date() {
        let appointment: Appointment =
            serde_json::from_str(r#"{"day":"2024-03-09","confirmed_on":null}"#).unwrap();
        assert_eq!(appointment.day, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert!(appointment.confirmed_on.is_none());
    }

    #[test]
    fn test_rejects_other_formats() {
        let err = serde_json::from_str::<DateOnly>(r#""09/03/2024""#).unwrap_err();
        assert!(err.to_string().contains("expected yyyy-MM-dd"));
        assert!(serde_json::from_str::<DateOnly>(r#""2024-03-09T10:00:00""#).is_err());
        assert!(serde_json::from_str::<DateOnly>(r#""2024-02-30""#).is_err());
    }

    #[test]
    fn test_display_and_parse() {
        let date: DateOnly = "2025-01-05".parse().unwrap();
        assert_eq!(date.to_string(), "2025-01-05");
    }
}
