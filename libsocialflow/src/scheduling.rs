//! Schedule input parsing
//!
//! The composer collects a calendar date (`YYYY-MM-DD`) and a wall-clock
//! time (`HH:MM`, optionally `HH:MM:SS`) separately. Both are needed to form
//! a scheduled instant; the wall-clock time is interpreted in a
//! [`ScheduleZone`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::{Result, SocialFlowError};

/// Time zone used to interpret schedule inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScheduleZone {
    /// The machine's local time zone
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl ScheduleZone {
    pub fn utc() -> Self {
        ScheduleZone::Fixed(Utc.fix())
    }

    /// Resolve a wall-clock time in this zone to an instant
    ///
    /// Ambiguous local times (DST fall-back) resolve to the earlier instant.
    /// Times skipped by a DST jump are rejected.
    pub fn resolve(&self, naive: NaiveDateTime) -> Result<DateTime<Utc>> {
        let resolved = match self {
            ScheduleZone::Local => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            ScheduleZone::Fixed(offset) => offset
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        };
        resolved.ok_or_else(|| {
            SocialFlowError::InvalidInput(format!("{} does not exist in the {} time zone", naive, self))
        })
    }
}

impl FromStr for ScheduleZone {
    type Err = SocialFlowError;

    /// Accepts `local`, `utc`, or an offset such as `+02:00` / `-0530`
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "local" => return Ok(ScheduleZone::Local),
            "utc" | "z" => return Ok(ScheduleZone::utc()),
            _ => {}
        }

        let invalid = || {
            SocialFlowError::InvalidInput(format!(
                "Invalid time zone: '{}'. Valid options: local, utc, or an offset like +02:00",
                s
            ))
        };

        let (sign, rest) = match trimmed.chars().next() {
            Some('+') => (1, &trimmed[1..]),
            Some('-') => (-1, &trimmed[1..]),
            _ => return Err(invalid()),
        };
        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
        let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
        if minutes >= 60 {
            return Err(invalid());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(ScheduleZone::Fixed)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for ScheduleZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleZone::Local => write!(f, "local"),
            ScheduleZone::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

/// Date and time fields as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub date: Option<String>,
    pub time: Option<String>,
}

impl ScheduleInput {
    pub fn new(date: Option<String>, time: Option<String>) -> Self {
        Self { date, time }
    }

    /// Whether both fields carry a value
    pub fn is_complete(&self) -> bool {
        field(&self.date).is_some() && field(&self.time).is_some()
    }

    /// Combined instant, or `None` when either field is missing
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if a present field cannot be parsed.
    pub fn resolve(&self, zone: &ScheduleZone) -> Result<Option<DateTime<Utc>>> {
        let (Some(date), Some(time)) = (field(&self.date), field(&self.time)) else {
            return Ok(None);
        };
        combine(date, time, zone).map(Some)
    }

    pub fn clear(&mut self) {
        self.date = None;
        self.time = None;
    }
}

fn field(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Combine a `YYYY-MM-DD` date and `HH:MM[:SS]` time into an instant
pub fn combine(date: &str, time: &str, zone: &ScheduleZone) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|e| {
        SocialFlowError::InvalidInput(format!("Could not parse date '{}': {}", date, e))
    })?;
    let time = parse_time(time.trim())?;
    zone.resolve(date.and_time(time))
}

fn parse_time(input: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(input, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M:%S"))
        .map_err(|e| SocialFlowError::InvalidInput(format!("Could not parse time '{}': {}", input, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_in_utc() {
        let at = combine("2025-06-01", "14:30", &ScheduleZone::utc()).unwrap();
        assert_eq!(at.to_rfc3339(), "2025-06-01T14:30:00+00:00");
    }

    #[test]
    fn test_combine_with_offset() {
        let zone: ScheduleZone = "+02:00".parse().unwrap();
        let at = combine("2025-06-01", "14:30", &zone).unwrap();
        assert_eq!(at.to_rfc3339(), "2025-06-01T12:30:00+00:00");
    }

    #[test]
    fn test_combine_in_local_zone() {
        let at = combine("2025-06-01", "14:30", &ScheduleZone::Local).unwrap();
        let expected = Local
            .from_local_datetime(&NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(14, 30, 0).unwrap())
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(at, expected);
    }

    #[test]
    fn test_combine_accepts_seconds() {
        let at = combine("2025-06-01", "14:30:15", &ScheduleZone::utc()).unwrap();
        assert_eq!(at.to_rfc3339(), "2025-06-01T14:30:15+00:00");
    }

    #[test]
    fn test_combine_rejects_bad_input() {
        assert!(combine("06/01/2025", "14:30", &ScheduleZone::utc()).is_err());
        assert!(combine("2025-06-01", "2pm", &ScheduleZone::utc()).is_err());
        assert!(combine("2025-02-30", "10:00", &ScheduleZone::utc()).is_err());
    }

    #[test]
    fn test_schedule_input_missing_field() {
        let zone = ScheduleZone::utc();
        let date_only = ScheduleInput::new(Some("2025-06-01".to_string()), None);
        let time_only = ScheduleInput::new(None, Some("14:30".to_string()));
        let blank_time = ScheduleInput::new(Some("2025-06-01".to_string()), Some("  ".to_string()));

        assert_eq!(date_only.resolve(&zone).unwrap(), None);
        assert_eq!(time_only.resolve(&zone).unwrap(), None);
        assert_eq!(blank_time.resolve(&zone).unwrap(), None);
        assert!(!blank_time.is_complete());
    }

    #[test]
    fn test_zone_parsing() {
        assert_eq!("local".parse::<ScheduleZone>().unwrap(), ScheduleZone::Local);
        assert_eq!("UTC".parse::<ScheduleZone>().unwrap(), ScheduleZone::utc());
        assert_eq!(
            "-0530".parse::<ScheduleZone>().unwrap(),
            ScheduleZone::Fixed(FixedOffset::west_opt(5 * 3600 + 30 * 60).unwrap())
        );
        assert!("+2".parse::<ScheduleZone>().is_err());
        assert!("Europe/Paris".parse::<ScheduleZone>().is_err());
        assert!("+01:75".parse::<ScheduleZone>().is_err());
    }
}
