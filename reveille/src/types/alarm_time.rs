//! Alarm time of day.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

const HOURS_PER_DAY: u8 = 24;
const MINUTES_PER_HOUR: u8 = 60;

/// Hour and minute at which the alarm fires.
///
/// Always holds a valid time of day: `hour` in 0..=23 and `minute` in
/// 0..=59. Stepping wraps instead of saturating, so 23 + 1 hour is 0 and
/// minute 0 - 1 is 59. Stepping one field never carries into the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawAlarmTime", into = "RawAlarmTime")]
pub struct AlarmTime {
    hour: u8,
    minute: u8,
}

impl AlarmTime {
    /// Time used when nothing else is configured: 07:30.
    pub const DEFAULT: Self = Self {
        hour: 7,
        minute: 30,
    };

    /// Create a time of day, or `None` if either field is out of range.
    pub const fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < HOURS_PER_DAY && minute < MINUTES_PER_HOUR {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    pub const fn hour(&self) -> u8 {
        self.hour
    }

    pub const fn minute(&self) -> u8 {
        self.minute
    }

    pub const fn next_hour(self) -> Self {
        Self {
            hour: (self.hour + 1) % HOURS_PER_DAY,
            ..self
        }
    }

    pub const fn previous_hour(self) -> Self {
        Self {
            hour: (self.hour + HOURS_PER_DAY - 1) % HOURS_PER_DAY,
            ..self
        }
    }

    pub const fn next_minute(self) -> Self {
        Self {
            minute: (self.minute + 1) % MINUTES_PER_HOUR,
            ..self
        }
    }

    pub const fn previous_minute(self) -> Self {
        Self {
            minute: (self.minute + MINUTES_PER_HOUR - 1) % MINUTES_PER_HOUR,
            ..self
        }
    }
}

impl Default for AlarmTime {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for AlarmTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Parses `H:MM` or `HH:MM`.
impl FromStr for AlarmTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidAlarmTime(s.to_string());

        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        if minute.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;

        Self::new(hour, minute).ok_or_else(invalid)
    }
}

/// Wire form, validated on the way in.
#[derive(Serialize, Deserialize)]
struct RawAlarmTime {
    hour: u8,
    minute: u8,
}

impl TryFrom<RawAlarmTime> for AlarmTime {
    type Error = Error;

    fn try_from(raw: RawAlarmTime) -> Result<Self, Self::Error> {
        Self::new(raw.hour, raw.minute)
            .ok_or_else(|| Error::InvalidAlarmTime(format!("{:02}:{:02}", raw.hour, raw.minute)))
    }
}

impl From<AlarmTime> for RawAlarmTime {
    fn from(time: AlarmTime) -> Self {
        Self {
            hour: time.hour,
            minute: time.minute,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn at(hour: u8, minute: u8) -> AlarmTime {
        AlarmTime::new(hour, minute).unwrap()
    }

    #[test]
    fn rejects_out_of_range_fields() {
        assert!(AlarmTime::new(24, 0).is_none());
        assert!(AlarmTime::new(0, 60).is_none());
        assert!(AlarmTime::new(23, 59).is_some());
    }

    #[test_case(at(23, 10), at(0, 10); "hour wraps to midnight")]
    #[test_case(at(7, 30), at(8, 30); "plain step")]
    fn next_hour(from: AlarmTime, expected: AlarmTime) {
        assert_eq!(from.next_hour(), expected);
    }

    #[test_case(at(0, 10), at(23, 10); "midnight wraps to 23")]
    #[test_case(at(7, 30), at(6, 30); "plain step")]
    fn previous_hour(from: AlarmTime, expected: AlarmTime) {
        assert_eq!(from.previous_hour(), expected);
    }

    #[test_case(at(7, 59), at(7, 0); "minute wraps without carrying")]
    #[test_case(at(7, 30), at(7, 31); "plain step")]
    fn next_minute(from: AlarmTime, expected: AlarmTime) {
        assert_eq!(from.next_minute(), expected);
    }

    #[test_case(at(7, 0), at(7, 59); "minute wraps without borrowing")]
    #[test_case(at(7, 30), at(7, 29); "plain step")]
    fn previous_minute(from: AlarmTime, expected: AlarmTime) {
        assert_eq!(from.previous_minute(), expected);
    }

    #[test]
    fn long_step_sequences_stay_in_range() {
        let mut time = AlarmTime::DEFAULT;
        for i in 0..500u32 {
            time = match i % 4 {
                0 => time.next_hour(),
                1 => time.previous_minute(),
                2 => time.previous_hour().previous_hour(),
                _ => time.next_minute().next_minute().next_minute(),
            };
            assert!(time.hour() < 24);
            assert!(time.minute() < 60);
        }
    }

    #[test]
    fn full_cycles_return_to_start() {
        let mut time = AlarmTime::DEFAULT;
        for _ in 0..24 {
            time = time.next_hour();
        }
        for _ in 0..60 {
            time = time.previous_minute();
        }
        assert_eq!(time, AlarmTime::DEFAULT);
    }

    #[test_case("07:30", Some(at(7, 30)); "zero padded")]
    #[test_case("7:05", Some(at(7, 5)); "single digit hour")]
    #[test_case(" 23:59 ", Some(at(23, 59)); "surrounding whitespace")]
    #[test_case("24:00", None; "hour out of range")]
    #[test_case("12:60", None; "minute out of range")]
    #[test_case("12:5", None; "single digit minute")]
    #[test_case("1230", None; "missing colon")]
    #[test_case("ab:cd", None; "not numeric")]
    fn parse(input: &str, expected: Option<AlarmTime>) {
        assert_eq!(input.parse::<AlarmTime>().ok(), expected);
    }

    #[test]
    fn displays_zero_padded() {
        assert_eq!(at(7, 5).to_string(), "07:05");
    }

    #[test]
    fn deserialize_rejects_invalid_time() {
        let ok: AlarmTime = serde_json::from_str(r#"{"hour":6,"minute":45}"#).unwrap();
        assert_eq!(ok, at(6, 45));

        let bad = serde_json::from_str::<AlarmTime>(r#"{"hour":25,"minute":0}"#);
        assert!(bad.is_err());
    }
}
