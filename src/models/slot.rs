//! Time slot and day model.
//!
//! A timetable week is a grid of `days × slots`. Slots are the discrete
//! teaching periods of one day (e.g. "09:00-10:00"); the same slot list
//! repeats on every schedulable day.
//!
//! # Ordering
//! Slots are ordered chronologically by start time. Two slots are
//! *consecutive* when they are adjacent in that order, which is what
//! multi-slot sessions (labs) require.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A discrete teaching period within a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Unique slot identifier.
    pub id: String,
    /// Human-readable label (e.g. "9:30 AM - 10:30 AM").
    pub label: String,
    /// Start of the period.
    pub start: NaiveTime,
    /// End of the period (exclusive).
    pub end: NaiveTime,
}

impl TimeSlot {
    /// Creates a new slot. The label defaults to `HH:MM-HH:MM`.
    pub fn new(id: impl Into<String>, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            id: id.into(),
            label: format!("{}-{}", start.format("%H:%M"), end.format("%H:%M")),
            start,
            end,
        }
    }

    /// Creates a slot from whole hours, mostly for tests and fixtures.
    ///
    /// Out-of-range hours fall back to midnight.
    pub fn hourly(id: impl Into<String>, start_hour: u32, end_hour: u32) -> Self {
        let at = |h: u32| NaiveTime::from_hms_opt(h, 0, 0).unwrap_or(NaiveTime::MIN);
        Self::new(id, at(start_hour), at(end_hour))
    }

    /// Sets the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Length of the period in minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// Monday through Friday.
    pub const WEEKDAYS: [Day; 5] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];

    /// Full English name.
    pub fn name(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a day name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown day '{0}'")]
pub struct ParseDayError(pub String);

impl FromStr for Day {
    type Err = ParseDayError;

    /// Accepts full names and three-letter abbreviations, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let day = match lower.as_str() {
            "monday" | "mon" => Day::Monday,
            "tuesday" | "tue" => Day::Tuesday,
            "wednesday" | "wed" => Day::Wednesday,
            "thursday" | "thu" => Day::Thursday,
            "friday" | "fri" => Day::Friday,
            "saturday" | "sat" => Day::Saturday,
            "sunday" | "sun" => Day::Sunday,
            _ => return Err(ParseDayError(s.to_string())),
        };
        Ok(day)
    }
}

/// A (day, slot) cell of the weekly grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotRef {
    /// Day of the week.
    pub day: Day,
    /// Slot identifier.
    pub slot_id: String,
}

impl SlotRef {
    /// Creates a new slot reference.
    pub fn new(day: Day, slot_id: impl Into<String>) -> Self {
        Self {
            day,
            slot_id: slot_id.into(),
        }
    }
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} slot {}", self.day, self.slot_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_defaults() {
        let s = TimeSlot::hourly("1", 9, 10);
        assert_eq!(s.label, "09:00-10:00");
        assert_eq!(s.duration_minutes(), 60);

        let s = s.with_label("Period 1");
        assert_eq!(s.label, "Period 1");
    }

    #[test]
    fn test_day_parse() {
        assert_eq!("Monday".parse::<Day>().unwrap(), Day::Monday);
        assert_eq!("fri".parse::<Day>().unwrap(), Day::Friday);
        assert_eq!(" SUNDAY ".parse::<Day>().unwrap(), Day::Sunday);
        assert!("Funday".parse::<Day>().is_err());
    }

    #[test]
    fn test_day_display_and_order() {
        assert_eq!(Day::Wednesday.to_string(), "Wednesday");
        assert!(Day::Monday < Day::Friday);
        assert_eq!(Day::WEEKDAYS.len(), 5);
    }

    #[test]
    fn test_slot_ref_display() {
        let r = SlotRef::new(Day::Tuesday, "3");
        assert_eq!(r.to_string(), "Tuesday slot 3");
    }
}
