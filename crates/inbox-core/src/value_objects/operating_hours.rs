//! Operating-hours window for follow-up sequences
//!
//! Stored as JSON on the sequence row:
//! `{"timezone": "America/Sao_Paulo", "start": "08:00", "end": "18:00", "days": [1, 2, 3, 4, 5]}`
//! where days count from Sunday (0) to Saturday (6).

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Daily `[start, end)` window in a local timezone
///
/// A window whose `end` is before `start` runs overnight and belongs to the
/// day it starts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    pub timezone: Tz,
    pub start: NaiveTime,
    pub end: NaiveTime,
    #[serde(with = "weekday_numbers")]
    pub days: Vec<Weekday>,
}

impl OperatingHours {
    pub fn new(timezone: Tz, start: NaiveTime, end: NaiveTime, days: Vec<Weekday>) -> Self {
        Self {
            timezone,
            start,
            end,
            days,
        }
    }

    /// Whether the window can ever open
    pub fn is_never_open(&self) -> bool {
        self.days.is_empty() || self.start == self.end
    }

    fn runs_on(&self, day: Weekday) -> bool {
        self.days.contains(&day)
    }

    /// Whether `at` falls inside the window
    pub fn is_open(&self, at: DateTime<Utc>) -> bool {
        if self.is_never_open() {
            return false;
        }

        let local = at.with_timezone(&self.timezone);
        let time = local.time();
        let today = local.weekday();

        if self.start < self.end {
            self.runs_on(today) && time >= self.start && time < self.end
        } else {
            (self.runs_on(today) && time >= self.start)
                || (self.runs_on(today.pred()) && time < self.end)
        }
    }

    /// Earliest instant at or after `at` when the window is open
    ///
    /// Returns `None` when the window never opens.
    pub fn next_opening(&self, at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.is_never_open() {
            return None;
        }
        if self.is_open(at) {
            return Some(at);
        }

        let local_date = at.with_timezone(&self.timezone).date_naive();
        (0..=7)
            .filter_map(|offset| local_date.checked_add_signed(Duration::days(offset)))
            .filter(|date| self.runs_on(date.weekday()))
            .filter_map(|date| self.opening_on(date))
            .find(|opening| *opening > at)
    }

    /// Start of the window on a local date, shifted past DST gaps
    fn opening_on(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        let naive = date.and_time(self.start);
        self.timezone
            .from_local_datetime(&naive)
            .earliest()
            .or_else(|| {
                self.timezone
                    .from_local_datetime(&(naive + Duration::hours(1)))
                    .earliest()
            })
            .map(|local| local.with_timezone(&Utc))
    }
}

mod weekday_numbers {
    use chrono::Weekday;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(days: &[Weekday], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(days.iter().map(Weekday::num_days_from_sunday))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Weekday>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let numbers = Vec::<u8>::deserialize(deserializer)?;
        numbers
            .into_iter()
            .map(|n| {
                if n > 6 {
                    return Err(D::Error::custom(format!("invalid weekday number: {n}")));
                }
                // Weekday::try_from counts from Monday
                Weekday::try_from((n + 6) % 7).map_err(D::Error::custom)
            })
            .collect()
    }
}
