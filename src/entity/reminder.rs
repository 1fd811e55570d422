// src/entity/reminder.rs
use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveTime, TimeDelta, TimeZone, Timelike};

/// A one-shot reminder: a local calendar date plus a minute-precision time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reminder {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl Reminder {
    /// Build a reminder, dropping any seconds or sub-second part of `time`.
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        let time = time
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(time);
        Self { date, time }
    }

    /// Parse a reminder from its textual parts ("YYYY-MM-DD", "HH:MM").
    pub fn parse(date: &str, time: &str) -> Result<Self, String> {
        Ok(Self::new(parse_reminder_date(date)?, parse_reminder_time(time)?))
    }

    /// The instant this reminder targets, as local wall-clock time.
    ///
    /// An ambiguous local time (clocks turned back) resolves to the earlier
    /// instant. A local time skipped by a DST jump resolves to one hour later.
    pub fn target_instant(&self) -> DateTime<Local> {
        let naive = self.date.and_time(self.time);
        match Local.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(earliest, _) => earliest,
            LocalResult::None => {
                let shifted = naive + TimeDelta::hours(1);
                Local
                    .from_local_datetime(&shifted)
                    .earliest()
                    .unwrap_or_else(|| Local.from_utc_datetime(&naive))
            }
        }
    }

    /// "HH:MM", the persisted form of the time part.
    pub fn time_label(&self) -> String {
        self.time.format("%H:%M").to_string()
    }

    /// "YYYY-MM-DD", the persisted form of the date part.
    pub fn date_label(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Parse a reminder date. Accepts a plain ISO date or a full RFC 3339
/// timestamp, in which case the calendar date in the timestamp's own offset
/// is used.
pub fn parse_reminder_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.date_naive())
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD", s))
}

/// Parse a 24-hour "HH:MM" time.
pub fn parse_reminder_time(s: &str) -> Result<NaiveTime, String> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|_| format!("invalid time '{}', expected HH:MM (24-hour)", s))
}
