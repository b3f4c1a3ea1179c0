use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::model::schedule::Schedule;

/// Western Indonesia Time (WIB, UTC+7), the default reference zone.
pub const WIB_OFFSET_SECONDS: i32 = 7 * 3600;

/// A reference calendar day and its half-open UTC bounds `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub day: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Resolves instants to calendar days in one fixed reference timezone.
///
/// "Today" for check-in, the day swept for absences and the scheduler's
/// firing time are all computed here, so a check-in at 23:50 WIB and one at
/// 00:10 WIB land on different days regardless of the server's local zone.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceClock {
    offset: FixedOffset,
}

impl ReferenceClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(Self::new)
    }

    pub fn wib() -> Self {
        Self::new(FixedOffset::east_opt(WIB_OFFSET_SECONDS).expect("WIB offset is in range"))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Instant at which `time` occurs on `day` in the reference zone.
    pub fn at(&self, day: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        // fixed offsets have no gaps or folds
        self.offset
            .from_local_datetime(&day.and_time(time))
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| day.and_time(time).and_utc())
    }

    pub fn day_window(&self, day: NaiveDate) -> DayWindow {
        let next = day.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX);
        DayWindow {
            day,
            start: self.at(day, NaiveTime::MIN),
            end: self.at(next, NaiveTime::MIN),
        }
    }

    /// Day a shift belongs to: the reference date of its start. Check-in
    /// files rows under it and the sweep selects shifts by it, so an
    /// overnight shift is only ever accounted for on the day it began.
    pub fn shift_day(&self, schedule: &Schedule) -> NaiveDate {
        self.day_of(schedule.window_start)
    }

    pub fn previous_day(&self, instant: DateTime<Utc>) -> NaiveDate {
        let today = self.day_of(instant);
        today.pred_opt().unwrap_or(today)
    }

    /// First instant strictly after `now` whose reference wall-clock time is `at`.
    pub fn next_occurrence(&self, now: DateTime<Utc>, at: NaiveTime) -> DateTime<Utc> {
        let today = self.day_of(now);
        let candidate = self.at(today, at);
        if candidate > now {
            return candidate;
        }
        let tomorrow = today.succ_opt().unwrap_or(today);
        self.at(tomorrow, at)
    }
}

impl Default for ReferenceClock {
    fn default() -> Self {
        Self::wib()
    }
}
