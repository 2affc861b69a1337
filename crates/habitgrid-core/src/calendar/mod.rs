//! Calendar arithmetic shared by the habit engine.
//!
//! Every window the engine looks at is made of whole weeks of seven
//! consecutive days beginning on the configured [`WeekStart`]:
//!
//! - [`WeekWindow`]: one week, clipped at "today"
//! - [`RollingWindow`]: the six weeks ending with the week that contains today
//! - [`MonthGrid`]: the six weeks of a month view, the first one containing
//!   the 1st of the month

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Days in a week window.
pub const DAYS_PER_WEEK: usize = 7;
/// Weeks tracked by the rolling streak window and the month grid.
pub const WINDOW_WEEKS: usize = 6;
/// Days covered by the rolling window or a month grid.
pub const WINDOW_DAYS: usize = DAYS_PER_WEEK * WINDOW_WEEKS;

/// First day of a week row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }

    /// Slot (0-6) of `date` within its week.
    pub fn slot_of(self, date: NaiveDate) -> usize {
        let weekday = date.weekday();
        let slot = match self {
            WeekStart::Sunday => weekday.num_days_from_sunday(),
            WeekStart::Monday => weekday.num_days_from_monday(),
        };
        slot as usize
    }

    /// First day of the week that contains `date`.
    pub fn week_of(self, date: NaiveDate) -> NaiveDate {
        date - Duration::days(self.slot_of(date) as i64)
    }
}

impl fmt::Display for WeekStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekStart::Sunday => write!(f, "sunday"),
            WeekStart::Monday => write!(f, "monday"),
        }
    }
}

impl FromStr for WeekStart {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sun" | "sunday" => Ok(WeekStart::Sunday),
            "mon" | "monday" => Ok(WeekStart::Monday),
            other => Err(ValidationError::InvalidValue {
                field: "week_start".to_string(),
                message: format!("'{other}' is not sunday or monday"),
            }),
        }
    }
}

/// Number of days in `month` (1-12) of `year`, 0 for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (first, next) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 0,
    }
}

/// Signed number of days from `start` to `end`.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// One calendar month, used to restrict counting to the month on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthScope {
    year: i32,
    month: u32,
}

impl MonthScope {
    /// Returns `None` unless `month` is in 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first_day() + Duration::days(days_in_month(self.year, self.month) as i64 - 1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for MonthScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Seven days starting at `start`, clipped at "today".
///
/// `last_valid` is the last slot on or before today: 6 for a week that is
/// over, today's slot for the current week, `None` for a week that has not
/// started yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: NaiveDate,
    pub last_valid: Option<usize>,
    today_slot: Option<usize>,
}

impl WeekWindow {
    pub fn new(start: NaiveDate, today: NaiveDate) -> Self {
        let elapsed = days_between(start, today);
        let last_valid = if elapsed < 0 {
            None
        } else {
            Some(elapsed.min(DAYS_PER_WEEK as i64 - 1) as usize)
        };
        let today_slot = (0..DAYS_PER_WEEK as i64)
            .contains(&elapsed)
            .then_some(elapsed as usize);
        Self {
            start,
            last_valid,
            today_slot,
        }
    }

    pub fn date(&self, slot: usize) -> NaiveDate {
        self.start + Duration::days(slot as i64)
    }

    pub fn end(&self) -> NaiveDate {
        self.date(DAYS_PER_WEEK - 1)
    }

    /// Slot holding today, when this is the current week.
    pub fn today_slot(&self) -> Option<usize> {
        self.today_slot
    }

    /// Number of slots on or before today.
    pub fn valid_slots(&self) -> usize {
        self.last_valid.map_or(0, |last| last + 1)
    }

    /// Number of slots strictly after today.
    pub fn days_after_today(&self) -> usize {
        DAYS_PER_WEEK - self.valid_slots()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..DAYS_PER_WEEK).map(move |slot| self.date(slot))
    }
}

/// The six weeks ending with the week that contains today.
///
/// Index 0 is the oldest week, index 5 the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollingWindow {
    weeks: [WeekWindow; WINDOW_WEEKS],
}

impl RollingWindow {
    pub fn ending_at(today: NaiveDate, week_start: WeekStart) -> Self {
        let current = week_start.week_of(today);
        let weeks = std::array::from_fn(|index| {
            let weeks_back = (WINDOW_WEEKS - 1 - index) as i64;
            WeekWindow::new(current - Duration::weeks(weeks_back), today)
        });
        Self { weeks }
    }

    pub fn weeks(&self) -> &[WeekWindow; WINDOW_WEEKS] {
        &self.weeks
    }

    pub fn start(&self) -> NaiveDate {
        self.weeks[0].start
    }

    pub fn current(&self) -> &WeekWindow {
        &self.weeks[WINDOW_WEEKS - 1]
    }
}

/// Six-row month view including leading and trailing days of the
/// neighbouring months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthGrid {
    scope: MonthScope,
    start: NaiveDate,
}

impl MonthGrid {
    pub fn new(scope: MonthScope, week_start: WeekStart) -> Self {
        Self {
            scope,
            start: week_start.week_of(scope.first_day()),
        }
    }

    pub fn scope(&self) -> MonthScope {
        self.scope
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// First day of grid row `row` (0-5).
    pub fn row_start(&self, row: usize) -> NaiveDate {
        self.start + Duration::weeks(row as i64)
    }

    /// Date of cell `index` (0-41), row by row.
    pub fn date(&self, index: usize) -> NaiveDate {
        self.start + Duration::days(index as i64)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..WINDOW_DAYS).map(|index| self.date(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2026, 12), 31);
        assert_eq!(days_in_month(2026, 13), 0);
    }

    #[test]
    fn week_of_respects_week_start() {
        // 2026-10-14 is a Wednesday
        let wed = date(2026, 10, 14);
        assert_eq!(WeekStart::Sunday.week_of(wed), date(2026, 10, 11));
        assert_eq!(WeekStart::Monday.week_of(wed), date(2026, 10, 12));
        assert_eq!(WeekStart::Sunday.slot_of(wed), 3);
        assert_eq!(WeekStart::Monday.slot_of(wed), 2);
    }

    #[test]
    fn week_window_clips_at_today() {
        let today = date(2026, 10, 14);
        let current = WeekWindow::new(date(2026, 10, 11), today);
        assert_eq!(current.last_valid, Some(3));
        assert_eq!(current.today_slot(), Some(3));
        assert_eq!(current.days_after_today(), 3);

        let past = WeekWindow::new(date(2026, 10, 4), today);
        assert_eq!(past.last_valid, Some(6));
        assert_eq!(past.today_slot(), None);
        assert_eq!(past.days_after_today(), 0);

        let future = WeekWindow::new(date(2026, 10, 18), today);
        assert_eq!(future.last_valid, None);
        assert_eq!(future.valid_slots(), 0);
    }

    #[test]
    fn rolling_window_ends_with_current_week() {
        let today = date(2026, 10, 14);
        let window = RollingWindow::ending_at(today, WeekStart::Sunday);
        assert_eq!(window.current().start, date(2026, 10, 11));
        assert_eq!(window.start(), date(2026, 9, 6));
        assert!(window.weeks()[..5].iter().all(|w| w.last_valid == Some(6)));
    }

    #[test]
    fn month_grid_starts_on_week_containing_first() {
        // October 2026 starts on a Thursday
        let grid = MonthGrid::new(MonthScope::new(2026, 10).unwrap(), WeekStart::Sunday);
        assert_eq!(grid.start(), date(2026, 9, 27));
        assert_eq!(grid.dates().count(), WINDOW_DAYS);
        assert_eq!(grid.dates().last(), Some(date(2026, 11, 7)));
        assert_eq!(grid.row_start(1), date(2026, 10, 4));
    }

    #[test]
    fn month_scope_rejects_invalid_month() {
        assert!(MonthScope::new(2026, 0).is_none());
        assert!(MonthScope::new(2026, 13).is_none());
        let scope = MonthScope::new(2026, 2).unwrap();
        assert_eq!(scope.last_day(), date(2026, 2, 28));
        assert_eq!(scope.to_string(), "2026-02");
    }

    #[test]
    fn week_start_parses_names() {
        assert_eq!("Monday".parse::<WeekStart>().unwrap(), WeekStart::Monday);
        assert_eq!("sun".parse::<WeekStart>().unwrap(), WeekStart::Sunday);
        assert!("friday".parse::<WeekStart>().is_err());
    }
}
