//! Current streak over the rolling six-week window.
//!
//! The window is walked from the current week back to the oldest one. A day
//! that is still in progress (today) never breaks a streak. When all six
//! weeks hold, the habit's `base_streak_offset` is added, which is how
//! history older than the window keeps counting.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::bit_calendar::WeekBits;
use super::{DayMask, Frequency, Habit};
use crate::calendar::{RollingWindow, WeekStart, WeekWindow};

/// Outcome of a streak computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakResult {
    pub length: u32,
    /// The walk stopped inside the window, so the base offset was not added.
    pub broken_before_offset: bool,
    /// Oldest completion the streak counts. Shifted back by the base offset
    /// for daily habits; unknown for other frequencies once the offset applies.
    pub start_date: Option<NaiveDate>,
}

/// Streak calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct StreakCalculator {
    week_start: WeekStart,
}

impl StreakCalculator {
    pub fn new(week_start: WeekStart) -> Self {
        Self { week_start }
    }

    pub fn compute(&self, habit: &Habit, today: NaiveDate) -> StreakResult {
        let window = RollingWindow::ending_at(today, self.week_start);
        let mut tally = Tally::default();

        for week in window.weeks().iter().rev() {
            let bits = habit.completions.week_bits(week.start);
            let kept = match habit.frequency {
                Frequency::Daily => daily_week(&bits, week, &mut tally),
                Frequency::DayOfWeek { mask } => masked_week(&bits, week, mask, &mut tally),
                Frequency::PerWeek { count } => quota_week(&bits, week, count, &mut tally),
            };
            if !kept {
                tracing::trace!(
                    habit = %habit.name,
                    week = %week.start,
                    length = tally.length,
                    "streak broken"
                );
                return StreakResult {
                    length: tally.length,
                    broken_before_offset: true,
                    start_date: tally.oldest,
                };
            }
        }

        let offset = habit.base_streak_offset;
        let start_date = match (offset, &habit.frequency) {
            (0, _) => tally.oldest,
            (_, Frequency::Daily) => tally
                .oldest
                .map(|oldest| oldest - Duration::days(offset as i64)),
            _ => None,
        };
        StreakResult {
            length: tally.length + offset,
            broken_before_offset: false,
            start_date,
        }
    }
}

/// Counted slots so far, newest week first.
#[derive(Debug, Default)]
struct Tally {
    length: u32,
    oldest: Option<NaiveDate>,
}

impl Tally {
    fn count(&mut self, date: NaiveDate) {
        self.length += 1;
        if self.oldest.map_or(true, |oldest| date < oldest) {
            self.oldest = Some(date);
        }
    }
}

/// Counts completed days backward from the last valid slot.
fn daily_week(bits: &WeekBits, week: &WeekWindow, tally: &mut Tally) -> bool {
    let Some(last) = week.last_valid else {
        return true;
    };
    for slot in (0..=last).rev() {
        if bits.is_set(slot) {
            tally.count(week.date(slot));
        } else if week.today_slot() != Some(slot) {
            return false;
        }
    }
    true
}

/// Every due weekday up to the last valid slot must be done.
fn masked_week(bits: &WeekBits, week: &WeekWindow, mask: DayMask, tally: &mut Tally) -> bool {
    let Some(last) = week.last_valid else {
        return true;
    };
    let due: Vec<usize> = (0..=last)
        .filter(|slot| mask.contains(week.date(*slot).weekday()))
        .collect();
    if due
        .iter()
        .any(|slot| !bits.is_set(*slot) && week.today_slot() != Some(*slot))
    {
        return false;
    }
    for slot in due.into_iter().filter(|slot| bits.is_set(*slot)) {
        tally.count(week.date(slot));
    }
    true
}

/// The week holds while the quota is still reachable.
fn quota_week(bits: &WeekBits, week: &WeekWindow, count: u8, tally: &mut Tally) -> bool {
    let Some(last) = week.last_valid else {
        return true;
    };
    let checked = bits.count_through(last);
    let today_open = week
        .today_slot()
        .is_some_and(|slot| !bits.is_set(slot));
    let remaining = week.days_after_today() + usize::from(today_open);
    if checked + remaining < count as usize {
        return false;
    }
    for slot in (0..=last)
        .filter(|slot| bits.is_set(*slot))
        .take(count as usize)
    {
        tally.count(week.date(slot));
    }
    true
}
