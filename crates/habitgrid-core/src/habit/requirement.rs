//! Weekly requirement resolution.
//!
//! Given one week of completion bits and a [`Frequency`], decide for each of
//! the seven slots whether it is due and whether it is already satisfied.
//! When a [`MonthScope`] is given only slots inside that month are counted,
//! but a per-week quota is still computed over the whole week, so a day
//! completed in the neighbouring month reduces what is owed in this one.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::bit_calendar::WeekBits;
use super::Frequency;
use crate::calendar::{MonthScope, WeekWindow, DAYS_PER_WEEK};

/// State of one day slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    /// Not due under the habit's frequency
    NotRequired,
    /// Due and completed
    Satisfied,
    /// Due and not completed
    Pending,
    /// After today, or outside the month being counted
    OutOfBounds,
}

impl SlotState {
    pub fn is_required(self) -> bool {
        matches!(self, SlotState::Satisfied | SlotState::Pending)
    }
}

/// Requirement state of one habit for one week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementResult {
    pub due_count: u32,
    pub checked_count: u32,
    pub slots: [SlotState; DAYS_PER_WEEK],
}

impl RequirementResult {
    pub fn pending_count(&self) -> u32 {
        self.due_count - self.checked_count
    }

    /// Fraction of due slots already satisfied, 1.0 when nothing is due.
    pub fn progress(&self) -> f64 {
        if self.due_count == 0 {
            1.0
        } else {
            self.checked_count as f64 / self.due_count as f64
        }
    }
}

/// Resolves which slots of `window` are due for `frequency`.
///
/// Slots after `window.last_valid` are never due. For a per-week quota the
/// completed slots are claimed first, oldest first. Days after today can
/// still cover the rest, so only what they cannot is owed now; it goes on
/// the most recent uncompleted slots, walking backward.
pub fn resolve(
    frequency: &Frequency,
    bits: &WeekBits,
    window: &WeekWindow,
    scope: Option<MonthScope>,
) -> RequirementResult {
    let Some(last) = window.last_valid else {
        return RequirementResult {
            due_count: 0,
            checked_count: 0,
            slots: [SlotState::OutOfBounds; DAYS_PER_WEEK],
        };
    };

    let mut required = [false; DAYS_PER_WEEK];
    match frequency {
        Frequency::Daily => required[..=last].fill(true),
        Frequency::DayOfWeek { mask } => {
            for (slot, due) in required.iter_mut().enumerate().take(last + 1) {
                *due = mask.contains(window.date(slot).weekday());
            }
        }
        Frequency::PerWeek { count } => {
            let count = *count as usize;
            let mut claimed = 0;
            for slot in (0..=last).filter(|slot| bits.is_set(*slot)) {
                if claimed == count {
                    break;
                }
                required[slot] = true;
                claimed += 1;
            }
            let owed_now = count.saturating_sub(window.days_after_today());
            for slot in (0..=last).rev().filter(|slot| !bits.is_set(*slot)) {
                if claimed >= owed_now {
                    break;
                }
                required[slot] = true;
                claimed += 1;
            }
        }
    }

    let mut result = RequirementResult {
        due_count: 0,
        checked_count: 0,
        slots: [SlotState::NotRequired; DAYS_PER_WEEK],
    };
    for slot in 0..DAYS_PER_WEEK {
        let in_scope = slot <= last && scope.map_or(true, |s| s.contains(window.date(slot)));
        result.slots[slot] = if !in_scope {
            SlotState::OutOfBounds
        } else if !required[slot] {
            SlotState::NotRequired
        } else if bits.is_set(slot) {
            result.due_count += 1;
            result.checked_count += 1;
            SlotState::Satisfied
        } else {
            result.due_count += 1;
            SlotState::Pending
        };
    }
    result
}
