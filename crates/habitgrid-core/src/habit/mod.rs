//! Habits and their completion engine.
//!
//! A [`Habit`] owns its [`BitCalendar`]; everything else in this module is a
//! pure function over a habit and an explicit "today":
//!
//! - [`requirement::resolve`]: which slots of a week are due
//! - [`StreakCalculator`]: the current streak over the rolling six weeks

pub mod bit_calendar;
pub mod requirement;
pub mod streak;

pub use bit_calendar::{BitCalendar, ChunkKey, WeekBits};
pub use requirement::{resolve, RequirementResult, SlotState};
pub use streak::{StreakCalculator, StreakResult};

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::calendar::{WeekStart, WeekWindow};
use crate::error::ValidationError;

const WEEKDAYS_FROM_SUNDAY: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Seven-bit set of weekdays.
///
/// Sunday is bit 6 and Saturday bit 0, so a binary literal reads Sunday to
/// Saturday from left to right: `0b0101010` is Monday, Wednesday, Friday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayMask(u8);

impl DayMask {
    pub const ALL: DayMask = DayMask(0x7F);
    pub const WEEKDAYS: DayMask = DayMask(0b0111110);
    pub const WEEKENDS: DayMask = DayMask(0b1000001);

    pub fn new(bits: u8) -> Result<Self, ValidationError> {
        if bits == 0 || bits > 0x7F {
            return Err(ValidationError::OutOfRange {
                field: "day mask".to_string(),
                value: bits as i64,
                min: 1,
                max: 0x7F,
            });
        }
        Ok(Self(bits))
    }

    pub fn from_weekdays(days: &[Weekday]) -> Result<Self, ValidationError> {
        Self::new(days.iter().fold(0, |bits, day| bits | Self::bit_for(*day)))
    }

    pub fn bit_for(day: Weekday) -> u8 {
        1 << (6 - day.num_days_from_sunday())
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & Self::bit_for(day) != 0
    }

    pub fn len(self) -> u32 {
        self.0.count_ones()
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Days in the mask, Sunday first.
    pub fn weekdays(self) -> impl Iterator<Item = Weekday> {
        WEEKDAYS_FROM_SUNDAY
            .into_iter()
            .filter(move |day| self.contains(*day))
    }
}

impl TryFrom<u8> for DayMask {
    type Error = ValidationError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::new(bits)
    }
}

impl From<DayMask> for u8 {
    fn from(mask: DayMask) -> Self {
        mask.0
    }
}

impl fmt::Display for DayMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .weekdays()
            .map(|day| day.to_string().to_ascii_lowercase())
            .collect();
        write!(f, "{}", names.join(","))
    }
}

impl FromStr for DayMask {
    type Err = ValidationError;

    /// Parses a comma separated list of weekday names ("mon,wed,fri").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let days = s
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<Weekday>()
                    .map_err(|_| ValidationError::InvalidValue {
                        field: "day mask".to_string(),
                        message: format!("'{}' is not a weekday", part.trim()),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_weekdays(&days)
    }
}

/// How often a habit is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frequency {
    /// Every day.
    Daily,
    /// On the weekdays in the mask.
    DayOfWeek { mask: DayMask },
    /// Any `count` days of each week.
    PerWeek { count: u8 },
}

impl Frequency {
    pub fn per_week(count: u8) -> Result<Self, ValidationError> {
        let frequency = Frequency::PerWeek { count };
        frequency.validate()?;
        Ok(frequency)
    }

    pub fn day_of_week(mask: u8) -> Result<Self, ValidationError> {
        Ok(Frequency::DayOfWeek {
            mask: DayMask::new(mask)?,
        })
    }

    /// Checks invariants that deserialization alone cannot enforce.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Frequency::PerWeek { count } if !(1..=7).contains(count) => {
                Err(ValidationError::OutOfRange {
                    field: "per-week count".to_string(),
                    value: *count as i64,
                    min: 1,
                    max: 7,
                })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => write!(f, "daily"),
            Frequency::DayOfWeek { mask } => write!(f, "days:{mask}"),
            Frequency::PerWeek { count } => write!(f, "per-week:{count}"),
        }
    }
}

impl FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("daily") {
            return Ok(Frequency::Daily);
        }
        if let Some(count) = s.strip_prefix("per-week:") {
            let count = count
                .trim()
                .parse::<u8>()
                .map_err(|_| ValidationError::InvalidFrequency(s.to_string()))?;
            return Frequency::per_week(count);
        }
        if let Some(days) = s.strip_prefix("days:") {
            return Ok(Frequency::DayOfWeek {
                mask: days.parse()?,
            });
        }
        Err(ValidationError::InvalidFrequency(s.to_string()))
    }
}

/// A tracked habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: Uuid,
    pub name: String,
    pub frequency: Frequency,
    #[serde(default)]
    pub completions: BitCalendar,
    /// Streak carried over from before the rolling window.
    #[serde(default)]
    pub base_streak_offset: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub archived: bool,
}

impl Habit {
    pub fn new(name: impl Into<String>, frequency: Frequency) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            frequency,
            completions: BitCalendar::new(),
            base_streak_offset: 0,
            created_at: Utc::now(),
            archived: false,
        }
    }

    pub fn with_streak_offset(mut self, offset: u32) -> Self {
        self.base_streak_offset = offset;
        self
    }

    pub fn streak(&self, today: NaiveDate, week_start: WeekStart) -> StreakResult {
        StreakCalculator::new(week_start).compute(self, today)
    }

    /// Requirement state of the week containing `today`.
    pub fn week_progress(&self, today: NaiveDate, week_start: WeekStart) -> RequirementResult {
        let window = WeekWindow::new(week_start.week_of(today), today);
        let bits = self.completions.week_bits(window.start);
        resolve(&self.frequency, &bits, &window, None)
    }
}
