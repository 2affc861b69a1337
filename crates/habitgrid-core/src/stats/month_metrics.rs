//! Month metrics and heatmap.
//!
//! Folds every habit's weekly requirements over the six-row grid of a month
//! into per-day done/due counts and month totals. Only days inside the month
//! are counted; leading and trailing grid days stay empty so that the
//! heatmap always sums to the totals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::{
    MonthGrid, MonthScope, WeekStart, WeekWindow, DAYS_PER_WEEK, WINDOW_DAYS, WINDOW_WEEKS,
};
use crate::habit::{resolve, Habit, SlotState, StreakCalculator};

/// Heatmap cell data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub done: u32,
    pub due: u32,
    pub in_current_month: bool,
}

impl HeatmapCell {
    pub fn new(date: NaiveDate, in_current_month: bool) -> Self {
        Self {
            date,
            done: 0,
            due: 0,
            in_current_month,
        }
    }

    pub fn pending(&self) -> u32 {
        self.due - self.done
    }

    /// Share of due habits done on this day (0.0-1.0).
    pub fn intensity(&self) -> f64 {
        if self.due == 0 {
            0.0
        } else {
            self.done as f64 / self.due as f64
        }
    }

    /// Get the character for ASCII heatmap visualization.
    pub fn heat_char(&self) -> char {
        if !self.in_current_month {
            ' '
        } else if self.due == 0 {
            '·'
        } else if self.done == 0 {
            '░'
        } else if self.done < self.due {
            '▒'
        } else {
            '█'
        }
    }
}

/// The 6x7 month grid, row by row.
pub type Heatmap = [HeatmapCell; WINDOW_DAYS];

/// serde only derives arrays up to 32 elements.
mod grid_cells {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{Heatmap, HeatmapCell};

    pub fn serialize<S: Serializer>(cells: &Heatmap, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(cells.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Heatmap, D::Error> {
        let cells = Vec::<HeatmapCell>::deserialize(deserializer)?;
        let len = cells.len();
        cells
            .try_into()
            .map_err(|_| D::Error::invalid_length(len, &"42 heatmap cells"))
    }
}

/// The longest current streak among the aggregated habits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveStreak {
    pub habit_id: Uuid,
    pub habit_name: String,
    pub length: u32,
    pub start_date: Option<NaiveDate>,
}

/// Month totals across all habits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthMetrics {
    pub month: MonthScope,
    pub habits_done: u32,
    pub habits_due: u32,
    /// Days on or before today where everything due was done.
    pub perfect_days: u32,
    /// Days before today where nothing due was done.
    pub missed_days: u32,
    pub active_streak: Option<ActiveStreak>,
}

impl MonthMetrics {
    pub fn completion_rate(&self) -> f64 {
        if self.habits_due == 0 {
            0.0
        } else {
            self.habits_done as f64 / self.habits_due as f64
        }
    }
}

/// Metrics together with the 42-cell heatmap they were computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthReport {
    pub metrics: MonthMetrics,
    #[serde(with = "grid_cells")]
    pub heatmap: Heatmap,
}

/// Month metrics aggregator
#[derive(Debug, Clone, Copy, Default)]
pub struct MonthMetricsAggregator {
    week_start: WeekStart,
}

impl MonthMetricsAggregator {
    pub fn new(week_start: WeekStart) -> Self {
        Self { week_start }
    }

    pub fn aggregate(&self, habits: &[Habit], month: MonthScope, today: NaiveDate) -> MonthMetrics {
        self.compute(habits, month, today).metrics
    }

    pub fn heatmap(&self, habits: &[Habit], month: MonthScope, today: NaiveDate) -> Heatmap {
        self.compute(habits, month, today).heatmap
    }

    pub fn compute(&self, habits: &[Habit], month: MonthScope, today: NaiveDate) -> MonthReport {
        let grid = MonthGrid::new(month, self.week_start);
        let mut heatmap: Heatmap = std::array::from_fn(|index| {
            let date = grid.date(index);
            HeatmapCell::new(date, month.contains(date))
        });

        for habit in habits {
            for row in 0..WINDOW_WEEKS {
                let window = WeekWindow::new(grid.row_start(row), today);
                if window.last_valid.is_none() {
                    break;
                }
                let bits = habit.completions.week_bits(window.start);
                let result = resolve(&habit.frequency, &bits, &window, Some(month));
                tracing::trace!(
                    habit = %habit.name,
                    week = %window.start,
                    due = result.due_count,
                    checked = result.checked_count,
                    "resolved week"
                );
                for (slot, state) in result.slots.iter().enumerate() {
                    let cell = &mut heatmap[row * DAYS_PER_WEEK + slot];
                    match state {
                        SlotState::Satisfied => {
                            cell.due += 1;
                            cell.done += 1;
                        }
                        SlotState::Pending => cell.due += 1,
                        SlotState::NotRequired | SlotState::OutOfBounds => {}
                    }
                }
            }
        }

        let counted = || heatmap.iter().filter(|cell| cell.in_current_month);
        let metrics = MonthMetrics {
            month,
            habits_done: heatmap.iter().map(|cell| cell.done).sum(),
            habits_due: heatmap.iter().map(|cell| cell.due).sum(),
            perfect_days: counted()
                .filter(|cell| cell.date <= today && cell.due > 0 && cell.pending() == 0)
                .count() as u32,
            missed_days: counted()
                .filter(|cell| cell.date < today && cell.due > 0 && cell.done == 0)
                .count() as u32,
            active_streak: self.active_streak(habits, today),
        };
        tracing::debug!(
            %month,
            done = metrics.habits_done,
            due = metrics.habits_due,
            "aggregated month"
        );

        MonthReport { metrics, heatmap }
    }

    fn active_streak(&self, habits: &[Habit], today: NaiveDate) -> Option<ActiveStreak> {
        let calculator = StreakCalculator::new(self.week_start);
        habits
            .iter()
            .map(|habit| (habit, calculator.compute(habit, today)))
            .filter(|(_, streak)| streak.length > 0)
            .max_by_key(|(_, streak)| streak.length)
            .map(|(habit, streak)| ActiveStreak {
                habit_id: habit.id,
                habit_name: habit.name.clone(),
                length: streak.length,
                start_date: streak.start_date,
            })
    }
}
