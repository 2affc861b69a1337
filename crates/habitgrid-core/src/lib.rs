//! # HabitGrid Core Library
//!
//! This library provides the habit completion engine behind HabitGrid. All
//! of it is pure computation over explicit inputs: habits and their
//! completion calendars, plus a "today" supplied by the caller. Nothing here
//! reads the clock, so every result can be recomputed and tested
//! deterministically.
//!
//! ## Architecture
//!
//! - **Calendar**: week and month-grid arithmetic
//! - **Habit**: the month-chunked completion bitmap, weekly requirement
//!   resolution and the rolling six-week streak
//! - **Stats**: month totals and the 42-cell heatmap
//! - **Storage**: TOML configuration and a JSON habit store for the CLI
//!
//! ## Key Components
//!
//! - [`BitCalendar`]: per-habit completion storage
//! - [`resolve`]: which days of a week are due
//! - [`StreakCalculator`]: current streak per habit
//! - [`MonthMetricsAggregator`]: month metrics and heatmap

pub mod calendar;
pub mod error;
pub mod habit;
pub mod stats;
pub mod storage;

pub use calendar::{MonthGrid, MonthScope, RollingWindow, WeekStart, WeekWindow};
pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use habit::{
    resolve, BitCalendar, ChunkKey, DayMask, Frequency, Habit, RequirementResult, SlotState,
    StreakCalculator, StreakResult, WeekBits,
};
pub use stats::{
    ActiveStreak, Heatmap, HeatmapCell, MonthMetrics, MonthMetricsAggregator, MonthReport,
};
pub use storage::{Config, HabitStore};
