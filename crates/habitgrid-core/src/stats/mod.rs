//! Statistics module for HabitGrid
//!
//! Month-level aggregation of habit requirements for calendar and heatmap
//! views.

mod month_metrics;

pub use month_metrics::{
    ActiveStreak, Heatmap, HeatmapCell, MonthMetrics, MonthMetricsAggregator, MonthReport,
};
