use chrono::{Datelike, NaiveDate};
use clap::{Args, Subcommand};
use habitgrid_core::{HeatmapCell, MonthMetricsAggregator, MonthScope};

use super::Context;

#[derive(Args)]
pub struct MonthArgs {
    /// Year (default: current)
    #[arg(long)]
    year: Option<i32>,
    /// Month 1-12 (default: current)
    #[arg(long)]
    month: Option<u32>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

impl MonthArgs {
    fn scope(&self, today: NaiveDate) -> Result<MonthScope, Box<dyn std::error::Error>> {
        let year = self.year.unwrap_or(today.year());
        let month = self.month.unwrap_or(today.month());
        MonthScope::new(year, month).ok_or_else(|| format!("invalid month: {month}").into())
    }
}

#[derive(Subcommand)]
pub enum StatsAction {
    /// Month totals
    Month(MonthArgs),
    /// Month heatmap
    Heatmap(MonthArgs),
}

pub fn run(action: StatsAction, today: NaiveDate) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load()?;
    let aggregator = MonthMetricsAggregator::new(ctx.config.calendar.week_start);
    let habits = ctx.store.active();

    match action {
        StatsAction::Month(args) => {
            let metrics = aggregator.aggregate(&habits, args.scope(today)?, today);
            if ctx.json(args.json) {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            } else {
                println!("Month:        {}", metrics.month);
                println!(
                    "Done / due:   {} / {} ({:.0}%)",
                    metrics.habits_done,
                    metrics.habits_due,
                    metrics.completion_rate() * 100.0
                );
                println!("Perfect days: {}", metrics.perfect_days);
                println!("Missed days:  {}", metrics.missed_days);
                if let Some(streak) = &metrics.active_streak {
                    match streak.start_date {
                        Some(start) => println!(
                            "Best streak:  {} ({} since {start})",
                            streak.length, streak.habit_name
                        ),
                        None => println!("Best streak:  {} ({})", streak.length, streak.habit_name),
                    }
                }
            }
        }
        StatsAction::Heatmap(args) => {
            let cells = aggregator.heatmap(&habits, args.scope(today)?, today);
            if ctx.json(args.json) {
                println!("{}", serde_json::to_string_pretty(&cells[..])?);
            } else {
                print_heatmap(&cells, ctx.config.display.heat_chars);
            }
        }
    }
    Ok(())
}

fn print_heatmap(cells: &[HeatmapCell], heat_chars: bool) {
    for week in cells.chunks(7) {
        let line: Vec<String> = week
            .iter()
            .map(|cell| {
                if !cell.in_current_month {
                    "     ".to_string()
                } else if heat_chars {
                    format!("{:>2} {} ", cell.date.day(), cell.heat_char())
                } else {
                    format!("{:>2}:{}/{}", cell.date.day(), cell.done, cell.due)
                }
            })
            .collect();
        println!("{}", line.join(" ").trim_end());
    }
}
