use chrono::NaiveDate;
use clap::Args;
use habitgrid_core::Habit;
use serde::Serialize;

use super::Context;

#[derive(Args)]
pub struct StreakArgs {
    /// Habit name or id (default: all active habits)
    habit: Option<String>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct StreakRow<'a> {
    habit: &'a str,
    length: u32,
    broken_before_offset: bool,
    start_date: Option<NaiveDate>,
}

pub fn run(args: StreakArgs, today: NaiveDate) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load()?;
    let week_start = ctx.config.calendar.week_start;

    let habits: Vec<&Habit> = match &args.habit {
        Some(reference) => vec![ctx.store.find(reference)?],
        None => ctx.store.habits().iter().filter(|h| !h.archived).collect(),
    };

    let rows: Vec<StreakRow> = habits
        .iter()
        .map(|habit| {
            let streak = habit.streak(today, week_start);
            StreakRow {
                habit: &habit.name,
                length: streak.length,
                broken_before_offset: streak.broken_before_offset,
                start_date: streak.start_date,
            }
        })
        .collect();

    if ctx.json(args.json) {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for row in rows {
        match row.start_date {
            Some(start) => println!("{:<24} {:>4}  since {start}", row.habit, row.length),
            None => println!("{:<24} {:>4}", row.habit, row.length),
        }
    }
    Ok(())
}
