use chrono::NaiveDate;
use clap::Subcommand;
use habitgrid_core::calendar::RollingWindow;
use habitgrid_core::{resolve, Frequency, Habit, SlotState};
use serde::Serialize;

use super::Context;

#[derive(Subcommand)]
pub enum HabitAction {
    /// Add a habit
    Add {
        /// Habit name
        name: String,
        /// daily, per-week:N or days:mon,wed,fri
        #[arg(short, long, default_value = "daily")]
        frequency: Frequency,
        /// Streak carried over from before tracking started
        #[arg(long, default_value_t = 0)]
        streak_offset: u32,
    },
    /// List habits
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Include archived habits
        #[arg(long)]
        all: bool,
    },
    /// Remove a habit and its history
    Remove {
        /// Habit name or id
        habit: String,
    },
    /// Archive a habit (kept, but left out of stats)
    Archive {
        /// Habit name or id
        habit: String,
    },
    /// Toggle completion for a day (default today)
    Check {
        /// Habit name or id
        habit: String,
        /// Date to toggle (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Set completion for a day explicitly
    Set {
        /// Habit name or id
        habit: String,
        /// Date (YYYY-MM-DD)
        date: NaiveDate,
        /// true or false
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
    /// Show the rolling six weeks of a habit
    Show {
        /// Habit name or id
        habit: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct WeekRow {
    start: NaiveDate,
    bits: String,
    due: u32,
    checked: u32,
    slots: Vec<SlotState>,
}

pub fn run(action: HabitAction, today: NaiveDate) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctx = Context::load()?;

    match action {
        HabitAction::Add {
            name,
            frequency,
            streak_offset,
        } => {
            let habit = Habit::new(name, frequency).with_streak_offset(streak_offset);
            let added = ctx.store.add(habit)?;
            println!("Habit added: {} ({})", added.name, added.id);
            ctx.store.save()?;
        }
        HabitAction::List { json, all } => {
            let habits: Vec<&Habit> = ctx
                .store
                .habits()
                .iter()
                .filter(|h| all || !h.archived)
                .collect();
            if ctx.json(json) {
                println!("{}", serde_json::to_string_pretty(&habits)?);
            } else if habits.is_empty() {
                println!("No habits yet. Add one with `habitgrid habit add <name>`.");
            } else {
                let week_start = ctx.config.calendar.week_start;
                for habit in habits {
                    let progress = habit.week_progress(today, week_start);
                    let id = habit.id.to_string();
                    println!(
                        "{}  {:<24} {:<20} this week {}/{}{}",
                        &id[..8],
                        habit.name,
                        habit.frequency.to_string(),
                        progress.checked_count,
                        progress.due_count,
                        if habit.archived { "  [archived]" } else { "" }
                    );
                }
            }
        }
        HabitAction::Remove { habit } => {
            let removed = ctx.store.remove(&habit)?;
            ctx.store.save()?;
            println!("Habit removed: {}", removed.name);
        }
        HabitAction::Archive { habit } => {
            let habit = ctx.store.find_mut(&habit)?;
            habit.archived = true;
            let name = habit.name.clone();
            ctx.store.save()?;
            println!("Habit archived: {name}");
        }
        HabitAction::Check { habit, date } => {
            let date = date.unwrap_or(today);
            ensure_editable(&ctx, date, today)?;
            let habit = ctx.store.find_mut(&habit)?;
            let done = habit
                .completions
                .toggle(date, today)
                .ok_or_else(|| format!("{date} is in the future"))?;
            let name = habit.name.clone();
            ctx.store.save()?;
            println!("{name} {date}: {}", if done { "done" } else { "not done" });
        }
        HabitAction::Set { habit, date, value } => {
            ensure_editable(&ctx, date, today)?;
            let habit = ctx.store.find_mut(&habit)?;
            if !habit.completions.set(date, value, today) {
                return Err(format!("{date} is in the future").into());
            }
            let name = habit.name.clone();
            ctx.store.save()?;
            println!("{name} {date}: {}", if value { "done" } else { "not done" });
        }
        HabitAction::Show { habit, json } => {
            let week_start = ctx.config.calendar.week_start;
            let habit = ctx.store.find(&habit)?;
            let window = RollingWindow::ending_at(today, week_start);
            let rows: Vec<WeekRow> = window
                .weeks()
                .iter()
                .map(|week| {
                    let bits = habit.completions.week_bits(week.start);
                    let result = resolve(&habit.frequency, &bits, week, None);
                    WeekRow {
                        start: week.start,
                        bits: bits.to_string(),
                        due: result.due_count,
                        checked: result.checked_count,
                        slots: result.slots.to_vec(),
                    }
                })
                .collect();
            let streak = habit.streak(today, week_start);

            if ctx.json(json) {
                let out = serde_json::json!({
                    "habit": habit,
                    "weeks": rows,
                    "streak": streak,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{} ({})", habit.name, habit.frequency);
                for row in &rows {
                    let cells: String = row.slots.iter().zip(row.bits.chars()).map(slot_char).collect();
                    println!("  {}  {}  {}/{}", row.start, cells, row.checked, row.due);
                }
                println!("  streak: {}", streak.length);
            }
        }
    }
    Ok(())
}

fn slot_char((state, bit): (&SlotState, char)) -> char {
    match state {
        SlotState::Satisfied => '#',
        SlotState::Pending => 'o',
        SlotState::OutOfBounds => ' ',
        SlotState::NotRequired if bit == '1' => '+',
        SlotState::NotRequired => '.',
    }
}

fn ensure_editable(
    ctx: &Context,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<(), Box<dyn std::error::Error>> {
    if date <= today && !ctx.config.is_editable(date, today) {
        return Err(format!(
            "{date} is outside the editable window of {} weeks",
            ctx.config.calendar.edit_window_weeks
        )
        .into());
    }
    Ok(())
}
