//! Basic CLI E2E tests.
//!
//! Tests run the built binary against a temporary data directory and a fixed
//! `--today` so results do not depend on the clock.

mod common;

use common::{assert_contains, parse_json, run_cli_failure, run_cli_success};

const TODAY: &str = "--today=2026-10-14";

#[test]
fn test_habit_add_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_cli_success(dir.path(), &["habit", "add", "Read", TODAY]);
    assert_contains(&out, "Habit added: Read");

    let out = run_cli_success(dir.path(), &["habit", "list", "--json"]);
    let habits = parse_json(&out);
    assert_eq!(habits.as_array().unwrap().len(), 1);
    assert_eq!(habits[0]["name"], "Read");
    assert_eq!(habits[0]["frequency"]["type"], "daily");
}

#[test]
fn test_duplicate_habit_fails() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["habit", "add", "Read"]);
    let (_, stderr, _) = run_cli_failure(dir.path(), &["habit", "add", "read"]);
    assert_contains(&stderr, "already exists");
}

#[test]
fn test_invalid_frequency_rejected() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_failure(dir.path(), &["habit", "add", "Swim", "--frequency", "per-week:9"]);
}

#[test]
fn test_check_toggles_and_streak() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["habit", "add", "Read"]);
    for date in ["2026-10-12", "2026-10-13", "2026-10-14"] {
        let out = run_cli_success(dir.path(), &["habit", "check", "Read", "--date", date, TODAY]);
        assert_contains(&out, "done");
    }

    let out = run_cli_success(dir.path(), &["streak", "--json", TODAY]);
    let rows = parse_json(&out);
    assert_eq!(rows[0]["length"], 3);
    assert_eq!(rows[0]["start_date"], "2026-10-12");

    // toggling again clears the day
    let out = run_cli_success(dir.path(), &["habit", "check", "Read", TODAY]);
    assert_contains(&out, "not done");
    let out = run_cli_success(dir.path(), &["streak", "Read", "--json", TODAY]);
    assert_eq!(parse_json(&out)[0]["length"], 2);
}

#[test]
fn test_future_and_out_of_window_edits_fail() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["habit", "add", "Read"]);
    let (_, stderr, _) =
        run_cli_failure(dir.path(), &["habit", "set", "Read", "2026-10-15", "true", TODAY]);
    assert_contains(&stderr, "future");
    let (_, stderr, _) =
        run_cli_failure(dir.path(), &["habit", "set", "Read", "2026-08-01", "true", TODAY]);
    assert_contains(&stderr, "editable window");

    run_cli_success(dir.path(), &["config", "set", "calendar.edit_window_weeks", "0"]);
    run_cli_success(dir.path(), &["habit", "set", "Read", "2026-08-01", "true", TODAY]);
}

#[test]
fn test_stats_month_json() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["habit", "add", "Read"]);
    for day in 1..=10 {
        let date = format!("2026-10-{day:02}");
        run_cli_success(dir.path(), &["habit", "set", "Read", &date, "true", TODAY]);
    }
    let out = run_cli_success(dir.path(), &["stats", "month", "--json", TODAY]);
    let metrics = parse_json(&out);
    assert_eq!(metrics["habits_done"], 10);
    assert_eq!(metrics["habits_due"], 14);
    assert_eq!(metrics["perfect_days"], 10);
    assert_eq!(metrics["missed_days"], 3);

    let out = run_cli_success(dir.path(), &["stats", "heatmap", "--json", TODAY]);
    assert_eq!(parse_json(&out).as_array().unwrap().len(), 42);
}

#[test]
fn test_show_and_archive() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["habit", "add", "Gym", "-f", "days:mon,wed,fri"]);
    let out = run_cli_success(dir.path(), &["habit", "show", "Gym", "--json", TODAY]);
    let shown = parse_json(&out);
    assert_eq!(shown["weeks"].as_array().unwrap().len(), 6);
    assert_eq!(shown["streak"]["length"], 0);

    run_cli_success(dir.path(), &["habit", "archive", "Gym"]);
    let out = run_cli_success(dir.path(), &["habit", "list", "--json"]);
    assert!(parse_json(&out).as_array().unwrap().is_empty());
    let out = run_cli_success(dir.path(), &["habit", "list", "--all", "--json"]);
    assert_eq!(parse_json(&out).as_array().unwrap().len(), 1);
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_cli_success(dir.path(), &["config", "get", "calendar.week_start"]);
    assert_eq!(out.trim(), "sunday");
    run_cli_success(dir.path(), &["config", "set", "calendar.week_start", "monday"]);
    let out = run_cli_success(dir.path(), &["config", "get", "calendar.week_start"]);
    assert_eq!(out.trim(), "monday");
    run_cli_failure(dir.path(), &["config", "set", "calendar.week_start", "friday"]);
    run_cli_failure(dir.path(), &["config", "get", "nope"]);
}
