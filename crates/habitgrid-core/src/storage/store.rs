//! JSON file holding every habit and its completion calendar.
//!
//! The whole store is read on open and written back on [`HabitStore::save`];
//! callers load, mutate and save within one process.

use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{Result, StoreError};
use crate::habit::Habit;

/// Habit store file name.
const HABITS_FILE: &str = "habits.json";

#[derive(Debug, Clone)]
pub struct HabitStore {
    path: PathBuf,
    habits: Vec<Habit>,
}

impl HabitStore {
    /// Open the store in the data directory.
    pub fn open() -> Result<Self> {
        Self::open_at(data_dir()?.join(HABITS_FILE))
    }

    /// Open the store at `path`. A missing file is an empty store.
    pub fn open_at(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let habits = match std::fs::read_to_string(&path) {
            Ok(content) => Self::parse(&path, &content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), count = habits.len(), "opened habit store");
        Ok(Self { path, habits })
    }

    fn parse(path: &Path, content: &str) -> Result<Vec<Habit>> {
        let corrupt = |message: String| StoreError::Corrupt {
            path: path.to_path_buf(),
            message,
        };
        let habits: Vec<Habit> = serde_json::from_str(content).map_err(|e| corrupt(e.to_string()))?;
        for habit in &habits {
            habit
                .frequency
                .validate()
                .map_err(|e| corrupt(format!("habit '{}': {e}", habit.name)))?;
        }
        Ok(habits)
    }

    /// Write the store back, replacing the file atomically.
    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.habits)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), count = self.habits.len(), "saved habit store");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    /// Habits that are not archived.
    pub fn active(&self) -> Vec<Habit> {
        self.habits.iter().filter(|h| !h.archived).cloned().collect()
    }

    pub fn add(&mut self, habit: Habit) -> Result<&Habit> {
        if self
            .habits
            .iter()
            .any(|h| h.name.eq_ignore_ascii_case(&habit.name))
        {
            return Err(StoreError::DuplicateName(habit.name).into());
        }
        self.habits.push(habit);
        Ok(&self.habits[self.habits.len() - 1])
    }

    /// Finds a habit by full id, id prefix or case-insensitive name.
    pub fn find(&self, reference: &str) -> Result<&Habit> {
        let index = self.position(reference)?;
        Ok(&self.habits[index])
    }

    pub fn find_mut(&mut self, reference: &str) -> Result<&mut Habit> {
        let index = self.position(reference)?;
        Ok(&mut self.habits[index])
    }

    pub fn remove(&mut self, reference: &str) -> Result<Habit> {
        let index = self.position(reference)?;
        Ok(self.habits.remove(index))
    }

    fn position(&self, reference: &str) -> Result<usize> {
        let reference = reference.trim();
        if let Some(index) = self
            .habits
            .iter()
            .position(|h| h.name.eq_ignore_ascii_case(reference) || h.id.to_string() == reference)
        {
            return Ok(index);
        }

        let prefixed: Vec<usize> = self
            .habits
            .iter()
            .enumerate()
            .filter(|(_, h)| !reference.is_empty() && h.id.to_string().starts_with(reference))
            .map(|(index, _)| index)
            .collect();
        match prefixed.as_slice() {
            [index] => Ok(*index),
            [] => Err(StoreError::NotFound(reference.to_string()).into()),
            many => Err(StoreError::Ambiguous {
                reference: reference.to_string(),
                count: many.len(),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::habit::Frequency;
    use chrono::NaiveDate;

    fn store_in(dir: &tempfile::TempDir) -> HabitStore {
        HabitStore::open_at(dir.path().join(HABITS_FILE)).unwrap()
    }

    #[test]
    fn missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.habits().is_empty());
    }

    #[test]
    fn save_and_reopen_keeps_completions() {
        let dir = tempfile::tempdir().unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let mut store = store_in(&dir);
        store.add(Habit::new("Read", Frequency::Daily)).unwrap();
        store
            .find_mut("read")
            .unwrap()
            .completions
            .set(today, true, today);
        store.save().unwrap();

        let reopened = store_in(&dir);
        assert_eq!(reopened.habits().len(), 1);
        assert_eq!(reopened.find("Read").unwrap().completions.get(today), Some(true));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.add(Habit::new("Read", Frequency::Daily)).unwrap();
        let err = store.add(Habit::new("READ", Frequency::Daily)).unwrap_err();
        assert!(matches!(err, CoreError::Store(StoreError::DuplicateName(_))));
    }

    #[test]
    fn find_by_id_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        let id = store.add(Habit::new("Read", Frequency::Daily)).unwrap().id;
        let prefix = &id.to_string()[..8];
        assert_eq!(store.find(prefix).unwrap().name, "Read");
        assert!(matches!(
            store.find("nope"),
            Err(CoreError::Store(StoreError::NotFound(_)))
        ));
    }

    #[test]
    fn remove_and_active_filter() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.add(Habit::new("Read", Frequency::Daily)).unwrap();
        store.add(Habit::new("Walk", Frequency::Daily)).unwrap();
        store.find_mut("walk").unwrap().archived = true;
        assert_eq!(store.active().len(), 1);

        let removed = store.remove("read").unwrap();
        assert_eq!(removed.name, "Read");
        assert_eq!(store.habits().len(), 1);
    }

    #[test]
    fn invalid_frequency_marks_store_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(HABITS_FILE);
        let json = r#"[{"id":"6f1c1f0e-3a37-4d3b-9d8e-0a4a7d9b0c11","name":"Bad",
            "frequency":{"type":"per_week","count":9},
            "created_at":"2026-10-01T00:00:00Z"}]"#;
        std::fs::write(&path, json).unwrap();
        let err = HabitStore::open_at(&path).unwrap_err();
        assert!(matches!(err, CoreError::Store(StoreError::Corrupt { .. })));
    }
}
