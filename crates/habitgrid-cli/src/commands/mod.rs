pub mod config;
pub mod habit;
pub mod stats;
pub mod streak;

use habitgrid_core::{Config, HabitStore};

/// Loaded config plus the habit store, shared by the data commands.
pub struct Context {
    pub config: Config,
    pub store: HabitStore,
}

impl Context {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            config: Config::load()?,
            store: HabitStore::open()?,
        })
    }

    pub fn json(&self, flag: bool) -> bool {
        flag || self.config.display.json
    }
}
