//! Local files: TOML configuration and the JSON habit store.

mod config;
pub mod store;

pub use config::{CalendarConfig, Config, DisplayConfig};
pub use store::HabitStore;

use std::path::PathBuf;

use crate::error::Result;

/// Returns the data directory, creating it if needed.
///
/// `HABITGRID_DATA_DIR` wins when set. Otherwise `~/.config/habitgrid[-dev]/`
/// based on HABITGRID_ENV; set HABITGRID_ENV=dev to use the development
/// directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("HABITGRID_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("HABITGRID_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("habitgrid-dev")
            } else {
                base_dir.join("habitgrid")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
