use crate::error::Result;
use directories::ProjectDirs;
use std::path::PathBuf;

pub struct Config;

impl Config {
    pub fn home() -> Result<PathBuf> {
        if let Ok(home) = std::env::var("LABDASH_HOME") {
            return Ok(PathBuf::from(home));
        }
        ProjectDirs::from("dev", "labdash", "labdash")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "Could not find home directory")
                    .into()
            })
    }

    /// Preference store (theme, acks, notes, snoozes) lives in a single JSON file.
    pub fn prefs_path() -> Result<PathBuf> {
        Ok(Self::home()?.join("prefs.json"))
    }

    pub fn ensure_home() -> Result<()> {
        let home = Self::home()?;
        if !home.exists() {
            std::fs::create_dir_all(&home)?;
        }
        Ok(())
    }
}

pub const CANVAS_WIDTH: f64 = 800.0;
pub const CANVAS_HEIGHT: f64 = 600.0;
pub const NODE_RADIUS: f64 = 40.0;
pub const CANVAS_MARGIN: f64 = 20.0;
pub const LAYOUT_ITERATIONS: usize = 100;
pub const DEFAULT_LOG_LIMIT: usize = 100;
pub const SEARCH_DEBOUNCE_MS: u64 = 300;
pub const ACTION_LATENCY_MS: u64 = 220;
