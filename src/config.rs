use std::path::PathBuf;

pub const GAME_TITLE: &str = "Food Rush";

/// World units; the renderer maps them onto whatever terminal is available.
pub const WORLD_WIDTH: f32 = 1280.0;
pub const WORLD_HEIGHT: f32 = 720.0;

const DEFAULT_FPS: u64 = 60;
const DEFAULT_SAVES_DIR: &str = "saves";
const DEFAULT_ASSETS_DIR: &str = "assets";
const DEFAULT_LOG_FILE: &str = "food_rush.log";
const PROGRESS_FILE: &str = "progress.json";

#[derive(Debug, Clone)]
pub struct Settings {
    pub fps: u64,
    pub saves_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub seed: Option<u64>,
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            saves_dir: PathBuf::from(DEFAULT_SAVES_DIR),
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
            seed: None,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let fps = lookup("FOOD_RUSH_FPS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(defaults.fps);
        let path = |key: &str, default: PathBuf| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(default)
        };
        Self {
            fps,
            saves_dir: path("FOOD_RUSH_SAVES", defaults.saves_dir),
            assets_dir: path("FOOD_RUSH_ASSETS", defaults.assets_dir),
            seed: lookup("FOOD_RUSH_SEED").and_then(|v| v.parse::<u64>().ok()),
            log_file: path("FOOD_RUSH_LOG", defaults.log_file),
        }
    }

    pub fn progress_path(&self) -> PathBuf {
        self.saves_dir.join(PROGRESS_FILE)
    }
}
