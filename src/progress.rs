use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::ProgressError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleStats {
    pub id: &'static str,
    pub name: &'static str,
    pub speed_multiplier: f32,
    pub lives: u32,
    pub price: u32,
}

pub const VEHICLES: [VehicleStats; 3] = [
    VehicleStats {
        id: "bicycle",
        name: "Bicycle",
        speed_multiplier: 1.0,
        lives: 3,
        price: 0,
    },
    VehicleStats {
        id: "scooter",
        name: "Scooter",
        speed_multiplier: 1.2,
        lives: 4,
        price: 1000,
    },
    VehicleStats {
        id: "motorcycle",
        name: "Motorcycle",
        speed_multiplier: 1.5,
        lives: 5,
        price: 2000,
    },
];

pub const DEFAULT_VEHICLE: &str = "bicycle";

pub fn vehicle(id: &str) -> Option<&'static VehicleStats> {
    VEHICLES.iter().find(|v| v.id == id)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub coins: u32,
    pub vehicles: BTreeMap<String, bool>,
    pub current_vehicle: String,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            coins: 0,
            vehicles: VEHICLES
                .iter()
                .map(|v| (v.id.to_string(), v.price == 0))
                .collect(),
            current_vehicle: DEFAULT_VEHICLE.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoredProgress {
    coins: u32,
    vehicles: BTreeMap<String, bool>,
    current_vehicle: Option<String>,
}

impl From<StoredProgress> for Progress {
    fn from(stored: StoredProgress) -> Self {
        let vehicles: BTreeMap<String, bool> = VEHICLES
            .iter()
            .map(|v| {
                let owned = stored.vehicles.get(v.id).copied().unwrap_or(v.price == 0);
                (v.id.to_string(), owned)
            })
            .collect();
        let current_vehicle = stored
            .current_vehicle
            .filter(|id| vehicles.get(id).copied().unwrap_or(false))
            .unwrap_or_else(|| DEFAULT_VEHICLE.to_string());
        Self {
            coins: stored.coins,
            vehicles,
            current_vehicle,
        }
    }
}

/// Owns the progress record and its file. Every balance-changing call rewrites
/// the whole file; the in-memory copy stays authoritative if a write fails.
#[derive(Debug)]
pub struct ProgressStore {
    path: PathBuf,
    progress: Progress,
}

impl ProgressStore {
    /// Loads `path`, falling back to (and rewriting) defaults when the file is
    /// missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (progress, rewrite) = match read_progress(&path) {
            Ok(progress) => {
                info!(path = %path.display(), coins = progress.coins, "progress loaded");
                (progress, false)
            }
            Err(ProgressError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no progress file, starting fresh");
                (Progress::default(), true)
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "progress unreadable, resetting");
                (Progress::default(), true)
            }
        };
        let store = Self { path, progress };
        if rewrite {
            store.save();
        }
        store
    }

    #[cfg(test)]
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn coins(&self) -> u32 {
        self.progress.coins
    }

    pub fn owns(&self, id: &str) -> bool {
        self.progress.vehicles.get(id).copied().unwrap_or(false)
    }

    pub fn current_vehicle(&self) -> &str {
        &self.progress.current_vehicle
    }

    pub fn current_vehicle_stats(&self) -> &'static VehicleStats {
        vehicle(&self.progress.current_vehicle).unwrap_or(&VEHICLES[0])
    }

    pub fn save(&self) {
        if let Err(err) = write_progress(&self.path, &self.progress) {
            error!(%err, "failed to save progress");
        }
    }

    pub fn add_coins(&mut self, amount: u32) {
        if amount == 0 {
            return;
        }
        self.progress.coins = self.progress.coins.saturating_add(amount);
        info!(amount, total = self.progress.coins, "coins credited");
        self.save();
    }

    pub fn spend_coins(&mut self, amount: u32) -> bool {
        if self.progress.coins < amount {
            return false;
        }
        self.progress.coins -= amount;
        self.save();
        true
    }

    /// Buys and selects `id` when it is not yet owned and affordable.
    pub fn buy_vehicle(&mut self, id: &str) -> Result<bool, ProgressError> {
        let stats = vehicle(id).ok_or_else(|| ProgressError::UnknownVehicle(id.to_string()))?;
        if self.owns(id) || !self.spend_coins(stats.price) {
            return Ok(false);
        }
        self.progress.vehicles.insert(id.to_string(), true);
        self.progress.current_vehicle = id.to_string();
        info!(vehicle = id, price = stats.price, "vehicle bought");
        self.save();
        Ok(true)
    }

    pub fn select_vehicle(&mut self, id: &str) -> Result<bool, ProgressError> {
        vehicle(id).ok_or_else(|| ProgressError::UnknownVehicle(id.to_string()))?;
        if !self.owns(id) {
            return Ok(false);
        }
        self.progress.current_vehicle = id.to_string();
        self.save();
        Ok(true)
    }
}

fn read_progress(path: &Path) -> Result<Progress, ProgressError> {
    let text = fs::read_to_string(path).map_err(|source| ProgressError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let stored: StoredProgress = serde_json::from_str(&text)?;
    Ok(stored.into())
}

fn write_progress(path: &Path, progress: &Progress) -> Result<(), ProgressError> {
    let io_err = |source: io::Error| ProgressError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(progress)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    pub(crate) fn temp_progress_path() -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir()
            .join(format!("food_rush_test_{}_{}", std::process::id(), n))
            .join("progress.json")
    }

    #[test]
    fn missing_file_creates_defaults() {
        let path = temp_progress_path();
        let store = ProgressStore::open(&path);
        assert_eq!(store.progress(), &Progress::default());
        assert!(path.exists());
        assert!(store.owns("bicycle"));
        assert!(!store.owns("scooter"));
    }

    #[test]
    fn corrupt_file_is_reset_and_rewritten() {
        let path = temp_progress_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        let store = ProgressStore::open(&path);
        assert_eq!(store.coins(), 0);
        let reread = read_progress(&path).expect("rewritten file parses");
        assert_eq!(reread, Progress::default());
    }

    #[test]
    fn stored_values_are_merged_with_catalog() {
        let path = temp_progress_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            r#"{"coins": 1500, "vehicles": {"scooter": true, "rocket": true}, "current_vehicle": "rocket"}"#,
        )
        .unwrap();
        let store = ProgressStore::open(&path);
        assert_eq!(store.coins(), 1500);
        assert!(store.owns("scooter"));
        assert!(store.owns("bicycle"));
        assert!(!store.owns("rocket"));
        assert_eq!(store.current_vehicle(), DEFAULT_VEHICLE);
    }

    #[test]
    fn unowned_current_vehicle_falls_back() {
        let path = temp_progress_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            r#"{"coins": 0, "vehicles": {"scooter": true}, "current_vehicle": "motorcycle"}"#,
        )
        .unwrap();
        let store = ProgressStore::open(&path);
        assert_eq!(store.current_vehicle(), DEFAULT_VEHICLE);
        assert_eq!(store.current_vehicle_stats().id, DEFAULT_VEHICLE);

        fs::write(
            &path,
            r#"{"coins": 0, "vehicles": {"scooter": true}, "current_vehicle": "scooter"}"#,
        )
        .unwrap();
        assert_eq!(ProgressStore::open(&path).current_vehicle(), "scooter");
    }

    #[test]
    fn buying_requires_coins_and_selects() {
        let path = temp_progress_path();
        let mut store = ProgressStore::open(&path);
        assert!(!store.buy_vehicle("scooter").unwrap());

        store.add_coins(1200);
        assert!(store.buy_vehicle("scooter").unwrap());
        assert_eq!(store.coins(), 200);
        assert_eq!(store.current_vehicle(), "scooter");
        assert_eq!(store.current_vehicle_stats().lives, 4);
        assert!(!store.buy_vehicle("scooter").unwrap());

        let reopened = ProgressStore::open(&path);
        assert_eq!(reopened.coins(), 200);
        assert!(reopened.owns("scooter"));
        assert!(matches!(
            store.buy_vehicle("rocket"),
            Err(ProgressError::UnknownVehicle(_))
        ));
    }

    #[test]
    fn selecting_requires_ownership() {
        let mut store = ProgressStore::open(temp_progress_path());
        assert!(!store.select_vehicle("motorcycle").unwrap());
        assert!(store.select_vehicle("bicycle").unwrap());
        assert!(!store.spend_coins(1));
    }
}
