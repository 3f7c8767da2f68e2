//! Configuration persistence.
//!
//! Loads and saves the JSON config with atomic write operations and a
//! never-fail load path: any unreadable, empty or invalid file is logged and
//! reset to the default so startup always succeeds.

use crate::{
    AppError, AppResult,
    config::{CONFIG_FILE, WardenConfig},
};

use std::{fs, io::Write, panic::Location, path::PathBuf, sync::Arc};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use replay_warden_core::RotationSchedule;
use tracing::{debug, info, instrument, warn};

/// Owns the config file path and keeps the shared [`RotationSchedule`] in
/// sync with the persisted value.
pub struct ConfigStore {
    path: PathBuf,
    schedule: Arc<RotationSchedule>,
}

impl ConfigStore {
    /// Store backed by an explicit file path. Used directly by tests.
    pub fn open(path: PathBuf, schedule: Arc<RotationSchedule>) -> Self {
        Self { path, schedule }
    }

    /// Store backed by the platform config directory, created if absent.
    #[track_caller]
    #[instrument(skip(schedule))]
    pub fn from_project_dirs(schedule: Arc<RotationSchedule>) -> AppResult<Self> {
        let proj_dirs = ProjectDirs::from("dev", "replay-warden", "Replay-Warden").ok_or_else(
            || AppError::ConfigError {
                reason: "Failed to get config directory".to_string(),
                location: ErrorLocation::from(Location::caller()),
            },
        )?;

        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(Self::open(config_dir.join(CONFIG_FILE), schedule))
    }

    /// Loads the persisted config, falling back to (and rewriting) the
    /// default on any failure. Never errors: a broken config file must not
    /// prevent startup.
    #[instrument(skip(self))]
    pub fn load(&self) -> WardenConfig {
        let config = match self.read_config() {
            Ok(config) => {
                info!(
                    config_path = ?self.path,
                    cut_time_minutes = config.cut_time_minutes,
                    "Configuration loaded"
                );
                config
            }
            Err(reason) => {
                warn!(config_path = ?self.path, %reason, "Invalid config, resetting to default");
                let config = WardenConfig::default();
                if let Err(e) = self.persist(&config) {
                    warn!(error = ?e, "Failed to write default config");
                }
                config
            }
        };

        self.schedule.set_minutes(config.cut_time_minutes);
        config
    }

    /// Sets a new cut interval: updates the live schedule, then persists.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive interval. A persistence failure
    /// is logged but not propagated; the in-memory value already took
    /// effect.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn set_cut_minutes(&self, minutes: u64) -> AppResult<()> {
        if minutes == 0 {
            return Err(AppError::ConfigError {
                reason: "cut interval must be greater than zero".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.schedule.set_minutes(minutes);

        let config = WardenConfig {
            cut_time_minutes: minutes,
        };
        if let Err(e) = self.persist(&config) {
            warn!(error = ?e, "Failed to persist config change");
        }

        Ok(())
    }

    /// Reads and validates the config file. Any failure is reported as a
    /// human-readable reason for the fallback log line.
    fn read_config(&self) -> Result<WardenConfig, String> {
        if !self.path.exists() {
            return Err("config file does not exist".to_string());
        }

        let contents =
            fs::read_to_string(&self.path).map_err(|e| format!("failed to read config: {e}"))?;

        if contents.trim().is_empty() {
            return Err("config file is empty".to_string());
        }

        let config: WardenConfig =
            serde_json::from_str(&contents).map_err(|e| format!("failed to parse config: {e}"))?;

        if !config.is_valid() {
            return Err(format!(
                "invalid cut interval: {}",
                config.cut_time_minutes
            ));
        }

        Ok(config)
    }

    /// Saves a config using the atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    fn persist(&self, config: &WardenConfig) -> AppResult<()> {
        let contents =
            serde_json::to_string_pretty(config).map_err(|e| AppError::ConfigError {
                reason: format!("Failed to serialize config: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        // Atomic write: write to temp file then rename
        let temp_path = self.path.with_extension("json.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, &self.path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?self.path, "Configuration saved (atomic write)");

        Ok(())
    }
}
