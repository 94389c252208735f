//! Config File Storage
//!
//! Persists `AppConfig` as pretty JSON, by default at
//! `~/.sow-studio/config.json`. Every read and write is validated.

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::settings::{AppConfig, SettingsUpdate};
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{config_path, ensure_dir};

/// Owns the config file and its last loaded contents.
#[derive(Debug)]
pub struct ConfigService {
    config_path: PathBuf,
    config: AppConfig,
}

impl ConfigService {
    /// Open the default config file.
    pub fn new() -> AppResult<Self> {
        Self::open(config_path()?)
    }

    /// Open the config file at `path`, writing defaults when it is missing.
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let config_path = path.into();
        if let Some(parent) = config_path.parent() {
            ensure_dir(parent)?;
        }

        let config = if config_path.exists() {
            read_validated(&config_path)?
        } else {
            let defaults = AppConfig::default();
            write_validated(&config_path, &defaults)?;
            tracing::info!("[Config] Wrote defaults to {}", config_path.display());
            defaults
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Contents as stored on disk.
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    /// Stored config plus `ANYTHINGLLM_*` environment overrides.
    pub fn effective_config(&self) -> AppConfig {
        let mut config = self.config.clone();
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply a partial update and persist it. An update that would leave the
    /// config invalid is rejected and nothing is written.
    pub fn update_config(&mut self, update: SettingsUpdate) -> AppResult<AppConfig> {
        let mut next = self.config.clone();
        next.apply_update(update);
        write_validated(&self.config_path, &next)?;
        self.config = next;
        Ok(self.config.clone())
    }

    pub fn save(&self) -> AppResult<()> {
        write_validated(&self.config_path, &self.config)
    }

    /// Re-read the file, discarding in-memory state.
    pub fn reload(&mut self) -> AppResult<()> {
        self.config = read_validated(&self.config_path)?;
        Ok(())
    }

    pub fn reset(&mut self) -> AppResult<()> {
        self.config = AppConfig::default();
        self.save()
    }
}

fn read_validated(path: &Path) -> AppResult<AppConfig> {
    let config: AppConfig = serde_json::from_str(&fs::read_to_string(path)?)?;
    config.validate().map_err(AppError::validation)?;
    Ok(config)
}

fn write_validated(path: &Path, config: &AppConfig) -> AppResult<()> {
    config.validate().map_err(AppError::validation)?;
    fs::write(path, serde_json::to_string_pretty(config)?)?;
    Ok(())
}
