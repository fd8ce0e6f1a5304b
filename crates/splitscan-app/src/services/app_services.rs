// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — owns the data directory and the persisted
// settings the front end starts from.

use std::path::{Path, PathBuf};

use splitscan_core::AppConfig;
use splitscan_core::error::{Result, SplitscanError};
use tracing::{info, warn};

use super::data_dir;

/// Settings and storage locations for one run of the front end.
#[derive(Debug, Clone)]
pub struct AppServices {
    data_dir: PathBuf,
    config_path: PathBuf,
    config: AppConfig,
}

impl AppServices {
    /// Initialise from the platform data directory.
    ///
    /// `config_file` replaces the default `config.json` location. An explicit
    /// file must load; the default one silently falls back to defaults when
    /// absent.
    pub fn init(config_file: Option<PathBuf>) -> Result<Self> {
        Self::in_dir(data_dir::data_dir(), config_file)
    }

    pub fn in_dir(data_dir: PathBuf, config_file: Option<PathBuf>) -> Result<Self> {
        info!(path = %data_dir.display(), "initialising app services");

        let config = match &config_file {
            Some(path) => load_config(path)?,
            None => {
                let path = data_dir.join(CONFIG_FILE);
                if path.is_file() {
                    load_config(&path).unwrap_or_else(|e| {
                        warn!(error = %e, "ignoring unreadable settings file");
                        AppConfig::default()
                    })
                } else {
                    AppConfig::default()
                }
            }
        };

        let config_path = config_file.unwrap_or_else(|| data_dir.join(CONFIG_FILE));
        Ok(Self {
            data_dir,
            config_path,
            config,
        })
    }

    // -- Config Persistence --------------------------------------------------

    /// The settings loaded at start-up.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Validate, adopt and persist `config`.
    pub fn save_config(&mut self, config: &AppConfig) -> Result<()> {
        config.validate()?;
        persist_config(&self.config_path, config)?;
        self.config = config.clone();
        info!(path = %self.config_path.display(), "settings saved");
        Ok(())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Configured output directory, or `output/` inside the data directory.
    pub fn output_dir(&self) -> PathBuf {
        self.config
            .output_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join(OUTPUT_SUBDIR))
    }
}

// -- Config file persistence -------------------------------------------------

const CONFIG_FILE: &str = "config.json";
const OUTPUT_SUBDIR: &str = "output";

fn load_config(path: &Path) -> Result<AppConfig> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| SplitscanError::Config(format!("{}: {}", path.display(), e)))?;
    let config: AppConfig = serde_json::from_str(&data)?;
    config.validate()?;
    Ok(config)
}

fn persist_config(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_settings_fall_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let services = AppServices::in_dir(dir.path().to_path_buf(), None).expect("init");
        assert_eq!(services.config(), &AppConfig::default());
        assert_eq!(services.config_path(), dir.path().join("config.json"));
        assert_eq!(services.output_dir(), dir.path().join("output"));
    }

    #[test]
    fn saved_settings_are_loaded_next_time() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut services = AppServices::in_dir(dir.path().to_path_buf(), None).expect("init");

        let mut config = AppConfig::default();
        config.extraction.max_regions = 3;
        config.reveal_output = true;
        services.save_config(&config).expect("save");

        let reloaded = AppServices::in_dir(dir.path().to_path_buf(), None).expect("reload");
        assert_eq!(reloaded.config(), &config);
    }

    #[test]
    fn corrupt_default_settings_are_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("config.json"), "{ not json").expect("write");

        let services = AppServices::in_dir(dir.path().to_path_buf(), None).expect("init");
        assert_eq!(services.config(), &AppConfig::default());
    }

    #[test]
    fn explicit_settings_file_must_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("elsewhere.json");
        let result = AppServices::in_dir(dir.path().to_path_buf(), Some(missing));
        assert!(matches!(result, Err(SplitscanError::Config(_))));
    }

    #[test]
    fn partial_settings_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("custom.json");
        std::fs::write(&path, r#"{ "batch": { "max_parallelism": 2 } }"#).expect("write");

        let services = AppServices::in_dir(dir.path().to_path_buf(), Some(path)).expect("init");
        assert_eq!(services.config().batch.max_parallelism, 2);
        assert_eq!(services.config().extraction.max_regions, 5);
    }

    #[test]
    fn invalid_settings_are_not_saved() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut services = AppServices::in_dir(dir.path().to_path_buf(), None).expect("init");

        let mut config = AppConfig::default();
        config.extraction.jpeg_quality = 0;
        assert!(services.save_config(&config).is_err());
        assert!(!dir.path().join("config.json").exists());
    }
}
