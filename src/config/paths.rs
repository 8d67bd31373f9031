//! Path management for SoundVault
//!
//! This module manages all filesystem paths used by the service.

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

static PATHS: OnceCell<Arc<Paths>> = OnceCell::new();

/// Manages all filesystem paths for the service
#[derive(Debug, Clone)]
pub struct Paths {
    /// Config directory path
    config_dir: PathBuf,
    /// Path to the prebuilt web client
    client_path: PathBuf,
}

impl Paths {
    /// Initialize the paths singleton
    pub fn init(config: Option<PathBuf>, client: Option<PathBuf>) -> Result<Arc<Paths>> {
        let paths = PATHS.get_or_try_init(|| {
            let paths = Self::new(config, client)?;
            Ok::<_, anyhow::Error>(Arc::new(paths))
        })?;
        Ok(Arc::clone(paths))
    }

    pub(crate) fn new(config_override: Option<PathBuf>, client_override: Option<PathBuf>) -> Result<Self> {
        let config_dir = match config_override {
            Some(path) => path,
            None => directories::ProjectDirs::from("", "", "soundvault")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".soundvault")),
        };

        let client_path = client_override.unwrap_or_else(|| config_dir.join("client"));

        let paths = Self {
            config_dir,
            client_path,
        };

        std::fs::create_dir_all(&paths.config_dir).with_context(|| {
            format!("Failed to create config directory {}", paths.config_dir.display())
        })?;

        Ok(paths)
    }

    /// Get the config directory
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get the web client directory
    pub fn client_path(&self) -> &Path {
        &self.client_path
    }

    /// Get the settings file path
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Persisted Dropbox sessions
    pub fn sessions_path(&self) -> PathBuf {
        self.config_dir.join("sessions.json")
    }

    /// Entry document of the web client
    pub fn client_index(&self) -> PathBuf {
        self.client_path.join("index.html")
    }
}
