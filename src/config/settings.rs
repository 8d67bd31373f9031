//! Service settings for SoundVault
//!
//! Settings are layered: built-in defaults, then `settings.json` in the config
//! directory, then `SOUNDVAULT__<SECTION>__<KEY>` environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Paths;

pub const ENV_PREFIX: &str = "SOUNDVAULT";

/// Dropbox application credentials and endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DropboxSettings {
    pub app_key: String,
    pub app_secret: String,
    /// Where Dropbox sends the browser after consent (served by the web client)
    pub redirect_uri: String,
    pub authorize_url: String,
    pub oauth_url: String,
    pub api_url: String,
    pub content_url: String,
    /// Entries requested per listing page
    pub page_size: u32,
    /// Refresh the access token when it expires within this many seconds
    pub refresh_margin_secs: u64,
    /// Temporary links requested in parallel while processing a page
    pub link_concurrency: usize,
    /// Largest file accepted by a single upload call
    pub max_upload_bytes: usize,
}

impl Default for DropboxSettings {
    fn default() -> Self {
        Self {
            app_key: String::new(),
            app_secret: String::new(),
            redirect_uri: "http://localhost:8080/auth/dropbox/callback".to_string(),
            authorize_url: "https://www.dropbox.com/oauth2/authorize".to_string(),
            oauth_url: "https://api.dropbox.com/oauth2/token".to_string(),
            api_url: "https://api.dropboxapi.com".to_string(),
            content_url: "https://content.dropboxapi.com".to_string(),
            page_size: 20,
            refresh_margin_secs: 300,
            link_concurrency: 4,
            max_upload_bytes: 150 * 1024 * 1024,
        }
    }
}

/// Supabase project settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SupabaseSettings {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Public anon key sent as `apikey`
    pub anon_key: String,
    /// JWT secret used to verify access token signatures
    pub jwt_secret: Option<String>,
}

impl SupabaseSettings {
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeniusSettings {
    pub api_url: String,
    pub access_token: String,
}

impl Default for GeniusSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.genius.com".to_string(),
            access_token: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LyricsSettings {
    pub api_url: String,
    pub api_key: String,
}

impl Default for LyricsSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.musixmatch.com/ws/1.1".to_string(),
            api_key: String::new(),
        }
    }
}

/// Tag extraction pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataSettings {
    /// Tracks parsed concurrently per batch
    pub batch_size: usize,
    /// Pause between batches in milliseconds
    pub batch_delay_ms: u64,
    /// Downloads larger than this are abandoned
    pub max_download_bytes: u64,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            batch_size: 3,
            batch_delay_ms: 500,
            max_download_bytes: 200 * 1024 * 1024,
        }
    }
}

/// All service settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub dropbox: DropboxSettings,
    pub supabase: SupabaseSettings,
    pub genius: GeniusSettings,
    pub lyrics: LyricsSettings,
    pub metadata: MetadataSettings,
}

impl Settings {
    /// Load settings from the config directory and environment
    pub fn load(paths: &Paths) -> Result<Self> {
        let defaults = config::Config::try_from(&Settings::default())
            .context("Failed to build default settings")?;

        let settings: Settings = config::Config::builder()
            .add_source(defaults)
            .add_source(
                config::File::from(paths.settings_path())
                    .format(config::FileFormat::Json)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Failed to parse settings")?;

        Ok(settings)
    }

    /// Log every missing credential, returns how many were missing
    pub fn validate(&self) -> usize {
        let checks = [
            (self.dropbox.app_key.is_empty(), "dropbox.app_key"),
            (self.dropbox.app_secret.is_empty(), "dropbox.app_secret"),
            (self.supabase.url.is_empty(), "supabase.url"),
            (self.supabase.anon_key.is_empty(), "supabase.anon_key"),
            (self.genius.access_token.is_empty(), "genius.access_token"),
            (self.lyrics.api_key.is_empty(), "lyrics.api_key"),
        ];

        let mut missing = 0;
        for (is_missing, key) in checks {
            if is_missing {
                warn!(
                    "Setting '{}' is not configured; dependent endpoints will fail",
                    key
                );
                missing += 1;
            }
        }

        if self.supabase.jwt_secret.is_none() {
            warn!("supabase.jwt_secret is not set: access token signatures will NOT be verified");
        }

        missing
    }
}
