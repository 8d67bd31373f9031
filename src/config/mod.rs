//! Configuration module for SoundVault
//!
//! This module contains the service settings and path management.

mod paths;
mod settings;

pub use paths::Paths;
pub use settings::{
    DropboxSettings, GeniusSettings, LyricsSettings, MetadataSettings, Settings, SupabaseSettings,
};
